//! # Score Validation
//!
//! Structural checks on a [`Score`] before it is analyzed.
//!
//! The analysis passes are best-effort and never call this themselves: a measure
//! with odd content just reduces to whatever survives. Validation is for callers
//! that would rather reject a malformed score up front, like the `harmonize` binary.
//!
//! ## Rules
//! - Every measure has a positive, finite length
//! - Every event starts inside its measure: `0 <= offset < length`
//! - Every event has a positive, finite duration
//! - A chord has at least one pitch, and an explicit root is one of its pitches
//!
//! ## Example
//! ```rust
//! use harmonize::{validate, HarmonizeError, Measure, Part, Score};
//!
//! let score = Score::new(vec![Part::new(None, vec![Measure::new(7, 0.0, vec![])])]);
//! match validate(&score) {
//!     Err(HarmonizeError::SemanticError { measure, .. }) => assert_eq!(measure, 7),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use crate::error::HarmonizeError;
use crate::score::{Event, Measure, Score, OFFSET_EPSILON};

/// Validate every measure of every part, reporting the first defect found
pub fn validate(score: &Score) -> Result<(), HarmonizeError> {
    for part in &score.parts {
        for measure in &part.measures {
            validate_measure(measure)?;
        }
    }
    Ok(())
}

fn validate_measure(measure: &Measure) -> Result<(), HarmonizeError> {
    let error = |message: String| HarmonizeError::SemanticError {
        measure: measure.number,
        message,
    };

    if !measure.length.is_finite() || measure.length <= 0.0 {
        return Err(error(format!(
            "measure length must be positive, got {}",
            measure.length
        )));
    }

    for event in &measure.events {
        let offset = event.offset();
        if !offset.is_finite() || offset < -OFFSET_EPSILON || offset > measure.length - OFFSET_EPSILON {
            return Err(error(format!(
                "event at offset {} lies outside the measure (length {})",
                offset, measure.length
            )));
        }

        let duration = event.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(error(format!(
                "event at offset {} has non-positive duration {}",
                offset, duration
            )));
        }

        if let Event::Chord(chord) = event {
            if chord.is_empty() {
                return Err(error(format!("chord at offset {} has no pitches", offset)));
            }
            if let Some(root) = &chord.root {
                if !chord.pitches.contains(root) {
                    return Err(error(format!(
                        "chord at offset {} has root {} that is not one of its pitches",
                        offset, root
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Chord, Note, Part, Unpitched};
    use crate::Pitch;

    fn pitch(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    fn score_with(measure: Measure) -> Score {
        Score::new(vec![Part::new(None, vec![measure])])
    }

    fn message(result: Result<(), HarmonizeError>) -> String {
        match result {
            Err(HarmonizeError::SemanticError { message, .. }) => message,
            other => panic!("Expected SemanticError but got: {:?}", other),
        }
    }

    #[test]
    fn test_valid_score() {
        let measure = Measure::new(
            1,
            4.0,
            vec![
                Event::Chord(Chord::new([pitch("C3"), pitch("E3")], 0.0, 2.0)),
                Event::Note(Note::new(pitch("G3"), 2.0, 2.0)),
                Event::Unpitched(Unpitched::new(3.5, 0.5)),
            ],
        );
        assert!(validate(&score_with(measure)).is_ok());
        assert!(validate(&Score::default()).is_ok());
    }

    #[test]
    fn test_event_outside_measure() {
        let measure = Measure::new(3, 4.0, vec![Event::Note(Note::new(pitch("C4"), 4.5, 1.0))]);
        let result = validate(&score_with(measure));
        assert!(message(result).contains("outside the measure"));

        let measure = Measure::new(3, 4.0, vec![Event::Note(Note::new(pitch("C4"), -1.0, 1.0))]);
        assert!(validate(&score_with(measure)).is_err());
    }

    #[test]
    fn test_non_positive_duration() {
        let measure = Measure::new(2, 4.0, vec![Event::Note(Note::new(pitch("C4"), 1.0, 0.0))]);
        assert!(message(validate(&score_with(measure))).contains("non-positive duration"));
    }

    #[test]
    fn test_empty_chord() {
        let measure = Measure::new(1, 4.0, vec![Event::Chord(Chord::new([], 0.0, 1.0))]);
        assert!(message(validate(&score_with(measure))).contains("no pitches"));
    }

    #[test]
    fn test_root_outside_chord() {
        let chord = Chord::new([pitch("C4"), pitch("E4")], 0.0, 1.0).with_root(pitch("G4"));
        let measure = Measure::new(1, 4.0, vec![Event::Chord(chord)]);
        assert!(message(validate(&score_with(measure))).contains("not one of its pitches"));
    }

    #[test]
    fn test_reports_measure_number() {
        let measure = Measure::new(12, -4.0, vec![]);
        match validate(&score_with(measure)) {
            Err(HarmonizeError::SemanticError { measure, .. }) => assert_eq!(measure, 12),
            other => panic!("Expected SemanticError but got: {:?}", other),
        }
    }
}
