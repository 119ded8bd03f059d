//! # Chordify
//!
//! Collapses every part of a score into one stream of vertical sonorities.
//!
//! Within each measure, every onset and release of a pitched event is a time point.
//! Each span between consecutive time points becomes one event holding everything
//! that sounds during it: a [`Note`] when one pitch sounds, a [`Chord`] otherwise.
//! Silent spans produce nothing, and unpitched hits never contribute.
//!
//! ```text
//! Soprano: | E4------------ | G4----- |
//! Alto:    | C4---- | D4--------------|
//!            ↓
//! Result:  | [C4 E4]| [D4 E4]| [D4 G4]|
//! ```

use tracing::debug;

use crate::score::{Chord, Event, Measure, Note, Part, Score, OFFSET_EPSILON};

/// Name given to the derived part
pub const CHORDIFY_PART_NAME: &str = "Chordify";

/// Build the chordified part of `score`. The score itself is left untouched.
///
/// The result has as many measures as the longest part. Each measure takes its number
/// from the first part that has it and its length from the longest part at that index.
pub fn chordify(score: &Score) -> Part {
    let measure_count = score.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0);

    let measures = (0..measure_count)
        .map(|index| {
            let stack: Vec<&Measure> = score
                .parts
                .iter()
                .filter_map(|part| part.measures.get(index))
                .collect();
            chordify_measure(index, &stack)
        })
        .collect();

    Part::new(Some(CHORDIFY_PART_NAME.to_string()), measures)
}

fn chordify_measure(index: usize, stack: &[&Measure]) -> Measure {
    let number = stack
        .first()
        .map_or(index as u32 + 1, |measure| measure.number);
    let length = stack.iter().map(|m| m.length).fold(0.0, f64::max);

    let sounding: Vec<&Event> = stack
        .iter()
        .flat_map(|m| m.pitched_events())
        .filter(|e| e.offset() < length - OFFSET_EPSILON)
        .collect();

    let mut points: Vec<f64> = sounding
        .iter()
        .flat_map(|e| [e.offset().max(0.0), e.end().min(length)])
        .collect();
    points.sort_by(f64::total_cmp);
    points.dedup_by(|a, b| (*a - *b).abs() < OFFSET_EPSILON);

    let events: Vec<Event> = points
        .windows(2)
        .filter_map(|span| {
            let (start, end) = (span[0], span[1]);
            let pitches = sounding
                .iter()
                .filter(|e| e.offset() <= start + OFFSET_EPSILON && e.end() > start + OFFSET_EPSILON)
                .flat_map(|e| e.pitches().iter().copied());
            let chord = Chord::new(pitches, start, end - start);

            match chord.pitches.as_slice() {
                [] => None,
                [single] => Some(Event::Note(Note::new(*single, start, end - start))),
                _ => Some(Event::Chord(chord)),
            }
        })
        .collect();

    debug!(measure = number, verticals = events.len(), "chordified measure");
    Measure::new(number, length, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Unpitched;
    use crate::Pitch;

    fn pitch(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    fn note(p: &str, offset: f64, duration: f64) -> Event {
        Event::Note(Note::new(pitch(p), offset, duration))
    }

    fn one_measure(events: Vec<Event>) -> Part {
        Part::new(None, vec![Measure::new(1, 4.0, events)])
    }

    #[test]
    fn test_simultaneous_whole_notes_become_one_chord() {
        let score = Score::new(vec![
            one_measure(vec![note("E4", 0.0, 4.0)]),
            one_measure(vec![note("C4", 0.0, 4.0)]),
        ]);
        let part = chordify(&score);
        assert_eq!(part.name.as_deref(), Some(CHORDIFY_PART_NAME));
        assert_eq!(
            part.measures[0].events,
            vec![Event::Chord(Chord::new([pitch("C4"), pitch("E4")], 0.0, 4.0))]
        );
    }

    #[test]
    fn test_splits_at_every_onset_and_release() {
        let score = Score::new(vec![
            one_measure(vec![note("E4", 0.0, 2.0), note("G4", 2.0, 2.0)]),
            one_measure(vec![note("C4", 0.0, 1.0), note("D4", 1.0, 3.0)]),
        ]);
        let events = chordify(&score).measures.remove(0).events;
        let shape: Vec<(f64, f64, Vec<Pitch>)> = events
            .iter()
            .map(|e| (e.offset(), e.duration(), e.pitches().to_vec()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (0.0, 1.0, vec![pitch("C4"), pitch("E4")]),
                (1.0, 1.0, vec![pitch("D4"), pitch("E4")]),
                (2.0, 2.0, vec![pitch("D4"), pitch("G4")]),
            ]
        );
    }

    #[test]
    fn test_single_pitch_spans_are_notes_and_rests_are_skipped() {
        let score = Score::new(vec![one_measure(vec![note("A3", 1.0, 1.0), note("B3", 3.0, 1.0)])]);
        let events = chordify(&score).measures.remove(0).events;
        assert_eq!(events, vec![note("A3", 1.0, 1.0), note("B3", 3.0, 1.0)]);
    }

    #[test]
    fn test_unpitched_and_overhanging_events() {
        let score = Score::new(vec![
            one_measure(vec![Event::Unpitched(Unpitched::new(0.0, 4.0))]),
            one_measure(vec![note("C3", 2.0, 6.0)]),
        ]);
        let events = chordify(&score).measures.remove(0).events;
        assert_eq!(events, vec![note("C3", 2.0, 2.0)]);
    }

    #[test]
    fn test_uneven_parts_keep_measure_structure() {
        let long = Part::new(
            None,
            vec![
                Measure::new(1, 3.0, vec![note("C4", 0.0, 3.0)]),
                Measure::new(2, 3.0, vec![note("D4", 0.0, 3.0)]),
            ],
        );
        let short = one_measure(vec![note("G3", 0.0, 4.0)]);
        let part = chordify(&Score::new(vec![long, short]));

        assert_eq!(part.measures.len(), 2);
        assert_eq!(part.measures[0].length, 4.0);
        assert_eq!(part.measures[0].events.len(), 2);
        assert_eq!(part.measures[1].number, 2);
        assert_eq!(part.measures[1].events, vec![note("D4", 0.0, 3.0)]);
    }

    #[test]
    fn test_input_score_unchanged() {
        let score = Score::new(vec![one_measure(vec![note("C4", 0.0, 4.0)])]);
        let before = score.clone();
        let _ = chordify(&score);
        assert_eq!(score, before);
    }
}
