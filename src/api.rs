//! # Public API
//!
//! Entry points that take a whole [`Score`] and return its harmonic reduction.
//!
//! ## Analysis Functions
//!
//! - [`chord_symbols()`] - one chord symbol per measure
//! - [`chord_symbols_by_segment()`] - one chord symbol per `beats-per-segment` slice
//! - [`roman_numerals()`] - one Roman numeral per measure against the score's key
//! - [`analyze()`] - whichever of the above `options.labels` selects
//!
//! Every function drops unpitched parts, chordifies what is left and labels the
//! chordified part. The input score is never modified. Measures that cannot be
//! labeled are listed in [`Analysis::skipped`]; they never fail the call.
//!
//! ## Typical Usage
//!
//! ```rust
//! use harmonize::{chord_symbols, AnalysisOptions, Score};
//!
//! let source = r#"
//! parts:
//!   - name: Upper
//!     measures:
//!       - number: 1
//!         length: 4.0
//!         events:
//!           - { type: note, pitch: E4, offset: 0.0, duration: 4.0 }
//!   - name: Lower
//!     measures:
//!       - number: 1
//!         length: 4.0
//!         events:
//!           - { type: note, pitch: C4, offset: 0.0, duration: 4.0 }
//! "#;
//!
//! let score = Score::from_yaml(source)?;
//! let analysis = chord_symbols(&score, &AnalysisOptions::default())?;
//! assert_eq!(analysis.chordified.measures[0].harmony[0].figure, "C(no5)");
//! # Ok::<(), harmonize::HarmonizeError>(())
//! ```

use serde::Serialize;
use tracing::info;

use crate::chordify::chordify;
use crate::key::{detect_key, Key};
use crate::labeler::{label_chord_symbol_segments, label_chord_symbols, label_roman_numerals, Skipped};
use crate::options::{AnalysisOptions, LabelKind};
use crate::parts::remove_unpitched_parts;
use crate::score::{Part, Score};
use crate::HarmonizeError;

/// Result of one analysis pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// The chordified part carrying the inserted labels
    pub chordified: Part,
    /// Major key frame the Roman numerals were computed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    pub skipped: Vec<Skipped>,
}

impl Analysis {
    /// Copy of `score` with the labeled reduction appended as its last part
    pub fn merged_into(&self, score: &Score) -> Score {
        let mut merged = score.clone();
        merged.parts.push(self.chordified.clone());
        merged
    }

    /// Number of chord symbols and Roman-numeral lyrics in the reduction
    pub fn label_count(&self) -> usize {
        self.chordified
            .measures
            .iter()
            .map(|m| m.harmony.len() + m.events.iter().map(|e| e.lyrics().len()).sum::<usize>())
            .sum()
    }
}

/// The key Roman numerals are read in, before any minor-to-major reframing.
///
/// An explicit `key` option wins, then the key declared on the score, then key
/// detection over the score's pitched material.
pub fn resolve_key(score: &Score, options: &AnalysisOptions) -> Key {
    options
        .key
        .or(score.key)
        .unwrap_or_else(|| detect_key(score).key)
}

fn chordified_part(score: &Score) -> Part {
    chordify(&remove_unpitched_parts(score))
}

/// Label every measure with a chord symbol.
///
/// # Errors
/// Returns [`HarmonizeError::InvalidOptions`] if `options` fail validation.
pub fn chord_symbols(score: &Score, options: &AnalysisOptions) -> Result<Analysis, HarmonizeError> {
    options.validate()?;
    let mut chordified = chordified_part(score);
    info!(measures = chordified.measures.len(), "labeling chord symbols");

    let skipped = label_chord_symbols(&mut chordified, options);
    let analysis = Analysis {
        chordified,
        key: None,
        skipped,
    };
    info!(labels = analysis.label_count(), skipped = analysis.skipped.len(), "chord symbols done");
    Ok(analysis)
}

/// Label every `beats-per-segment` slice of each measure with a chord symbol.
///
/// # Example
/// ```rust
/// use harmonize::{chord_symbols_by_segment, AnalysisOptions, Score};
///
/// let source = r#"
/// parts:
///   - measures:
///       - number: 1
///         length: 4.0
///         events:
///           - { type: chord, pitches: [C3, E3, G3], offset: 0.0, duration: 2.0 }
///           - { type: chord, pitches: [F3, A3, C4], offset: 2.0, duration: 2.0 }
/// "#;
///
/// let options = AnalysisOptions { beats_per_segment: 2.0, ..Default::default() };
/// let analysis = chord_symbols_by_segment(&Score::from_yaml(source)?, &options)?;
/// let figures: Vec<_> = analysis.chordified.measures[0]
///     .harmony
///     .iter()
///     .map(|s| s.figure.as_str())
///     .collect();
/// assert_eq!(figures, vec!["C", "F"]);
/// # Ok::<(), harmonize::HarmonizeError>(())
/// ```
///
/// # Errors
/// Returns [`HarmonizeError::InvalidOptions`] if `options` fail validation.
pub fn chord_symbols_by_segment(
    score: &Score,
    options: &AnalysisOptions,
) -> Result<Analysis, HarmonizeError> {
    options.validate()?;
    let mut chordified = chordified_part(score);
    info!(
        measures = chordified.measures.len(),
        beats_per_segment = options.beats_per_segment,
        "labeling chord symbols by segment"
    );

    let skipped = label_chord_symbol_segments(&mut chordified, options);
    let analysis = Analysis {
        chordified,
        key: None,
        skipped,
    };
    info!(labels = analysis.label_count(), skipped = analysis.skipped.len(), "segments done");
    Ok(analysis)
}

/// Label every measure with a Roman numeral.
///
/// The key comes from [`resolve_key`]. A minor key is replaced by its relative
/// major, so every numeral is read in a major frame; [`Analysis::key`] reports the
/// frame that was used.
///
/// # Errors
/// Returns [`HarmonizeError::InvalidOptions`] if `options` fail validation.
pub fn roman_numerals(score: &Score, options: &AnalysisOptions) -> Result<Analysis, HarmonizeError> {
    options.validate()?;
    let pitched = remove_unpitched_parts(score);
    let key = resolve_key(&pitched, options);
    let frame = key.major_frame();
    let mut chordified = chordify(&pitched);
    info!(measures = chordified.measures.len(), key = %key, frame = %frame, "labeling roman numerals");

    let skipped = label_roman_numerals(&mut chordified, &frame, options);
    let analysis = Analysis {
        chordified,
        key: Some(frame),
        skipped,
    };
    info!(labels = analysis.label_count(), skipped = analysis.skipped.len(), "roman numerals done");
    Ok(analysis)
}

/// Run the pass selected by `options.labels`.
pub fn analyze(score: &Score, options: &AnalysisOptions) -> Result<Analysis, HarmonizeError> {
    match options.labels {
        LabelKind::ChordSymbols => chord_symbols(score, options),
        LabelKind::Segments => chord_symbols_by_segment(score, options),
        LabelKind::RomanNumerals => roman_numerals(score, options),
    }
}
