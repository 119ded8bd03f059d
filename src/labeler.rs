//! # Labeling Passes
//!
//! Each pass walks a chordified [`Part`], reduces every measure (or segment) to one
//! combined chord and names it. Naming happens in two phases: the first reads the
//! part and collects what to insert, the second applies the insertions. A unit that
//! cannot be named is reported as [`Skipped`] and the pass moves on.
//!
//! ## Passes
//! - [`label_chord_symbols`] - one chord symbol per measure at offset 0. When the
//!   chord does not name from its lowest pitch, the downbeat bass is tried as root.
//! - [`label_chord_symbol_segments`] - the same per fixed-size segment, falling back
//!   to the segment chord's own bass.
//! - [`label_roman_numerals`] - one Roman numeral per measure, attached as a lyric on
//!   the first pitched event.

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::LabelError;
use crate::harmony::{roman_numeral_from_chord, symbol_with_fallback, ChordSymbol, RootStrategy};
use crate::key::Key;
use crate::options::{AnalysisOptions, MIN_BEATS_PER_SEGMENT};
use crate::reduce::{reduce_window, Reduction};
use crate::score::{Event, Part, OFFSET_EPSILON};

/// A measure or segment that could not be labeled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub measure: u32,
    /// Start of the unit within the measure
    pub offset: f64,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: LabelError,
}

fn serialize_reason<S: Serializer>(reason: &LabelError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

fn skip(measure: u32, offset: f64, reason: LabelError) -> Skipped {
    warn!(measure, offset, %reason, "skipping unit");
    Skipped {
        measure,
        offset,
        reason,
    }
}

/// Label every measure of `part` with a chord symbol at its downbeat.
pub fn label_chord_symbols(part: &mut Part, options: &AnalysisOptions) -> Vec<Skipped> {
    let mut pending: Vec<(usize, ChordSymbol)> = Vec::new();
    let mut skipped = Vec::new();

    for (index, measure) in part.measures.iter().enumerate() {
        let Some(Reduction { bass, chord }) = reduce_window(&measure.events, 0.0, options) else {
            debug!(measure = measure.number, "nothing left after filtering");
            continue;
        };

        let mut strategies = vec![RootStrategy::Natural];
        strategies.extend(bass.map(RootStrategy::Forced));

        match symbol_with_fallback(&chord, &strategies, 0.0) {
            Ok(symbol) => {
                debug!(measure = measure.number, figure = %symbol.figure, "chord symbol");
                pending.push((index, symbol));
            }
            Err(reason) => skipped.push(skip(measure.number, 0.0, reason)),
        }
    }

    for (index, symbol) in pending {
        part.measures[index].insert_symbol(symbol);
    }
    skipped
}

/// Start and end offsets of the segments of a measure. The last segment is shorter
/// when `size` does not divide `length`. Sizes under [`MIN_BEATS_PER_SEGMENT`] are
/// raised to it.
pub fn segment_bounds(length: f64, size: f64) -> Vec<(f64, f64)> {
    if !length.is_finite() || length <= OFFSET_EPSILON || !(size > 0.0) {
        return Vec::new();
    }
    let size = size.max(MIN_BEATS_PER_SEGMENT);
    let count = ((length - OFFSET_EPSILON) / size).ceil() as usize;
    (0..count)
        .map(|i| {
            let start = i as f64 * size;
            (start, (start + size).min(length))
        })
        .collect()
}

/// Label every `beats-per-segment` slice of each measure with its own chord symbol.
///
/// A segment holds the events whose onset falls inside it. Segments with nothing left
/// after filtering are skipped without a report.
pub fn label_chord_symbol_segments(part: &mut Part, options: &AnalysisOptions) -> Vec<Skipped> {
    let mut pending: Vec<(usize, ChordSymbol)> = Vec::new();
    let mut skipped = Vec::new();

    for (index, measure) in part.measures.iter().enumerate() {
        for (start, end) in segment_bounds(measure.length, options.beats_per_segment) {
            let window: Vec<Event> = measure
                .events
                .iter()
                .filter(|e| e.offset() > start - OFFSET_EPSILON && e.offset() < end - OFFSET_EPSILON)
                .cloned()
                .collect();

            let Some(Reduction { chord, .. }) = reduce_window(&window, start, options) else {
                debug!(measure = measure.number, start, "empty segment");
                continue;
            };

            let mut strategies = vec![RootStrategy::Natural];
            strategies.extend(chord.bass().copied().map(RootStrategy::Forced));

            match symbol_with_fallback(&chord, &strategies, start) {
                Ok(symbol) => {
                    debug!(measure = measure.number, start, figure = %symbol.figure, "segment symbol");
                    pending.push((index, symbol));
                }
                Err(reason) => skipped.push(skip(measure.number, start, reason)),
            }
        }
    }

    for (index, symbol) in pending {
        part.measures[index].insert_symbol(symbol);
    }
    skipped
}

/// Label every measure of `part` with a Roman numeral in `key`.
///
/// The figure is added as a lyric to the first pitched event of the measure.
pub fn label_roman_numerals(part: &mut Part, key: &Key, options: &AnalysisOptions) -> Vec<Skipped> {
    let mut pending: Vec<(usize, String)> = Vec::new();
    let mut skipped = Vec::new();

    for (index, measure) in part.measures.iter().enumerate() {
        let Some(Reduction { chord, .. }) = reduce_window(&measure.events, 0.0, options) else {
            debug!(measure = measure.number, "nothing left after filtering");
            continue;
        };

        match roman_numeral_from_chord(&chord, key) {
            Ok(numeral) => {
                debug!(measure = measure.number, figure = %numeral.figure, "roman numeral");
                pending.push((index, numeral.figure));
            }
            Err(reason) => skipped.push(skip(measure.number, 0.0, reason)),
        }
    }

    for (index, figure) in pending {
        if let Some(event) = part.measures[index].first_pitched_mut() {
            event.add_lyric(figure);
        }
    }
    skipped
}
