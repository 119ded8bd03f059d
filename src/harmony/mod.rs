//! # Harmony Naming
//!
//! Turns a [`crate::Chord`] into text a musician reads.
//!
//! ## Components
//! - `templates` - the chord-quality table shared by both labelers
//! - `symbol` - chord symbols (`Cmaj7`, `F#m/A`) with ordered root fallback
//! - `roman` - Roman numerals (`V7`, `ii°6`) against a key
//!
//! Both naming routines return a [`crate::LabelError`] instead of guessing when a
//! pitch set does not match any known quality.

mod roman;
mod symbol;
mod templates;

pub use roman::{roman_numeral_from_chord, RomanNumeral};
pub use symbol::{chord_symbol_figure, symbol_with_fallback, ChordSymbol, RootStrategy};
pub use templates::{
    interval_mask, template_for, template_for_suffix, ChordQuality, ChordTemplate, TEMPLATES,
};
