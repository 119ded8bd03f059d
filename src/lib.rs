pub mod api;
pub mod chordify;
pub mod error;
pub mod harmony;
pub mod key;
pub mod labeler;
pub mod options;
pub mod parts;
pub mod pitch;
pub mod reduce;
pub mod score;
pub mod validate;

pub use api::{analyze, chord_symbols, chord_symbols_by_segment, resolve_key, roman_numerals, Analysis};
pub use chordify::chordify;
pub use error::*;
pub use harmony::{
    chord_symbol_figure, roman_numeral_from_chord, symbol_with_fallback, ChordQuality, ChordSymbol,
    RomanNumeral, RootStrategy,
};
pub use key::{detect_key, Key, KeyDetection, Mode};
pub use labeler::Skipped;
pub use options::{AnalysisOptions, LabelKind};
pub use parts::remove_unpitched_parts;
pub use pitch::{Accidental, NoteName, Pitch, PitchName};
pub use score::*;
pub use validate::validate;
