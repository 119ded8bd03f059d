//! Chord-symbol naming and parsing.
//!
//! [`chord_symbol_figure`] names a [`Chord`] from its root; [`ChordSymbol::new`] parses a
//! figure back and refuses anything that does not resolve to a root and a known
//! quality. [`symbol_with_fallback`] walks an ordered list of root choices until one
//! produces a legal symbol.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::templates::{interval_mask, template_for, template_for_suffix, ChordQuality};
use crate::error::LabelError;
use crate::pitch::{split_pitch_name, Pitch, PitchName};
use crate::score::Chord;

/// Octave chord-symbol roots are realized in (C3 = MIDI 48)
const SYMBOL_OCTAVE: i8 = 3;

/// A chord symbol attached at an offset within a measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChordSymbol", into = "RawChordSymbol")]
pub struct ChordSymbol {
    pub figure: String,
    pub root: Pitch,
    pub quality: ChordQuality,
    /// Slash bass, one octave below the root
    pub bass: Option<Pitch>,
    pub offset: f64,
}

/// Serialized form: the figure is the source of truth
#[derive(Serialize, Deserialize)]
struct RawChordSymbol {
    figure: String,
    offset: f64,
}

impl ChordSymbol {
    /// Parse a figure such as `Cmaj7`, `F#m`, `Bb7/D` or `Gsus4`.
    ///
    /// # Example
    /// ```
    /// use harmonize::ChordSymbol;
    ///
    /// let symbol = ChordSymbol::new("Bb7/D", 2.0).unwrap();
    /// assert_eq!(symbol.root.to_string(), "Bb3");
    /// assert_eq!(symbol.bass.unwrap().to_string(), "D2");
    ///
    /// assert!(ChordSymbol::new("H7", 0.0).is_err());
    /// ```
    pub fn new(figure: &str, offset: f64) -> Result<Self, LabelError> {
        let trimmed = figure.trim();
        let (root, rest) =
            split_pitch_name(trimmed).ok_or_else(|| LabelError::InvalidRoot(figure.to_string()))?;

        let (suffix, bass) = match rest.split_once('/') {
            Some((suffix, bass)) => {
                let bass: PitchName = bass
                    .parse()
                    .map_err(|_| LabelError::InvalidFigure(figure.to_string()))?;
                (suffix, Some(bass.in_octave(SYMBOL_OCTAVE - 1)))
            }
            None => (rest, None),
        };

        let template =
            template_for_suffix(suffix).ok_or_else(|| LabelError::InvalidFigure(figure.to_string()))?;

        Ok(Self {
            figure: trimmed.to_string(),
            root: root.in_octave(SYMBOL_OCTAVE),
            quality: template.quality,
            bass,
            offset,
        })
    }

    /// MIDI notes for the symbol, voiced upward from the root in octave 3, with any
    /// slash bass an octave below the root's octave.
    ///
    /// ```
    /// use harmonize::ChordSymbol;
    ///
    /// assert_eq!(ChordSymbol::new("C", 0.0).unwrap().midi_notes(), vec![48, 52, 55]);
    /// assert_eq!(ChordSymbol::new("G7", 0.0).unwrap().midi_notes(), vec![55, 59, 62, 65]);
    /// assert_eq!(ChordSymbol::new("C/E", 0.0).unwrap().midi_notes(), vec![40, 48, 52, 55]);
    /// ```
    pub fn midi_notes(&self) -> Vec<i16> {
        let root = self.root.midi();
        let voicing = template_for_suffix(self.suffix())
            .map(|t| t.voicing)
            .unwrap_or(&[0]);

        let mut notes: Vec<i16> = self.bass.iter().map(Pitch::midi).collect();
        notes.extend(voicing.iter().map(|&interval| root + interval as i16));
        notes
    }

    fn suffix(&self) -> &str {
        let after_root = split_pitch_name(&self.figure).map_or("", |(_, rest)| rest);
        after_root.split('/').next().unwrap_or("")
    }
}

impl TryFrom<RawChordSymbol> for ChordSymbol {
    type Error = LabelError;

    fn try_from(raw: RawChordSymbol) -> Result<Self, Self::Error> {
        ChordSymbol::new(&raw.figure, raw.offset)
    }
}

impl From<ChordSymbol> for RawChordSymbol {
    fn from(symbol: ChordSymbol) -> Self {
        RawChordSymbol {
            figure: symbol.figure,
            offset: symbol.offset,
        }
    }
}

fn pitch_list(chord: &Chord) -> String {
    chord
        .pitches
        .iter()
        .map(Pitch::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name a chord from its root (explicit, or the lowest pitch).
///
/// The intervals of every pitch class above the root must match a known quality
/// exactly. When the lowest pitch is not the root the figure gets a slash bass.
///
/// # Errors
/// - [`LabelError::EmptyChord`] - nothing to name
/// - [`LabelError::RootNotInChord`] - an explicit root whose pitch class is absent
/// - [`LabelError::UnrecognizedChord`] - no quality matches above this root
pub fn chord_symbol_figure(chord: &Chord) -> Result<String, LabelError> {
    let bass = chord.bass().ok_or(LabelError::EmptyChord)?;
    let root = chord.root().ok_or(LabelError::EmptyChord)?;
    let root_pc = root.pitch_class();

    if !chord.contains_pitch_class(root_pc) {
        return Err(LabelError::RootNotInChord {
            root: root.to_string(),
        });
    }

    let template = template_for(interval_mask(&chord.pitches, root_pc)).ok_or_else(|| {
        LabelError::UnrecognizedChord {
            root: root.to_string(),
            pitches: pitch_list(chord),
        }
    })?;

    let mut figure = format!("{}{}", root.name(), template.suffix);
    if bass.pitch_class() != root_pc {
        figure.push('/');
        figure.push_str(&bass.name().to_string());
    }
    Ok(figure)
}

/// Which root to assume for one naming attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootStrategy {
    /// The chord's own root (explicit, or the lowest pitch)
    Natural,
    /// Override the root with this pitch
    Forced(Pitch),
}

/// Try each root strategy in order and return the first legal chord symbol.
///
/// When every strategy fails, the error of the last attempt is returned.
pub fn symbol_with_fallback(
    chord: &Chord,
    strategies: &[RootStrategy],
    offset: f64,
) -> Result<ChordSymbol, LabelError> {
    let mut last_error = LabelError::EmptyChord;

    for strategy in strategies {
        let candidate = match strategy {
            RootStrategy::Natural => chord.clone(),
            RootStrategy::Forced(root) => chord.clone().with_root(*root),
        };

        match chord_symbol_figure(&candidate).and_then(|figure| ChordSymbol::new(&figure, offset)) {
            Ok(symbol) => return Ok(symbol),
            Err(err) => {
                debug!(?strategy, reason = %err, "chord symbol attempt failed");
                last_error = err;
            }
        }
    }

    Err(last_error)
}
