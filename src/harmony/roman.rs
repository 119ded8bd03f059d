//! Roman-numeral labels relative to a key.
//!
//! The scale degree comes from the letter distance between the chord root and the
//! key tonic, so `Bb` in C major is `bVII` and `A#` would be `#VI`. The numeral is
//! lowercase for chords with a minor third and no major third, followed by any quality
//! mark and the inversion figure.

use serde::Serialize;

use super::templates::{interval_mask, template_for, ChordQuality, ChordTemplate, Figures};
use crate::error::LabelError;
use crate::key::Key;
use crate::pitch::Pitch;
use crate::score::Chord;

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// A functional harmony label such as `V7`, `ii°6` or `bVII`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RomanNumeral {
    pub figure: String,
    /// Scale degree 1..=7 of the root
    pub degree: u8,
    /// Semitones the root sits above (+) or below (-) the diatonic degree
    pub alteration: i8,
    pub quality: ChordQuality,
    pub inversion: u8,
    /// Key the numeral was computed against
    pub key: Key,
}

/// Root and template of a chord: the explicit root if set, otherwise the first pitch
/// from the bass upward whose interval set is a known quality.
fn analyze_root(chord: &Chord) -> Result<(Pitch, &'static ChordTemplate), LabelError> {
    if chord.is_empty() {
        return Err(LabelError::EmptyChord);
    }
    let pitches = || {
        chord
            .pitches
            .iter()
            .map(Pitch::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    };

    if let Some(root) = chord.root {
        if !chord.contains_pitch_class(root.pitch_class()) {
            return Err(LabelError::RootNotInChord {
                root: root.to_string(),
            });
        }
        return template_for(interval_mask(&chord.pitches, root.pitch_class()))
            .map(|template| (root, template))
            .ok_or_else(|| LabelError::UnrecognizedChord {
                root: root.to_string(),
                pitches: pitches(),
            });
    }

    chord
        .pitches
        .iter()
        .find_map(|candidate| {
            template_for(interval_mask(&chord.pitches, candidate.pitch_class()))
                .map(|template| (*candidate, template))
        })
        .ok_or_else(|| LabelError::NoRootFound { pitches: pitches() })
}

fn inversion_figure(template: &ChordTemplate, inversion: u8) -> &'static str {
    match (template.figures, inversion) {
        (Figures::Fixed(text), _) => text,
        (Figures::Triad, 1) => "6",
        (Figures::Triad, 2) => "64",
        (Figures::Triad, _) => "",
        (Figures::Seventh, 1) => "65",
        (Figures::Seventh, 2) => "43",
        (Figures::Seventh, 3) => "42",
        (Figures::Seventh, _) => "7",
    }
}

/// Label a chord with a Roman numeral in `key`.
///
/// # Example
/// ```
/// use harmonize::{roman_numeral_from_chord, Chord, Key, Pitch};
///
/// let key: Key = "C".parse().unwrap();
/// let pitches = ["B3", "D4", "F4", "G4"].iter().map(|p| p.parse::<Pitch>().unwrap());
/// let numeral = roman_numeral_from_chord(&Chord::new(pitches, 0.0, 4.0), &key).unwrap();
/// assert_eq!(numeral.figure, "V65");
/// ```
pub fn roman_numeral_from_chord(chord: &Chord, key: &Key) -> Result<RomanNumeral, LabelError> {
    let (root, template) = analyze_root(chord)?;
    let bass = chord.bass().ok_or(LabelError::EmptyChord)?;

    let root_name = root.name();
    let degree = (root_name.note.index() - key.tonic.note.index()).rem_euclid(7) as usize;
    let actual = (root.pitch_class() as i32 - key.tonic.pitch_class() as i32).rem_euclid(12);
    // Fold into -6..=6 so B# over C reads as a raised degree, not eleven flats
    let alteration = match actual - key.scale()[degree] as i32 {
        d if d > 6 => d - 12,
        d if d < -6 => d + 12,
        d => d,
    };

    let mut figure = String::new();
    let prefix = if alteration < 0 { "b" } else { "#" };
    figure.push_str(&prefix.repeat(alteration.unsigned_abs() as usize));
    if template.is_minor() {
        figure.push_str(&NUMERALS[degree].to_lowercase());
    } else {
        figure.push_str(NUMERALS[degree]);
    }
    figure.push_str(template.roman_mark);

    let bass_interval = (bass.pitch_class() + 12 - root.pitch_class()) % 12;
    let inversion = template.inversion(bass_interval);
    figure.push_str(inversion_figure(template, inversion));

    Ok(RomanNumeral {
        figure,
        degree: degree as u8 + 1,
        alteration: alteration as i8,
        quality: template.quality,
        inversion,
        key: *key,
    })
}
