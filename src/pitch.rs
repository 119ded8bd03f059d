//! # Pitch Types
//!
//! Spelled pitches for harmonic analysis.
//!
//! A [`Pitch`] keeps its spelling (letter + accidental) and its octave. Spelling matters
//! for naming (`F#` vs `Gb`), but every comparison the analysis makes ("lowest pitch",
//! "below the bass floor") is by height: [`Pitch::midi`]. Octaves follow the letter,
//! so `B#3` and `C4` have the same height.
//!
//! ## Text Form
//! - `C4` - middle C (MIDI 60)
//! - `F#3`, `Bb2` - single accidentals
//! - `C##4`, `Ebb5` - double accidentals
//! - `B-1` - negative octaves are allowed
//!
//! Pitches serialize to and from this text form, so a YAML score can write
//! `pitch: Eb4`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarmonizeError;

/// Note names A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteName {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    /// Semitones above C of the natural note
    pub fn semitone(self) -> i8 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    /// Position in the C D E F G A B cycle
    pub fn index(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 1,
            NoteName::E => 2,
            NoteName::F => 3,
            NoteName::G => 4,
            NoteName::A => 5,
            NoteName::B => 6,
        }
    }

    /// Letter at a position in the cycle, wrapping in both directions
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(7) as usize]
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }
}

/// Chromatic alteration of a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    #[default]
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Semitone adjustment applied to the natural note
    pub fn alter(self) -> i8 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    pub fn from_alter(alter: i8) -> Option<Self> {
        match alter {
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        }
    }
}

/// A spelled pitch without an octave (key tonics, chord-symbol roots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchName {
    pub note: NoteName,
    pub accidental: Accidental,
}

impl PitchName {
    pub fn new(note: NoteName, accidental: Accidental) -> Self {
        Self { note, accidental }
    }

    /// Pitch class 0-11 (C = 0)
    pub fn pitch_class(self) -> u8 {
        (self.note.semitone() + self.accidental.alter()).rem_euclid(12) as u8
    }

    /// Move by `steps` letters and `semitones` half steps, spelling the result on the
    /// target letter. Returns `None` when the spelling would need more than a double
    /// accidental.
    ///
    /// ```
    /// use harmonize::{PitchName, NoteName, Accidental};
    ///
    /// // A up a minor third (two letters, three semitones) is C
    /// let a = PitchName::new(NoteName::A, Accidental::Natural);
    /// assert_eq!(a.transpose(2, 3).unwrap().to_string(), "C");
    ///
    /// // C up a minor third is Eb, not D#
    /// let c = PitchName::new(NoteName::C, Accidental::Natural);
    /// assert_eq!(c.transpose(2, 3).unwrap().to_string(), "Eb");
    /// ```
    pub fn transpose(self, steps: i32, semitones: i32) -> Option<Self> {
        let note = NoteName::from_index(self.note.index() + steps);
        let target = (self.pitch_class() as i32 + semitones).rem_euclid(12);
        let mut alter = (target - note.semitone() as i32).rem_euclid(12);
        if alter > 6 {
            alter -= 12;
        }
        Accidental::from_alter(alter as i8).map(|accidental| Self { note, accidental })
    }

    /// Spell a pitch class, using flats or sharps for the black keys
    pub fn from_pitch_class(pitch_class: u8, prefer_flat: bool) -> Self {
        use NoteName::*;

        // Letter at or below each pitch class; black keys share the white key under them
        const LETTERS: [NoteName; 12] = [C, C, D, D, E, F, F, G, G, A, A, B];
        const BLACK_KEYS: [u8; 5] = [1, 3, 6, 8, 10];

        let pitch_class = (pitch_class % 12) as usize;
        if !BLACK_KEYS.contains(&(pitch_class as u8)) {
            Self::new(LETTERS[pitch_class], Accidental::Natural)
        } else if prefer_flat {
            Self::new(LETTERS[pitch_class + 1], Accidental::Flat)
        } else {
            Self::new(LETTERS[pitch_class], Accidental::Sharp)
        }
    }

    pub fn in_octave(self, octave: i8) -> Pitch {
        Pitch::new(self.note, self.accidental, octave)
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note.as_char(), self.accidental.symbol())
    }
}

impl FromStr for PitchName {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_pitch_name(s.trim()) {
            Some((name, "")) => Ok(name),
            _ => Err(HarmonizeError::InvalidPitch(s.to_string())),
        }
    }
}

/// Split a leading pitch name (letter + up to two `#`/`b`) off the front of `s`,
/// returning the name and whatever follows it.
pub(crate) fn split_pitch_name(s: &str) -> Option<(PitchName, &str)> {
    let mut chars = s.chars();
    let note = NoteName::from_char(chars.next()?)?;
    let rest = chars.as_str();

    let (accidental, consumed) = if rest.starts_with("##") {
        (Accidental::DoubleSharp, 2)
    } else if rest.starts_with('#') {
        (Accidental::Sharp, 1)
    } else if rest.starts_with("bb") {
        (Accidental::DoubleFlat, 2)
    } else if rest.starts_with('b') {
        (Accidental::Flat, 1)
    } else {
        (Accidental::Natural, 0)
    };

    Some((PitchName { note, accidental }, &rest[consumed..]))
}

/// A spelled pitch with an octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    pub note: NoteName,
    pub accidental: Accidental,
    pub octave: i8,
}

impl Pitch {
    pub fn new(note: NoteName, accidental: Accidental, octave: i8) -> Self {
        Self {
            note,
            accidental,
            octave,
        }
    }

    pub fn name(&self) -> PitchName {
        PitchName::new(self.note, self.accidental)
    }

    /// Height as a MIDI number (C4 = 60). Not clamped, so very low or high
    /// spellings stay comparable.
    pub fn midi(&self) -> i16 {
        (self.octave as i16 + 1) * 12 + self.note.semitone() as i16 + self.accidental.alter() as i16
    }

    /// Pitch class 0-11 (C = 0)
    pub fn pitch_class(&self) -> u8 {
        self.midi().rem_euclid(12) as u8
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HarmonizeError::InvalidPitch(s.to_string());
        let (name, octave) = split_pitch_name(s.trim()).ok_or_else(invalid)?;
        let octave: i8 = octave.parse().map_err(|_| invalid())?;
        Ok(name.in_octave(octave))
    }
}

impl TryFrom<String> for Pitch {
    type Error = HarmonizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(pitch("C4"), Pitch::new(NoteName::C, Accidental::Natural, 4));
        assert_eq!(pitch("F#3"), Pitch::new(NoteName::F, Accidental::Sharp, 3));
        assert_eq!(pitch("Bb2"), Pitch::new(NoteName::B, Accidental::Flat, 2));
        assert_eq!(pitch("Ebb5").accidental, Accidental::DoubleFlat);
        assert_eq!(pitch("C##4").accidental, Accidental::DoubleSharp);
        assert_eq!(pitch("B-1").octave, -1);

        for text in ["C4", "F#3", "Bb2", "Ebb5", "C##4", "B-1"] {
            assert_eq!(pitch(text).to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", "H4", "C", "C#", "Cx4", "C4.5", "4C"] {
            assert!(text.parse::<Pitch>().is_err(), "{:?} should not parse", text);
        }
    }

    #[test]
    fn test_midi_heights() {
        assert_eq!(pitch("C4").midi(), 60);
        assert_eq!(pitch("A4").midi(), 69);
        assert_eq!(pitch("C-1").midi(), 0);
        assert_eq!(pitch("Bb2").midi(), 46);
        // Octave follows the letter
        assert_eq!(pitch("B#3").midi(), pitch("C4").midi());
        assert_eq!(pitch("Cb4").midi(), pitch("B3").midi());
    }

    #[test]
    fn test_pitch_class_wraps() {
        assert_eq!(pitch("Cb4").pitch_class(), 11);
        assert_eq!(pitch("B#3").pitch_class(), 0);
        assert_eq!(pitch("Gb3").pitch_class(), 6);
    }

    #[test]
    fn test_transpose_keeps_spelling() {
        let e = PitchName::new(NoteName::E, Accidental::Natural);
        assert_eq!(e.transpose(2, 3).unwrap().to_string(), "G");
        let f_sharp = PitchName::new(NoteName::F, Accidental::Sharp);
        assert_eq!(f_sharp.transpose(2, 3).unwrap().to_string(), "A");
        let eb = PitchName::new(NoteName::E, Accidental::Flat);
        assert_eq!(eb.transpose(-2, -3).unwrap().to_string(), "C");
        let c = PitchName::new(NoteName::C, Accidental::Natural);
        assert_eq!(c.transpose(0, 1).unwrap().to_string(), "C#");
    }

    #[test]
    fn test_spell_pitch_class() {
        assert_eq!(PitchName::from_pitch_class(1, true).to_string(), "Db");
        assert_eq!(PitchName::from_pitch_class(1, false).to_string(), "C#");
        assert_eq!(PitchName::from_pitch_class(11, true).to_string(), "B");

        let sharps: Vec<String> = (0..12)
            .map(|pc| PitchName::from_pitch_class(pc, false).to_string())
            .collect();
        let flats: Vec<String> = (0..12)
            .map(|pc| PitchName::from_pitch_class(pc, true).to_string())
            .collect();
        assert_eq!(sharps, ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"]);
        assert_eq!(flats, ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"]);

        for pc in 0..24 {
            assert_eq!(PitchName::from_pitch_class(pc, true).pitch_class(), pc % 12);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let yaml = serde_yaml::to_string(&pitch("Eb4")).unwrap();
        assert_eq!(yaml.trim(), "Eb4");
        let back: Pitch = serde_yaml::from_str("F#2").unwrap();
        assert_eq!(back, pitch("F#2"));
        assert!(serde_yaml::from_str::<Pitch>("Q2").is_err());
    }
}
