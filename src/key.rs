//! # Keys and Key Detection
//!
//! A [`Key`] is a tonic plus a [`Mode`]. It is analysis context only: the passes read it
//! and never change the score's declared key.
//!
//! ## Text Form
//! - `C`, `F#`, `Bb` - major keys
//! - `Am`, `Ebm` - minor keys
//! - `A minor`, `Eb major` - spelled-out mode
//! - `###`, `bb` - key-signature counts (3 sharps = A major, 2 flats = Bb major).
//!   A single `b` is read as B major, so one flat is written `F`.
//!
//! ## Detection
//! [`detect_key`] uses the Krumhansl-Schmuckler algorithm: a duration-weighted
//! pitch-class histogram of the whole score correlated against the 24
//! Krumhansl-Kessler key profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarmonizeError;
use crate::pitch::{split_pitch_name, Accidental, NoteName, PitchName};
use crate::score::Score;

/// Krumhansl-Kessler key-profile ratings, tonic first
const MAJOR_PROFILE: [f64; 12] = [6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88];

const MINOR_PROFILE: [f64; 12] = [6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17];

/// Major tonics conventionally spelled with flats: Db, Eb, F, Gb, Ab, Bb
const FLAT_MAJOR_ROOTS: [u8; 6] = [1, 3, 5, 6, 8, 10];

/// Minor tonics conventionally spelled with flats: Eb, Bb
const FLAT_MINOR_ROOTS: [u8; 2] = [3, 10];

/// Mode for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    pub tonic: PitchName,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: PitchName, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    pub fn major(tonic: PitchName) -> Self {
        Self::new(tonic, Mode::Major)
    }

    /// Major key with `fifths` sharps (positive) or flats (negative) in its signature
    pub fn from_fifths(fifths: i8) -> Option<Self> {
        if !(-7..=7).contains(&fifths) {
            return None;
        }
        // Each sharp moves the tonic up a fifth: four letters, seven semitones
        let c = PitchName::new(NoteName::C, Accidental::Natural);
        let fifths = fifths as i32;
        c.transpose(4 * fifths, 7 * fifths).map(Self::major)
    }

    /// The relative key: minor third below a major tonic, minor third above a minor one
    pub fn relative(&self) -> Self {
        let (steps, semitones, mode) = match self.mode {
            Mode::Major => (-2, -3, Mode::Minor),
            Mode::Minor => (2, 3, Mode::Major),
        };
        let tonic = self.tonic.transpose(steps, semitones).unwrap_or_else(|| {
            let pc = (self.tonic.pitch_class() as i32 + semitones).rem_euclid(12) as u8;
            conventional_tonic(pc, mode)
        });
        Self { tonic, mode }
    }

    /// This key if major, otherwise its relative major
    pub fn major_frame(&self) -> Self {
        match self.mode {
            Mode::Major => *self,
            Mode::Minor => self.relative(),
        }
    }

    /// Semitones above the tonic of each scale degree
    pub fn scale(&self) -> [u8; 7] {
        match self.mode {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

impl FromStr for Key {
    type Err = HarmonizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || HarmonizeError::InvalidKey(s.to_string());

        // Sharp count notation (e.g., "#", "##", "###")
        if !trimmed.is_empty() && trimmed.chars().all(|c| c == '#') {
            return i8::try_from(trimmed.len())
                .ok()
                .and_then(Key::from_fifths)
                .ok_or_else(invalid);
        }

        // Flat count notation needs at least two flats; "b" alone is B major
        if trimmed.len() >= 2 && trimmed.chars().all(|c| c == 'b') {
            return i8::try_from(trimmed.len())
                .ok()
                .and_then(|count| Key::from_fifths(-count))
                .ok_or_else(invalid);
        }

        let (tonic, rest) = split_pitch_name(trimmed).ok_or_else(invalid)?;
        let mode = match rest.trim().to_ascii_lowercase().as_str() {
            "" | "major" | "maj" => Mode::Major,
            "m" | "minor" | "min" => Mode::Minor,
            _ => return Err(invalid()),
        };
        Ok(Self { tonic, mode })
    }
}

impl TryFrom<String> for Key {
    type Error = HarmonizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// Result of key analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyDetection {
    pub key: Key,
    /// Pearson correlation with the best-matching key profile
    pub confidence: f64,
}

fn conventional_tonic(pitch_class: u8, mode: Mode) -> PitchName {
    let prefer_flat = match mode {
        Mode::Major => FLAT_MAJOR_ROOTS.contains(&pitch_class),
        Mode::Minor => FLAT_MINOR_ROOTS.contains(&pitch_class),
    };
    PitchName::from_pitch_class(pitch_class, prefer_flat)
}

/// Total sounding time of each pitch class. A chord adds its full duration to every
/// pitch it holds, so doubled pitch classes count once per pitch.
fn pitch_class_weights(score: &Score) -> [f64; 12] {
    let mut weights = [0.0_f64; 12];
    let events = score
        .parts
        .iter()
        .flat_map(|part| &part.measures)
        .flat_map(|measure| &measure.events);
    for event in events {
        let duration = event.duration().max(0.0);
        for pitch in event.pitches() {
            weights[pitch.pitch_class() as usize] += duration;
        }
    }
    weights
}

/// Detect the key of a score using the Krumhansl-Schmuckler algorithm.
///
/// Every pitched event contributes each of its pitches weighted by the event's
/// duration. The best Pearson correlation over all 24 major/minor profiles wins;
/// on a tie the earlier candidate (C upward, major before minor) is kept.
/// A score with no pitched material is reported as C major with confidence 0.
pub fn detect_key(score: &Score) -> KeyDetection {
    let weights = pitch_class_weights(score);
    if weights.iter().sum::<f64>() <= 0.0 {
        return KeyDetection {
            key: Key::major(PitchName::new(NoteName::C, Accidental::Natural)),
            confidence: 0.0,
        };
    }

    let candidates = (0..12u8).flat_map(|tonic| {
        [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)]
            .into_iter()
            .map(move |(mode, profile)| (tonic, mode, profile))
    });

    let mut best = (0u8, Mode::Major, f64::NEG_INFINITY);
    for (tonic, mode, profile) in candidates {
        // Weights seen from the candidate tonic: index 0 is the tonic
        let relative: [f64; 12] = std::array::from_fn(|i| weights[(i + tonic as usize) % 12]);
        let fit = correlation(&relative, profile);
        if fit > best.2 {
            best = (tonic, mode, fit);
        }
    }

    let (tonic, mode, confidence) = best;
    KeyDetection {
        key: Key::new(conventional_tonic(tonic, mode), mode),
        confidence,
    }
}

/// Pearson correlation of two pitch-class vectors; 0 when either is flat.
fn correlation(x: &[f64; 12], y: &[f64; 12]) -> f64 {
    let mean = |v: &[f64; 12]| v.iter().sum::<f64>() / 12.0;
    let (x_mean, y_mean) = (mean(x), mean(y));

    let (covariance, x_spread, y_spread) = x.iter().zip(y).fold(
        (0.0, 0.0, 0.0),
        |(cov, xs, ys), (a, b)| {
            let (da, db) = (a - x_mean, b - y_mean);
            (cov + da * db, xs + da * da, ys + db * db)
        },
    );

    let spread = (x_spread * y_spread).sqrt();
    if spread < 1e-10 {
        0.0
    } else {
        covariance / spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::correlation as pearson;
    use crate::score::{Chord, Event, Measure, Note, Part};

    fn key(s: &str) -> Key {
        s.parse().unwrap()
    }

    fn melody(pitches: &[&str]) -> Score {
        let events = pitches
            .iter()
            .enumerate()
            .map(|(i, p)| Event::Note(Note::new(p.parse().unwrap(), i as f64, 1.0)))
            .collect();
        Score::new(vec![Part::new(
            None,
            vec![Measure::new(1, pitches.len() as f64, events)],
        )])
    }

    #[test]
    fn test_parse_key_forms() {
        assert_eq!(key("G").to_string(), "G major");
        assert_eq!(key("Am").to_string(), "A minor");
        assert_eq!(key("Ebm").to_string(), "Eb minor");
        assert_eq!(key("F# minor").to_string(), "F# minor");
        assert_eq!(key("Bb major").to_string(), "Bb major");
        assert_eq!(key("###").to_string(), "A major");
        assert_eq!(key("bb").to_string(), "Bb major");
        assert_eq!(key("b").to_string(), "B major");
        assert!("H".parse::<Key>().is_err());
        assert!("C dorian".parse::<Key>().is_err());
        assert!("########".parse::<Key>().is_err());
    }

    #[test]
    fn test_from_fifths() {
        assert_eq!(Key::from_fifths(0).unwrap().to_string(), "C major");
        assert_eq!(Key::from_fifths(1).unwrap().to_string(), "G major");
        assert_eq!(Key::from_fifths(-1).unwrap().to_string(), "F major");
        assert_eq!(Key::from_fifths(6).unwrap().to_string(), "F# major");
        assert_eq!(Key::from_fifths(-7).unwrap().to_string(), "Cb major");
        assert!(Key::from_fifths(8).is_none());
    }

    #[test]
    fn test_relative_keys() {
        assert_eq!(key("Am").relative(), key("C"));
        assert_eq!(key("Cm").relative(), key("Eb"));
        assert_eq!(key("F#m").relative(), key("A"));
        assert_eq!(key("Eb").relative(), key("Cm"));
        assert_eq!(key("G").relative(), key("Em"));
    }

    #[test]
    fn test_major_frame() {
        assert_eq!(key("Dm").major_frame(), key("F"));
        assert_eq!(key("D").major_frame(), key("D"));
    }

    #[test]
    fn test_chord_pitches_weighted_by_duration() {
        let chord = Chord::new(
            ["C3", "C4", "G4"].iter().map(|p| p.parse().unwrap()),
            0.0,
            2.0,
        );
        let measure = Measure::new(
            1,
            4.0,
            vec![Event::Chord(chord), Event::Note(Note::new("E4".parse().unwrap(), 2.0, 0.5))],
        );
        let weights = pitch_class_weights(&Score::new(vec![Part::new(None, vec![measure])]));
        assert_eq!(weights[0], 4.0);
        assert_eq!(weights[4], 0.5);
        assert_eq!(weights[7], 2.0);
        assert_eq!(weights.iter().sum::<f64>(), 6.5);
    }

    #[test]
    fn test_empty_score_is_c_major() {
        let result = detect_key(&Score::new(vec![]));
        assert_eq!(result.key, key("C"));
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_c_major_scale_detected() {
        let result = detect_key(&melody(&["C4", "D4", "E4", "F4", "G4", "A4", "B4"]));
        assert_eq!(result.key, key("C"));
        assert!(result.confidence > 0.7, "confidence {} should be > 0.7", result.confidence);
    }

    #[test]
    fn test_a_minor_triad_weighting() {
        let result = detect_key(&melody(&["A3", "C4", "E4", "A4", "E4", "C4", "A3", "E3"]));
        assert_eq!(result.key, key("Am"));
    }

    #[test]
    fn test_flat_key_spelling() {
        let result = detect_key(&melody(&["Db4", "Eb4", "F4", "Gb4", "Ab4", "Bb4", "C5"]));
        if result.key.tonic.pitch_class() == 1 && result.key.mode == Mode::Major {
            assert_eq!(result.key.tonic.to_string(), "Db");
        }
    }

    #[test]
    fn test_pearson_identical_arrays() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let r = pearson(&a, &a);
        assert!((r - 1.0).abs() < 1e-10, "self-correlation should be 1.0, got {}", r);
    }

    #[test]
    fn test_serde_as_string() {
        let back: Key = serde_yaml::from_str("Bbm").unwrap();
        assert_eq!(back, key("Bb minor"));
        assert_eq!(serde_yaml::to_string(&back).unwrap().trim(), "Bb minor");
    }
}
