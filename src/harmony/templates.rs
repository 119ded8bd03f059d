use serde::Serialize;

use crate::pitch::Pitch;

/// Chord qualities recognized when naming a pitch set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Suspended4,
    Suspended2,
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    Diminished7,
    HalfDiminished7,
    Major6,
    Minor6,
    Add9,
    Dominant9,
    Major9,
    Minor9,
    Power,
    MajorThird,
    MinorThird,
    Pedal,
}

/// How a quality shows its inversion in a Roman numeral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Figures {
    /// Root position, `6`, `64`
    Triad,
    /// `7`, `65`, `43`, `42`
    Seventh,
    /// Always the given text, inversion not shown
    Fixed(&'static str),
}

/// A chord template: interval set above the root plus the ways to spell it.
pub struct ChordTemplate {
    pub quality: ChordQuality,
    /// Chord-symbol suffix after the root ("m7", "dim", ...)
    pub suffix: &'static str,
    /// Intervals above the root, in chord-member order (root, third, fifth, seventh)
    pub tones: &'static [u8],
    /// MIDI offsets from the root used to realize a symbol as notes
    pub voicing: &'static [u8],
    pub(crate) intervals: u16, // bitmask: bit i set means interval i is in the template
    pub(crate) roman_mark: &'static str,
    pub(crate) figures: Figures,
}

impl ChordTemplate {
    const fn new(
        quality: ChordQuality,
        suffix: &'static str,
        tones: &'static [u8],
        voicing: &'static [u8],
        roman_mark: &'static str,
        figures: Figures,
    ) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < tones.len() {
            mask |= 1 << tones[i];
            i += 1;
        }
        Self {
            quality,
            suffix,
            tones,
            voicing,
            intervals: mask,
            roman_mark,
            figures,
        }
    }

    /// Minor third without a major third: written lowercase as a Roman numeral
    pub fn is_minor(&self) -> bool {
        self.intervals & (1 << 3) != 0 && self.intervals & (1 << 4) == 0
    }

    /// Inversion number for a bass this many semitones above the root
    pub fn inversion(&self, bass_interval: u8) -> u8 {
        self.tones
            .iter()
            .position(|&t| t == bass_interval % 12)
            .unwrap_or(0) as u8
    }
}

use ChordQuality as Q;
use Figures::{Fixed, Seventh, Triad};

/// All recognized chord templates. Interval sets are unique, so at most one template
/// matches a given root.
pub static TEMPLATES: &[ChordTemplate] = &[
    // Triads
    ChordTemplate::new(Q::Major, "", &[0, 4, 7], &[0, 4, 7], "", Triad),
    ChordTemplate::new(Q::Minor, "m", &[0, 3, 7], &[0, 3, 7], "", Triad),
    ChordTemplate::new(Q::Diminished, "dim", &[0, 3, 6], &[0, 3, 6], "°", Triad),
    ChordTemplate::new(Q::Augmented, "aug", &[0, 4, 8], &[0, 4, 8], "+", Triad),
    ChordTemplate::new(Q::Suspended4, "sus4", &[0, 5, 7], &[0, 5, 7], "", Fixed("sus4")),
    ChordTemplate::new(Q::Suspended2, "sus2", &[0, 2, 7], &[0, 2, 7], "", Fixed("sus2")),
    // Sevenths and sixths
    ChordTemplate::new(Q::Dominant7, "7", &[0, 4, 7, 10], &[0, 4, 7, 10], "", Seventh),
    ChordTemplate::new(Q::Major7, "maj7", &[0, 4, 7, 11], &[0, 4, 7, 11], "maj", Seventh),
    ChordTemplate::new(Q::Minor7, "m7", &[0, 3, 7, 10], &[0, 3, 7, 10], "", Seventh),
    ChordTemplate::new(Q::MinorMajor7, "m(maj7)", &[0, 3, 7, 11], &[0, 3, 7, 11], "maj", Seventh),
    ChordTemplate::new(Q::Diminished7, "dim7", &[0, 3, 6, 9], &[0, 3, 6, 9], "°", Seventh),
    ChordTemplate::new(Q::HalfDiminished7, "m7b5", &[0, 3, 6, 10], &[0, 3, 6, 10], "ø", Seventh),
    ChordTemplate::new(Q::Major6, "6", &[0, 4, 7, 9], &[0, 4, 7, 9], "", Fixed("add6")),
    ChordTemplate::new(Q::Minor6, "m6", &[0, 3, 7, 9], &[0, 3, 7, 9], "", Fixed("add6")),
    // Ninths (voiced with the ninth above the octave)
    ChordTemplate::new(Q::Add9, "add9", &[0, 4, 7, 2], &[0, 4, 7, 14], "", Fixed("add9")),
    ChordTemplate::new(Q::Dominant9, "9", &[0, 4, 7, 10, 2], &[0, 4, 7, 10, 14], "", Fixed("9")),
    ChordTemplate::new(Q::Major9, "maj9", &[0, 4, 7, 11, 2], &[0, 4, 7, 11, 14], "", Fixed("maj9")),
    ChordTemplate::new(Q::Minor9, "m9", &[0, 3, 7, 10, 2], &[0, 3, 7, 10, 14], "", Fixed("9")),
    // Dyads and single pitch classes
    ChordTemplate::new(Q::Power, "5", &[0, 7], &[0, 7], "", Fixed("5")),
    ChordTemplate::new(Q::MajorThird, "(no5)", &[0, 4], &[0, 4], "", Fixed("(no5)")),
    ChordTemplate::new(Q::MinorThird, "m(no5)", &[0, 3], &[0, 3], "", Fixed("(no5)")),
    ChordTemplate::new(Q::Pedal, "pedal", &[0], &[0], "", Fixed("")),
];

/// Interval bitmask of `pitches` measured above `root_pitch_class`
pub fn interval_mask(pitches: &[Pitch], root_pitch_class: u8) -> u16 {
    let mut mask = 0u16;
    for pitch in pitches {
        let interval = (pitch.pitch_class() + 12 - root_pitch_class % 12) % 12;
        mask |= 1 << interval;
    }
    mask
}

/// The template whose interval set is exactly `intervals`
pub fn template_for(intervals: u16) -> Option<&'static ChordTemplate> {
    TEMPLATES.iter().find(|t| t.intervals == intervals)
}

/// The template written with this chord-symbol suffix
pub fn template_for_suffix(suffix: &str) -> Option<&'static ChordTemplate> {
    TEMPLATES.iter().find(|t| t.suffix == suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitches(names: &[&str]) -> Vec<Pitch> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[test]
    fn test_interval_sets_are_unique() {
        for (i, a) in TEMPLATES.iter().enumerate() {
            for b in &TEMPLATES[i + 1..] {
                assert_ne!(a.intervals, b.intervals, "{:?} and {:?} collide", a.quality, b.quality);
                assert_ne!(a.suffix, b.suffix);
            }
        }
    }

    #[test]
    fn test_exact_matching() {
        let c_major = interval_mask(&pitches(&["C4", "E4", "G4", "C5"]), 0);
        assert_eq!(template_for(c_major).unwrap().quality, ChordQuality::Major);

        let g7 = interval_mask(&pitches(&["G3", "B3", "D4", "F4"]), 7);
        assert_eq!(template_for(g7).unwrap().quality, ChordQuality::Dominant7);

        // A C E G above A is Am7, above C it is C6
        let set = pitches(&["A3", "C4", "E4", "G4"]);
        assert_eq!(template_for(interval_mask(&set, 9)).unwrap().quality, ChordQuality::Minor7);
        assert_eq!(template_for(interval_mask(&set, 0)).unwrap().quality, ChordQuality::Major6);

        // E G C above E has no template
        assert!(template_for(interval_mask(&pitches(&["E3", "G3", "C4"]), 4)).is_none());
    }

    #[test]
    fn test_minor_and_inversion() {
        let minor = template_for_suffix("m").unwrap();
        assert!(minor.is_minor());
        assert!(!template_for_suffix("").unwrap().is_minor());
        assert!(template_for_suffix("m7b5").unwrap().is_minor());
        assert!(!template_for_suffix("sus2").unwrap().is_minor());

        let dom7 = template_for_suffix("7").unwrap();
        assert_eq!(dom7.inversion(0), 0);
        assert_eq!(dom7.inversion(4), 1);
        assert_eq!(dom7.inversion(7), 2);
        assert_eq!(dom7.inversion(10), 3);
    }
}
