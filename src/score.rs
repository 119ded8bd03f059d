//! # Score Model
//!
//! The in-memory score that the reduction passes read and annotate.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── title: Option<String>
//!   ├── key: Option<Key> (declared key, analysis context only)
//!   └── Vec<Part>
//!         ├── name: Option<String>
//!         └── Vec<Measure>
//!               ├── number: u32 (diagnostics only)
//!               ├── length: f64 (quarter lengths)
//!               ├── Vec<Event>
//!               │     ├── Note { pitch, offset, duration, lyrics }
//!               │     ├── Chord { pitches, root, offset, duration, lyrics }
//!               │     └── Unpitched { instrument, offset, duration, lyrics }
//!               └── harmony: Vec<ChordSymbol> (inserted by labeling)
//! ```
//!
//! ## Offsets and Durations
//! - `offset` is measured in beats from the start of the measure; the downbeat is 0.0
//! - `duration` is a quarter length (quarter note = 1.0, eighth = 0.5)
//! - Offsets are compared with a tolerance of [`OFFSET_EPSILON`] so that values built up
//!   from thirds or fifths of a beat still line up
//!
//! ## YAML Form
//! ```yaml
//! title: Chorale
//! key: G
//! parts:
//!   - name: Soprano
//!     measures:
//!       - number: 1
//!         length: 4.0
//!         events:
//!           - type: note
//!             pitch: B4
//!             offset: 0.0
//!             duration: 2.0
//!           - type: chord
//!             pitches: [D4, G4]
//!             offset: 2.0
//!             duration: 2.0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::HarmonizeError;
use crate::harmony::ChordSymbol;
use crate::key::Key;
use crate::pitch::Pitch;

/// Tolerance for treating two offsets as the same time point
pub const OFFSET_EPSILON: f64 = 1e-9;

pub(crate) fn same_offset(a: f64, b: f64) -> bool {
    (a - b).abs() < OFFSET_EPSILON
}

/// A single pitched note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub offset: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lyrics: Vec<String>,
}

impl Note {
    pub fn new(pitch: Pitch, offset: f64, duration: f64) -> Self {
        Self {
            pitch,
            offset,
            duration,
            lyrics: Vec::new(),
        }
    }
}

/// Simultaneous pitches sharing one offset and duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub pitches: Vec<Pitch>,
    /// Explicit root used for naming; the lowest pitch stands in when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Pitch>,
    pub offset: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lyrics: Vec<String>,
}

impl Chord {
    /// Build a chord, dropping repeated spellings and ordering pitches low to high
    pub fn new(pitches: impl IntoIterator<Item = Pitch>, offset: f64, duration: f64) -> Self {
        let mut unique: Vec<Pitch> = Vec::new();
        for pitch in pitches {
            if !unique.contains(&pitch) {
                unique.push(pitch);
            }
        }
        // Stable, so enharmonic ties keep their input order
        unique.sort_by_key(Pitch::midi);

        Self {
            pitches: unique,
            root: None,
            offset,
            duration,
            lyrics: Vec::new(),
        }
    }

    pub fn with_root(mut self, root: Pitch) -> Self {
        self.root = Some(root);
        self
    }

    /// The explicit root if one was set, otherwise the lowest pitch
    pub fn root(&self) -> Option<&Pitch> {
        self.root.as_ref().or_else(|| self.bass())
    }

    /// Lowest pitch by height
    pub fn bass(&self) -> Option<&Pitch> {
        self.pitches.iter().min_by_key(|p| p.midi())
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn contains_pitch_class(&self, pitch_class: u8) -> bool {
        self.pitches.iter().any(|p| p.pitch_class() == pitch_class)
    }

    /// Merge every pitch of `events` into one chord.
    ///
    /// A note contributes its pitch, a chord all of its pitches. The result spans from
    /// the earliest onset to the latest release. Returns `None` when the events carry no
    /// pitches at all.
    pub fn combine(events: &[Event]) -> Option<Chord> {
        let start = events.iter().map(Event::offset).reduce(f64::min)?;
        let end = events.iter().map(Event::end).reduce(f64::max)?;
        let chord = Chord::new(
            events.iter().flat_map(|e| e.pitches().iter().copied()),
            start,
            end - start,
        );
        (!chord.is_empty()).then_some(chord)
    }
}

/// A percussion or other unpitched hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unpitched {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    pub offset: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lyrics: Vec<String>,
}

impl Unpitched {
    pub fn new(offset: f64, duration: f64) -> Self {
        Self {
            instrument: None,
            offset,
            duration,
            lyrics: Vec::new(),
        }
    }
}

/// An event in a measure: a note, a chord, or an unpitched hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Note(Note),
    Chord(Chord),
    Unpitched(Unpitched),
}

impl Event {
    pub fn offset(&self) -> f64 {
        match self {
            Event::Note(note) => note.offset,
            Event::Chord(chord) => chord.offset,
            Event::Unpitched(hit) => hit.offset,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Event::Note(note) => note.duration,
            Event::Chord(chord) => chord.duration,
            Event::Unpitched(hit) => hit.duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.offset() + self.duration()
    }

    /// Every pitch the event sounds; empty for unpitched hits
    pub fn pitches(&self) -> &[Pitch] {
        match self {
            Event::Note(note) => std::slice::from_ref(&note.pitch),
            Event::Chord(chord) => &chord.pitches,
            Event::Unpitched(_) => &[],
        }
    }

    pub fn is_pitched(&self) -> bool {
        !self.pitches().is_empty()
    }

    pub fn lowest_pitch(&self) -> Option<&Pitch> {
        self.pitches().iter().min_by_key(|p| p.midi())
    }

    pub fn lyrics(&self) -> &[String] {
        match self {
            Event::Note(note) => &note.lyrics,
            Event::Chord(chord) => &chord.lyrics,
            Event::Unpitched(hit) => &hit.lyrics,
        }
    }

    pub fn add_lyric(&mut self, text: impl Into<String>) {
        let lyrics = match self {
            Event::Note(note) => &mut note.lyrics,
            Event::Chord(chord) => &mut chord.lyrics,
            Event::Unpitched(hit) => &mut hit.lyrics,
        };
        lyrics.push(text.into());
    }
}

/// A single measure of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub number: u32,
    /// Total duration in quarter lengths
    pub length: f64,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub harmony: Vec<ChordSymbol>,
}

impl Measure {
    pub fn new(number: u32, length: f64, events: Vec<Event>) -> Self {
        Self {
            number,
            length,
            events,
            harmony: Vec::new(),
        }
    }

    pub fn pitched_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_pitched())
    }

    pub fn first_pitched_mut(&mut self) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.is_pitched())
    }

    /// Insert a chord symbol, keeping symbols ordered by offset
    pub fn insert_symbol(&mut self, symbol: ChordSymbol) {
        let position = self
            .harmony
            .iter()
            .position(|existing| existing.offset > symbol.offset)
            .unwrap_or(self.harmony.len());
        self.harmony.insert(position, symbol);
    }
}

/// One instrument's line of measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

impl Part {
    pub fn new(name: Option<String>, measures: Vec<Measure>) -> Self {
        Self { name, measures }
    }

    /// True when any measure holds a note or chord (unpitched hits do not count)
    pub fn has_pitched_notes(&self) -> bool {
        self.measures.iter().any(|m| m.pitched_events().next().is_some())
    }

    /// Copy of the measures numbered `first..=last`
    pub fn measure_range(&self, first: u32, last: u32) -> Part {
        Part {
            name: self.name.clone(),
            measures: self
                .measures
                .iter()
                .filter(|m| (first..=last).contains(&m.number))
                .cloned()
                .collect(),
        }
    }
}

/// A complete multi-part score
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Score {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            title: None,
            key: None,
            parts,
        }
    }

    pub fn from_yaml(source: &str) -> Result<Self, HarmonizeError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn to_yaml(&self) -> Result<String, HarmonizeError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_chord_dedupes_and_orders_pitches() {
        let chord = Chord::new([pitch("G4"), pitch("C4"), pitch("E4"), pitch("C4")], 0.0, 1.0);
        assert_eq!(chord.pitches, vec![pitch("C4"), pitch("E4"), pitch("G4")]);
    }

    #[test]
    fn test_chord_keeps_enharmonic_spellings() {
        let chord = Chord::new([pitch("Gb4"), pitch("F#4")], 0.0, 1.0);
        assert_eq!(chord.pitches.len(), 2);
        assert_eq!(chord.bass(), Some(&pitch("Gb4")));
    }

    #[test]
    fn test_root_defaults_to_lowest() {
        let chord = Chord::new([pitch("E4"), pitch("C4")], 0.0, 1.0);
        assert_eq!(chord.root(), Some(&pitch("C4")));
        let chord = chord.with_root(pitch("E4"));
        assert_eq!(chord.root(), Some(&pitch("E4")));
        assert_eq!(chord.bass(), Some(&pitch("C4")));
    }

    #[test]
    fn test_combine_unions_pitches_and_spans() {
        let events = vec![
            Event::Chord(Chord::new([pitch("C3"), pitch("G3")], 0.0, 2.0)),
            Event::Note(Note::new(pitch("E4"), 2.0, 1.0)),
            Event::Note(Note::new(pitch("G3"), 3.0, 1.0)),
        ];
        let chord = Chord::combine(&events).unwrap();
        assert_eq!(chord.pitches, vec![pitch("C3"), pitch("G3"), pitch("E4")]);
        assert_eq!(chord.offset, 0.0);
        assert_eq!(chord.duration, 4.0);
    }

    #[test]
    fn test_combine_without_pitches() {
        assert!(Chord::combine(&[]).is_none());
        assert!(Chord::combine(&[Event::Unpitched(Unpitched::new(0.0, 1.0))]).is_none());
    }

    #[test]
    fn test_event_accessors() {
        let mut note = Event::Note(Note::new(pitch("A3"), 1.5, 0.5));
        assert_eq!(note.pitches(), &[pitch("A3")]);
        assert_eq!(note.end(), 2.0);
        note.add_lyric("vi");
        assert_eq!(note.lyrics(), &["vi".to_string()]);

        let hit = Event::Unpitched(Unpitched::new(0.0, 1.0));
        assert!(!hit.is_pitched());
        assert!(hit.lowest_pitch().is_none());
    }

    #[test]
    fn test_measure_range_by_number() {
        let measures = (1..=5).map(|n| Measure::new(n, 4.0, vec![])).collect();
        let part = Part::new(Some("Piano".into()), measures);
        let excerpt = part.measure_range(2, 3);
        let numbers: Vec<u32> = excerpt.measures.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn test_yaml_round_trip_of_event_kinds() {
        let source = r#"
title: Mixed
key: Dm
parts:
  - name: Keys
    measures:
      - number: 1
        length: 4.0
        events:
          - type: note
            pitch: D4
            offset: 0.0
            duration: 1.0
          - type: chord
            pitches: [F4, A4]
            root: F4
            offset: 1.0
            duration: 1.0
          - type: unpitched
            instrument: snare
            offset: 2.0
            duration: 1.0
"#;
        let score = Score::from_yaml(source).unwrap();
        assert_eq!(score.key, Some("D minor".parse().unwrap()));
        let events = &score.parts[0].measures[0].events;
        assert!(matches!(events[0], Event::Note(_)));
        assert!(matches!(&events[1], Event::Chord(c) if c.root == Some(pitch("F4"))));
        assert!(matches!(events[2], Event::Unpitched(_)));

        let again = Score::from_yaml(&score.to_yaml().unwrap()).unwrap();
        assert_eq!(again, score);
    }
}
