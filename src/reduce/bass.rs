use crate::pitch::Pitch;
use crate::score::{same_offset, Chord, Event};

/// Lowest pitch among the events that start exactly on `downbeat`.
///
/// Height decides, not spelling: for `Gb3` and `F#3` on the same downbeat either may be
/// returned. `None` when nothing pitched starts there.
pub fn downbeat_bass(events: &[Event], downbeat: f64) -> Option<Pitch> {
    events
        .iter()
        .filter(|e| same_offset(e.offset(), downbeat))
        .filter_map(Event::lowest_pitch)
        .min_by_key(|p| p.midi())
        .copied()
}

/// Drop material that sounds below the bass floor after the downbeat.
///
/// - Anything on the downbeat is kept as is
/// - A later note survives when there is no floor or it is at or above the floor
/// - A later chord keeps only its pitches at or above the floor, and disappears if
///   none are left
/// - Later unpitched hits carry no harmony and are dropped
///
/// Relative order is preserved.
pub fn filter_below_bass_floor(events: &[Event], floor: Option<&Pitch>, downbeat: f64) -> Vec<Event> {
    let above = |pitch: &Pitch| floor.map_or(true, |floor| pitch.midi() >= floor.midi());

    events
        .iter()
        .filter_map(|event| {
            if same_offset(event.offset(), downbeat) {
                return Some(event.clone());
            }
            match event {
                Event::Note(note) => above(&note.pitch).then(|| event.clone()),
                Event::Chord(chord) => {
                    let kept: Vec<Pitch> = chord.pitches.iter().copied().filter(|p| above(p)).collect();
                    if kept.is_empty() {
                        return None;
                    }
                    let mut reduced = Chord::new(kept, chord.offset, chord.duration);
                    reduced.root = chord.root.filter(|root| reduced.pitches.contains(root));
                    reduced.lyrics = chord.lyrics.clone();
                    Some(Event::Chord(reduced))
                }
                Event::Unpitched(_) => None,
            }
        })
        .collect()
}
