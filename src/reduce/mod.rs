//! # Reduction Module
//!
//! Turns the chordified events of one measure (or one segment of a measure) into a
//! single combined chord.
//!
//! ## Pipeline
//! 1. `bass` - find the lowest pitch on the downbeat and drop anything that sounds
//!    below it later in the window
//! 2. `duration` - drop short passing material unless a run of it is long enough
//!    to matter
//! 3. [`Chord::combine`] - union of every surviving pitch
//!
//! ## Example
//! ```rust
//! use harmonize::reduce::reduce_window;
//! use harmonize::{AnalysisOptions, Chord, Event, Note};
//!
//! let events = vec![
//!     Event::Chord(Chord::new(["C3".parse().unwrap(), "E4".parse().unwrap()], 0.0, 2.0)),
//!     Event::Note(Note::new("G4".parse().unwrap(), 2.0, 2.0)),
//!     Event::Note(Note::new("A2".parse().unwrap(), 3.75, 0.25)),
//! ];
//!
//! let reduction = reduce_window(&events, 0.0, &AnalysisOptions::default()).unwrap();
//! assert_eq!(reduction.bass.unwrap().to_string(), "C3");
//! assert_eq!(reduction.chord.pitches.len(), 3); // C3 E4 G4, A2 is below the floor
//! ```

mod bass;
mod duration;


pub use bass::{downbeat_bass, filter_below_bass_floor};
pub use duration::filter_weighted_duration;

use crate::options::AnalysisOptions;
use crate::pitch::Pitch;
use crate::score::{Chord, Event};

/// Combined harmony of one window, with the downbeat bass it was filtered against
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub bass: Option<Pitch>,
    pub chord: Chord,
}

/// Run the reduction pipeline over `events`, treating `downbeat` as the window start.
///
/// Returns `None` when nothing pitched survives filtering.
pub fn reduce_window(events: &[Event], downbeat: f64, options: &AnalysisOptions) -> Option<Reduction> {
    let bass = downbeat_bass(events, downbeat);
    let floored = filter_below_bass_floor(events, bass.as_ref(), downbeat);
    let filtered = filter_weighted_duration(floored, options.threshold, options.cumulative_threshold);
    let chord = Chord::combine(&filtered)?;
    Some(Reduction { bass, chord })
}
