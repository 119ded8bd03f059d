use crate::score::{Event, OFFSET_EPSILON};

/// Remove short, ornamental events unless a run of them adds up to something.
///
/// Events longer than `threshold` always survive. Consecutive events at or under
/// `threshold` are held as a pending run; the run is kept when its total duration
/// reaches `cumulative_threshold` (inclusive) and discarded otherwise. The run is
/// judged when the next long event arrives and once more at the end of the input.
///
/// Input order is preserved and only whole runs are removed.
pub fn filter_weighted_duration(
    events: impl IntoIterator<Item = Event>,
    threshold: f64,
    cumulative_threshold: f64,
) -> Vec<Event> {
    let mut kept = Vec::new();
    let mut run: Vec<Event> = Vec::new();

    let flush = |run: &mut Vec<Event>, kept: &mut Vec<Event>| {
        let total: f64 = run.iter().map(Event::duration).sum();
        if total + OFFSET_EPSILON >= cumulative_threshold {
            kept.append(run);
        } else {
            run.clear();
        }
    };

    for event in events {
        if event.duration() > threshold {
            flush(&mut run, &mut kept);
            kept.push(event);
        } else {
            run.push(event);
        }
    }
    flush(&mut run, &mut kept);

    kept
}
