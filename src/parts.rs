use tracing::debug;

use crate::score::Score;

/// Copy of `score` without the parts that never sound a pitch.
///
/// Drum tracks and empty staves would otherwise feed nothing but noise into the
/// reduction. A score with no pitched parts comes back with no parts.
pub fn remove_unpitched_parts(score: &Score) -> Score {
    let parts = score
        .parts
        .iter()
        .filter(|part| {
            let keep = part.has_pitched_notes();
            if !keep {
                debug!(part = part.name.as_deref().unwrap_or("<unnamed>"), "dropping unpitched part");
            }
            keep
        })
        .cloned()
        .collect();

    Score {
        title: score.title.clone(),
        key: score.key,
        parts,
    }
}
