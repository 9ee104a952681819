/// Observed/modeled series alignment.
///
/// Both inputs are already deduplicated and sorted (see `TimeSeries::new`),
/// so the join is a single merge pass. The aligner only ever removes points
/// by date; cutting a series down to a fixed length is the fallback
/// strategy's job, not this module's.

use crate::model::{AlignedPair, AlignedPoint, DateWindow, TimeSeries};
use std::cmp::Ordering;

/// Inner-joins `observed` and `modeled` on timestamp and, when a window is
/// given, keeps only timestamps whose date lies inside it.
///
/// The result is ascending by timestamp. An empty intersection yields an
/// empty pair rather than an error.
pub fn align(observed: &TimeSeries, modeled: &TimeSeries, window: Option<DateWindow>) -> AlignedPair {
    let obs = observed.points();
    let sim = modeled.points();

    let mut points = Vec::with_capacity(obs.len().min(sim.len()));
    let (mut i, mut j) = (0, 0);

    while i < obs.len() && j < sim.len() {
        match obs[i].timestamp.cmp(&sim[j].timestamp) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                points.push(AlignedPoint {
                    timestamp: obs[i].timestamp,
                    observed: obs[i].value,
                    modeled: sim[j].value,
                });
                i += 1;
                j += 1;
            }
        }
    }

    let pair = AlignedPair { points };
    match window {
        Some(window) => clip_to_window(&pair, window),
        None => pair,
    }
}

/// Keeps the points of `pair` whose date falls inside `window`.
///
/// Idempotent: clipping an already-clipped pair to the same window returns
/// an identical pair.
pub fn clip_to_window(pair: &AlignedPair, window: DateWindow) -> AlignedPair {
    AlignedPair {
        points: pair
            .points
            .iter()
            .filter(|p| window.contains(p.timestamp))
            .copied()
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
