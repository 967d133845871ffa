//! Skeleton repair passes applied to one island before graph extraction.
//!
//! Thinning leaves small artifacts that create spurious branch points: a
//! staircase corner pixel, a one-pixel stub on a thickened line, a
//! single-pixel hole. Each pass below is repeated until it changes nothing.
//! Results depend on arena order; a different order may remove a different
//! pixel of the same artifact, which is topologically equivalent.
//!
//! Input is assumed to be thinned. A right-angle corner whose two arm pixels
//! also touch diagonally (`(2,0)`, `(3,0)`, `(3,1)`) is not matched by any
//! pass and is left as is; under 8-connectivity it becomes a two-pixel
//! unclassified junction with a loop through the corner pixel.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::connectivity::PixelCoord;
use crate::island::{Island, PixelId};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Which cleanup passes to run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupParams {
    /// Remove staircase corner pixels.
    pub remove_steps: bool,
    /// Remove one-pixel stubs sticking out of a straight run.
    pub trim_orthogonal_stubs: bool,
    /// Fill background pixels enclosed by 4 orthogonal foreground pixels.
    ///
    /// Off by default: it is meant for masks before thinning and would close
    /// the centre of a 4-pixel ring.
    pub fill_single_holes: bool,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self {
            remove_steps: true,
            trim_orthogonal_stubs: true,
            fill_single_holes: false,
        }
    }
}

impl CleanupParams {
    /// All passes disabled.
    pub fn none() -> Self {
        Self {
            remove_steps: false,
            trim_orthogonal_stubs: false,
            fill_single_holes: false,
        }
    }
}

/// What a cleanup run changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub holes_filled: usize,
    pub stubs_trimmed: usize,
    pub steps_removed: usize,
    /// Full rounds over the enabled passes, including the final no-op round.
    pub rounds: usize,
}

impl CleanupReport {
    #[inline]
    pub fn changed(&self) -> bool {
        self.holes_filled + self.stubs_trimmed + self.steps_removed > 0
    }
}

/// Run the enabled passes until a whole round leaves the island unchanged.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(island, params), fields(pixels = island.len()))
)]
pub fn cleanup_island(island: &mut Island, params: &CleanupParams) -> CleanupReport {
    let mut report = CleanupReport::default();
    let area = island
        .bounds()
        .map(|b| b.width() as usize * b.height() as usize)
        .unwrap_or(0);
    let max_rounds = island.len() + area + 2;

    loop {
        report.rounds += 1;
        assert!(
            report.rounds <= max_rounds,
            "island cleanup did not converge after {max_rounds} rounds"
        );

        let mut changed = 0;
        if params.fill_single_holes {
            let n = fill_single_holes(island);
            report.holes_filled += n;
            changed += n;
        }
        if params.trim_orthogonal_stubs {
            let n = trim_orthogonal_stubs(island);
            report.stubs_trimmed += n;
            changed += n;
        }
        if params.remove_steps {
            let n = remove_steps(island);
            report.steps_removed += n;
            changed += n;
        }
        if changed == 0 {
            break;
        }
    }

    if report.changed() {
        debug!(
            "cleanup: {} holes filled, {} stubs trimmed, {} steps removed in {} rounds",
            report.holes_filled, report.stubs_trimmed, report.steps_removed, report.rounds
        );
    }
    report
}

/// Remove staircase corners until none is left. Returns the removed count.
pub fn remove_steps(island: &mut Island) -> usize {
    remove_to_fixpoint(island, is_step_pixel)
}

/// Remove orthogonal stubs until none is left. Returns the removed count.
pub fn trim_orthogonal_stubs(island: &mut Island) -> usize {
    remove_to_fixpoint(island, is_orthogonal_stub)
}

/// Fill single-pixel holes until none is left. Returns the filled count.
pub fn fill_single_holes(island: &mut Island) -> usize {
    let mut total = 0;
    loop {
        let holes = find_single_holes(island);
        if holes.is_empty() {
            return total;
        }
        for c in holes {
            island.insert(c);
            total += 1;
        }
    }
}

fn remove_to_fixpoint(island: &mut Island, matches: fn(&Island, PixelId) -> bool) -> usize {
    let max_passes = island.len() + 1;
    let mut total = 0;
    let mut passes = 0;
    loop {
        passes += 1;
        assert!(
            passes <= max_passes,
            "pixel removal pass did not converge after {max_passes} passes"
        );

        let ids: Vec<PixelId> = island.ids().collect();
        let mut removed = 0;
        for id in ids {
            // Earlier removals in this pass may have changed the neighborhood.
            if !matches(island, id) {
                continue;
            }
            if let Some(c) = island.coord(id) {
                island.remove(c);
                removed += 1;
            }
        }
        if removed == 0 {
            return total;
        }
        total += removed;
    }
}

fn neighbor_coords(island: &Island, id: PixelId) -> Vec<PixelCoord> {
    island
        .neighbors(id)
        .into_iter()
        .filter_map(|n| island.coord(n))
        .collect()
}

/// Staircase corner:
///
/// ```text
///  #          #
///  ##   ->     #
///   #          #
/// ```
///
/// The pixel has exactly 3 neighbors; one of them, `P`, is orthogonal to it,
/// the other two are a knight's move apart and both touch `P`, so removing
/// the pixel keeps the island connected.
pub fn is_step_pixel(island: &Island, id: PixelId) -> bool {
    let Some(c) = island.coord(id) else {
        return false;
    };
    let nbs = neighbor_coords(island, id);
    if nbs.len() != 3 {
        return false;
    }

    let conn = island.connectivity();
    (0..3).any(|i| {
        let p = nbs[i];
        let q = nbs[(i + 1) % 3];
        let r = nbs[(i + 2) % 3];
        c.is_orthogonal_neighbor(p)
            && q.is_knights_move(r)
            && conn.are_neighbors(p, q)
            && conn.are_neighbors(p, r)
    })
}

/// One-pixel stub on a straight run:
///
/// ```text
///   #         #
///  ##   ->    #
///   #         #
/// ```
///
/// The pixel has exactly 3 neighbors and they are three consecutive pixels
/// of one column or one row.
pub fn is_orthogonal_stub(island: &Island, id: PixelId) -> bool {
    let nbs = neighbor_coords(island, id);
    if nbs.len() != 3 {
        return false;
    }
    consecutive_run(nbs.iter().map(|c| (c.x, c.y))) || consecutive_run(nbs.iter().map(|c| (c.y, c.x)))
}

/// All `(fixed, along)` pairs share `fixed` and `along` spans exactly 3 values.
fn consecutive_run<I: Iterator<Item = (i32, i32)>>(pairs: I) -> bool {
    let pairs: Vec<(i32, i32)> = pairs.collect();
    let Some(&(fixed, _)) = pairs.first() else {
        return false;
    };
    if pairs.iter().any(|&(f, _)| f != fixed) {
        return false;
    }
    let mut along: Vec<i32> = pairs.iter().map(|&(_, a)| a).collect();
    along.sort_unstable();
    along.dedup();
    along.len() == 3 && along[2] - along[0] == 2
}

/// Background pixels with all four orthogonal neighbors set, row-major.
pub fn find_single_holes(island: &Island) -> Vec<PixelCoord> {
    let mut holes = BTreeSet::new();
    for c in island.coords() {
        for candidate in c.orthogonal_ring() {
            if island.contains(candidate) {
                continue;
            }
            if candidate.orthogonal_ring().iter().all(|&n| island.contains(n)) {
                holes.insert(candidate);
            }
        }
    }
    holes.into_iter().collect()
}
