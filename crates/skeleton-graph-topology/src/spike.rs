//! Spikes: the first pixel of every edge leaving a nucleus.

use log::debug;
use serde::{Deserialize, Serialize};
use skeleton_graph_core::{Island, NeighborTable, PixelId};

use crate::error::TopologyError;
use crate::nucleus::{NucleusId, NucleusSet};

/// A neighbor of a nucleus pixel that lies outside that nucleus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Spike {
    pub nucleus: NucleusId,
    /// Nucleus pixel the spike touches.
    pub anchor: PixelId,
    /// The pixel outside the nucleus.
    pub pixel: PixelId,
}

impl Spike {
    /// Key used to look a spike up from the far end of a trace.
    #[inline]
    pub fn key(&self) -> (PixelId, PixelId) {
        (self.anchor, self.pixel)
    }
}

/// Collect every spike, ordered by nucleus, then anchor, then neighbor order.
///
/// A spike pixel that is not a nucleus pixel must be a chain pixel; one with
/// more than two neighbors means the skeleton is too thick to trace.
pub fn collect_spikes(
    island: &Island,
    table: &NeighborTable,
    nuclei: &NucleusSet,
) -> Result<Vec<Spike>, TopologyError> {
    nuclei.ensure_current(island)?;
    if !table.is_current(island) {
        return Err(TopologyError::StaleNuclei {
            built: table.generation(),
            current: island.generation(),
        });
    }

    let mut spikes = Vec::new();
    for nucleus in nuclei.iter() {
        for &anchor in nucleus.pixels() {
            for &pixel in table.neighbors(anchor) {
                let owner = nuclei.nucleus_of(pixel);
                if owner == Some(nucleus.id()) {
                    continue;
                }
                if owner.is_none() && table.degree(pixel) > 2 {
                    return Err(TopologyError::ThickSpike {
                        spike: island.coord(pixel).unwrap_or_default(),
                        degree: table.degree(pixel),
                    });
                }
                spikes.push(Spike {
                    nucleus: nucleus.id(),
                    anchor,
                    pixel,
                });
            }
        }
    }

    debug!("spikes: {} from {} nuclei", spikes.len(), nuclei.len());
    Ok(spikes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skeleton_graph_core::{Connectivity, PixelCoord};

    fn island(v: &[(i32, i32)]) -> Island {
        Island::from_coords(v.iter().map(|&p| PixelCoord::from(p)), Connectivity::C8)
    }

    #[test]
    fn spikes_of_a_plus() {
        let mut pts = vec![(0, 0)];
        for k in 1..=3 {
            pts.extend([(k, 0), (-k, 0), (0, k), (0, -k)]);
        }
        let isl = island(&pts);
        let table = isl.neighbor_table();
        let nuclei = NucleusSet::detect(&isl);
        let spikes = collect_spikes(&isl, &table, &nuclei).expect("thin skeleton");

        // Four arms leave the cross and every terminal has one spike back.
        assert_eq!(spikes.len(), 8);
        let centre = isl.id_of(PixelCoord::new(0, 0)).expect("centre");
        let hub = nuclei.nucleus_of(centre).expect("hub");
        assert_eq!(spikes.iter().filter(|s| s.nucleus == hub).count(), 4);
    }

    #[test]
    fn adjacent_terminals_spike_into_each_other() {
        let isl = island(&[(0, 0), (1, 1)]);
        let table = isl.neighbor_table();
        let nuclei = NucleusSet::detect(&isl);
        let spikes = collect_spikes(&isl, &table, &nuclei).expect("thin skeleton");
        assert_eq!(spikes.len(), 2);
        assert!(spikes.iter().all(|s| nuclei.nucleus_of(s.pixel).is_some()));
    }

    #[test]
    fn nuclei_from_other_pixels_hit_a_thick_spike() {
        // Same size and generation, so the nuclei pass the staleness check,
        // but (2, 1) makes the arm pixels next to it three-way branches.
        let line = island(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let nuclei = NucleusSet::detect(&line);
        let bumped = island(&[(0, 0), (1, 0), (2, 0), (3, 0), (2, 1)]);
        let table = bumped.neighbor_table();
        assert!(matches!(
            collect_spikes(&bumped, &table, &nuclei),
            Err(TopologyError::ThickSpike { degree: 3, .. })
        ));
    }

    #[test]
    fn stale_inputs_are_rejected() {
        let mut isl = island(&[(0, 0), (1, 0), (2, 0)]);
        let table = isl.neighbor_table();
        let nuclei = NucleusSet::detect(&isl);
        isl.remove(PixelCoord::new(2, 0));
        assert!(matches!(
            collect_spikes(&isl, &table, &nuclei),
            Err(TopologyError::StaleNuclei { .. })
        ));
    }
}
