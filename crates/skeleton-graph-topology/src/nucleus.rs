//! Nucleus detection: grouping every degree != 2 pixel into graph vertices.
//!
//! A nucleus is a connected component of the subgraph of pixels with degree
//! greater than 2, or a single pixel of degree 0 or 1. Because components are
//! well defined, the partition does not depend on the order in which seeds
//! are visited.

use std::collections::VecDeque;

use log::debug;
use nalgebra::Point2;
use skeleton_graph_core::{Island, NeighborTable, PixelCoord, PixelId};

use crate::classify::{centroid, classify, NucleusShape};
use crate::error::TopologyError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Index of a nucleus inside its [`NucleusSet`].
pub type NucleusId = usize;

#[derive(Clone, Debug)]
pub struct Nucleus {
    id: NucleusId,
    pixels: Vec<PixelId>,
    coords: Vec<PixelCoord>,
    centre: PixelId,
    centre_coord: PixelCoord,
    shape: NucleusShape,
    centroid: Point2<f32>,
}

impl Nucleus {
    #[inline]
    pub fn id(&self) -> NucleusId {
        self.id
    }

    /// Member pixels in discovery order; the seed comes first.
    #[inline]
    pub fn pixels(&self) -> &[PixelId] {
        &self.pixels
    }

    #[inline]
    pub fn coords(&self) -> &[PixelCoord] {
        &self.coords
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn centre(&self) -> PixelId {
        self.centre
    }

    #[inline]
    pub fn centre_coord(&self) -> PixelCoord {
        self.centre_coord
    }

    #[inline]
    pub fn shape(&self) -> NucleusShape {
        self.shape
    }

    #[inline]
    pub fn centroid(&self) -> Point2<f32> {
        self.centroid
    }
}

/// All nuclei of one island generation plus the pixel -> nucleus lookup.
#[derive(Clone, Debug)]
pub struct NucleusSet {
    generation: u64,
    nuclei: Vec<Nucleus>,
    owner: Vec<Option<NucleusId>>,
}

impl NucleusSet {
    /// Detect nuclei with a freshly built neighbor table.
    pub fn detect(island: &Island) -> Self {
        build(island, &island.neighbor_table())
    }

    /// Island generation the set was built for.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nuclei.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nuclei.is_empty()
    }

    #[inline]
    pub fn get(&self, id: NucleusId) -> Option<&Nucleus> {
        self.nuclei.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Nucleus> {
        self.nuclei.iter()
    }

    /// Nucleus owning `pixel`, if any.
    #[inline]
    pub fn nucleus_of(&self, pixel: PixelId) -> Option<NucleusId> {
        self.owner.get(pixel).copied().flatten()
    }

    /// Fails when the island was mutated after detection.
    pub fn ensure_current(&self, island: &Island) -> Result<(), TopologyError> {
        if self.generation == island.generation() && self.owner.len() == island.id_bound() {
            Ok(())
        } else {
            Err(TopologyError::StaleNuclei {
                built: self.generation,
                current: island.generation(),
            })
        }
    }

    /// Nucleus pixel sets as sorted coordinate lists, sorted by first pixel.
    ///
    /// Independent of nucleus numbering, so two detections can be compared.
    pub fn partition(&self) -> Vec<Vec<PixelCoord>> {
        let mut out: Vec<Vec<PixelCoord>> = self
            .nuclei
            .iter()
            .map(|n| {
                let mut c = n.coords.clone();
                c.sort_unstable();
                c
            })
            .collect();
        out.sort_unstable();
        out
    }

    pub fn count_shape(&self, shape: NucleusShape) -> usize {
        self.nuclei.iter().filter(|n| n.shape == shape).count()
    }
}

/// Detect nuclei using a neighbor table taken from `island`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(island, table), fields(pixels = island.len()))
)]
pub fn detect_nuclei(island: &Island, table: &NeighborTable) -> Result<NucleusSet, TopologyError> {
    if !table.is_current(island) {
        return Err(TopologyError::StaleNuclei {
            built: table.generation(),
            current: island.generation(),
        });
    }
    Ok(build(island, table))
}

fn build(island: &Island, table: &NeighborTable) -> NucleusSet {
    let mut owner: Vec<Option<NucleusId>> = vec![None; island.id_bound()];
    let mut nuclei = Vec::new();
    let mut queue = VecDeque::new();

    for seed in island.ids() {
        if table.degree(seed) == 2 || owner[seed].is_some() {
            continue;
        }

        let id = nuclei.len();
        owner[seed] = Some(id);
        let mut pixels = vec![seed];

        if table.degree(seed) > 2 {
            queue.push_back(seed);
            while let Some(p) = queue.pop_front() {
                for &q in table.neighbors(p) {
                    if owner[q].is_none() && table.degree(q) > 2 {
                        owner[q] = Some(id);
                        pixels.push(q);
                        queue.push_back(q);
                    }
                }
            }
        }

        let coords: Vec<PixelCoord> = pixels.iter().filter_map(|&p| island.coord(p)).collect();
        let class = classify(island, &pixels);
        let centre_coord = island.coord(class.centre).unwrap_or(coords[0]);
        nuclei.push(Nucleus {
            id,
            centroid: centroid(&coords),
            pixels,
            coords,
            centre: class.centre,
            centre_coord,
            shape: class.shape,
        });
    }

    let set = NucleusSet {
        generation: table.generation(),
        nuclei,
        owner,
    };
    debug!(
        "nuclei: {} ({} junctions, {} unclassified)",
        set.len(),
        set.iter().filter(|n| table.degree(n.centre) > 2).count(),
        set.count_shape(NucleusShape::Unclassified)
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use skeleton_graph_core::Connectivity;

    fn island(v: &[(i32, i32)], conn: Connectivity) -> Island {
        Island::from_coords(v.iter().map(|&p| PixelCoord::from(p)), conn)
    }

    fn y_shape() -> Vec<(i32, i32)> {
        // Centre with an orthogonal stem and two diagonal arms.
        vec![
            (0, 0),
            (0, 1),
            (0, 2),
            (0, 3),
            (-1, -1),
            (-2, -2),
            (-3, -3),
            (1, -1),
            (2, -2),
            (3, -3),
        ]
    }

    #[test]
    fn ring_has_no_nuclei() {
        let isl = island(&[(1, 0), (0, 1), (-1, 0), (0, -1)], Connectivity::C8);
        let set = NucleusSet::detect(&isl);
        assert!(set.is_empty());
    }

    #[test]
    fn junction_and_terminals() {
        let isl = island(&y_shape(), Connectivity::C8);
        let set = NucleusSet::detect(&isl);
        assert_eq!(set.len(), 4);
        assert_eq!(set.count_shape(NucleusShape::Terminal), 3);
        assert_eq!(set.count_shape(NucleusShape::NickedT), 1);

        let centre = isl.id_of(PixelCoord::new(0, 0)).expect("centre");
        let junction = set.nucleus_of(centre).and_then(|n| set.get(n)).expect("owned");
        assert_eq!(junction.len(), 1);
        assert_eq!(junction.centre_coord(), PixelCoord::new(0, 0));

        let chain = isl.id_of(PixelCoord::new(0, 1)).expect("chain pixel");
        assert_eq!(set.nucleus_of(chain), None);
    }

    #[test]
    fn filled_t_nucleus_grows_over_degree_three_pixels() {
        let mut pts = vec![(0, 0)];
        for k in 1..=3 {
            pts.push((-k, 0));
            pts.push((k, 0));
            pts.push((0, k));
        }
        let isl = island(&pts, Connectivity::C8);
        let set = NucleusSet::detect(&isl);
        let centre = isl.id_of(PixelCoord::new(0, 0)).expect("centre");
        let hub = set.nucleus_of(centre).and_then(|n| set.get(n)).expect("owned");
        assert_eq!(hub.len(), 4);
        assert_eq!(hub.shape(), NucleusShape::FilledT);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn detection_is_idempotent_and_order_independent() {
        let pts = y_shape();
        let isl = island(&pts, Connectivity::C8);
        let first = NucleusSet::detect(&isl);
        let again = NucleusSet::detect(&isl);
        assert_eq!(first.partition(), again.partition());

        let reversed: Vec<(i32, i32)> = pts.iter().rev().copied().collect();
        let isl_rev = island(&reversed, Connectivity::C8);
        assert_eq!(first.partition(), NucleusSet::detect(&isl_rev).partition());
    }

    #[test]
    fn stale_table_is_rejected() {
        let mut isl = island(&y_shape(), Connectivity::C8);
        let table = isl.neighbor_table();
        let set = detect_nuclei(&isl, &table).expect("fresh table");
        assert!(set.ensure_current(&isl).is_ok());

        isl.remove(PixelCoord::new(3, -3));
        assert!(matches!(
            detect_nuclei(&isl, &table),
            Err(TopologyError::StaleNuclei { .. })
        ));
        assert!(set.ensure_current(&isl).is_err());
    }

    #[test]
    fn isolated_pixel_is_its_own_nucleus() {
        let isl = island(&[(5, 5)], Connectivity::C4);
        let set = NucleusSet::detect(&isl);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).map(Nucleus::shape), Some(NucleusShape::Unclassified));
    }
}
