//! End-to-end extraction: flood fill -> cleanup -> nuclei -> graph, per island.

use log::{debug, warn};
use skeleton_graph_core::{
    cleanup_island, flood_fill_coords, flood_fill_predicate, flood_fill_view, BinaryImageView,
    CleanupReport, FloodFillError, Island, IslandList, IslandOrigin, PixelCoord,
};

use crate::assemble::assemble_graph;
use crate::error::TopologyError;
use crate::graph::PixelGraph;
use crate::nucleus::detect_nuclei;
use crate::params::SkeletonGraphParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Result for one island. A topology failure is local to its island.
#[derive(Clone, Debug)]
pub struct IslandGraph {
    pub origin: Option<IslandOrigin>,
    /// Pixel count after cleanup.
    pub pixel_count: usize,
    pub cleanup: CleanupReport,
    /// The cleaned island the graph was traced on.
    pub island: Island,
    pub graph: Result<PixelGraph, TopologyError>,
}

impl IslandGraph {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.graph.is_ok()
    }
}

/// Runs the pipeline with a fixed parameter set.
#[derive(Clone, Debug, Default)]
pub struct SkeletonGraphBuilder {
    params: SkeletonGraphParams,
}

impl SkeletonGraphBuilder {
    pub fn new(params: SkeletonGraphParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SkeletonGraphParams {
        &self.params
    }

    /// Extract one graph per foreground island of a binary view.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, view), fields(width = view.width, height = view.height))
    )]
    pub fn build_from_view(&self, view: &BinaryImageView<'_>) -> Result<Vec<IslandGraph>, FloodFillError> {
        let islands = flood_fill_view(view, self.params.connectivity)?;
        Ok(self.build_islands(islands))
    }

    /// Extract graphs from a `width x height` domain where `is_set(x, y)`
    /// marks foreground.
    pub fn build_from_predicate<F>(
        &self,
        width: usize,
        height: usize,
        is_set: F,
    ) -> Result<Vec<IslandGraph>, FloodFillError>
    where
        F: Fn(usize, usize) -> bool,
    {
        let islands = flood_fill_predicate(width, height, self.params.connectivity, is_set)?;
        Ok(self.build_islands(islands))
    }

    /// Extract graphs from explicit foreground coordinates.
    pub fn build_from_coords(&self, coords: &[PixelCoord]) -> Vec<IslandGraph> {
        self.build_islands(flood_fill_coords(coords, self.params.connectivity))
    }

    /// Filter, order and process the islands of one flood fill.
    pub fn build_islands(&self, mut islands: IslandList) -> Vec<IslandGraph> {
        let dropped = islands.retain_min_size(self.params.min_island_size);
        if self.params.sort_by_size {
            islands.sort_by_size_desc();
        }
        debug!(
            "islands: {} kept, {} below {} pixels",
            islands.len(),
            dropped,
            self.params.min_island_size
        );

        let out: Vec<IslandGraph> = islands
            .into_vec()
            .into_iter()
            .map(|island| self.build_island(island))
            .collect();

        let failed = out.iter().filter(|g| !g.is_ok()).count();
        if failed > 0 {
            warn!("{failed} of {} islands failed graph assembly", out.len());
        }
        out
    }

    /// Clean one island and trace its graph.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, island), fields(pixels = island.len()))
    )]
    pub fn build_island(&self, mut island: Island) -> IslandGraph {
        let cleanup = cleanup_island(&mut island, &self.params.cleanup);
        let graph = trace_island(&island, self.params.max_trace_steps);
        if let Err(err) = &graph {
            warn!(
                "island {:?} ({} pixels): {err}",
                island.origin().map(|o| o.ordinal),
                island.len()
            );
        }
        IslandGraph {
            origin: island.origin(),
            pixel_count: island.len(),
            cleanup,
            island,
            graph,
        }
    }
}

fn trace_island(island: &Island, max_trace_steps: Option<usize>) -> Result<PixelGraph, TopologyError> {
    let table = island.neighbor_table();
    let nuclei = detect_nuclei(island, &table)?;
    assemble_graph(island, &table, &nuclei, max_trace_steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skeleton_graph_core::{BinaryImage, CleanupParams, Connectivity};

    #[test]
    fn empty_image_yields_no_islands() {
        let img = BinaryImage::new(8, 8);
        let out = SkeletonGraphBuilder::default()
            .build_from_view(&img.view())
            .expect("valid view");
        assert!(out.is_empty());
    }

    #[test]
    fn small_islands_are_dropped_and_order_is_by_size() {
        let img = BinaryImage::from_ascii(&[
            "#.......", //
            "........", //
            "..####..", //
            "........", //
            "......##", //
        ]);
        let params = SkeletonGraphParams {
            min_island_size: 2,
            sort_by_size: true,
            ..SkeletonGraphParams::default()
        };
        let out = SkeletonGraphBuilder::new(params)
            .build_from_view(&img.view())
            .expect("valid view");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].pixel_count, 4);
        assert_eq!(out[1].pixel_count, 2);
        assert!(out.iter().all(IslandGraph::is_ok));
    }

    #[test]
    fn cleanup_runs_before_tracing() {
        // Staircase corner at (1, 1) would otherwise create a junction.
        let coords: Vec<PixelCoord> = [(0, 0), (0, 1), (1, 1), (1, 2), (1, 3)]
            .iter()
            .map(|&p| PixelCoord::from(p))
            .collect();

        let cleaned = SkeletonGraphBuilder::default().build_from_coords(&coords);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].cleanup.steps_removed, 1);
        let graph = cleaned[0].graph.as_ref().expect("graph");
        assert_eq!(graph.num_junctions(), 0);
        assert_eq!(graph.num_terminals(), 2);

        let raw = SkeletonGraphBuilder::new(SkeletonGraphParams {
            cleanup: CleanupParams::none(),
            ..SkeletonGraphParams::default()
        })
        .build_from_coords(&coords);
        assert_eq!(raw[0].pixel_count, 5);
    }

    #[test]
    fn failing_island_does_not_abort_others() {
        let coords: Vec<PixelCoord> = (0..10)
            .map(|x| PixelCoord::new(x, 0))
            .chain([PixelCoord::new(0, 5), PixelCoord::new(1, 5)])
            .collect();
        let out = SkeletonGraphBuilder::new(SkeletonGraphParams {
            connectivity: Connectivity::C4,
            max_trace_steps: Some(3),
            ..SkeletonGraphParams::default()
        })
        .build_from_coords(&coords);

        assert_eq!(out.len(), 2);
        assert!(matches!(
            out[0].graph,
            Err(TopologyError::TraceCapExceeded { cap: 3, .. })
        ));
        assert!(out[1].is_ok());
    }
}
