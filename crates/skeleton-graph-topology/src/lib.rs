//! Skeleton topology: from cleaned pixel islands to node/edge graphs.
//!
//! Current focus:
//! - nucleus detection (grouping branch and end pixels into graph vertices),
//! - best-effort junction shape classification,
//! - edge assembly by tracing 2-connected pixel chains between nuclei.
//!
//! Pixel-level primitives (islands, flood fill, cleanup) live in
//! `skeleton-graph-core`.

mod assemble;
mod classify;
mod error;
mod graph;
mod io;
mod nucleus;
mod params;
mod pipeline;
mod spike;

pub use assemble::{assemble_graph, build_graph};
pub use classify::NucleusShape;
pub use error::TopologyError;
pub use graph::{
    CoverageIssue, EdgeEnds, EdgeId, GraphEdge, GraphNode, NodeId, NodeKind, PixelGraph,
    PolylineSimplifier,
};
pub use io::{GraphExtractConfig, GraphIoError, GraphReport, IslandReport};
pub use nucleus::{detect_nuclei, Nucleus, NucleusId, NucleusSet};
pub use params::SkeletonGraphParams;
pub use pipeline::{IslandGraph, SkeletonGraphBuilder};
pub use spike::{collect_spikes, Spike};

pub use skeleton_graph_core::{CleanupParams, CleanupReport, Connectivity, Island, PixelCoord};
