//! High-level facade crate for the `skeleton-graph-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the pixel-level and topology crates
//! - (feature-gated) helpers that take an `image::GrayImage` holding a thinned
//!   skeleton and return one graph per connected island.
//!
//! ## Quickstart
//!
//! ```no_run
//! use skeleton_graph::detect;
//! use skeleton_graph::SkeletonGraphParams;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("skeleton.png")?.decode()?.to_luma8();
//! let islands = detect::graphs_from_gray(&img, &SkeletonGraphParams::default())?;
//! for island in &islands {
//!     if let Ok(graph) = &island.graph {
//!         println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `skeleton_graph::core`: pixel coordinates, islands, flood fill, cleanup.
//! - `skeleton_graph::topology`: nuclei, junction shapes, graph assembly, JSON io.
//! - `skeleton_graph::detect` (feature `image`): helpers from `image::GrayImage`.

pub use skeleton_graph_core as core;
pub use skeleton_graph_topology as topology;

pub use skeleton_graph_core::{BinaryImage, BinaryImageView, CleanupParams, Connectivity, PixelCoord};
pub use skeleton_graph_topology::{
    EdgeEnds, GraphEdge, GraphNode, IslandGraph, NodeKind, NucleusShape, PixelGraph,
    SkeletonGraphBuilder, SkeletonGraphParams, TopologyError,
};

#[cfg(feature = "image")]
pub mod detect;
