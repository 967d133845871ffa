//! Graph of one island: nodes at nuclei, edges along pixel chains.

use std::collections::{BTreeSet, HashMap};

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use skeleton_graph_core::{Connectivity, Island, PixelCoord};

use crate::classify::NucleusShape;

pub type NodeId = usize;
pub type EdgeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "shape", rename_all = "snake_case")]
pub enum NodeKind {
    /// A pixel without neighbors.
    Isolated,
    /// Line endpoint.
    Terminal,
    /// Branch point, with its best-effort shape.
    Junction(NucleusShape),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Centre pixel of the nucleus.
    pub coord: PixelCoord,
    pub centroid: Point2<f32>,
    /// All pixels of the nucleus.
    pub pixels: Vec<PixelCoord>,
    pub incident_edges: Vec<EdgeId>,
}

impl GraphNode {
    #[inline]
    pub fn is_junction(&self) -> bool {
        matches!(self.kind, NodeKind::Junction(_))
    }

    pub fn shape(&self) -> Option<NucleusShape> {
        match self.kind {
            NodeKind::Junction(shape) => Some(shape),
            NodeKind::Terminal => Some(NucleusShape::Terminal),
            NodeKind::Isolated => None,
        }
    }

    /// Number of edge ends attached to this node.
    ///
    /// A self-loop counts twice; the one-pixel edge of an isolated dot counts
    /// zero.
    pub fn degree(&self, graph: &PixelGraph) -> usize {
        self.incident_edges
            .iter()
            .filter_map(|&e| graph.edges.get(e))
            .map(|e| match e.ends {
                EdgeEnds::Nodes { start, end } if start == end => {
                    if e.pixels.len() > 1 {
                        2
                    } else {
                        0
                    }
                }
                _ => 1,
            })
            .sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeEnds {
    Nodes { start: NodeId, end: NodeId },
    /// Closed loop without any node on it.
    Cycle,
}

impl EdgeEnds {
    pub fn nodes(&self) -> Option<(NodeId, NodeId)> {
        match *self {
            EdgeEnds::Nodes { start, end } => Some((start, end)),
            EdgeEnds::Cycle => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub ends: EdgeEnds,
    /// Ordered pixel chain. For node edges the first and last pixels are
    /// nucleus pixels; a cycle does not repeat its first pixel.
    pub pixels: Vec<PixelCoord>,
}

impl GraphEdge {
    #[inline]
    pub fn is_cycle(&self) -> bool {
        self.ends == EdgeEnds::Cycle
    }

    /// Euclidean length of the chain, closing the loop for cycles.
    pub fn arc_length(&self) -> f32 {
        let step = |a: PixelCoord, b: PixelCoord| (a.distance_sq(b) as f32).sqrt();
        let open: f32 = self.pixels.windows(2).map(|w| step(w[0], w[1])).sum();
        match (self.is_cycle(), self.pixels.first(), self.pixels.last()) {
            (true, Some(&first), Some(&last)) if self.pixels.len() > 1 => open + step(last, first),
            _ => open,
        }
    }

    /// Chain pixels strictly between the two boundary nucleus pixels.
    pub fn interior(&self) -> &[PixelCoord] {
        if self.is_cycle() {
            return &self.pixels;
        }
        match self.pixels.len() {
            0..=2 => &[],
            n => &self.pixels[1..n - 1],
        }
    }

    /// Hand the chain to an external polyline simplifier.
    pub fn simplified<S: PolylineSimplifier + ?Sized>(
        &self,
        simplifier: &S,
        tolerance: f32,
    ) -> Vec<PixelCoord> {
        simplifier.simplify(&self.pixels, tolerance)
    }
}

/// Polyline simplification (e.g. Douglas-Peucker) provided by the caller.
pub trait PolylineSimplifier {
    fn simplify(&self, chain: &[PixelCoord], tolerance: f32) -> Vec<PixelCoord>;
}

/// Pixel coverage problem found by [`PixelGraph::check_coverage`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageIssue {
    /// Island pixel referenced by no node and no edge.
    Missing(PixelCoord),
    /// Graph pixel that is not in the island.
    Foreign(PixelCoord),
    /// Non-nucleus pixel referenced more than once.
    Duplicate(PixelCoord),
    /// Node edge whose first or last pixel belongs to no node.
    UnanchoredEnd(PixelCoord),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PixelGraph {
    pub connectivity: Connectivity,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl PixelGraph {
    pub fn num_junctions(&self) -> usize {
        self.iter_junctions().count()
    }

    pub fn num_terminals(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Terminal)
            .count()
    }

    pub fn num_cycles(&self) -> usize {
        self.edges.iter().filter(|e| e.is_cycle()).count()
    }

    pub fn iter_junctions(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| n.is_junction())
    }

    pub fn edge_pixels(&self, id: EdgeId) -> &[PixelCoord] {
        self.edges.get(id).map(|e| e.pixels.as_slice()).unwrap_or(&[])
    }

    /// Node whose nucleus contains `c`.
    pub fn node_at(&self, c: PixelCoord) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.pixels.contains(&c))
    }

    /// Every pixel referenced by a node or an edge, row-major.
    pub fn pixel_set(&self) -> BTreeSet<PixelCoord> {
        self.nodes
            .iter()
            .flat_map(|n| n.pixels.iter().copied())
            .chain(self.edges.iter().flat_map(|e| e.pixels.iter().copied()))
            .collect()
    }

    pub fn total_arc_length(&self) -> f32 {
        self.edges.iter().map(GraphEdge::arc_length).sum()
    }

    /// Compare the graph against the island it was built from.
    ///
    /// Node pixels and edge pixels together must equal the island pixel set.
    /// Only nucleus pixels may be shared, and only at edge boundaries.
    pub fn check_coverage(&self, island: &Island) -> Vec<CoverageIssue> {
        let mut issues = Vec::new();
        let node_pixels: BTreeSet<PixelCoord> = self
            .nodes
            .iter()
            .flat_map(|n| n.pixels.iter().copied())
            .collect();

        let mut interior_uses: HashMap<PixelCoord, usize> = HashMap::new();
        for edge in &self.edges {
            for &c in edge.interior() {
                *interior_uses.entry(c).or_default() += 1;
            }
            if !edge.is_cycle() {
                for c in [edge.pixels.first(), edge.pixels.last()].into_iter().flatten() {
                    if !node_pixels.contains(c) {
                        issues.push(CoverageIssue::UnanchoredEnd(*c));
                    }
                }
            }
        }

        let mut dup: Vec<PixelCoord> = interior_uses
            .iter()
            .filter(|&(c, &n)| n > 1 || node_pixels.contains(c))
            .map(|(&c, _)| c)
            .collect();
        dup.sort_unstable();
        issues.extend(dup.into_iter().map(CoverageIssue::Duplicate));

        let covered = self.pixel_set();
        issues.extend(
            island
                .sorted_coords()
                .into_iter()
                .filter(|c| !covered.contains(c))
                .map(CoverageIssue::Missing),
        );
        issues.extend(
            covered
                .into_iter()
                .filter(|&c| !island.contains(c))
                .map(CoverageIssue::Foreign),
        );
        issues
    }
}
