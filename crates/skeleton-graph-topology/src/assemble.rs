//! Graph assembly by spike tracing.
//!
//! Every spike starts a walk over degree-2 pixels that stops at the first
//! nucleus pixel. The walk becomes one edge, and the spike it arrived through
//! is consumed so the same chain is not traced again from the other end.
//! Pixels left untouched afterwards belong to loops without any nucleus and
//! are emitted as cycle edges.

use std::collections::HashMap;

use log::debug;
use skeleton_graph_core::{Island, NeighborTable, PixelCoord, PixelId};

use crate::error::TopologyError;
use crate::graph::{EdgeEnds, GraphEdge, GraphNode, NodeKind, PixelGraph};
use crate::nucleus::{Nucleus, NucleusId, NucleusSet};
use crate::spike::{collect_spikes, Spike};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Detect nuclei and assemble the graph of `island` in one call.
pub fn build_graph(island: &Island, max_trace_steps: Option<usize>) -> Result<PixelGraph, TopologyError> {
    let table = island.neighbor_table();
    let nuclei = crate::nucleus::detect_nuclei(island, &table)?;
    assemble_graph(island, &table, &nuclei, max_trace_steps)
}

/// Trace every edge of `island` between the given nuclei.
///
/// `max_trace_steps` bounds a single walk; it defaults to the island size
/// plus one, which no walk over a consistent island can reach.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(island, table, nuclei),
        fields(pixels = island.len(), nuclei = nuclei.len())
    )
)]
pub fn assemble_graph(
    island: &Island,
    table: &NeighborTable,
    nuclei: &NucleusSet,
    max_trace_steps: Option<usize>,
) -> Result<PixelGraph, TopologyError> {
    let spikes = collect_spikes(island, table, nuclei)?;
    let cap = max_trace_steps.unwrap_or(island.len() + 1);
    let graph = assemble_from_spikes(island, table, nuclei, &spikes, cap)?;
    debug!(
        "graph: {} nodes ({} junctions), {} edges ({} cycles)",
        graph.nodes.len(),
        graph.num_junctions(),
        graph.edges.len(),
        graph.num_cycles()
    );
    Ok(graph)
}

struct Walker<'a> {
    island: &'a Island,
    table: &'a NeighborTable,
    nuclei: &'a NucleusSet,
    cap: usize,
}

struct Trace {
    chain: Vec<PixelId>,
    end: NucleusId,
}

impl Walker<'_> {
    fn coord(&self, id: PixelId) -> PixelCoord {
        self.island.coord(id).unwrap_or_default()
    }

    fn coords(&self, chain: &[PixelId]) -> Vec<PixelCoord> {
        chain.iter().map(|&id| self.coord(id)).collect()
    }

    /// The neighbor of chain pixel `cur` that is not `prev`.
    fn step(&self, prev: PixelId, cur: PixelId) -> Result<PixelId, TopologyError> {
        match *self.table.neighbors(cur) {
            [a, b] => Ok(if a == prev { b } else { a }),
            ref other => Err(TopologyError::OrphanBoundary {
                pixel: self.coord(cur),
                degree: other.len(),
            }),
        }
    }

    fn trace(&self, spike: Spike) -> Result<Trace, TopologyError> {
        let mut chain = vec![spike.anchor, spike.pixel];
        let (mut prev, mut cur) = (spike.anchor, spike.pixel);
        let mut steps = 0;
        loop {
            if let Some(end) = self.nuclei.nucleus_of(cur) {
                return Ok(Trace { chain, end });
            }
            steps += 1;
            if steps > self.cap {
                return Err(TopologyError::TraceCapExceeded {
                    start: self.coord(spike.anchor),
                    cap: self.cap,
                });
            }
            let next = self.step(prev, cur)?;
            chain.push(next);
            prev = cur;
            cur = next;
        }
    }

    /// Walk a nucleus-free loop starting at `start`, towards its smaller
    /// neighbor first.
    fn trace_cycle(&self, start: PixelId) -> Result<Vec<PixelId>, TopologyError> {
        let first = match *self.table.neighbors(start) {
            [a, b] => {
                if self.coord(a) <= self.coord(b) {
                    a
                } else {
                    b
                }
            }
            ref other => {
                return Err(TopologyError::OrphanBoundary {
                    pixel: self.coord(start),
                    degree: other.len(),
                })
            }
        };

        let mut chain = vec![start];
        let (mut prev, mut cur) = (start, first);
        while cur != start {
            if chain.len() > self.cap {
                return Err(TopologyError::TraceCapExceeded {
                    start: self.coord(start),
                    cap: self.cap,
                });
            }
            if self.nuclei.nucleus_of(cur).is_some() {
                return Err(TopologyError::OrphanBoundary {
                    pixel: self.coord(cur),
                    degree: self.table.degree(cur),
                });
            }
            chain.push(cur);
            let next = self.step(prev, cur)?;
            prev = cur;
            cur = next;
        }
        Ok(chain)
    }
}

fn node_for(nucleus: &Nucleus, table: &NeighborTable) -> GraphNode {
    let kind = match (nucleus.len(), table.degree(nucleus.centre())) {
        (1, 0) => NodeKind::Isolated,
        (1, 1) => NodeKind::Terminal,
        _ => NodeKind::Junction(nucleus.shape()),
    };
    GraphNode {
        id: nucleus.id(),
        kind,
        coord: nucleus.centre_coord(),
        centroid: nucleus.centroid(),
        pixels: nucleus.coords().to_vec(),
        incident_edges: Vec::new(),
    }
}

fn assemble_from_spikes(
    island: &Island,
    table: &NeighborTable,
    nuclei: &NucleusSet,
    spikes: &[Spike],
    cap: usize,
) -> Result<PixelGraph, TopologyError> {
    let walker = Walker {
        island,
        table,
        nuclei,
        cap,
    };
    let mut graph = PixelGraph {
        connectivity: island.connectivity(),
        nodes: nuclei.iter().map(|n| node_for(n, table)).collect(),
        edges: Vec::new(),
    };

    let mut covered = vec![false; island.id_bound()];
    for nucleus in nuclei.iter() {
        for &p in nucleus.pixels() {
            covered[p] = true;
        }
    }

    // A lone pixel is a cycle of one through its own node.
    for node in &graph.nodes {
        if node.kind == NodeKind::Isolated {
            graph.edges.push(GraphEdge {
                id: graph.edges.len(),
                ends: EdgeEnds::Nodes {
                    start: node.id,
                    end: node.id,
                },
                pixels: vec![node.coord],
            });
        }
    }

    let by_key: HashMap<(PixelId, PixelId), usize> =
        spikes.iter().enumerate().map(|(i, s)| (s.key(), i)).collect();
    let mut consumed = vec![false; spikes.len()];

    for (i, &spike) in spikes.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;

        let trace = walker.trace(spike)?;
        let n = trace.chain.len();
        if let Some(&back) = by_key.get(&(trace.chain[n - 1], trace.chain[n - 2])) {
            consumed[back] = true;
        }
        for &p in &trace.chain {
            covered[p] = true;
        }
        graph.edges.push(GraphEdge {
            id: graph.edges.len(),
            ends: EdgeEnds::Nodes {
                start: spike.nucleus,
                end: trace.end,
            },
            pixels: walker.coords(&trace.chain),
        });
    }

    let mut leftover: Vec<(PixelCoord, PixelId)> = island
        .pixels()
        .filter(|&(id, _)| !covered[id])
        .map(|(id, c)| (c, id))
        .collect();
    leftover.sort_unstable();
    for (_, start) in leftover {
        if covered[start] {
            continue;
        }
        let chain = walker.trace_cycle(start)?;
        for &p in &chain {
            covered[p] = true;
        }
        graph.edges.push(GraphEdge {
            id: graph.edges.len(),
            ends: EdgeEnds::Cycle,
            pixels: walker.coords(&chain),
        });
    }

    for e in 0..graph.edges.len() {
        if let Some((start, end)) = graph.edges[e].ends.nodes() {
            graph.nodes[start].incident_edges.push(e);
            if end != start {
                graph.nodes[end].incident_edges.push(e);
            }
        }
    }

    Ok(graph)
}
