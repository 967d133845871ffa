//! JSON configuration and report helpers for graph extraction.

use serde::{Deserialize, Serialize};
use skeleton_graph_core::{CleanupReport, IslandOrigin};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::graph::PixelGraph;
use crate::params::SkeletonGraphParams;
use crate::pipeline::IslandGraph;

#[derive(thiserror::Error, Debug)]
pub enum GraphIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for an extraction run over one skeleton image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExtractConfig {
    pub input_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub params: SkeletonGraphParams,
}

impl GraphExtractConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GraphIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GraphIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("skeleton_graph_report.json"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IslandReport {
    #[serde(default)]
    pub origin: Option<IslandOrigin>,
    pub pixel_count: usize,
    pub cleanup: CleanupReport,
    #[serde(default)]
    pub graph: Option<PixelGraph>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<&IslandGraph> for IslandReport {
    fn from(g: &IslandGraph) -> Self {
        let (graph, error) = match &g.graph {
            Ok(graph) => (Some(graph.clone()), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            origin: g.origin,
            pixel_count: g.pixel_count,
            cleanup: g.cleanup,
            graph,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    pub input_path: String,
    pub config_path: String,
    pub params: SkeletonGraphParams,
    pub width: usize,
    pub height: usize,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_failed: usize,
    pub islands: Vec<IslandReport>,
}

impl GraphReport {
    /// Build an empty report for a run over a `width x height` image.
    pub fn new(cfg: &GraphExtractConfig, config_path: &Path, width: usize, height: usize) -> Self {
        Self {
            input_path: cfg.input_path.clone(),
            config_path: config_path.to_string_lossy().into_owned(),
            params: cfg.params.clone(),
            width,
            height,
            num_nodes: 0,
            num_edges: 0,
            num_failed: 0,
            islands: Vec::new(),
        }
    }

    /// Append island results and update the totals.
    pub fn add_islands(&mut self, islands: &[IslandGraph]) {
        for g in islands {
            match &g.graph {
                Ok(graph) => {
                    self.num_nodes += graph.nodes.len();
                    self.num_edges += graph.edges.len();
                }
                Err(_) => self.num_failed += 1,
            }
            self.islands.push(IslandReport::from(g));
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GraphIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), GraphIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
