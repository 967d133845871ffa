use serde::{Deserialize, Serialize};
use skeleton_graph_core::{CleanupParams, Connectivity};

/// Parameters of the skeleton -> graph pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonGraphParams {
    /// Pixel neighborhood used for flood fill and every later stage.
    pub connectivity: Connectivity,

    /// Repair passes run on each island before nucleus detection.
    pub cleanup: CleanupParams,

    /// Islands with fewer pixels (after flood fill) are dropped.
    pub min_island_size: usize,

    /// Process islands largest first instead of in discovery order.
    pub sort_by_size: bool,

    /// Upper bound on the length of one edge walk. `None` uses the island
    /// size plus one.
    pub max_trace_steps: Option<usize>,
}

impl Default for SkeletonGraphParams {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::C8,
            cleanup: CleanupParams::default(),
            min_island_size: 1,
            sort_by_size: false,
            max_trace_steps: None,
        }
    }
}

impl SkeletonGraphParams {
    pub fn with_connectivity(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: SkeletonGraphParams =
            serde_json::from_str(r#"{ "connectivity": "C4", "min_island_size": 3 }"#)
                .expect("parse");
        assert_eq!(params.connectivity, Connectivity::C4);
        assert_eq!(params.min_island_size, 3);
        assert_eq!(params.cleanup, CleanupParams::default());
        assert_eq!(params.max_trace_steps, None);
    }
}
