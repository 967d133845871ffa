use skeleton_graph_core::PixelCoord;

/// Fatal problems with the skeleton topology of one island.
///
/// Each of these means the input violates the "thin, branch points isolated"
/// precondition. Processing of the affected island stops; other islands are
/// unaffected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A spike pixel outside every nucleus has more than two neighbors.
    ///
    /// Nucleus detection absorbs every such pixel, so this is only reached
    /// when the nucleus set was built from a different pixel set than the
    /// island it is used with.
    #[error("spike {spike} has {degree} neighbors; skeleton is not thin enough")]
    ThickSpike { spike: PixelCoord, degree: usize },
    #[error("edge trace starting at {start} did not reach a nucleus within {cap} steps")]
    TraceCapExceeded { start: PixelCoord, cap: usize },
    /// A chain pixel outside every nucleus does not have exactly two
    /// neighbors.
    ///
    /// Like [`TopologyError::ThickSpike`], only reached when the nuclei and
    /// the neighbor table disagree about the island's pixels.
    #[error("chain pixel {pixel} has {degree} neighbors but belongs to no nucleus")]
    OrphanBoundary { pixel: PixelCoord, degree: usize },
    #[error("nuclei were built for island generation {built}, island is at {current}")]
    StaleNuclei { built: u64, current: u64 },
}
