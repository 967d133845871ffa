//! Island arena: one connected pixel component plus its coordinate index.
//!
//! Pixels live in a slot arena and are referenced by [`PixelId`]. Removal
//! leaves a tombstone so ids handed out earlier stay valid for the lifetime
//! of the island. Neighbor queries are answered from the coordinate index on
//! every call; read-only stages take a [`NeighborTable`] snapshot instead,
//! which is tied to the island generation at the time it was built.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::connectivity::{Connectivity, PixelBounds, PixelCoord};

/// Index of a pixel inside its island arena.
pub type PixelId = usize;

/// Where an island came from. Used for auditing and reports only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IslandOrigin {
    /// Identifier of the flood-fill run that produced the island.
    pub fill_id: u64,
    /// Discovery position of the island within that run.
    pub ordinal: usize,
}

#[derive(Clone, Debug)]
pub struct Island {
    connectivity: Connectivity,
    slots: Vec<Option<PixelCoord>>,
    index: HashMap<PixelCoord, PixelId>,
    generation: u64,
    origin: Option<IslandOrigin>,
}

impl Island {
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            slots: Vec::new(),
            index: HashMap::new(),
            generation: 0,
            origin: None,
        }
    }

    /// Build an island from explicit coordinates. Duplicates are ignored.
    ///
    /// No connectivity check is made; use the flood fill to split arbitrary
    /// coordinate sets into connected islands.
    pub fn from_coords<I>(coords: I, connectivity: Connectivity) -> Self
    where
        I: IntoIterator<Item = PixelCoord>,
    {
        let mut island = Self::new(connectivity);
        for c in coords {
            island.insert(c);
        }
        island.generation = 0;
        island
    }

    pub(crate) fn with_origin(mut self, origin: IslandOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Mutation counter. Bumped by every successful insert or remove.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn origin(&self) -> Option<IslandOrigin> {
        self.origin
    }

    /// Number of live pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Upper bound (exclusive) of every id handed out so far.
    ///
    /// Per-pixel side tables are sized with this value.
    #[inline]
    pub fn id_bound(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn contains(&self, c: PixelCoord) -> bool {
        self.index.contains_key(&c)
    }

    #[inline]
    pub fn id_of(&self, c: PixelCoord) -> Option<PixelId> {
        self.index.get(&c).copied()
    }

    /// Coordinate of a live pixel.
    #[inline]
    pub fn coord(&self, id: PixelId) -> Option<PixelCoord> {
        self.slots.get(id).copied().flatten()
    }

    #[inline]
    pub fn is_live(&self, id: PixelId) -> bool {
        self.coord(id).is_some()
    }

    /// Live pixel ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = PixelId> + '_ {
        self.pixels().map(|(id, _)| id)
    }

    /// Live pixel coordinates in arena order.
    pub fn coords(&self) -> impl Iterator<Item = PixelCoord> + '_ {
        self.slots.iter().filter_map(|s| *s)
    }

    /// Live `(id, coord)` pairs in arena order.
    pub fn pixels(&self) -> impl Iterator<Item = (PixelId, PixelCoord)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, s)| s.map(|c| (id, c)))
    }

    /// Coordinates sorted row-major.
    pub fn sorted_coords(&self) -> Vec<PixelCoord> {
        let mut out: Vec<PixelCoord> = self.coords().collect();
        out.sort_unstable();
        out
    }

    /// Add a pixel, returning its id. Existing pixels keep their id.
    pub fn insert(&mut self, c: PixelCoord) -> PixelId {
        if let Some(&id) = self.index.get(&c) {
            return id;
        }
        let id = self.slots.len();
        self.slots.push(Some(c));
        self.index.insert(c, id);
        self.generation += 1;
        id
    }

    /// Remove a pixel, returning the id it had.
    pub fn remove(&mut self, c: PixelCoord) -> Option<PixelId> {
        let id = self.index.remove(&c)?;
        self.slots[id] = None;
        self.generation += 1;
        Some(id)
    }

    /// Neighbors of `id` under the island connectivity, orthogonal first.
    pub fn neighbors(&self, id: PixelId) -> Vec<PixelId> {
        let Some(c) = self.coord(id) else {
            return Vec::new();
        };
        self.connectivity
            .offsets()
            .iter()
            .filter_map(|&(dx, dy)| self.id_of(c.offset(dx, dy)))
            .collect()
    }

    #[inline]
    pub fn degree(&self, id: PixelId) -> usize {
        self.neighbors(id).len()
    }

    /// Neighbors that differ by one step in x or in y.
    pub fn orthogonal_neighbors(&self, id: PixelId) -> Vec<PixelId> {
        self.neighbors_where(id, PixelCoord::is_orthogonal_neighbor)
    }

    /// Neighbors that differ by one step in both x and y.
    ///
    /// Always empty under [`Connectivity::C4`].
    pub fn diagonal_neighbors(&self, id: PixelId) -> Vec<PixelId> {
        self.neighbors_where(id, PixelCoord::is_diagonal_neighbor)
    }

    fn neighbors_where(&self, id: PixelId, pred: fn(PixelCoord, PixelCoord) -> bool) -> Vec<PixelId> {
        let Some(c) = self.coord(id) else {
            return Vec::new();
        };
        self.neighbors(id)
            .into_iter()
            .filter(|&n| self.coord(n).is_some_and(|nc| pred(c, nc)))
            .collect()
    }

    pub fn bounds(&self) -> Option<PixelBounds> {
        PixelBounds::from_coords(self.coords())
    }

    /// Snapshot every neighbor list for the current generation.
    pub fn neighbor_table(&self) -> NeighborTable {
        let lists = (0..self.slots.len()).map(|id| self.neighbors(id)).collect();
        NeighborTable {
            generation: self.generation,
            lists,
        }
    }

    /// Copy of this island with tombstones dropped and ids renumbered.
    pub fn compacted(&self) -> Island {
        let mut out = Island::from_coords(self.coords(), self.connectivity);
        out.origin = self.origin;
        out
    }
}

/// Neighbor lists of every pixel, frozen at one island generation.
#[derive(Clone, Debug)]
pub struct NeighborTable {
    generation: u64,
    lists: Vec<Vec<PixelId>>,
}

impl NeighborTable {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The island has not been mutated since this table was built.
    #[inline]
    pub fn is_current(&self, island: &Island) -> bool {
        self.generation == island.generation() && self.lists.len() == island.id_bound()
    }

    #[inline]
    pub fn neighbors(&self, id: PixelId) -> &[PixelId] {
        self.lists.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn degree(&self, id: PixelId) -> usize {
        self.neighbors(id).len()
    }
}
