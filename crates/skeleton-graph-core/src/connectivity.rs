//! Pixel coordinates and the 4/8-neighborhood geometry shared by every stage.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Offsets of the eight neighbors, orthogonal ones first.
const OFFSETS_C8: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// Which pixels count as neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connectivity {
    /// Orthogonal neighbors only (±1 in x or y).
    C4,
    /// Orthogonal plus the four diagonal neighbors.
    #[default]
    C8,
}

impl Connectivity {
    /// Neighbor offsets for this mode. Orthogonal offsets always come first.
    #[inline]
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::C4 => &OFFSETS_C8[..4],
            Connectivity::C8 => &OFFSETS_C8,
        }
    }

    /// Whether `a` and `b` are neighbors under this mode.
    #[inline]
    pub fn are_neighbors(self, a: PixelCoord, b: PixelCoord) -> bool {
        match self {
            Connectivity::C4 => a.is_orthogonal_neighbor(b),
            Connectivity::C8 => a.is_orthogonal_neighbor(b) || a.is_diagonal_neighbor(b),
        }
    }
}

/// Integer pixel coordinate.
///
/// Ordering is row-major: by `y`, then by `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
}

impl PixelCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    #[inline]
    fn delta(self, other: Self) -> (i32, i32) {
        ((other.x - self.x).abs(), (other.y - self.y).abs())
    }

    /// `other` differs by exactly one step in x or in y.
    #[inline]
    pub fn is_orthogonal_neighbor(self, other: Self) -> bool {
        matches!(self.delta(other), (1, 0) | (0, 1))
    }

    /// `other` differs by exactly one step in both x and y.
    #[inline]
    pub fn is_diagonal_neighbor(self, other: Self) -> bool {
        self.delta(other) == (1, 1)
    }

    /// `other` is a chess knight's move away: |dx| + |dy| = 3, ||dx| - |dy|| = 1.
    #[inline]
    pub fn is_knights_move(self, other: Self) -> bool {
        let (dx, dy) = self.delta(other);
        dx + dy == 3 && (dx - dy).abs() == 1
    }

    /// Squared euclidean distance.
    #[inline]
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = (other.x - self.x) as i64;
        let dy = (other.y - self.y) as i64;
        dx * dx + dy * dy
    }

    /// The four orthogonal neighbor coordinates.
    pub fn orthogonal_ring(self) -> [PixelCoord; 4] {
        [
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(0, -1),
        ]
    }
}

impl Ord for PixelCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for PixelCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PixelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for PixelCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Inclusive axis-aligned bounds of a pixel set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub min: PixelCoord,
    pub max: PixelCoord,
}

impl PixelBounds {
    pub fn from_coords<I: IntoIterator<Item = PixelCoord>>(coords: I) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for c in iter {
            bounds.min.x = bounds.min.x.min(c.x);
            bounds.min.y = bounds.min.y.min(c.y);
            bounds.max.x = bounds.max.x.max(c.x);
            bounds.max.y = bounds.max.y.max(c.y);
        }
        Some(bounds)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        (self.max.x - self.min.x) as u32 + 1
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.max.y - self.min.y) as u32 + 1
    }

    #[inline]
    pub fn contains(&self, c: PixelCoord) -> bool {
        c.x >= self.min.x && c.x <= self.max.x && c.y >= self.min.y && c.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_predicates() {
        let c = PixelCoord::new(0, 0);
        assert!(c.is_orthogonal_neighbor(PixelCoord::new(0, -1)));
        assert!(!c.is_orthogonal_neighbor(PixelCoord::new(1, 1)));
        assert!(c.is_diagonal_neighbor(PixelCoord::new(-1, 1)));
        assert!(!c.is_diagonal_neighbor(c));
        assert!(c.is_knights_move(PixelCoord::new(1, 2)));
        assert!(c.is_knights_move(PixelCoord::new(-2, 1)));
        assert!(!c.is_knights_move(PixelCoord::new(3, 0)));
        assert!(!c.is_knights_move(PixelCoord::new(2, 2)));
    }

    #[test]
    fn c4_offsets_are_prefix_of_c8() {
        assert_eq!(Connectivity::C4.offsets().len(), 4);
        assert_eq!(Connectivity::C8.offsets().len(), 8);
        assert_eq!(Connectivity::C4.offsets(), &Connectivity::C8.offsets()[..4]);
        for &(dx, dy) in Connectivity::C4.offsets() {
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        let a = PixelCoord::new(3, 4);
        for conn in [Connectivity::C4, Connectivity::C8] {
            for &(dx, dy) in Connectivity::C8.offsets() {
                let b = a.offset(dx, dy);
                assert_eq!(conn.are_neighbors(a, b), conn.are_neighbors(b, a));
            }
        }
    }

    #[test]
    fn row_major_ordering() {
        let mut v = vec![
            PixelCoord::new(2, 1),
            PixelCoord::new(0, 2),
            PixelCoord::new(5, 0),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                PixelCoord::new(5, 0),
                PixelCoord::new(2, 1),
                PixelCoord::new(0, 2)
            ]
        );
    }

    #[test]
    fn bounds_cover_all_coords() {
        let b = PixelBounds::from_coords([
            PixelCoord::new(-1, 3),
            PixelCoord::new(4, 0),
            PixelCoord::new(2, 2),
        ])
        .expect("non-empty");
        assert_eq!(b.min, PixelCoord::new(-1, 0));
        assert_eq!(b.max, PixelCoord::new(4, 3));
        assert_eq!(b.width(), 6);
        assert_eq!(b.height(), 4);
        assert!(PixelBounds::from_coords(std::iter::empty()).is_none());
    }
}
