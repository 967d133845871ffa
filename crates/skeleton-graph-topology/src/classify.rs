//! Best-effort naming of nucleus shapes.
//!
//! A miss is not an error: the nucleus stays [`NucleusShape::Unclassified`]
//! and still becomes a valid node. Single-pixel patterns look at the
//! pixel's neighbors in the island; multi-pixel patterns look at adjacency
//! between the nucleus pixels only.
//!
//! Nucleus pixels of the multi-pixel patterns:
//!
//! ```text
//!  Y      FilledT   Cross    DoubleY
//!  .#     ###       .#.      .#..
//!  ##     .#.       ###      ##..
//!                   .#.      ..##
//!                            ..#.
//! ```

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use skeleton_graph_core::{Island, PixelCoord, PixelId};

/// Local shape of a nucleus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NucleusShape {
    /// One pixel with exactly one neighbor.
    Terminal,
    /// Five pixels, one of them with four orthogonal neighbors, or a single
    /// pixel with four orthogonal arms.
    Cross,
    /// One pixel with two diagonal and one orthogonal neighbor.
    NickedT,
    /// Four pixels, one of them with three orthogonal neighbors, or a single
    /// pixel with three orthogonal arms and no diagonal ones.
    FilledT,
    /// Three pixels forming a right angle.
    Y,
    /// Six pixels: two right-angle pivots sitting diagonally to each other.
    DoubleY,
    #[default]
    Unclassified,
}

impl NucleusShape {
    pub fn name(self) -> &'static str {
        match self {
            NucleusShape::Terminal => "terminal",
            NucleusShape::Cross => "cross",
            NucleusShape::NickedT => "nicked-t",
            NucleusShape::FilledT => "filled-t",
            NucleusShape::Y => "y",
            NucleusShape::DoubleY => "double-y",
            NucleusShape::Unclassified => "unclassified",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Classification {
    pub shape: NucleusShape,
    pub centre: PixelId,
}

pub(crate) fn centroid(coords: &[PixelCoord]) -> Point2<f32> {
    if coords.is_empty() {
        return Point2::origin();
    }
    let n = coords.len() as f32;
    let (sx, sy) = coords
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), c| (sx + c.x as f32, sy + c.y as f32));
    Point2::new(sx / n, sy / n)
}

/// Classify a nucleus given its pixel ids in discovery order.
pub(crate) fn classify(island: &Island, pixels: &[PixelId]) -> Classification {
    let coords: Vec<PixelCoord> = pixels.iter().filter_map(|&id| island.coord(id)).collect();
    debug_assert_eq!(coords.len(), pixels.len(), "nucleus holds a removed pixel");

    let hit = match pixels {
        [single] => single_pixel_shape(island, *single),
        _ => multi_pixel_shape(&coords).map(|(shape, i)| (shape, pixels[i])),
    };

    match hit {
        Some((shape, centre)) => Classification { shape, centre },
        None => Classification {
            shape: NucleusShape::Unclassified,
            centre: nearest_to_centroid(pixels, &coords),
        },
    }
}

fn single_pixel_shape(island: &Island, id: PixelId) -> Option<(NucleusShape, PixelId)> {
    let orth = island.orthogonal_neighbors(id).len();
    let diag = island.diagonal_neighbors(id).len();
    match (orth, diag) {
        (o, d) if o + d == 1 => Some((NucleusShape::Terminal, id)),
        (4, 0) => Some((NucleusShape::Cross, id)),
        (1, 2) => Some((NucleusShape::NickedT, id)),
        (3, 0) => Some((NucleusShape::FilledT, id)),
        _ => None,
    }
}

/// Returns the shape and the index of the centre pixel within `coords`.
fn multi_pixel_shape(coords: &[PixelCoord]) -> Option<(NucleusShape, usize)> {
    let orth: Vec<Vec<usize>> = (0..coords.len())
        .map(|i| {
            (0..coords.len())
                .filter(|&j| coords[i].is_orthogonal_neighbor(coords[j]))
                .collect()
        })
        .collect();

    match coords.len() {
        5 => unique(&orth, |o| o.len() == 4).map(|i| (NucleusShape::Cross, i)),
        4 => unique(&orth, |o| o.len() == 3).map(|i| (NucleusShape::FilledT, i)),
        3 => (0..3)
            .find(|&i| {
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);
                coords[i].is_orthogonal_neighbor(coords[j])
                    && coords[i].is_orthogonal_neighbor(coords[k])
                    && coords[j].is_diagonal_neighbor(coords[k])
            })
            .map(|i| (NucleusShape::Y, i)),
        6 => {
            let pivots: Vec<usize> = (0..coords.len())
                .filter(|&i| {
                    orth[i].len() == 2 && coords[orth[i][0]].is_diagonal_neighbor(coords[orth[i][1]])
                })
                .collect();
            match pivots.as_slice() {
                [a, b] if coords[*a].is_diagonal_neighbor(coords[*b]) => {
                    Some((NucleusShape::DoubleY, *a))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn unique(orth: &[Vec<usize>], pred: impl Fn(&Vec<usize>) -> bool) -> Option<usize> {
    let mut hits = orth.iter().enumerate().filter(|(_, o)| pred(o)).map(|(i, _)| i);
    let first = hits.next()?;
    hits.next().is_none().then_some(first)
}

fn nearest_to_centroid(pixels: &[PixelId], coords: &[PixelCoord]) -> PixelId {
    let c = centroid(coords);
    let mut best = 0;
    let mut best_d2 = f32::INFINITY;
    for (i, p) in coords.iter().enumerate() {
        let dx = p.x as f32 - c.x;
        let dy = p.y as f32 - c.y;
        let d2 = dx * dx + dy * dy;
        if d2 < best_d2 || (d2 == best_d2 && pixels[i] < pixels[best]) {
            best_d2 = d2;
            best = i;
        }
    }
    pixels.get(best).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use skeleton_graph_core::Connectivity;

    fn island(v: &[(i32, i32)], conn: Connectivity) -> Island {
        Island::from_coords(v.iter().map(|&p| PixelCoord::from(p)), conn)
    }

    fn ids(island: &Island, v: &[(i32, i32)]) -> Vec<PixelId> {
        v.iter()
            .map(|&p| island.id_of(PixelCoord::from(p)).expect("pixel in island"))
            .collect()
    }

    #[test]
    fn terminal_and_nicked_t_single_pixels() {
        let isl = island(
            &[(0, 0), (0, 1), (0, 2), (-1, -1), (-2, -2), (1, -1), (2, -2)],
            Connectivity::C8,
        );
        let c = classify(&isl, &ids(&isl, &[(0, 0)]));
        assert_eq!(c.shape, NucleusShape::NickedT);
        let c = classify(&isl, &ids(&isl, &[(0, 2)]));
        assert_eq!(c.shape, NucleusShape::Terminal);
    }

    #[test]
    fn cross_and_filled_t_pick_the_hub() {
        let plus = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];
        let isl = island(&plus, Connectivity::C8);
        let c = classify(&isl, &ids(&isl, &[(1, 0), (0, 0), (-1, 0), (0, 1), (0, -1)]));
        assert_eq!(c.shape, NucleusShape::Cross);
        assert_eq!(isl.coord(c.centre), Some(PixelCoord::new(0, 0)));

        let tee = [(0, 0), (1, 0), (-1, 0), (0, 1)];
        let isl = island(&tee, Connectivity::C8);
        let c = classify(&isl, &ids(&isl, &[(-1, 0), (0, 1), (0, 0), (1, 0)]));
        assert_eq!(c.shape, NucleusShape::FilledT);
        assert_eq!(isl.coord(c.centre), Some(PixelCoord::new(0, 0)));
    }

    #[test]
    fn lone_hub_pixels_under_c4() {
        let tee = [(0, 0), (1, 0), (2, 0), (-1, 0), (-2, 0), (0, 1), (0, 2)];
        let isl = island(&tee, Connectivity::C4);
        let c = classify(&isl, &ids(&isl, &[(0, 0)]));
        assert_eq!(c.shape, NucleusShape::FilledT);
        assert_eq!(isl.coord(c.centre), Some(PixelCoord::new(0, 0)));

        let plus = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];
        let isl = island(&plus, Connectivity::C4);
        assert_eq!(classify(&isl, &ids(&isl, &[(0, 0)])).shape, NucleusShape::Cross);

        // Two arms only: a bend, not a hub.
        let isl = island(&[(0, 0), (1, 0), (0, 1)], Connectivity::C4);
        assert_eq!(
            classify(&isl, &ids(&isl, &[(0, 0)])).shape,
            NucleusShape::Unclassified
        );
    }

    #[test]
    fn right_angle_is_y() {
        let isl = island(&[(0, 0), (0, -1), (-1, 0)], Connectivity::C8);
        let c = classify(&isl, &ids(&isl, &[(0, -1), (-1, 0), (0, 0)]));
        assert_eq!(c.shape, NucleusShape::Y);
        assert_eq!(isl.coord(c.centre), Some(PixelCoord::new(0, 0)));

        let isl = island(&[(0, 0), (1, 0), (2, 0)], Connectivity::C8);
        let c = classify(&isl, &ids(&isl, &[(0, 0), (1, 0), (2, 0)]));
        assert_eq!(c.shape, NucleusShape::Unclassified);
        assert_eq!(isl.coord(c.centre), Some(PixelCoord::new(1, 0)));
    }

    #[test]
    fn double_y_needs_diagonal_pivots() {
        let pts = [(0, 0), (-1, 0), (0, -1), (1, 1), (2, 1), (1, 2)];
        let isl = island(&pts, Connectivity::C8);
        let c = classify(&isl, &ids(&isl, &pts));
        assert_eq!(c.shape, NucleusShape::DoubleY);
        assert_eq!(isl.coord(c.centre), Some(PixelCoord::new(0, 0)));

        let block = [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)];
        let isl = island(&block, Connectivity::C8);
        assert_eq!(
            classify(&isl, &ids(&isl, &block)).shape,
            NucleusShape::Unclassified
        );
    }

    #[test]
    fn centroid_of_pixels() {
        let c = centroid(&[PixelCoord::new(0, 0), PixelCoord::new(2, 0), PixelCoord::new(1, 3)]);
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 1.0);
    }
}
