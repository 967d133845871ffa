//! Connected-component labelling of foreground pixels into islands.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::binary::BinaryImageView;
use crate::connectivity::{Connectivity, PixelCoord};
use crate::island::{Island, IslandOrigin};

#[cfg(feature = "tracing")]
use tracing::instrument;

static NEXT_FILL_ID: AtomicU64 = AtomicU64::new(1);

/// Errors returned by the grid flood fill.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FloodFillError {
    #[error("pixel domain {width}x{height} is too large")]
    DomainTooLarge { width: usize, height: usize },
    #[error("binary buffer length mismatch (expected {expected} bytes, got {got})")]
    BufferSizeMismatch { expected: usize, got: usize },
}

/// Islands discovered by one flood-fill run.
#[derive(Clone, Debug)]
pub struct IslandList {
    fill_id: u64,
    connectivity: Connectivity,
    islands: Vec<Island>,
}

impl IslandList {
    fn new(connectivity: Connectivity) -> Self {
        Self {
            fill_id: NEXT_FILL_ID.fetch_add(1, Ordering::Relaxed),
            connectivity,
            islands: Vec::new(),
        }
    }

    fn push(&mut self, coords: Vec<PixelCoord>) {
        let origin = IslandOrigin {
            fill_id: self.fill_id,
            ordinal: self.islands.len(),
        };
        self.islands
            .push(Island::from_coords(coords, self.connectivity).with_origin(origin));
    }

    #[inline]
    pub fn fill_id(&self) -> u64 {
        self.fill_id
    }

    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.islands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&Island> {
        self.islands.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Island> {
        self.islands.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Island> {
        self.islands.iter_mut()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Island] {
        &self.islands
    }

    pub fn total_pixels(&self) -> usize {
        self.islands.iter().map(Island::len).sum()
    }

    /// Largest islands first. Equal sizes keep discovery order.
    pub fn sort_by_size_desc(&mut self) {
        self.islands.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    /// Drop islands with fewer than `min_size` pixels; returns how many went.
    pub fn retain_min_size(&mut self, min_size: usize) -> usize {
        let before = self.islands.len();
        self.islands.retain(|island| island.len() >= min_size);
        before - self.islands.len()
    }

    pub fn into_vec(self) -> Vec<Island> {
        self.islands
    }
}

impl IntoIterator for IslandList {
    type Item = Island;
    type IntoIter = std::vec::IntoIter<Island>;

    fn into_iter(self) -> Self::IntoIter {
        self.islands.into_iter()
    }
}

impl<'a> IntoIterator for &'a IslandList {
    type Item = &'a Island;
    type IntoIter = std::slice::Iter<'a, Island>;

    fn into_iter(self) -> Self::IntoIter {
        self.islands.iter()
    }
}

/// Label the foreground of a binary view.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(view), fields(width = view.width, height = view.height))
)]
pub fn flood_fill_view(
    view: &BinaryImageView<'_>,
    connectivity: Connectivity,
) -> Result<IslandList, FloodFillError> {
    let expected = view
        .width
        .checked_mul(view.height)
        .ok_or(FloodFillError::DomainTooLarge {
            width: view.width,
            height: view.height,
        })?;
    if view.data.len() != expected {
        return Err(FloodFillError::BufferSizeMismatch {
            expected,
            got: view.data.len(),
        });
    }
    flood_fill_predicate(view.width, view.height, connectivity, |x, y| {
        view.data[y * view.width + x] != 0
    })
}

/// Label the foreground of a `width x height` domain given by `is_set`.
///
/// Islands come out in row-major order of their first pixel.
pub fn flood_fill_predicate<F>(
    width: usize,
    height: usize,
    connectivity: Connectivity,
    is_set: F,
) -> Result<IslandList, FloodFillError>
where
    F: Fn(usize, usize) -> bool,
{
    let too_large = FloodFillError::DomainTooLarge { width, height };
    let n = width.checked_mul(height).ok_or(too_large.clone())?;
    if width > i32::MAX as usize || height > i32::MAX as usize {
        return Err(too_large);
    }

    let mut out = IslandList::new(connectivity);
    if n == 0 {
        return Ok(out);
    }

    let mut fg = vec![false; n];
    for y in 0..height {
        for x in 0..width {
            fg[y * width + x] = is_set(x, y);
        }
    }

    let mut seen = vec![false; n];
    let mut stack = Vec::new();

    for start in 0..n {
        if !fg[start] || seen[start] {
            continue;
        }

        let mut component = Vec::new();
        seen[start] = true;
        stack.push(start);

        while let Some(p) = stack.pop() {
            let (x, y) = ((p % width) as i32, (p / width) as i32);
            component.push(PixelCoord::new(x, y));
            for &(dx, dy) in connectivity.offsets() {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                    continue;
                }
                let q = ny as usize * width + nx as usize;
                if fg[q] && !seen[q] {
                    seen[q] = true;
                    stack.push(q);
                }
            }
        }

        out.push(component);
    }

    debug!(
        "flood fill {}x{}: {} islands, {} pixels",
        width,
        height,
        out.len(),
        out.total_pixels()
    );
    Ok(out)
}

/// Label an explicit set of foreground coordinates.
///
/// Islands come out in the order their first pixel appears in `coords`.
/// Duplicate coordinates are tolerated.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(coords), fields(num_coords = coords.len()))
)]
pub fn flood_fill_coords(coords: &[PixelCoord], connectivity: Connectivity) -> IslandList {
    let fg: HashSet<PixelCoord> = coords.iter().copied().collect();
    let mut seen: HashSet<PixelCoord> = HashSet::with_capacity(fg.len());
    let mut out = IslandList::new(connectivity);
    let mut stack = Vec::new();

    for &start in coords {
        if !seen.insert(start) {
            continue;
        }

        let mut component = Vec::new();
        stack.push(start);

        while let Some(c) = stack.pop() {
            component.push(c);
            for &(dx, dy) in connectivity.offsets() {
                let nb = c.offset(dx, dy);
                if fg.contains(&nb) && seen.insert(nb) {
                    stack.push(nb);
                }
            }
        }

        out.push(component);
    }

    debug!(
        "flood fill of {} coords: {} islands",
        coords.len(),
        out.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryImage;

    #[test]
    fn empty_input_is_not_an_error() {
        let img = BinaryImage::new(4, 3);
        let islands = flood_fill_view(&img.view(), Connectivity::C8).expect("fill");
        assert!(islands.is_empty());

        let islands = flood_fill_coords(&[], Connectivity::C4);
        assert!(islands.is_empty());
    }

    #[test]
    fn diagonal_pixels_split_under_c4() {
        let img = BinaryImage::from_ascii(&["#...", ".#..", "...#"]);
        let c8 = flood_fill_view(&img.view(), Connectivity::C8).expect("fill");
        let c4 = flood_fill_view(&img.view(), Connectivity::C4).expect("fill");
        assert_eq!(c8.len(), 2);
        assert_eq!(c4.len(), 3);
        assert_eq!(c8.get(0).map(Island::len), Some(2));
        assert!(c8.iter().all(|i| i.connectivity() == Connectivity::C8));
    }

    #[test]
    fn islands_are_tagged_with_origin() {
        let img = BinaryImage::from_ascii(&["##..#", ".....", "###.."]);
        let islands = flood_fill_view(&img.view(), Connectivity::C8).expect("fill");
        assert_eq!(islands.len(), 3);
        for (i, island) in islands.iter().enumerate() {
            let origin = island.origin().expect("origin");
            assert_eq!(origin.fill_id, islands.fill_id());
            assert_eq!(origin.ordinal, i);
        }
    }

    #[test]
    fn sort_and_filter_by_size() {
        let img = BinaryImage::from_ascii(&["#.###", ".....", "##..."]);
        let mut islands = flood_fill_view(&img.view(), Connectivity::C8).expect("fill");
        islands.sort_by_size_desc();
        let sizes: Vec<usize> = islands.iter().map(Island::len).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
        assert_eq!(islands.retain_min_size(2), 1);
        assert_eq!(islands.total_pixels(), 5);
    }

    #[test]
    fn buffer_length_is_validated() {
        let data = [0u8; 5];
        let view = BinaryImageView {
            width: 3,
            height: 2,
            data: &data,
        };
        assert_eq!(
            flood_fill_view(&view, Connectivity::C8).unwrap_err(),
            FloodFillError::BufferSizeMismatch {
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn unbounded_domain_is_rejected() {
        let err = flood_fill_predicate(usize::MAX, 2, Connectivity::C8, |_, _| false).unwrap_err();
        assert!(matches!(err, FloodFillError::DomainTooLarge { .. }));
    }

    #[test]
    fn coordinate_fill_clones_pixels_per_island() {
        let coords = [
            PixelCoord::new(10, 10),
            PixelCoord::new(11, 11),
            PixelCoord::new(-5, 0),
            PixelCoord::new(10, 10),
        ];
        let mut islands = flood_fill_coords(&coords, Connectivity::C8);
        assert_eq!(islands.len(), 2);
        assert_eq!(islands.get(0).map(Island::len), Some(2));

        for island in islands.iter_mut() {
            let first = island.coords().next().expect("non-empty");
            island.remove(first);
        }
        assert_eq!(coords.len(), 4);
        assert_eq!(islands.total_pixels(), 1);
    }
}
