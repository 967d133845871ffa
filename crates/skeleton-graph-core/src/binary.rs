//! Bilevel pixel grids handed over by the thinning stage.
//!
//! Any non-zero byte is foreground. No thresholding happens here.

#[derive(Clone, Copy, Debug)]
pub struct BinaryImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl<'a> BinaryImageView<'a> {
    /// Foreground test; out-of-range coordinates are background.
    #[inline]
    pub fn is_set(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width + x as usize] != 0
    }

    #[inline]
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

impl BinaryImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Parse an ASCII sketch: `#`, `x`, `+` and `1` are foreground, anything
    /// else is background. Short rows are padded with background.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut img = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if matches!(ch, '#' | 'x' | '+' | '1') {
                    img.data[y * width + x] = 255;
                }
            }
        }
        img
    }

    #[inline]
    pub fn view(&self) -> BinaryImageView<'_> {
        BinaryImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = if on { 255 } else { 0 };
        }
    }
}
