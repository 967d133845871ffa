use crate::core::{BinaryImageView, FloodFillError};
use crate::topology::{IslandGraph, SkeletonGraphBuilder, SkeletonGraphParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    FloodFill(#[from] FloodFillError),
}

/// View an `image::GrayImage` as a bilevel skeleton: non-zero is foreground.
///
/// No thresholding happens; binarize and thin before calling.
pub fn binary_from_gray(img: &::image::GrayImage) -> BinaryImageView<'_> {
    BinaryImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Run the full pipeline on a skeleton image: flood fill -> cleanup -> graph.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn graphs_from_gray(
    img: &::image::GrayImage,
    params: &SkeletonGraphParams,
) -> Result<Vec<IslandGraph>, DetectError> {
    let builder = SkeletonGraphBuilder::new(params.clone());
    let out = builder.build_from_view(&binary_from_gray(img))?;
    log::debug!(
        "extracted {} island graphs from {}x{} image",
        out.len(),
        img.width(),
        img.height()
    );
    Ok(out)
}

/// Build an `image::GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

/// Run the pipeline on a raw row-major skeleton buffer.
pub fn graphs_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: &SkeletonGraphParams,
) -> Result<Vec<IslandGraph>, DetectError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    graphs_from_gray(&img, params)
}
