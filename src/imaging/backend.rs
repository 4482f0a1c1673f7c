//! Image primitive backend trait and its error type.
//!
//! The [`ImageBackend`] trait is the full set of pixel operations the resize
//! pipeline needs: decode, load, allocate/paint a canvas, area scale,
//! composite, crop, sharpen and JPEG encode. The pipeline never touches
//! pixels itself, so everything above this trait can be tested against the
//! recording mock in [`tests`].
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::geometry::{Dimensions, Rect};
use super::params::{Background, Quality};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel primitives consumed by the resize pipeline.
///
/// `Sync` so one backend can serve a rayon pool. Images are owned by the
/// caller for the duration of one resize; nothing is shared across calls.
pub trait ImageBackend: Sync {
    type Image: Send;

    /// Decode an encoded image held in memory.
    fn decode(&self, data: &[u8]) -> Result<Self::Image, BackendError>;

    /// Read and decode an image from disk.
    fn load(&self, path: &Path) -> Result<Self::Image, BackendError>;

    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Allocate a blank canvas. Contents are unspecified until painted.
    ///
    /// Fails instead of aborting when the buffer cannot be allocated.
    fn canvas(&self, size: Dimensions) -> Result<Self::Image, BackendError>;

    fn paint_solid(&self, canvas: &mut Self::Image, color: Background);

    /// Area-interpolated resize to exactly `size`.
    fn area_scale(&self, image: &Self::Image, size: Dimensions)
    -> Result<Self::Image, BackendError>;

    /// Copy `image` onto `canvas` with its top-left corner at `(x, y)`.
    fn composite_at(&self, canvas: &mut Self::Image, image: &Self::Image, x: u32, y: u32);

    /// Extract `rect`, which must lie within the image.
    fn crop(&self, image: &Self::Image, rect: Rect) -> Self::Image;

    /// Unsharp mask. Identity when `amount` or `radius` is not positive.
    /// Radii above [`Sharpening::MAX_RADIUS`](super::params::Sharpening::MAX_RADIUS)
    /// are clamped to it.
    fn sharpen(&self, image: Self::Image, amount: i32, radius: f64) -> Self::Image;

    fn encode_jpeg(&self, image: &Self::Image, quality: Quality) -> Result<Vec<u8>, BackendError>;
}
