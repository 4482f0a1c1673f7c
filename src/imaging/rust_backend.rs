//! Pure Rust image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP, TIFF, BMP) | `image::ImageReader` with format sniffing |
//! | Area scale | `fast_image_resize` box convolution (bilinear when enlarging) |
//! | Paint / composite | `image::RgbImage` pixel access, `imageops::replace` |
//! | Crop | `imageops::crop_imm` |
//! | Sharpen | `imageops::blur` + weighted difference (unsharp mask) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! All images are handled as 8-bit RGB. Alpha is discarded on decode.
//! Canvas and scale buffers above [`Dimensions::MAX_PIXELS`] are refused
//! with [`BackendError::ProcessingFailed`] rather than allocated.

use super::backend::{BackendError, ImageBackend};
use super::geometry::{Dimensions, Rect};
use super::params::{Background, Quality, Sharpening};
use fast_image_resize::images::{Image as ResizeBuffer, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, Rgb, RgbImage, imageops};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions we try to decode, filtered at startup to those whose decoder
/// is compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True if `path` has one of the [`supported_input_extensions`].
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend using the `image` and `fast_image_resize` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Refuse buffers the process could not reasonably allocate.
fn check_allocation(size: Dimensions) -> Result<(), BackendError> {
    if size.exceeds_pixel_limit() {
        return Err(BackendError::ProcessingFailed(format!(
            "{size} buffer exceeds the {} pixel limit",
            Dimensions::MAX_PIXELS
        )));
    }
    Ok(())
}

fn decode_reader<R: std::io::BufRead + std::io::Seek>(
    reader: ImageReader<R>,
    origin: &str,
) -> Result<RgbImage, BackendError> {
    let image = reader
        .decode()
        .map_err(|e| BackendError::Decode(format!("{origin}: {e}")))?
        .to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(BackendError::Decode(format!("{origin}: image has no pixels")));
    }
    Ok(image)
}

impl ImageBackend for RustBackend {
    type Image = RgbImage;

    fn decode(&self, data: &[u8]) -> Result<RgbImage, BackendError> {
        if data.is_empty() {
            return Err(BackendError::Decode("image data is empty".to_string()));
        }
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        decode_reader(reader, "in-memory image")
    }

    fn load(&self, path: &Path) -> Result<RgbImage, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        decode_reader(reader, &path.display().to_string())
    }

    fn dimensions(&self, image: &RgbImage) -> Dimensions {
        Dimensions::new(image.width(), image.height())
    }

    fn canvas(&self, size: Dimensions) -> Result<RgbImage, BackendError> {
        check_allocation(size)?;
        Ok(RgbImage::new(size.width, size.height))
    }

    fn paint_solid(&self, canvas: &mut RgbImage, color: Background) {
        let fill = Rgb(color.rgb());
        for pixel in canvas.pixels_mut() {
            *pixel = fill;
        }
    }

    fn area_scale(&self, image: &RgbImage, size: Dimensions) -> Result<RgbImage, BackendError> {
        let source = self.dimensions(image);
        if size == source {
            return Ok(image.clone());
        }
        check_allocation(size)?;
        if size.is_empty() || source.is_empty() {
            return Ok(RgbImage::new(size.width, size.height));
        }

        // Box convolution averages every covered source pixel, which is area
        // interpolation when shrinking. It degenerates to nearest neighbour
        // when enlarging, so switch to bilinear there.
        let filter = if size.fits_within(source) {
            FilterType::Box
        } else {
            FilterType::Bilinear
        };

        let src = ImageRef::new(source.width, source.height, image.as_raw(), PixelType::U8x3)
            .map_err(|e| BackendError::ProcessingFailed(format!("Invalid source buffer: {e}")))?;
        let mut dst = ResizeBuffer::new(size.width, size.height, PixelType::U8x3);

        Resizer::new()
            .resize(
                &src,
                &mut dst,
                &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(filter)),
            )
            .map_err(|e| BackendError::ProcessingFailed(format!("Resize to {size} failed: {e}")))?;

        RgbImage::from_raw(size.width, size.height, dst.into_vec()).ok_or_else(|| {
            BackendError::ProcessingFailed("Failed to create image from resized buffer".into())
        })
    }

    fn composite_at(&self, canvas: &mut RgbImage, image: &RgbImage, x: u32, y: u32) {
        imageops::replace(canvas, image, i64::from(x), i64::from(y));
    }

    fn crop(&self, image: &RgbImage, rect: Rect) -> RgbImage {
        imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
    }

    fn sharpen(&self, image: RgbImage, amount: i32, radius: f64) -> RgbImage {
        if amount <= 0 || radius.is_nan() || radius <= 0.0 {
            return image;
        }
        let weight = f64::from(amount) / 100.0;
        let sigma = radius.min(Sharpening::MAX_RADIUS);
        let blurred = imageops::blur(&image, sigma as f32);

        let mut sharpened = image;
        for (value, soft) in sharpened.iter_mut().zip(blurred.iter()) {
            let boosted = f64::from(*value) * (1.0 + weight) - f64::from(*soft) * weight;
            *value = boosted.round().clamp(0.0, 255.0) as u8;
        }
        sharpened
    }

    fn encode_jpeg(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.value())
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
        if bytes.is_empty() {
            return Err(BackendError::Encode("JPEG encoder produced no data".into()));
        }
        Ok(bytes)
    }
}
