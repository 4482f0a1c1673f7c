//! Resize pipeline.
//!
//! These functions combine the layout calculation with backend execution.
//! They normalize the target, compute a [`Layout`], then drive the backend:
//!
//! ```text
//! fit:  canvas(target) → paint(background) → area_scale(content)
//!         → composite(rect) → [sharpen] → encode
//! fill: area_scale(intermediate) → crop(rect) → [sharpen] → encode
//! ```
//!
//! A target equal to the source skips resampling entirely. Every call is
//! all-or-nothing: the first backend failure aborts it and nothing is retried.
//! Options and buffer sizes are checked before the backend allocates anything:
//! a sharpen radius above [`Sharpening::MAX_RADIUS`] or a canvas above
//! [`Dimensions::MAX_PIXELS`] fails the call up front.

use super::backend::{BackendError, ImageBackend};
use super::geometry::Dimensions;
use super::layout::{Layout, compute_layout};
use super::params::{Algorithm, Background, Quality, RenderOptions, Sharpening};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("image data length is zero")]
    EmptySourceData,
    #[error("invalid source image: {0}")]
    InvalidSourceFormat(String),
    #[error("encoding failed: {0}")]
    EncodeFailure(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image processing failed: {0}")]
    Processing(String),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("{0} exceeds the {max} pixel limit", max = Dimensions::MAX_PIXELS)]
    TooLarge(Dimensions),
}

impl From<BackendError> for ResizeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => ResizeError::Io(e),
            BackendError::Decode(msg) => ResizeError::InvalidSourceFormat(msg),
            BackendError::Encode(msg) => ResizeError::EncodeFailure(msg),
            BackendError::ProcessingFailed(msg) => ResizeError::Processing(msg),
        }
    }
}

/// Result type for resize operations.
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Everything decided before any pixel work happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePlan {
    pub source: Dimensions,
    /// Normalized target: the size of the encoded output.
    pub target: Dimensions,
    pub algorithm: Algorithm,
    pub layout: Layout,
    pub background: Background,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}

impl ResizePlan {
    /// Target equals source: no resampling, crop or fill needed.
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }
}

/// Plan a resize without executing it.
///
/// `source` must be strictly positive.
pub fn plan_resize(source: Dimensions, options: &RenderOptions) -> ResizePlan {
    let target = options.target.normalize(source);
    let layout = compute_layout(source, target, options.algorithm, options.gravity);
    ResizePlan {
        source,
        target,
        algorithm: options.algorithm,
        layout,
        background: options.background,
        quality: options.resolved_quality(),
        sharpening: options.sharpening(),
    }
}

fn check_options(options: &RenderOptions) -> Result<()> {
    if !Sharpening::accepts_radius(options.sharpen_radius) {
        return Err(ResizeError::InvalidOptions(format!(
            "sharpen radius {} must be a finite number no greater than {}",
            options.sharpen_radius,
            Sharpening::MAX_RADIUS
        )));
    }
    Ok(())
}

/// Reject plans whose buffers would be too large to allocate.
fn check_buffers(plan: &ResizePlan) -> Result<()> {
    for size in [plan.target, plan.layout.intermediate] {
        if size.exceeds_pixel_limit() {
            return Err(ResizeError::TooLarge(size));
        }
    }
    Ok(())
}

/// Encoded output plus the plan that produced it.
#[derive(Debug, Clone)]
pub struct Resized {
    pub data: Vec<u8>,
    pub plan: ResizePlan,
}

/// Decode `data`, resize it per `options`, and return JPEG bytes.
pub fn resize<B: ImageBackend>(
    backend: &B,
    data: &[u8],
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(ResizeError::EmptySourceData);
    }
    check_options(options)?;
    let image = backend.decode(data)?;
    render(backend, image, options).map(|resized| resized.data)
}

/// Load an image from disk and resize it per `options`.
pub fn resize_path<B: ImageBackend>(
    backend: &B,
    path: &Path,
    options: &RenderOptions,
) -> Result<Resized> {
    check_options(options)?;
    let image = backend.load(path)?;
    render(backend, image, options)
}

/// Resize an already decoded image.
pub fn render<B: ImageBackend>(
    backend: &B,
    image: B::Image,
    options: &RenderOptions,
) -> Result<Resized> {
    check_options(options)?;
    let source = backend.dimensions(&image);
    if source.is_empty() {
        return Err(ResizeError::InvalidSourceFormat(format!(
            "source has no pixels ({source})"
        )));
    }

    let plan = plan_resize(source, options);
    tracing::debug!(
        source = %plan.source,
        target = %plan.target,
        algorithm = %plan.algorithm,
        ratio = plan.layout.ratio,
        rect = %plan.layout.rect,
        "resize planned"
    );
    check_buffers(&plan)?;

    let composed = if plan.is_identity() {
        image
    } else {
        match plan.algorithm {
            Algorithm::Fit => letterbox(backend, &image, &plan)?,
            Algorithm::Fill => scale_and_crop(backend, &image, &plan.layout)?,
        }
    };

    let finished = match plan.sharpening {
        Some(s) => backend.sharpen(composed, s.amount, s.radius),
        None => composed,
    };

    let data = backend.encode_jpeg(&finished, plan.quality)?;
    Ok(Resized { data, plan })
}

fn letterbox<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    plan: &ResizePlan,
) -> Result<B::Image> {
    let layout = &plan.layout;
    let mut canvas = backend.canvas(layout.intermediate)?;
    if layout.needs_background_fill {
        backend.paint_solid(&mut canvas, plan.background);
    }
    // Extreme aspect ratios can floor the content to zero pixels on one axis.
    if !layout.rect.size().is_empty() {
        let scaled = backend.area_scale(image, layout.rect.size())?;
        backend.composite_at(&mut canvas, &scaled, layout.rect.x, layout.rect.y);
    }
    Ok(canvas)
}

fn scale_and_crop<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    layout: &Layout,
) -> Result<B::Image> {
    let scaled = backend.area_scale(image, layout.intermediate)?;
    Ok(backend.crop(&scaled, layout.rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::geometry::{Rect, TargetSpec};
    use crate::imaging::params::Gravity;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h)
    }

    #[test]
    fn plan_normalizes_unset_axes() {
        let plan = plan_resize(dims(1024, 768), &RenderOptions::new(200, 0));
        assert_eq!(plan.target, dims(200, 768));
        assert_eq!(plan.quality.value(), 95);
        assert!(plan.sharpening.is_none());
        assert!(!plan.is_identity());
    }

    #[test]
    fn plan_identity_when_target_unset() {
        for algorithm in Algorithm::ALL {
            let options = RenderOptions::default().with_algorithm(algorithm);
            let plan = plan_resize(dims(1024, 768), &options);
            assert!(plan.is_identity());
            assert_eq!(plan.target, dims(1024, 768));
            assert_eq!(plan.layout.rect, Rect::new(0, 0, 1024, 768));
            assert!(!plan.layout.needs_background_fill);
        }
    }

    #[test]
    fn fit_sequence() {
        let backend = MockBackend::with_source(400, 300);
        let options = RenderOptions::new(200, 200)
            .with_gravity(Gravity::South)
            .with_background(Background::WHITE)
            .with_quality(80);

        let bytes = resize(&backend, b"source", &options).unwrap();
        assert_eq!(bytes, b"jpeg 200x200 q80");

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Decode(6),
                RecordedOp::Canvas(dims(200, 200)),
                RecordedOp::Paint([255, 255, 255]),
                RecordedOp::AreaScale {
                    from: dims(400, 300),
                    to: dims(200, 150)
                },
                RecordedOp::Composite {
                    size: dims(200, 150),
                    x: 0,
                    y: 50
                },
                RecordedOp::Encode {
                    size: dims(200, 200),
                    quality: 80
                },
            ]
        );
    }

    #[test]
    fn fit_exact_aspect_skips_paint() {
        let backend = MockBackend::with_source(400, 300);
        resize(&backend, b"x", &RenderOptions::new(200, 150)).unwrap();

        let ops = backend.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Paint(_))));
        assert!(ops.contains(&RecordedOp::Composite {
            size: dims(200, 150),
            x: 0,
            y: 0
        }));
    }

    #[test]
    fn fit_collapsed_content_is_background_only() {
        let backend = MockBackend::with_source(10000, 1);
        let bytes = resize(&backend, b"x", &RenderOptions::new(10, 10)).unwrap();
        assert_eq!(bytes, b"jpeg 10x10 q95");

        let ops = backend.get_operations();
        assert!(ops.contains(&RecordedOp::Paint([0, 0, 0])));
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::AreaScale { .. })));
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Composite { .. })));
    }

    #[test]
    fn fill_sequence() {
        let backend = MockBackend::with_source(400, 300);
        let options = RenderOptions::new(200, 200)
            .with_algorithm(Algorithm::Fill)
            .with_gravity(Gravity::East);

        let bytes = resize(&backend, b"x", &options).unwrap();
        assert_eq!(bytes, b"jpeg 200x200 q95");

        assert_eq!(
            backend.get_operations()[1..],
            [
                RecordedOp::AreaScale {
                    from: dims(400, 300),
                    to: dims(267, 200)
                },
                RecordedOp::Crop(Rect::new(67, 0, 200, 200)),
                RecordedOp::Encode {
                    size: dims(200, 200),
                    quality: 95
                },
            ]
        );
    }

    #[test]
    fn identity_skips_resampling() {
        for algorithm in Algorithm::ALL {
            let backend = MockBackend::with_source(1024, 768);
            let options = RenderOptions::default().with_algorithm(algorithm);

            let bytes = resize(&backend, b"x", &options).unwrap();
            assert_eq!(bytes, b"jpeg 1024x768 q95");
            assert_eq!(
                backend.get_operations(),
                vec![
                    RecordedOp::Decode(1),
                    RecordedOp::Encode {
                        size: dims(1024, 768),
                        quality: 95
                    }
                ]
            );
        }
    }

    #[test]
    fn sharpen_runs_after_crop_before_encode() {
        let backend = MockBackend::with_source(100, 200);
        let options = RenderOptions::new(50, 200)
            .with_algorithm(Algorithm::Fill)
            .with_gravity(Gravity::West)
            .with_sharpening(60, 1.5);

        resize(&backend, b"x", &options).unwrap();

        let ops = backend.get_operations();
        let tail = &ops[ops.len() - 3..];
        assert_eq!(tail[0], RecordedOp::Crop(Rect::new(0, 0, 50, 200)));
        assert_eq!(
            tail[1],
            RecordedOp::Sharpen {
                amount: 60,
                radius: 1.5
            }
        );
        assert!(matches!(tail[2], RecordedOp::Encode { .. }));
    }

    #[test]
    fn sharpen_skipped_unless_both_positive() {
        for (amount, radius) in [(0, 1.0), (50, 0.0), (-5, 2.0)] {
            let backend = MockBackend::with_source(100, 100);
            let options = RenderOptions::new(50, 50).with_sharpening(amount, radius);
            resize(&backend, b"x", &options).unwrap();
            assert!(
                !backend
                    .get_operations()
                    .iter()
                    .any(|op| matches!(op, RecordedOp::Sharpen { .. }))
            );
        }
    }

    #[test]
    fn infinite_sharpen_radius_is_rejected() {
        let backend = MockBackend::with_source(100, 100);
        let options = RenderOptions::new(50, 50).with_sharpening(100, f64::INFINITY);
        let err = resize(&backend, b"x", &options).unwrap_err();
        assert!(matches!(err, ResizeError::InvalidOptions(_)));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn oversized_sharpen_radius_is_rejected() {
        for radius in [1e7, f64::NAN, Sharpening::MAX_RADIUS * 2.0] {
            let backend = MockBackend::with_source(100, 100);
            let options = RenderOptions::new(50, 50).with_sharpening(100, radius);
            let err = resize_path(&backend, Path::new("/in.png"), &options).unwrap_err();
            assert!(err.to_string().contains("sharpen radius"), "{err}");
            assert!(backend.get_operations().is_empty());
        }
    }

    #[test]
    fn sharpen_radius_at_limit_runs() {
        let backend = MockBackend::with_source(100, 100);
        let options = RenderOptions::new(50, 50).with_sharpening(100, Sharpening::MAX_RADIUS);
        resize(&backend, b"x", &options).unwrap();
        assert!(backend.get_operations().contains(&RecordedOp::Sharpen {
            amount: 100,
            radius: Sharpening::MAX_RADIUS
        }));
    }

    #[test]
    fn huge_fill_intermediate_fails_before_allocating() {
        let backend = MockBackend::with_source(1, 10000);
        let options = RenderOptions::new(10000, 1).with_algorithm(Algorithm::Fill);
        let err = resize(&backend, b"x", &options).unwrap_err();
        assert!(
            matches!(err, ResizeError::TooLarge(size) if size == dims(10000, 100_000_000)),
            "{err}"
        );
        assert_eq!(backend.get_operations(), vec![RecordedOp::Decode(1)]);
    }

    #[test]
    fn huge_fit_canvas_fails_before_allocating() {
        let backend = MockBackend::with_source(100, 100);
        let options = RenderOptions::new(100_000, 100_000);
        let err = resize(&backend, b"x", &options).unwrap_err();
        assert!(matches!(err, ResizeError::TooLarge(_)));
        assert!(
            !backend
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Canvas(_)))
        );
    }

    #[test]
    fn empty_data_is_rejected_before_decode() {
        let backend = MockBackend::with_source(10, 10);
        let err = resize(&backend, &[], &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, ResizeError::EmptySourceData));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn decode_failure_is_invalid_source() {
        let backend = MockBackend::new();
        let err = resize(&backend, b"x", &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, ResizeError::InvalidSourceFormat(_)));
    }

    #[test]
    fn zero_sized_decode_is_invalid_source() {
        let backend = MockBackend::with_source(0, 10);
        let err = resize(&backend, b"x", &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, ResizeError::InvalidSourceFormat(_)));
    }

    #[test]
    fn encode_failure_aborts() {
        let backend = MockBackend::with_source(10, 10).failing_encode();
        let err = resize(&backend, b"x", &RenderOptions::new(5, 5)).unwrap_err();
        assert!(matches!(err, ResizeError::EncodeFailure(_)));
    }

    #[test]
    fn resize_path_returns_plan() {
        let backend = MockBackend::with_source(1024, 768);
        let options = RenderOptions {
            target: TargetSpec::new(0, 200),
            algorithm: Algorithm::Fill,
            ..RenderOptions::default()
        };
        let resized = resize_path(&backend, Path::new("/in.png"), &options).unwrap();

        assert_eq!(resized.plan.target, dims(1024, 200));
        assert_eq!(resized.plan.layout.intermediate, dims(1024, 768));
        assert_eq!(resized.plan.layout.rect, Rect::new(0, 284, 1024, 200));
        assert!(matches!(&backend.get_operations()[0], RecordedOp::Load(p) if p == "/in.png"));
    }
}
