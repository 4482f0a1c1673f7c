//! Layout engine: source size + target + algorithm + gravity → [`Layout`].
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Fit
//!
//! ```text
//! ratio   = min(tw / sw, th / sh)
//! content = (floor(sw * ratio), floor(sh * ratio))   ≤ target on both axes
//! free    = target - content
//! rect    = (gravity offset in free, content)        placement inside the target canvas
//! ```
//!
//! ## Fill
//!
//! ```text
//! ratio        = max(tw / sw, th / sh)
//! intermediate = (ceil(sw * ratio), ceil(sh * ratio)) ≥ target on both axes
//! free         = intermediate - target
//! rect         = (gravity offset in free, target)     crop window out of the intermediate
//! ```
//!
//! Floor (fit) and ceil (fill) are deliberate: they trade at most one pixel of
//! padding or overshoot for a guarantee that content never overflows the
//! canvas and a crop never runs off the intermediate image.

use super::geometry::{Dimensions, Rect};
use super::gravity;
use super::params::{Algorithm, Gravity};

/// Computed geometry for one resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Scale factor applied to the source.
    pub ratio: f64,
    /// Fit: the target canvas. Fill: the over-scaled image before cropping.
    pub intermediate: Dimensions,
    /// Fit: where the scaled source sits on the canvas. Fill: the crop window.
    pub rect: Rect,
    /// Fit only: part of the canvas is not covered by the scaled source.
    pub needs_background_fill: bool,
}

/// Per-algorithm choice of ratio and rounding.
#[derive(Clone, Copy)]
struct Strategy {
    pick_ratio: fn(f64, f64) -> f64,
    round: fn(f64) -> f64,
}

const FIT: Strategy = Strategy {
    pick_ratio: f64::min,
    round: f64::floor,
};

const FILL: Strategy = Strategy {
    pick_ratio: f64::max,
    round: f64::ceil,
};

impl Algorithm {
    fn strategy(self) -> Strategy {
        match self {
            Algorithm::Fit => FIT,
            Algorithm::Fill => FILL,
        }
    }
}

impl Strategy {
    fn ratio(self, source: Dimensions, target: Dimensions) -> f64 {
        let xf = f64::from(target.width) / f64::from(source.width);
        let yf = f64::from(target.height) / f64::from(source.height);
        (self.pick_ratio)(xf, yf)
    }

    fn scale(self, source: Dimensions, ratio: f64) -> Dimensions {
        // `as` saturates, so absurd ratios cannot wrap.
        Dimensions {
            width: (self.round)(f64::from(source.width) * ratio) as u32,
            height: (self.round)(f64::from(source.height) * ratio) as u32,
        }
    }
}

/// Compute the layout for scaling `source` onto a normalized `target`.
///
/// `source` must be strictly positive and `target` already normalized (see
/// [`TargetSpec::normalize`](super::geometry::TargetSpec::normalize)). Given
/// those, this function is total.
pub fn compute_layout(
    source: Dimensions,
    target: Dimensions,
    algorithm: Algorithm,
    gravity: Gravity,
) -> Layout {
    let strategy = algorithm.strategy();
    let ratio = strategy.ratio(source, target);
    let scaled = strategy.scale(source, ratio);

    match algorithm {
        Algorithm::Fit => {
            let (x, y) = gravity::offset(
                gravity,
                target.width.saturating_sub(scaled.width),
                target.height.saturating_sub(scaled.height),
            );
            Layout {
                ratio,
                intermediate: target,
                rect: Rect::new(x, y, scaled.width, scaled.height),
                needs_background_fill: scaled.width < target.width
                    || scaled.height < target.height,
            }
        }
        Algorithm::Fill => {
            let (x, y) = gravity::offset(
                gravity,
                scaled.width.saturating_sub(target.width),
                scaled.height.saturating_sub(target.height),
            );
            Layout {
                ratio,
                intermediate: scaled,
                rect: Rect::new(x, y, target.width, target.height),
                needs_background_fill: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h)
    }

    const SOURCES: &[(u32, u32)] = &[
        (1, 1),
        (3, 1),
        (7, 3),
        (100, 100),
        (100, 200),
        (400, 300),
        (1024, 768),
        (1920, 1080),
        (10000, 1),
    ];

    const TARGETS: &[(u32, u32)] = &[
        (1, 1),
        (5, 5),
        (25, 100),
        (50, 200),
        (150, 120),
        (200, 200),
        (1024, 200),
        (2000, 1020),
        (2000, 3000),
    ];

    // =========================================================================
    // Fit
    // =========================================================================

    #[test]
    fn fit_landscape_into_square() {
        // 400x300 → 200x200: ratio 0.5, content 200x150, 50px vertical slack
        let layout =
            compute_layout(dims(400, 300), dims(200, 200), Algorithm::Fit, Gravity::Center);
        assert_eq!(layout.ratio, 0.5);
        assert_eq!(layout.intermediate, dims(200, 200));
        assert_eq!(layout.rect, Rect::new(0, 25, 200, 150));
        assert!(layout.needs_background_fill);
    }

    #[test]
    fn fit_gravity_moves_content() {
        let source = dims(400, 300);
        let target = dims(200, 200);
        let at = |g| compute_layout(source, target, Algorithm::Fit, g).rect;
        assert_eq!(at(Gravity::North), Rect::new(0, 0, 200, 150));
        assert_eq!(at(Gravity::South), Rect::new(0, 50, 200, 150));
        assert_eq!(at(Gravity::West), Rect::new(0, 25, 200, 150));
        assert_eq!(at(Gravity::SouthEast), Rect::new(0, 50, 200, 150));
    }

    #[test]
    fn fit_floor_leaves_one_pixel_of_padding() {
        // 1024x768 → 150x120: height 768 * (150/1024) = 112.5 → 112
        let layout =
            compute_layout(dims(1024, 768), dims(150, 120), Algorithm::Fit, Gravity::Center);
        assert_eq!(layout.rect, Rect::new(0, 4, 150, 112));
        assert!(layout.needs_background_fill);
    }

    #[test]
    fn fit_odd_slack_rounds_toward_origin() {
        // 7x3 → 5x5: content 5x2, free height 3 → center y = 1
        let layout = compute_layout(dims(7, 3), dims(5, 5), Algorithm::Fit, Gravity::Center);
        assert_eq!(layout.rect, Rect::new(0, 1, 5, 2));
    }

    #[test]
    fn fit_enlarges() {
        let layout =
            compute_layout(dims(1024, 768), dims(2000, 1020), Algorithm::Fit, Gravity::East);
        assert_eq!(layout.rect, Rect::new(640, 0, 1360, 1020));
    }

    #[test]
    fn fit_extreme_aspect_collapses_axis() {
        let layout = compute_layout(dims(10000, 1), dims(10, 10), Algorithm::Fit, Gravity::Center);
        assert_eq!(layout.rect, Rect::new(0, 5, 10, 0));
        assert!(layout.needs_background_fill);
    }

    #[test]
    fn fit_content_never_exceeds_target() {
        for &(sw, sh) in SOURCES {
            for &(tw, th) in TARGETS {
                for gravity in Gravity::ALL {
                    let target = dims(tw, th);
                    let layout = compute_layout(dims(sw, sh), target, Algorithm::Fit, gravity);
                    assert!(
                        layout.rect.size().fits_within(target),
                        "{sw}x{sh} → {tw}x{th} {gravity}: {:?}",
                        layout.rect
                    );
                    assert!(layout.rect.within(target));
                    assert_eq!(layout.intermediate, target);
                    assert_eq!(layout.needs_background_fill, layout.rect.size() != target);
                }
            }
        }
    }

    // =========================================================================
    // Fill
    // =========================================================================

    #[test]
    fn fill_landscape_into_square() {
        // 400x300 → 200x200: ratio 2/3, intermediate 267x200, crop 67px horizontally
        let layout =
            compute_layout(dims(400, 300), dims(200, 200), Algorithm::Fill, Gravity::Center);
        assert_eq!(layout.intermediate, dims(267, 200));
        assert_eq!(layout.rect, Rect::new(33, 0, 200, 200));
        assert!(!layout.needs_background_fill);
    }

    #[test]
    fn fill_tall_source_west_keeps_left_edge() {
        // 100x200 → 50x200: width ratio 0.5, height ratio 1 → no scaling, crop left half
        let layout = compute_layout(dims(100, 200), dims(50, 200), Algorithm::Fill, Gravity::West);
        assert_eq!(layout.ratio, 1.0);
        assert_eq!(layout.intermediate, dims(100, 200));
        assert_eq!(layout.rect, Rect::new(0, 0, 50, 200));
    }

    #[test]
    fn fill_tall_source_gravities() {
        let source = dims(100, 200);
        let at = |target, g| compute_layout(source, target, Algorithm::Fill, g);

        let center = at(dims(50, 200), Gravity::Center);
        assert_eq!(center.rect, Rect::new(25, 0, 50, 200));

        let north = at(dims(25, 100), Gravity::North);
        assert_eq!(north.intermediate, dims(50, 100));
        assert_eq!(north.rect, Rect::new(12, 0, 25, 100));

        let south = at(dims(100, 400), Gravity::South);
        assert_eq!(south.intermediate, dims(200, 400));
        assert_eq!(south.rect, Rect::new(50, 0, 100, 400));

        let east = at(dims(50, 200), Gravity::East);
        assert_eq!(east.rect, Rect::new(50, 0, 50, 200));
    }

    #[test]
    fn fill_ceil_overshoots_by_at_most_one() {
        // 7x3 → 5x5: ratio 5/3, width 11.67 → 12
        let layout = compute_layout(dims(7, 3), dims(5, 5), Algorithm::Fill, Gravity::SouthEast);
        assert_eq!(layout.intermediate, dims(12, 5));
        assert_eq!(layout.rect, Rect::new(7, 0, 5, 5));
    }

    #[test]
    fn fill_intermediate_covers_target() {
        for &(sw, sh) in SOURCES {
            for &(tw, th) in TARGETS {
                for gravity in Gravity::ALL {
                    let target = dims(tw, th);
                    let layout = compute_layout(dims(sw, sh), target, Algorithm::Fill, gravity);
                    assert!(
                        target.fits_within(layout.intermediate),
                        "{sw}x{sh} → {tw}x{th} {gravity}: {:?}",
                        layout.intermediate
                    );
                    assert!(layout.rect.within(layout.intermediate));
                    assert_eq!(layout.rect.size(), target);
                    assert!(!layout.needs_background_fill);
                }
            }
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    #[test]
    fn identity_for_both_algorithms() {
        let source = dims(1024, 768);
        for algorithm in Algorithm::ALL {
            for gravity in Gravity::ALL {
                let layout = compute_layout(source, source, algorithm, gravity);
                assert_eq!(layout.ratio, 1.0);
                assert_eq!(layout.intermediate, source);
                assert_eq!(layout.rect, Rect::new(0, 0, 1024, 768));
                assert!(!layout.needs_background_fill);
            }
        }
    }
}
