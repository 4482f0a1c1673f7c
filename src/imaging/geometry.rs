//! Plain geometry value types shared by the layout engine and backends.

use std::fmt;

/// Pixel extents of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Largest buffer, in pixels, the pipeline will allocate (384 MiB as RGB).
    pub const MAX_PIXELS: u64 = 1 << 27;

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// True when a buffer of this size is over [`MAX_PIXELS`](Self::MAX_PIXELS).
    pub fn exceeds_pixel_limit(self) -> bool {
        self.pixel_count() > Self::MAX_PIXELS
    }

    /// True when either axis is zero (nothing to draw).
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when `self` fits inside `other` on both axes.
    pub fn fits_within(self, other: Dimensions) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle. Origin is top-left, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// True when the rectangle lies entirely inside a canvas of `bounds`.
    pub fn within(self, bounds: Dimensions) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(bounds.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(bounds.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Caller-requested output size. Zero on an axis means "keep the source's".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetSpec {
    pub width: u32,
    pub height: u32,
}

impl TargetSpec {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Replace unconstrained (zero) axes with the source's matching axis.
    pub fn normalize(self, source: Dimensions) -> Dimensions {
        Dimensions {
            width: if self.width == 0 {
                source.width
            } else {
                self.width
            },
            height: if self.height == 0 {
                source.height
            } else {
                self.height
            },
        }
    }
}
