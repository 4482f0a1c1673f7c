//! Parameter types for resize operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between callers (CLI, batch driver, benchmark) and the
//! [`operations`](super::operations) pipeline, which turns them into a
//! [`Layout`](super::layout::Layout) and a sequence of backend calls.
//!
//! ## Types
//!
//! - [`Algorithm`]: `fit` (letterbox) or `fill` (scale and crop).
//! - [`Gravity`]: one of nine anchors for placement or cropping.
//! - [`Background`]: RGB fill color for letterbox padding (default black).
//! - [`Quality`]: JPEG quality, 1 to 100, default 95.
//! - [`Sharpening`]: unsharp-mask amount and radius; only exists when both are positive.
//! - [`RenderOptions`]: everything a single resize call needs.

use super::geometry::TargetSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an algorithm or gravity name is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseOptionError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Layout strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// Scale the whole source inside the target canvas, padding with background.
    #[default]
    Fit,
    /// Scale the source to cover the target canvas, cropping the overflow.
    Fill,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Fit, Algorithm::Fill];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Fit => "fit",
            Algorithm::Fill => "fill",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fit" => Ok(Algorithm::Fit),
            "fill" => Ok(Algorithm::Fill),
            _ => Err(ParseOptionError::new("algorithm", s)),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = ParseOptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.as_str().to_string()
    }
}

/// Anchor governing where content (fit) or the crop window (fill) sits
/// within the available slack space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gravity {
    #[default]
    Center,
    North,
    South,
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Gravity {
    pub const ALL: [Gravity; 9] = [
        Gravity::Center,
        Gravity::North,
        Gravity::South,
        Gravity::West,
        Gravity::East,
        Gravity::NorthWest,
        Gravity::NorthEast,
        Gravity::SouthWest,
        Gravity::SouthEast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::North => "north",
            Gravity::South => "south",
            Gravity::West => "west",
            Gravity::East => "east",
            Gravity::NorthWest => "northwest",
            Gravity::NorthEast => "northeast",
            Gravity::SouthWest => "southwest",
            Gravity::SouthEast => "southeast",
        }
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gravity {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "center" | "c" => Ok(Gravity::Center),
            "north" | "n" => Ok(Gravity::North),
            "south" | "s" => Ok(Gravity::South),
            "west" | "w" => Ok(Gravity::West),
            "east" | "e" => Ok(Gravity::East),
            "northwest" | "nw" => Ok(Gravity::NorthWest),
            "northeast" | "ne" => Ok(Gravity::NorthEast),
            "southwest" | "sw" => Ok(Gravity::SouthWest),
            "southeast" | "se" => Ok(Gravity::SouthEast),
            _ => Err(ParseOptionError::new("gravity", s)),
        }
    }
}

impl TryFrom<String> for Gravity {
    type Error = ParseOptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Gravity> for String {
    fn from(value: Gravity) -> Self {
        value.as_str().to_string()
    }
}

/// Letterbox fill color as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const BLACK: Background = Background([0, 0, 0]);
    pub const WHITE: Background = Background([255, 255, 255]);

    pub fn rgb(self) -> [u8; 3] {
        self.0
    }
}

impl FromStr for Background {
    type Err = ParseOptionError;

    /// Parses `R,G,B` with each channel in 0..=255.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels: Vec<u8> = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| ParseOptionError::new("background", s))?;
        match channels.as_slice() {
            [r, g, b] => Ok(Background([*r, *g, *b])),
            _ => Err(ParseOptionError::new("background", s)),
        }
    }
}

/// JPEG encoding quality (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const DEFAULT: Quality = Quality(95);

    /// Clamp into 1..=100.
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    /// Zero means "unset" and resolves to the default of 95.
    pub fn or_default(value: u32) -> Self {
        if value == 0 {
            Self::DEFAULT
        } else {
            Self::new(value)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Unsharp-mask parameters.
///
/// - `amount`: strength in percent (100 doubles local contrast at edges)
/// - `radius`: sigma of the Gaussian blur used for the mask
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub amount: i32,
    pub radius: f64,
}

impl Sharpening {
    /// Largest accepted blur sigma. Blur cost grows with the sigma.
    pub const MAX_RADIUS: f64 = 20.0;

    /// Returns `None` unless both `amount` and `radius` are positive and
    /// `radius` is at most [`MAX_RADIUS`](Self::MAX_RADIUS).
    pub fn new(amount: i32, radius: f64) -> Option<Self> {
        (amount > 0 && radius > 0.0 && radius <= Self::MAX_RADIUS)
            .then_some(Self { amount, radius })
    }

    /// True when `radius` either disables sharpening or is usable as a sigma.
    pub fn accepts_radius(radius: f64) -> bool {
        radius.is_finite() && radius <= Self::MAX_RADIUS
    }
}

/// Everything one resize call needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOptions {
    pub target: TargetSpec,
    pub algorithm: Algorithm,
    pub gravity: Gravity,
    pub background: Background,
    /// 0 = default (95).
    pub quality: u32,
    /// 0 = disabled.
    pub sharpen_amount: i32,
    /// 0.0 = disabled.
    pub sharpen_radius: f64,
}

impl RenderOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: TargetSpec::new(width, height),
            ..Self::default()
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_sharpening(mut self, amount: i32, radius: f64) -> Self {
        self.sharpen_amount = amount;
        self.sharpen_radius = radius;
        self
    }

    pub fn resolved_quality(&self) -> Quality {
        Quality::or_default(self.quality)
    }

    pub fn sharpening(&self) -> Option<Sharpening> {
        Sharpening::new(self.sharpen_amount, self.sharpen_radius)
    }
}
