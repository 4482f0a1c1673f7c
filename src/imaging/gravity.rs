//! Gravity resolution: free space on each axis → anchor offset.
//!
//! Each [`Gravity`] decomposes into one [`Anchor`] per axis. The table below
//! is the only place that relationship is written down; both the fit and
//! fill layouts go through it.
//!
//! | Gravity | x | y |
//! |---|---|---|
//! | center | free_w / 2 | free_h / 2 |
//! | north | free_w / 2 | 0 |
//! | south | free_w / 2 | free_h |
//! | west | 0 | free_h / 2 |
//! | east | free_w | free_h / 2 |
//! | northwest | 0 | 0 |
//! | northeast | free_w | 0 |
//! | southwest | 0 | free_h |
//! | southeast | free_w | free_h |
//!
//! Halving truncates, so an odd amount of free space leaves the extra pixel
//! on the far (right/bottom) side.

use super::params::Gravity;

/// Position along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    /// Offset into `free` pixels of slack.
    pub fn place(self, free: u32) -> u32 {
        match self {
            Anchor::Start => 0,
            Anchor::Center => free / 2,
            Anchor::End => free,
        }
    }
}

impl Gravity {
    /// Horizontal and vertical anchors for this gravity.
    pub fn anchors(self) -> (Anchor, Anchor) {
        use Anchor::{Center, End, Start};
        match self {
            Gravity::Center => (Center, Center),
            Gravity::North => (Center, Start),
            Gravity::South => (Center, End),
            Gravity::West => (Start, Center),
            Gravity::East => (End, Center),
            Gravity::NorthWest => (Start, Start),
            Gravity::NorthEast => (End, Start),
            Gravity::SouthWest => (Start, End),
            Gravity::SouthEast => (End, End),
        }
    }
}

/// Resolve the `(x, y)` offset for `gravity` given the slack on each axis.
pub fn offset(gravity: Gravity, free_width: u32, free_height: u32) -> (u32, u32) {
    let (horizontal, vertical) = gravity.anchors();
    (horizontal.place(free_width), vertical.place(free_height))
}
