//! Image resizing: geometry, parameters, backend, pipeline.
//!
//! | Piece | Role |
//! |---|---|
//! | [`geometry`] | `Dimensions`, `Rect`, `TargetSpec` value types |
//! | [`gravity`] | Gravity → per-axis anchor → offset within free space |
//! | [`layout`] | Pure fit/fill layout computation |
//! | [`params`] | Algorithm, gravity, background, quality, sharpening, render options |
//! | [`backend`] | [`ImageBackend`] trait: the pixel primitives |
//! | [`rust_backend`] | [`RustBackend`]: `image` + `fast_image_resize` implementation |
//! | [`operations`] | The resize pipeline driving a backend from a layout |
//!
//! Layout and gravity are pure and carry no state, so any number of resizes
//! can run concurrently. Each call owns its own buffers.

pub mod backend;
pub mod geometry;
pub mod gravity;
pub mod layout;
pub mod operations;
pub mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use geometry::{Dimensions, Rect, TargetSpec};
pub use layout::{Layout, compute_layout};
pub use operations::{ResizeError, ResizePlan, Resized, plan_resize, render, resize, resize_path};
pub use params::{
    Algorithm, Background, Gravity, ParseOptionError, Quality, RenderOptions, Sharpening,
};
pub use rust_backend::{RustBackend, is_supported_input, supported_input_extensions};
