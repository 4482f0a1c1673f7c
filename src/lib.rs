//! # trez
//!
//! Resize encoded images to an exact target canvas and re-encode them as JPEG.
//! Two layout strategies are supported:
//!
//! - **Fit**: scale the whole image inside the target, keep its aspect ratio,
//!   and pad the rest of the canvas with a background color.
//! - **Fill**: scale the image to cover the target, keep its aspect ratio, and
//!   crop the overflow.
//!
//! A nine-way gravity decides where the content sits (fit) or which part of
//! the image survives the crop (fill).
//!
//! # Architecture: Layout, Then Pixels
//!
//! Every resize is split into a pure planning step and a pixel step:
//!
//! ```text
//! 1. Plan     source size + options  →  Layout   (ratio, intermediate, rect)
//! 2. Execute  Layout + ImageBackend  →  JPEG bytes
//! ```
//!
//! The planning step is plain integer/float arithmetic with no I/O, so the
//! geometry can be tested exhaustively. The execution step only calls the
//! [`ImageBackend`](imaging::ImageBackend) trait, so the orchestration can be
//! tested against a recording mock without encoding a single image.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, gravity, fit/fill layout, backend trait, the resize pipeline |
//! | [`config`] | `trez.toml` loading, validation, and merging onto stock defaults |
//! | [`batch`] | Parallel resize of a directory tree into a mirrored output tree |
//! | [`bench`] | Timing harness over a grid of sizes and algorithms |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## One Geometry Implementation
//!
//! Fit and fill share a single layout function. The two algorithms differ only
//! in how they pick the scale ratio (min vs. max of the axis ratios), how they
//! round the scaled size (floor vs. ceil), and which side of the comparison the
//! free space is measured on. Gravity is a table from each of the nine values
//! to a pair of per-axis anchors. Adding an algorithm or a gravity is a table
//! entry, not a new code path.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and JPEG encoding use the [`image`](https://docs.rs/image) crate;
//! area-averaging downscales use
//! [`fast_image_resize`](https://docs.rs/fast_image_resize). No system
//! libraries are needed, so the binary is self-contained.
//!
//! ## Stateless, Concurrent Calls
//!
//! A resize owns all of its buffers and shares nothing with other calls. The
//! batch driver and the benchmark fan out over [rayon](https://docs.rs/rayon)
//! with no locking.

pub mod batch;
pub mod bench;
pub mod config;
pub mod imaging;
pub mod output;
