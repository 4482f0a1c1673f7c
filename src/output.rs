//! CLI output formatting for all commands.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! photo.png → thumb.jpg
//!     1024x768 → 200x200 (fill)
//!     Crop: 200x200+33+0 of 267x200
//!     Quality: 95, 14.2 KB
//! ```
//!
//! ## Batch
//!
//! ```text
//! trip/beach.png → trip/beach.jpg (1024x768 → 200x200, 9.8 KB)
//! broken.png: failed: Decode failed: ...
//!
//! Resized 12 images, 1 failed
//! ```
//!
//! ## Bench
//!
//! ```text
//! count: 60, mean: 4.21ms, min: 2.02ms, max: 9.90ms, p99: 9.11ms, stddev: 1.30ms, rate: 21.55/s
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::bench::TimerStats;
use crate::imaging::{Algorithm, Resized};
use std::path::Path;

/// Human-readable byte count.
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Path relative to `root` when possible, for compact display.
fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Format the result of a single resize.
pub fn format_resize_result(input: &Path, output: &Path, resized: &Resized) -> Vec<String> {
    let plan = &resized.plan;
    let layout = &plan.layout;
    let mut lines = vec![
        format!("{} → {}", input.display(), output.display()),
        format!("    {} → {} ({})", plan.source, plan.target, plan.algorithm),
    ];

    if plan.is_identity() {
        lines.push("    Unchanged: re-encoded only".to_string());
    } else {
        match plan.algorithm {
            Algorithm::Fit => {
                lines.push(format!("    Placed: {}", layout.rect));
                if layout.needs_background_fill {
                    let [r, g, b] = plan.background.rgb();
                    lines.push(format!("    Background: {r},{g},{b}"));
                }
            }
            Algorithm::Fill => {
                lines.push(format!(
                    "    Crop: {} of {}",
                    layout.rect, layout.intermediate
                ));
            }
        }
    }

    if let Some(sharpening) = plan.sharpening {
        lines.push(format!(
            "    Sharpen: {}% radius {}",
            sharpening.amount, sharpening.radius
        ));
    }
    lines.push(format!(
        "    Quality: {}, {}",
        plan.quality.value(),
        format_bytes(resized.data.len())
    ));
    lines
}

pub fn print_resize_result(input: &Path, output: &Path, resized: &Resized) {
    for line in format_resize_result(input, output, resized) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event.
///
/// Paths are shown relative to the source and output roots.
pub fn format_batch_event(event: &BatchEvent, source_root: &Path, output_root: &Path) -> String {
    match event {
        BatchEvent::Resized {
            source,
            output,
            source_size,
            target,
            bytes,
        } => format!(
            "{} → {} ({} → {}, {})",
            display_relative(source, source_root),
            display_relative(output, output_root),
            source_size,
            target,
            format_bytes(*bytes)
        ),
        BatchEvent::Failed { source, error } => {
            format!("{}: failed: {}", display_relative(source, source_root), error)
        }
    }
}

/// Format the closing batch summary.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    if summary.total() == 0 {
        return vec!["No supported images found".to_string()];
    }
    let mut line = format!("Resized {}", plural(summary.succeeded, "image"));
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    vec![String::new(), line]
}

pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Bench
// ============================================================================

/// Format benchmark timings on one line.
pub fn format_bench_stats(stats: &TimerStats) -> Vec<String> {
    let fields = [
        format!("count: {}", stats.count),
        format!("mean: {:.2?}", stats.mean),
        format!("min: {:.2?}", stats.min),
        format!("max: {:.2?}", stats.max),
        format!("p99: {:.2?}", stats.p99),
        format!("stddev: {:.2?}", stats.std_dev),
        format!("rate: {:.2}/s", stats.rate),
    ];
    vec![fields.join(", ")]
}

pub fn print_bench_stats(stats: &TimerStats) {
    for line in format_bench_stats(stats) {
        println!("{}", line);
    }
}
