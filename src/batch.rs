//! Directory batch resizing.
//!
//! Walks a source tree, resizes every supported image with the same
//! [`RenderOptions`], and mirrors the relative layout into an output tree:
//!
//! ```text
//! photos/                      out/
//! ├── trip/                    ├── trip/
//! │   ├── beach.png      →     │   ├── beach.jpg
//! │   └── dunes.jpeg     →     │   └── dunes.jpg
//! ├── notes.txt                └── cover.jpg
//! └── cover.webp         →
//! ```
//!
//! Files are processed in parallel on the global rayon pool. Each file is
//! independent: a file that fails to decode or encode is reported as a
//! [`BatchEvent::Failed`] and the rest of the batch carries on.
//!
//! Inputs that differ only by extension (`cover.png` and `cover.jpg`) map to
//! the same output. None of them is written; each one is reported as failed
//! with [`BatchError::OutputCollision`].

use crate::imaging::{
    Dimensions, ImageBackend, RenderOptions, ResizeError, RustBackend, is_supported_input,
    resize_path,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Output {0} would be written by more than one input")]
    OutputCollision(PathBuf),
    #[error(transparent)]
    Resize(#[from] ResizeError),
}

/// Progress event emitted once per input file.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Resized {
        source: PathBuf,
        output: PathBuf,
        source_size: Dimensions,
        target: Dimensions,
        bytes: usize,
    },
    Failed {
        source: PathBuf,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Find all supported images under `source`, sorted by path.
pub fn discover_inputs(source: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !source.is_dir() {
        return Err(BatchError::SourceNotFound(source.to_path_buf()));
    }
    let mut inputs = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_input(entry.path()) {
            inputs.push(entry.into_path());
        }
    }
    Ok(inputs)
}

/// Map an input file to its mirrored `.jpg` location under `output_root`.
pub fn output_path_for(source_root: &Path, output_root: &Path, input: &Path) -> PathBuf {
    let relative = input.strip_prefix(source_root).unwrap_or(input);
    let mut output = output_root.join(relative);
    output.set_extension("jpg");
    output
}

/// Resize every supported image under `source` into `output`.
pub fn batch(
    source: &Path,
    output: &Path,
    options: &RenderOptions,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let backend = RustBackend::new();
    batch_with_backend(&backend, source, output, options, events)
}

/// Batch resize using a specific backend (allows testing with mock).
pub fn batch_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    options: &RenderOptions,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let inputs = discover_inputs(source)?;
    tracing::debug!(count = inputs.len(), source = %source.display(), "batch inputs");
    std::fs::create_dir_all(output)?;

    let jobs: Vec<(&PathBuf, PathBuf)> = inputs
        .iter()
        .map(|input| (input, output_path_for(source, output, input)))
        .collect();
    let mut claims: HashMap<&Path, usize> = HashMap::new();
    for (_, target) in &jobs {
        *claims.entry(target.as_path()).or_default() += 1;
    }

    let outcomes: Vec<bool> = jobs
        .par_iter()
        .map_with(events, |tx, (input, target)| {
            let result = if claims[target.as_path()] > 1 {
                Err(BatchError::OutputCollision(target.clone()))
            } else {
                resize_one(backend, input, target, options)
            };
            let event = match result {
                Ok((source_size, resized_to, bytes)) => BatchEvent::Resized {
                    source: (*input).clone(),
                    output: target.clone(),
                    source_size,
                    target: resized_to,
                    bytes,
                },
                Err(e) => {
                    tracing::warn!(path = %input.display(), error = %e, "skipping image");
                    BatchEvent::Failed {
                        source: (*input).clone(),
                        error: e.to_string(),
                    }
                }
            };
            let ok = matches!(event, BatchEvent::Resized { .. });
            if let Some(tx) = tx {
                // Receiver may have hung up; the summary still counts the file.
                tx.send(event).ok();
            }
            ok
        })
        .collect();

    let succeeded = outcomes.iter().filter(|ok| **ok).count();
    Ok(BatchSummary {
        succeeded,
        failed: outcomes.len() - succeeded,
    })
}

fn resize_one(
    backend: &impl ImageBackend,
    input: &Path,
    target: &Path,
    options: &RenderOptions,
) -> Result<(Dimensions, Dimensions, usize), BatchError> {
    let resized = resize_path(backend, input, options)?;
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, &resized.data)?;
    Ok((resized.plan.source, resized.plan.target, resized.data.len()))
}
