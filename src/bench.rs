//! Resize benchmark harness.
//!
//! Decodes nothing up front: every job runs the full `resize` entry point
//! (decode, layout, scale, encode) on the same source bytes so the numbers
//! match what a caller of the library sees. Jobs are the cross product
//! `times x sizes x algorithms`, executed on a dedicated rayon pool.
//!
//! With a [`BenchConfig::progress_interval`], a ticker thread summarizes the
//! samples collected so far at that interval while the jobs run.

use crate::imaging::{
    Algorithm, ImageBackend, ParseOptionError, RenderOptions, ResizeError, TargetSpec, resize,
};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Sizes used when none are given on the command line.
pub const DEFAULT_SIZES: &str = "200x200,400x180,800x600";
/// Algorithms used when none are given on the command line.
pub const DEFAULT_ALGORITHMS: &str = "fit,fill";

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Invalid size {0:?}: expected WIDTHxHEIGHT")]
    InvalidSize(String),
    #[error("At least one size is required")]
    NoSizes,
    #[error("At least one algorithm is required")]
    NoAlgorithms,
    #[error(transparent)]
    UnknownAlgorithm(#[from] ParseOptionError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Resize failed: {0}")]
    Resize(#[from] ResizeError),
}

/// Parse a comma-separated list of `WxH` sizes, e.g. `200x200,400x180`.
pub fn parse_sizes(list: &str) -> Result<Vec<TargetSpec>, BenchError> {
    let sizes = list
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (w, h) = entry
                .split_once(['x', 'X'])
                .ok_or_else(|| BenchError::InvalidSize(entry.to_string()))?;
            let parse = |v: &str| {
                v.trim()
                    .parse::<u32>()
                    .map_err(|_| BenchError::InvalidSize(entry.to_string()))
            };
            Ok(TargetSpec::new(parse(w)?, parse(h)?))
        })
        .collect::<Result<Vec<_>, BenchError>>()?;
    if sizes.is_empty() {
        return Err(BenchError::NoSizes);
    }
    Ok(sizes)
}

/// Parse a comma-separated list of algorithm names, e.g. `fit,fill`.
pub fn parse_algorithms(list: &str) -> Result<Vec<Algorithm>, BenchError> {
    let algorithms = list
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.parse::<Algorithm>())
        .collect::<Result<Vec<_>, _>>()?;
    if algorithms.is_empty() {
        return Err(BenchError::NoAlgorithms);
    }
    Ok(algorithms)
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Repetitions of the full size/algorithm grid.
    pub times: usize,
    /// Worker threads. 0 lets rayon pick.
    pub workers: usize,
    pub sizes: Vec<TargetSpec>,
    pub algorithms: Vec<Algorithm>,
    /// Gravity, background, quality and sharpening shared by every job.
    pub base: RenderOptions,
    /// Report running stats at this interval. `None` reports only at the end.
    pub progress_interval: Option<Duration>,
}

impl BenchConfig {
    /// Expand the grid into one set of render options per resize.
    pub fn jobs(&self) -> Vec<RenderOptions> {
        let mut jobs = Vec::with_capacity(self.times * self.sizes.len() * self.algorithms.len());
        for _ in 0..self.times {
            for size in &self.sizes {
                for algorithm in &self.algorithms {
                    jobs.push(RenderOptions {
                        target: *size,
                        algorithm: *algorithm,
                        ..self.base.clone()
                    });
                }
            }
        }
        jobs
    }
}

/// Timing summary over all resizes in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimerStats {
    pub count: usize,
    #[serde(serialize_with = "as_millis")]
    pub mean: Duration,
    #[serde(serialize_with = "as_millis")]
    pub min: Duration,
    #[serde(serialize_with = "as_millis")]
    pub max: Duration,
    #[serde(serialize_with = "as_millis")]
    pub p99: Duration,
    #[serde(serialize_with = "as_millis")]
    pub std_dev: Duration,
    /// Resizes per second of wall-clock time.
    pub rate: f64,
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

impl TimerStats {
    /// Summarize per-resize durations measured over `wall` elapsed time.
    pub fn from_durations(durations: &[Duration], wall: Duration) -> Self {
        if durations.is_empty() {
            return Self::default();
        }
        let mut sorted: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        // Population variance.
        let variance = sorted.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / count as f64;
        let wall_secs = wall.as_secs_f64();

        Self {
            count,
            mean: Duration::from_secs_f64(mean),
            min: Duration::from_secs_f64(sorted[0]),
            max: Duration::from_secs_f64(sorted[count - 1]),
            p99: Duration::from_secs_f64(percentile(&sorted, 0.99)),
            std_dev: Duration::from_secs_f64(variance.sqrt()),
            rate: if wall_secs > 0.0 {
                count as f64 / wall_secs
            } else {
                0.0
            },
        }
    }
}

/// Interpolated percentile of ascending `sorted`, positions counted from 1.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let pos = p * (n as f64 + 1.0);
    if pos < 1.0 {
        sorted[0]
    } else if pos >= n as f64 {
        sorted[n - 1]
    } else {
        let lower = sorted[pos as usize - 1];
        let upper = sorted[pos as usize];
        lower + (pos - pos.floor()) * (upper - lower)
    }
}

/// Run every job in `config` against `data` and summarize the timings.
///
/// The first resize error aborts the run.
pub fn run(
    backend: &impl ImageBackend,
    data: &[u8],
    config: &BenchConfig,
) -> Result<TimerStats, BenchError> {
    run_with_progress(backend, data, config, |_| {})
}

/// [`run`], calling `on_tick` with the stats so far every
/// [`progress_interval`](BenchConfig::progress_interval).
pub fn run_with_progress<F>(
    backend: &impl ImageBackend,
    data: &[u8],
    config: &BenchConfig,
    on_tick: F,
) -> Result<TimerStats, BenchError>
where
    F: Fn(&TimerStats) + Sync,
{
    if config.sizes.is_empty() {
        return Err(BenchError::NoSizes);
    }
    if config.algorithms.is_empty() {
        return Err(BenchError::NoAlgorithms);
    }

    let jobs = config.jobs();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;
    tracing::debug!(
        jobs = jobs.len(),
        workers = pool.current_num_threads(),
        "starting benchmark"
    );

    let started = Instant::now();
    let samples = Mutex::new(Vec::<Duration>::with_capacity(jobs.len()));
    let snapshot = || {
        let durations = samples.lock().unwrap_or_else(PoisonError::into_inner);
        TimerStats::from_durations(&durations, started.elapsed())
    };

    let (snapshot, on_tick) = (&snapshot, &on_tick);

    let outcome = std::thread::scope(|scope| {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        if let Some(interval) = config.progress_interval {
            scope.spawn(move || {
                // Ticks until the sender below is dropped.
                while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                    on_tick(&snapshot());
                }
            });
        }

        let outcome = pool.install(|| {
            jobs.par_iter().try_for_each(|options| {
                let t = Instant::now();
                resize(backend, data, options)?;
                let elapsed = t.elapsed();
                samples
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(elapsed);
                Ok::<(), ResizeError>(())
            })
        });
        drop(stop_tx);
        outcome
    });
    outcome?;

    let wall = started.elapsed();
    let durations = samples.into_inner().unwrap_or_else(PoisonError::into_inner);
    Ok(TimerStats::from_durations(&durations, wall))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Gravity;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn parse_default_sizes() {
        let sizes = parse_sizes(DEFAULT_SIZES).unwrap();
        assert_eq!(
            sizes,
            vec![
                TargetSpec::new(200, 200),
                TargetSpec::new(400, 180),
                TargetSpec::new(800, 600),
            ]
        );
    }

    #[test]
    fn parse_sizes_tolerates_spaces_and_zero_axis() {
        let sizes = parse_sizes(" 300X0 , 0x100,").unwrap();
        assert_eq!(sizes, vec![TargetSpec::new(300, 0), TargetSpec::new(0, 100)]);
    }

    #[test]
    fn parse_sizes_rejects_bad_entries() {
        assert!(matches!(parse_sizes(""), Err(BenchError::NoSizes)));
        assert!(matches!(parse_sizes(" , "), Err(BenchError::NoSizes)));
        assert!(matches!(parse_sizes("200"), Err(BenchError::InvalidSize(_))));
        assert!(matches!(parse_sizes("200xabc"), Err(BenchError::InvalidSize(_))));
        assert!(matches!(parse_sizes("-1x5"), Err(BenchError::InvalidSize(_))));
    }

    #[test]
    fn parse_algorithms_lists() {
        assert_eq!(
            parse_algorithms(DEFAULT_ALGORITHMS).unwrap(),
            vec![Algorithm::Fit, Algorithm::Fill]
        );
        assert_eq!(parse_algorithms("FILL").unwrap(), vec![Algorithm::Fill]);
        assert!(matches!(parse_algorithms(""), Err(BenchError::NoAlgorithms)));
        let err = parse_algorithms("fit,stretch").unwrap_err();
        assert!(err.to_string().contains("stretch"));
    }

    #[test]
    fn jobs_cover_full_grid() {
        let config = BenchConfig {
            times: 3,
            workers: 1,
            sizes: parse_sizes("10x10,20x20").unwrap(),
            algorithms: vec![Algorithm::Fit, Algorithm::Fill],
            base: RenderOptions::default().with_gravity(Gravity::East),
            progress_interval: None,
        };
        let jobs = config.jobs();
        assert_eq!(jobs.len(), 12);
        assert!(jobs.iter().all(|j| j.gravity == Gravity::East));
        assert_eq!(jobs[1].algorithm, Algorithm::Fill);
        assert_eq!(jobs[2].target, TargetSpec::new(20, 20));
    }

    #[test]
    fn stats_of_empty_run() {
        assert_eq!(
            TimerStats::from_durations(&[], Duration::ZERO),
            TimerStats::default()
        );
    }

    #[test]
    fn stats_basic_values() {
        let durations = [ms(10), ms(20), ms(30), ms(40)];
        let stats = TimerStats::from_durations(&durations, Duration::from_secs(2));
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, ms(10));
        assert_eq!(stats.max, ms(40));
        assert!((stats.mean.as_secs_f64() - 0.025).abs() < 1e-9);
        // sqrt(125) ms
        assert!((stats.std_dev.as_secs_f64() - 0.011_180_34).abs() < 1e-6);
        assert!((stats.rate - 2.0).abs() < 1e-9);
        // Few samples: the 99th percentile is the max
        assert_eq!(stats.p99, ms(40));
    }

    #[test]
    fn percentile_interpolates() {
        let sorted: Vec<f64> = (1..=200).map(f64::from).collect();
        // pos = 0.99 * 201 = 198.99 → between 198 and 199
        assert!((percentile(&sorted, 0.99) - 198.99).abs() < 1e-9);
        assert_eq!(percentile(&[5.0], 0.99), 5.0);
    }

    #[test]
    fn stats_serialize_as_millis() {
        let stats = TimerStats::from_durations(&[ms(5)], Duration::from_secs(1));
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["count"], 1);
        assert!((json["mean"].as_f64().unwrap() - 5.0).abs() < 1e-9);
        assert!((json["rate"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn run_with_mock_counts_every_job() {
        let backend = MockBackend::with_source(800, 600);
        let config = BenchConfig {
            times: 2,
            workers: 2,
            sizes: parse_sizes("200x200,400x180").unwrap(),
            algorithms: vec![Algorithm::Fit, Algorithm::Fill],
            base: RenderOptions::default(),
            progress_interval: None,
        };
        let stats = run(&backend, b"fake", &config).unwrap();
        assert_eq!(stats.count, 8);
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);

        let encodes = backend
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Encode { .. }))
            .count();
        assert_eq!(encodes, 8);
    }

    #[test]
    fn progress_ticks_report_running_counts() {
        let backend = MockBackend::with_source(800, 600);
        let config = BenchConfig {
            times: 400,
            workers: 2,
            sizes: parse_sizes("200x200,400x180").unwrap(),
            algorithms: vec![Algorithm::Fit, Algorithm::Fill],
            base: RenderOptions::default(),
            progress_interval: Some(Duration::from_millis(1)),
        };
        let ticks = Mutex::new(Vec::new());
        let stats = run_with_progress(&backend, b"fake", &config, |s| {
            ticks.lock().unwrap().push(s.count);
        })
        .unwrap();
        assert_eq!(stats.count, 1600);

        let ticks = ticks.into_inner().unwrap();
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]), "{ticks:?}");
        assert!(ticks.iter().all(|&count| count <= stats.count));
    }

    #[test]
    fn no_ticks_without_interval() {
        let backend = MockBackend::with_source(80, 60);
        let config = BenchConfig {
            times: 5,
            workers: 1,
            sizes: parse_sizes("20x20").unwrap(),
            algorithms: vec![Algorithm::Fill],
            base: RenderOptions::default(),
            progress_interval: None,
        };
        let ticks = Mutex::new(0);
        let stats = run_with_progress(&backend, b"fake", &config, |_| {
            *ticks.lock().unwrap() += 1;
        })
        .unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(ticks.into_inner().unwrap(), 0);
    }

    #[test]
    fn run_aborts_on_resize_error() {
        let backend = MockBackend::with_source(800, 600).failing_encode();
        let config = BenchConfig {
            times: 1,
            workers: 1,
            sizes: parse_sizes("10x10").unwrap(),
            algorithms: vec![Algorithm::Fit],
            base: RenderOptions::default(),
            progress_interval: None,
        };
        assert!(matches!(
            run(&backend, b"fake", &config),
            Err(BenchError::Resize(ResizeError::EncodeFailure(_)))
        ));
    }

    #[test]
    fn run_rejects_empty_grid() {
        let backend = MockBackend::with_source(10, 10);
        let config = BenchConfig {
            times: 1,
            workers: 1,
            sizes: Vec::new(),
            algorithms: vec![Algorithm::Fit],
            base: RenderOptions::default(),
            progress_interval: None,
        };
        assert!(matches!(
            run(&backend, b"fake", &config),
            Err(BenchError::NoSizes)
        ));
    }
}
