use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use trez::config::{self, ResizeConfig};
use trez::imaging::{
    Algorithm, Background, Gravity, RenderOptions, RustBackend, Sharpening, resize_path,
};
use trez::{batch, bench, output};

/// Resize options shared by `resize` and `batch`.
///
/// Anything left unset falls back to the `[resize]` section of the config.
#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Target width in pixels (0 = keep source width)
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Target height in pixels (0 = keep source height)
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Layout strategy: fit or fill
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Anchor: center, north, south, west, east, northwest, northeast, southwest, southeast
    #[arg(long)]
    gravity: Option<Gravity>,

    /// Letterbox color for fit
    #[arg(long, value_name = "R,G,B")]
    background: Option<Background>,

    /// JPEG quality (1-100, 0 = default)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: Option<u32>,

    /// Unsharp mask strength in percent
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
    sharpen_amount: Option<i32>,

    /// Unsharp mask blur sigma (0-20)
    #[arg(long, value_parser = parse_sharpen_radius)]
    sharpen_radius: Option<f64>,
}

fn parse_sharpen_radius(value: &str) -> Result<f64, String> {
    let radius: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if radius < 0.0 || !Sharpening::accepts_radius(radius) {
        return Err(format!(
            "must be a number between 0 and {}",
            Sharpening::MAX_RADIUS
        ));
    }
    Ok(radius)
}

impl RenderArgs {
    fn render_options(&self, defaults: &ResizeConfig) -> RenderOptions {
        let mut options = defaults.render_options(self.width, self.height);
        if let Some(algorithm) = self.algorithm {
            options.algorithm = algorithm;
        }
        if let Some(gravity) = self.gravity {
            options.gravity = gravity;
        }
        if let Some(background) = self.background {
            options.background = background;
        }
        if let Some(quality) = self.quality {
            options.quality = quality;
        }
        if let Some(amount) = self.sharpen_amount {
            options.sharpen_amount = amount;
        }
        if let Some(radius) = self.sharpen_radius {
            options.sharpen_radius = radius;
        }
        options
    }
}

fn version_string() -> &'static str {
    let build_id = env!("TREZ_BUILD_ID");
    if build_id.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} ({build_id})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "trez")]
#[command(about = "Resize images to an exact canvas with fit/fill layouts")]
#[command(long_about = "\
Resize images to an exact canvas with fit/fill layouts

Algorithms:

  fit   Scale the whole image inside WIDTHxHEIGHT and pad the rest with
        the background color. Nothing is cut off.
  fill  Scale the image to cover WIDTHxHEIGHT and crop the overflow.
        No padding is added.

Gravity picks where the image sits (fit) or which part is kept (fill):

  northwest  north  northeast
  west       center east
  southwest  south  southeast

A width or height of 0 keeps the source's size on that axis. Output is
always JPEG.

Run 'trez gen-config' to generate a documented trez.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file = built-in defaults)
    #[arg(long, default_value = "trez.toml", global = true)]
    config: PathBuf,

    /// Log layout decisions and per-file progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize one image and write it as JPEG
    Resize {
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output_path: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Resize every image under a directory into a mirrored output tree
    Batch {
        source: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output_dir: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Time repeated resizes of one file over a grid of sizes and algorithms
    Bench {
        file: PathBuf,
        /// Repetitions of the size/algorithm grid
        #[arg(long, default_value_t = 100)]
        times: usize,
        /// Worker threads (default: processing.max_processes, else CPU cores)
        #[arg(long)]
        workers: Option<usize>,
        /// Comma-separated WIDTHxHEIGHT list
        #[arg(long, default_value = bench::DEFAULT_SIZES)]
        sizes: String,
        /// Comma-separated algorithm list
        #[arg(long, default_value = bench::DEFAULT_ALGORITHMS)]
        algorithms: String,
        /// Print timings as JSON (durations in milliseconds). Disables the
        /// once-a-second progress lines.
        #[arg(long)]
        json: bool,
    },
    /// Print a stock trez.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Resize {
            input,
            output_path,
            render,
        } => {
            let trez_config = config::load_config(&cli.config)?;
            let options = render.render_options(&trez_config.resize);
            let resized = resize_path(&RustBackend::new(), &input, &options)?;
            if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, &resized.data)?;
            output::print_resize_result(&input, &output_path, &resized);
        }
        Command::Batch {
            source,
            output_dir,
            render,
        } => {
            let trez_config = config::load_config(&cli.config)?;
            init_thread_pool(&trez_config.processing);
            let options = render.render_options(&trez_config.resize);
            let (tx, rx) = std::sync::mpsc::channel();
            let source_root = source.clone();
            let output_root = output_dir.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    println!(
                        "{}",
                        output::format_batch_event(&event, &source_root, &output_root)
                    );
                }
            });
            let result = batch::batch(&source, &output_dir, &options, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_batch_summary(&result?);
        }
        Command::Bench {
            file,
            times,
            workers,
            sizes,
            algorithms,
            json,
        } => {
            let trez_config = config::load_config(&cli.config)?;
            let data = std::fs::read(&file)?;
            let bench_config = bench::BenchConfig {
                times,
                workers: workers
                    .unwrap_or_else(|| config::effective_threads(&trez_config.processing)),
                sizes: bench::parse_sizes(&sizes)?,
                algorithms: bench::parse_algorithms(&algorithms)?,
                base: trez_config.resize.render_options(0, 0),
                progress_interval: (!json).then_some(Duration::from_secs(1)),
            };
            tracing::info!(
                workers = bench_config.workers,
                jobs = bench_config.jobs().len(),
                "benchmarking {}",
                file.display()
            );
            let stats = bench::run_with_progress(
                &RustBackend::new(),
                &data,
                &bench_config,
                output::print_bench_stats,
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                output::print_bench_stats(&stats);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `--verbose` forces debug output for this crate; otherwise `RUST_LOG`
/// applies, defaulting to warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("trez=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
