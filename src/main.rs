use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::error::Error;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use histeq_rust::filters::{Histogram, LookupStrategy};
use histeq_rust::{EqualizationPipeline, PipelineConfig, PixelBuffer};

const BAR_WIDTH: u64 = 50;

#[derive(Parser, Debug)]
#[command(
    name = "histeq",
    about = "Convert an image to grayscale and equalize its histogram",
    version
)]
struct Cli {
    /// Image file to process
    image: PathBuf,

    /// Where to write the equalized image (default: <stem>_equalized.png next to the input)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Intensity lookup used when applying the mapping
    #[arg(long = "lookup", value_enum, default_value_t = LookupArg::Dense)]
    lookup: LookupArg,

    /// Print the non-empty histogram bins before and after equalization
    #[arg(long = "histogram")]
    histogram: bool,

    /// Log per-stage details
    #[arg(short = 'v', long = "verbose", conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LookupArg {
    Dense,
    Sparse,
}

impl From<LookupArg> for LookupStrategy {
    fn from(arg: LookupArg) -> Self {
        match arg {
            LookupArg::Dense => LookupStrategy::Dense,
            LookupArg::Sparse => LookupStrategy::Sparse,
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(OsStr::to_str).unwrap_or("image");
    input.with_file_name(format!("{stem}_equalized.png"))
}

fn print_histogram(label: &str, hist: &Histogram) {
    println!("{label} ({} pixels):", hist.total());
    let peak = hist.bins().iter().copied().max().unwrap_or(0).max(1);
    for v in hist.support() {
        let count = hist.count(v);
        let bar = "#".repeat((count * BAR_WIDTH / peak).max(1) as usize);
        println!("  {v:>3} {count:>10} {bar}");
    }
}

fn save_rgba(buffer: &PixelBuffer, path: &Path) -> Result<(), Box<dyn Error>> {
    let rgba = image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.to_packed_vec())
        .ok_or("equalized buffer does not match its dimensions")?;
    rgba.save(path)
        .map_err(|e| format!("failed to save '{}': {e}", path.display()))?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let decoded = image::open(&cli.image)
        .map_err(|e| format!("failed to load '{}': {e}", cli.image.display()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    println!("OK: '{}' loaded ({width}x{height} px)", cli.image.display());

    let buffer = PixelBuffer::from_rgba8(width, height, rgba.into_raw())?;
    let config = PipelineConfig {
        lookup: cli.lookup.into(),
        ..PipelineConfig::default()
    };
    debug!("pipeline config: {config:?}");

    let report = EqualizationPipeline::new(config).run(buffer)?;
    if report.converted {
        info!("converted color image to grayscale");
    } else {
        info!("image is already grayscale");
    }

    println!(
        "before: mean {:.2}  stddev {:.2}",
        report.stats.mean, report.stats.stddev
    );
    println!(
        "after:  mean {:.2}  stddev {:.2}",
        report.equalized_stats.mean, report.equalized_stats.stddev
    );
    println!("mapping covers {} intensities", report.mapping.len());

    if cli.histogram {
        print_histogram("before", &report.histogram);
        print_histogram("after", &report.equalized_histogram);
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.image));
    save_rgba(&report.equalized, &output)?;
    println!("saved '{}'", output.display());

    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
