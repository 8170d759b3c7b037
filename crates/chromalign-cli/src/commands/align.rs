use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use chromalign_core::align::PairHints;
use chromalign_core::composite::{BitDepth, PixelTransform};
use chromalign_core::frame::{AlignmentResult, Pair};
use chromalign_core::pipeline::config::AlignConfig;
use chromalign_core::pipeline::run_alignment_reported;

use super::{parse_bit_depth, parse_hint, WindowArgs};
use crate::progress::BarReporter;
use crate::summary::{print_align_summary, print_report};

#[derive(Args)]
pub struct AlignArgs {
    /// Plate for the red channel (#0)
    pub red: PathBuf,

    /// Plate for the green channel (#1)
    pub green: PathBuf,

    /// Plate for the blue channel (#2)
    pub blue: PathBuf,

    /// Output file path; format follows the extension (png, tif, jpg, gif, bmp)
    #[arg(short, long, default_value = "aligned.png")]
    pub output: PathBuf,

    /// Alignment config file (TOML); replaces the window, output and hint flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Output bits per channel (8 or 16)
    #[arg(long, env = "BITS", default_value = "16", value_parser = parse_bit_depth)]
    pub bits: BitDepth,

    /// Per-channel bit shift: positive shifts right, negative shifts left
    #[arg(
        long,
        env = "SHIFT",
        default_value_t = 0,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i32).range(-31..=31)
    )]
    pub shift: i32,

    /// Known offset for plates #0 and #1 as "dx,dy,distance"; skips that search
    #[arg(long = "hint01", value_parser = parse_hint, allow_hyphen_values = true)]
    pub hint01: Option<AlignmentResult>,

    /// Known offset for plates #1 and #2 as "dx,dy,distance"; skips that search
    #[arg(long = "hint12", value_parser = parse_hint, allow_hyphen_values = true)]
    pub hint12: Option<AlignmentResult>,

    /// Known offset for plates #2 and #0 as "dx,dy,distance"; skips that search
    #[arg(long = "hint20", value_parser = parse_hint, allow_hyphen_values = true)]
    pub hint20: Option<AlignmentResult>,
}

pub fn run(args: &AlignArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let mut config: AlignConfig = toml::from_str(&contents).context("Invalid alignment config")?;
        config.inputs = [args.red.clone(), args.green.clone(), args.blue.clone()];
        config
    } else {
        build_config_from_args(args)
    };
    config.validate()?;
    tracing::debug!(?config, "Resolved alignment config");

    print_align_summary(&config);

    let started = Instant::now();
    let reporter = Arc::new(BarReporter::new()?);
    let report = run_alignment_reported(&config, reporter.clone())
        .with_context(|| format!("Failed to align into {}", config.output.display()))?;
    reporter.finish();

    print_report(&report, &config, started.elapsed());
    Ok(())
}

fn build_config_from_args(args: &AlignArgs) -> AlignConfig {
    let mut hints = PairHints::default();
    hints.set(Pair::ZeroOne, args.hint01);
    hints.set(Pair::OneTwo, args.hint12);
    hints.set(Pair::TwoZero, args.hint20);

    AlignConfig {
        inputs: [args.red.clone(), args.green.clone(), args.blue.clone()],
        output: args.output.clone(),
        workers: args.window.workers,
        channel: args.window.channel.into(),
        search: args.window.search_config(),
        transform: PixelTransform {
            bit_depth: args.bits,
            shift: args.shift,
        },
        hints,
    }
}
