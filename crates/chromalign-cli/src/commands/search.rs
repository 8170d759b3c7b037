use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use chromalign_core::align::{search_offset, SearchWindow};
use chromalign_core::frame::Offset;
use chromalign_core::io::image_io::load_frame;
use chromalign_core::pipeline::config::default_workers;
use indicatif::{ProgressBar, ProgressStyle};

use super::WindowArgs;
use crate::summary::{print_edge_warnings, print_search_result};

#[derive(Args)]
pub struct SearchArgs {
    /// Reference plate
    pub first: PathBuf,

    /// Plate whose offset relative to the first is searched
    pub second: PathBuf,

    #[command(flatten)]
    pub window: WindowArgs,
}

pub fn run(args: &SearchArgs) -> Result<()> {
    let channel = args.window.channel.into();
    let first = load_frame(&args.first, channel)
        .with_context(|| format!("Failed to load {}", args.first.display()))?;
    let second = load_frame(&args.second, channel)
        .with_context(|| format!("Failed to load {}", args.second.display()))?;

    println!(
        "Loaded {}x{} and {}x{} plates",
        first.width(),
        first.height(),
        second.width(),
        second.height()
    );

    let search = args.window.search_config();
    search.validate()?;
    let window = search.window_for(first.width(), first.height());
    window.validate_pair(&first, &second)?;
    let workers = args.window.workers.unwrap_or_else(default_workers);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} {elapsed}")?);
    spinner.set_message(format!(
        "Scoring {} offsets on {} workers",
        window.candidate_count(),
        workers
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let started = Instant::now();
    let result = search_offset(&first, &second, &window, workers);
    spinner.finish_and_clear();
    let result = result?;

    print_search_result(&result, &window, started.elapsed());

    let warnings = edge_messages(&window, result.offset);
    print_edge_warnings(warnings.as_slice());

    Ok(())
}

/// Edge warnings for a standalone search, which has no plate numbering.
fn edge_messages(window: &SearchWindow, offset: Offset) -> Vec<String> {
    window
        .edges_hit(offset)
        .into_iter()
        .map(|edge| format!("best offset {}", edge.advice(window.edge_range(edge))))
        .collect()
}
