pub mod align;
pub mod config;
pub mod info;
pub mod search;

use clap::{Args, ValueEnum};
use chromalign_core::composite::BitDepth;
use chromalign_core::consts::{DEFAULT_BLOCK_HALF_SIZE, DEFAULT_SEARCH_RANGE};
use chromalign_core::frame::AlignmentResult;
use chromalign_core::io::image_io::SampleChannel;
use chromalign_core::pipeline::config::SearchConfig;

#[derive(Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Red,
    Green,
    Blue,
    Luma,
}

impl From<ChannelArg> for SampleChannel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Red => SampleChannel::Red,
            ChannelArg::Green => SampleChannel::Green,
            ChannelArg::Blue => SampleChannel::Blue,
            ChannelArg::Luma => SampleChannel::Luma,
        }
    }
}

/// Search window and worker options shared by `align` and `search`.
#[derive(Args)]
pub struct WindowArgs {
    /// How many worker threads to use (defaults to autodetect)
    #[arg(short = 'n', long, env = "N")]
    pub workers: Option<usize>,

    /// X of the sample block center (middle of the first plate if omitted)
    #[arg(long, env = "FROM_X")]
    pub from_x: Option<usize>,

    /// Y of the sample block center (middle of the first plate if omitted)
    #[arg(long, env = "FROM_Y")]
    pub from_y: Option<usize>,

    /// Offsets checked on each side of zero along x (64 gives 129 checks)
    #[arg(long, env = "RANGE_X", default_value_t = DEFAULT_SEARCH_RANGE)]
    pub range_x: usize,

    /// Offsets checked on each side of zero along y
    #[arg(long, env = "RANGE_Y", default_value_t = DEFAULT_SEARCH_RANGE)]
    pub range_y: usize,

    /// Half-width of the block scored per offset (200 gives 400 columns)
    #[arg(long, env = "SIZE_X", default_value_t = DEFAULT_BLOCK_HALF_SIZE)]
    pub size_x: usize,

    /// Half-height of the block scored per offset
    #[arg(long, env = "SIZE_Y", default_value_t = DEFAULT_BLOCK_HALF_SIZE)]
    pub size_y: usize,

    /// Channel of each input file used as the plate intensity
    #[arg(long, value_enum, default_value = "green")]
    pub channel: ChannelArg,
}

impl WindowArgs {
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            center_x: self.from_x,
            center_y: self.from_y,
            range_x: self.range_x,
            range_y: self.range_y,
            size_x: self.size_x,
            size_y: self.size_y,
        }
    }
}

/// Parse a pairwise hint written as `dx,dy,distance`.
pub fn parse_hint(s: &str) -> Result<AlignmentResult, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected 'dx,dy,distance', got '{s}'"));
    }
    let dx = parts[0]
        .parse::<i64>()
        .map_err(|e| format!("invalid dx '{}': {e}", parts[0]))?;
    let dy = parts[1]
        .parse::<i64>()
        .map_err(|e| format!("invalid dy '{}': {e}", parts[1]))?;
    let distance = parts[2]
        .parse::<f64>()
        .map_err(|e| format!("invalid distance '{}': {e}", parts[2]))?;
    if !distance.is_finite() || distance < 0.0 {
        return Err(format!("distance must be a non-negative number, got {distance}"));
    }
    Ok(AlignmentResult::new(dx, dy, distance))
}

/// Format a result so it can be passed back through `parse_hint`.
pub fn format_hint(result: &AlignmentResult) -> String {
    format!(
        "{},{},{}",
        result.offset.dx, result.offset.dy, result.distance
    )
}

pub fn parse_bit_depth(s: &str) -> Result<BitDepth, String> {
    let bits: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("bit depth must be 8 or 16, got '{s}'"))?;
    BitDepth::try_from(bits)
}
