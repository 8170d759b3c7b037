use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::align::{PairHints, SearchWindow};
use crate::composite::PixelTransform;
use crate::consts::{DEFAULT_BLOCK_HALF_SIZE, DEFAULT_SEARCH_RANGE};
use crate::error::{ChromalignError, Result};
use crate::io::image_io::SampleChannel;

/// Everything needed for one alignment run.
///
/// Plain values come before the tables so the struct serializes to TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Plates for the red, green and blue channels, in that order.
    pub inputs: [PathBuf; 3],
    pub output: PathBuf,
    /// Worker budget; defaults to the available hardware parallelism.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(default)]
    pub channel: SampleChannel,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub transform: PixelTransform,
    #[serde(default)]
    pub hints: PairHints,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            inputs: [
                PathBuf::from("red.png"),
                PathBuf::from("green.png"),
                PathBuf::from("blue.png"),
            ],
            output: PathBuf::from("aligned.png"),
            workers: None,
            channel: SampleChannel::default(),
            search: SearchConfig::default(),
            transform: PixelTransform::default(),
            hints: PairHints::default(),
        }
    }
}

impl AlignConfig {
    /// Reject parameters that are invalid regardless of the plates.
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(ChromalignError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        self.search.validate()?;
        self.transform.validate()?;
        Ok(())
    }

    pub fn worker_budget(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }
}

/// Detected hardware parallelism, or 1 when it cannot be queried.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Search window geometry as configured. The center defaults to the middle
/// of the first plate once its size is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_x: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_y: Option<usize>,
    #[serde(default = "default_range")]
    pub range_x: usize,
    #[serde(default = "default_range")]
    pub range_y: usize,
    /// Half-width of the sample block.
    #[serde(default = "default_size")]
    pub size_x: usize,
    /// Half-height of the sample block.
    #[serde(default = "default_size")]
    pub size_y: usize,
}

fn default_range() -> usize {
    DEFAULT_SEARCH_RANGE
}
fn default_size() -> usize {
    DEFAULT_BLOCK_HALF_SIZE
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            center_x: None,
            center_y: None,
            range_x: DEFAULT_SEARCH_RANGE,
            range_y: DEFAULT_SEARCH_RANGE,
            size_x: DEFAULT_BLOCK_HALF_SIZE,
            size_y: DEFAULT_BLOCK_HALF_SIZE,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size_x == 0 || self.size_y == 0 {
            return Err(ChromalignError::InvalidConfig(format!(
                "sample block size must be >= 1, got ({}, {})",
                self.size_x, self.size_y
            )));
        }
        Ok(())
    }

    /// Concrete window for plates whose first member is `width` x `height`.
    pub fn window_for(&self, width: usize, height: usize) -> SearchWindow {
        SearchWindow {
            center_x: self.center_x.unwrap_or(width / 2),
            center_y: self.center_y.unwrap_or(height / 2),
            range_x: self.range_x,
            range_y: self.range_y,
            half_x: self.size_x,
            half_y: self.size_y,
        }
    }
}
