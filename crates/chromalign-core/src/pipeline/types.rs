use crate::align::{EdgeWarning, Registration, SearchWindow};
use crate::composite::Canvas;
use crate::frame::Triangle;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Loading,
    Searching,
    Resolving,
    Compositing,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading plates"),
            Self::Searching => write!(f, "Searching offsets"),
            Self::Resolving => write!(f, "Resolving offsets"),
            Self::Compositing => write!(f, "Compositing"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Everything a finished run produced.
#[derive(Clone, Debug)]
pub struct AlignmentReport {
    pub window: SearchWindow,
    pub triangle: Triangle,
    pub warnings: Vec<EdgeWarning>,
    pub registration: Registration,
    pub canvas: Canvas,
    pub mean_intensity: f64,
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., pairs to search), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_alignment` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
