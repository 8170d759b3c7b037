pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{align_frames, run_alignment, run_alignment_into, run_alignment_reported};
pub use types::{AlignmentReport, PipelineStage, ProgressReporter};
