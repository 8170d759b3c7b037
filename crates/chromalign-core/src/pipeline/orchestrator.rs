use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::align::{estimate_triangle, resolve, BruteForceSearch, OffsetSearch};
use crate::composite::composite;
use crate::error::Result;
use crate::frame::{Frame, IntensitySampler};
use crate::io::image_io::{load_frames, CanvasSink, FileSink};

use super::config::AlignConfig;
use super::types::{AlignmentReport, NoOpReporter, PipelineStage, ProgressReporter};

/// Align three decoded plates: pairwise search, triangulation, compositing.
///
/// Nothing is written; the report carries the finished canvas.
pub fn align_frames<S>(
    frames: [&Frame; 3],
    config: &AlignConfig,
    searcher: &S,
    reporter: &dyn ProgressReporter,
) -> Result<AlignmentReport>
where
    S: OffsetSearch + ?Sized,
{
    config.validate()?;
    let workers = config.worker_budget();
    let window = config.search.window_for(frames[0].width(), frames[0].height());
    info!(
        center_x = window.center_x,
        center_y = window.center_y,
        range_x = window.range_x,
        range_y = window.range_y,
        size_x = window.half_x,
        size_y = window.half_y,
        workers,
        "Search window"
    );

    let pending = config.hints.missing().len();
    reporter.begin_stage(PipelineStage::Searching, Some(pending));
    let started = Instant::now();
    let pairwise = estimate_triangle(frames, &window, &config.hints, searcher, workers, |done| {
        reporter.advance(done)
    })?;
    info!(
        searched = pending,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Pairwise offsets estimated"
    );
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Resolving, None);
    let dims = frames.map(|f| f.dimensions());
    let registration = resolve(&pairwise.triangle, dims);
    info!(
        anchor = %registration.anchor,
        offset_0 = %registration.offsets[0],
        offset_1 = %registration.offsets[1],
        offset_2 = %registration.offsets[2],
        width = registration.canvas_width,
        height = registration.canvas_height,
        "Offsets resolved"
    );
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Compositing, None);
    let started = Instant::now();
    let result = composite(frames, &registration, &config.transform)?;
    info!(
        bit_depth = %config.transform.bit_depth,
        shift = config.transform.shift,
        mean_intensity = result.mean_intensity,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Composite complete"
    );
    reporter.finish_stage();

    Ok(AlignmentReport {
        window,
        triangle: pairwise.triangle,
        warnings: pairwise.warnings,
        registration,
        canvas: result.canvas,
        mean_intensity: result.mean_intensity,
    })
}

/// Run the full alignment with a thread-safe progress reporter:
/// load the plates, align them, and hand the canvas to `sink`.
pub fn run_alignment_into<K>(
    config: &AlignConfig,
    sink: &K,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<AlignmentReport>
where
    K: CanvasSink + ?Sized,
{
    config.validate()?;

    reporter.begin_stage(PipelineStage::Loading, Some(config.inputs.len()));
    let started = Instant::now();
    let frames = load_frames(&config.inputs, config.channel)?;
    info!(
        channel = %config.channel,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Plates loaded"
    );
    reporter.finish_stage();

    let [red, green, blue] = &frames;
    let report = align_frames([red, green, blue], config, &BruteForceSearch, reporter.as_ref())?;

    reporter.begin_stage(PipelineStage::Writing, None);
    let started = Instant::now();
    sink.write(&report.canvas)?;
    info!(
        output = %config.output.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Output saved"
    );
    reporter.finish_stage();

    Ok(report)
}

/// Run the full alignment, writing to `config.output`.
pub fn run_alignment_reported(
    config: &AlignConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<AlignmentReport> {
    run_alignment_into(config, &FileSink::new(&config.output), reporter)
}

/// Run the full alignment without progress reporting.
pub fn run_alignment(config: &AlignConfig) -> Result<AlignmentReport> {
    run_alignment_reported(config, Arc::new(NoOpReporter))
}
