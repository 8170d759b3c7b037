use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{ChromalignError, Result};
use crate::frame::{AlignmentResult, Frame, IntensitySampler, Offset};

use super::window::SearchWindow;

/// Strategy for estimating the offset of plate `b` relative to plate `a`.
///
/// The pipeline only talks to this trait, so tests and callers can swap the
/// exhaustive search for something else (a cached result, a counter, ...).
pub trait OffsetSearch: Sync {
    fn search(
        &self,
        a: &Frame,
        b: &Frame,
        window: &SearchWindow,
        max_workers: usize,
    ) -> Result<AlignmentResult>;
}

/// Exhaustive mean-absolute-difference search over the whole window.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceSearch;

impl OffsetSearch for BruteForceSearch {
    fn search(
        &self,
        a: &Frame,
        b: &Frame,
        window: &SearchWindow,
        max_workers: usize,
    ) -> Result<AlignmentResult> {
        search_offset(a, b, window, max_workers)
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    distance: f64,
    dx: i64,
    dy: i64,
}

impl Candidate {
    /// Lower distance wins; equal distances fall back to lowest dx, then dy,
    /// so the winner does not depend on which worker reports first.
    fn beats(&self, other: &Candidate) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance && (self.dx, self.dy) < (other.dx, other.dy))
    }
}

fn offer(best: &mut Option<Candidate>, candidate: Candidate) {
    match best {
        Some(current) if !candidate.beats(current) => {}
        _ => *best = Some(candidate),
    }
}

/// Find the integer offset `(dx, dy)` minimising the mean absolute difference
/// between `a(i, j)` and `b(i + dx, j + dy)` over the window's sample block.
///
/// One task per `dx` runs on a dedicated pool of `max_workers` threads, so at
/// most `max_workers` rows of the offset grid are scored at once. Returns after
/// every row has been scored.
pub fn search_offset<A, B>(
    a: &A,
    b: &B,
    window: &SearchWindow,
    max_workers: usize,
) -> Result<AlignmentResult>
where
    A: IntensitySampler + ?Sized,
    B: IntensitySampler + ?Sized,
{
    if max_workers == 0 {
        return Err(ChromalignError::InvalidConfig(
            "worker budget must be at least 1".into(),
        ));
    }
    window.validate_pair(a, b)?;

    let started = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .thread_name(|i| format!("offset-search-{i}"))
        .build()
        .map_err(|e| ChromalignError::ThreadPool(e.to_string()))?;

    let best: Mutex<Option<Candidate>> = Mutex::new(None);
    let rx = window.range_x as i64;
    let ry = window.range_y as i64;

    pool.install(|| {
        (-rx..=rx).into_par_iter().for_each(|dx| {
            let mut row_best = None;
            for dy in -ry..=ry {
                let distance = block_distance(a, b, window, Offset::new(dx, dy));
                offer(&mut row_best, Candidate { distance, dx, dy });
            }
            if let Some(candidate) = row_best {
                let mut shared = best.lock().unwrap_or_else(PoisonError::into_inner);
                offer(&mut shared, candidate);
            }
        });
    });

    let winner = best
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .ok_or_else(|| ChromalignError::InvalidConfig("search window has no candidates".into()))?;

    debug!(
        dx = winner.dx,
        dy = winner.dy,
        distance = winner.distance,
        candidates = window.candidate_count(),
        workers = max_workers,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Offset search complete"
    );

    Ok(AlignmentResult::new(winner.dx, winner.dy, winner.distance))
}

/// Mean absolute difference over the sample block for one candidate offset.
///
/// The window has been validated against both plates, so every coordinate
/// read here is in bounds.
pub fn block_distance<A, B>(a: &A, b: &B, window: &SearchWindow, offset: Offset) -> f64
where
    A: IntensitySampler + ?Sized,
    B: IntensitySampler + ?Sized,
{
    let x0 = window.center_x - window.half_x;
    let x1 = window.center_x + window.half_x;
    let y0 = window.center_y - window.half_y;
    let y1 = window.center_y + window.half_y;

    let mut sum: u64 = 0;
    for j in y0..y1 {
        let j2 = (j as i64 + offset.dy) as usize;
        for i in x0..x1 {
            let i2 = (i as i64 + offset.dx) as usize;
            sum += a.sample(i, j).abs_diff(b.sample(i2, j2)) as u64;
        }
    }
    sum as f64 / window.block_len() as f64
}
