use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ChromalignError, Result};
use crate::frame::{AlignmentResult, EstimateOrigin, Frame, Pair, PairEstimate, Triangle};

use super::search::OffsetSearch;
use super::window::{RangeEdge, SearchWindow};

/// Precomputed pairwise results that replace the corresponding search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_one: Option<AlignmentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_two: Option<AlignmentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_zero: Option<AlignmentResult>,
}

impl PairHints {
    pub fn get(&self, pair: Pair) -> Option<AlignmentResult> {
        match pair {
            Pair::ZeroOne => self.zero_one,
            Pair::OneTwo => self.one_two,
            Pair::TwoZero => self.two_zero,
        }
    }

    pub fn set(&mut self, pair: Pair, hint: Option<AlignmentResult>) {
        match pair {
            Pair::ZeroOne => self.zero_one = hint,
            Pair::OneTwo => self.one_two = hint,
            Pair::TwoZero => self.two_zero = hint,
        }
    }

    /// Pairs without a hint, i.e. the ones that must be searched.
    pub fn missing(&self) -> Vec<Pair> {
        Pair::ALL
            .into_iter()
            .filter(|&pair| self.get(pair).is_none())
            .collect()
    }
}

/// A searched offset that landed on the boundary of the search range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeWarning {
    pub pair: Pair,
    pub edge: RangeEdge,
    pub range: usize,
}

impl std::fmt::Display for EdgeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (a, b) = self.pair.indices();
        write!(f, "aligning #{a} to #{b} {}", self.edge.advice(self.range))
    }
}

#[derive(Clone, Debug)]
pub struct PairwiseOutcome {
    pub triangle: Triangle,
    pub warnings: Vec<EdgeWarning>,
}

/// Worker budget for each of `searches` concurrent searches sharing `total`.
pub fn split_budget(total: usize, searches: usize) -> usize {
    if searches == 0 {
        return total.max(1);
    }
    (total / searches).max(1)
}

/// Estimate all three pairwise offsets of the plate triangle.
///
/// Hinted pairs are taken verbatim and never searched. Every pair that needs
/// a search is validated against the window before any search starts; the
/// searches then run concurrently, sharing `workers` between them, or one
/// after another when there are fewer workers than searches. At most
/// `workers` search threads are busy at any moment.
/// `on_pair_done` receives the number of searches finished so far.
pub fn estimate_triangle<S, F>(
    frames: [&Frame; 3],
    window: &SearchWindow,
    hints: &PairHints,
    searcher: &S,
    workers: usize,
    on_pair_done: F,
) -> Result<PairwiseOutcome>
where
    S: OffsetSearch + ?Sized,
    F: Fn(usize) + Send + Sync,
{
    if workers == 0 {
        return Err(ChromalignError::InvalidConfig(
            "worker budget must be at least 1".into(),
        ));
    }

    let pending = hints.missing();
    for pair in &pending {
        let (i, j) = pair.indices();
        window.validate_pair(frames[i], frames[j])?;
    }

    // Fewer workers than searches: run one search at a time with the whole
    // budget instead of oversubscribing.
    let sequential = workers < pending.len();
    let per_search = if sequential {
        workers
    } else {
        split_budget(workers, pending.len())
    };
    let counter = AtomicUsize::new(0);

    let search_pair = |&pair: &Pair| -> Result<(Pair, AlignmentResult)> {
        let (i, j) = pair.indices();
        let started = Instant::now();
        let result = searcher.search(frames[i], frames[j], window, per_search)?;
        info!(
            pair = %pair,
            dx = result.offset.dx,
            dy = result.offset.dy,
            distance = result.distance,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pair aligned"
        );
        let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
        on_pair_done(done);
        Ok((pair, result))
    };

    let searched: Vec<(Pair, AlignmentResult)> = if sequential {
        pending.iter().map(search_pair).collect::<Result<_>>()?
    } else {
        pending.par_iter().map(search_pair).collect::<Result<_>>()?
    };

    let mut warnings = Vec::new();
    for &(pair, result) in &searched {
        for edge in window.edges_hit(result.offset) {
            let warning = EdgeWarning {
                pair,
                edge,
                range: window.edge_range(edge),
            };
            warn!("{warning}");
            warnings.push(warning);
        }
    }

    let estimate = |pair: Pair| -> Result<PairEstimate> {
        if let Some(result) = hints.get(pair) {
            return Ok(PairEstimate {
                pair,
                result,
                origin: EstimateOrigin::Hinted,
            });
        }
        searched
            .iter()
            .find(|(p, _)| *p == pair)
            .map(|&(_, result)| PairEstimate {
                pair,
                result,
                origin: EstimateOrigin::Searched,
            })
            .ok_or_else(|| ChromalignError::InvalidConfig(format!("no estimate for pair {pair}")))
    };

    let triangle = Triangle::from_estimates([
        estimate(Pair::ZeroOne)?,
        estimate(Pair::OneTwo)?,
        estimate(Pair::TwoZero)?,
    ]);

    Ok(PairwiseOutcome { triangle, warnings })
}
