use serde::{Deserialize, Serialize};

use crate::error::{ChromalignError, Result};
use crate::frame::{IntensitySampler, Offset};

/// Candidate offset space plus the sample block used to score each candidate.
///
/// Candidates cover `[-range_x, range_x] x [-range_y, range_y]`; the block is
/// `[center_x - half_x, center_x + half_x) x [center_y - half_y, center_y + half_y)`
/// in the first plate of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub center_x: usize,
    pub center_y: usize,
    pub range_x: usize,
    pub range_y: usize,
    pub half_x: usize,
    pub half_y: usize,
}

/// Side of the search range a winning offset landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeEdge {
    Left,
    Right,
    Up,
    Down,
}

impl std::fmt::Display for RangeEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

impl RangeEdge {
    pub fn axis(self) -> char {
        match self {
            Self::Left | Self::Right => 'x',
            Self::Up | Self::Down => 'y',
        }
    }

    /// Advice for an optimum found on this edge of a `range` px search range,
    /// phrased without naming the plates involved.
    pub fn advice(self, range: usize) -> String {
        format!(
            "needed the maximum {range} px shift {self} of the second plate; \
             the optimum may lie outside the searched window, try a larger {} range and block size",
            self.axis()
        )
    }
}

impl SearchWindow {
    /// Number of samples scored per candidate.
    pub fn block_len(&self) -> usize {
        4 * self.half_x * self.half_y
    }

    /// Number of candidate offsets, saturating for ranges no plate can hold.
    pub fn candidate_count(&self) -> usize {
        let side = |range: usize| range.saturating_mul(2).saturating_add(1);
        side(self.range_x).saturating_mul(side(self.range_y))
    }

    /// Range limit along the axis of `edge`.
    pub fn edge_range(&self, edge: RangeEdge) -> usize {
        match edge {
            RangeEdge::Left | RangeEdge::Right => self.range_x,
            RangeEdge::Up | RangeEdge::Down => self.range_y,
        }
    }

    /// Check that every sample read for every candidate lies inside both
    /// plates of size `(width, height)`.
    pub fn validate(&self, dims_a: (usize, usize), dims_b: (usize, usize)) -> Result<()> {
        if self.half_x == 0 || self.half_y == 0 {
            return Err(ChromalignError::InvalidConfig(format!(
                "sample block half size must be >= 1, got ({}, {})",
                self.half_x, self.half_y
            )));
        }
        let min_w = dims_a.0.min(dims_b.0);
        let min_h = dims_a.1.min(dims_b.1);
        check_axis('x', self.center_x, self.range_x, self.half_x, min_w)?;
        check_axis('y', self.center_y, self.range_y, self.half_y, min_h)?;
        Ok(())
    }

    pub fn validate_pair<A, B>(&self, a: &A, b: &B) -> Result<()>
    where
        A: IntensitySampler + ?Sized,
        B: IntensitySampler + ?Sized,
    {
        self.validate(a.dimensions(), b.dimensions())
    }

    /// Range edges touched by `offset`. Empty when the optimum is interior.
    pub fn edges_hit(&self, offset: Offset) -> Vec<RangeEdge> {
        let rx = self.range_x as i64;
        let ry = self.range_y as i64;
        let mut edges = Vec::new();
        if offset.dx == -rx {
            edges.push(RangeEdge::Left);
        }
        if offset.dx == rx {
            edges.push(RangeEdge::Right);
        }
        if offset.dy == -ry {
            edges.push(RangeEdge::Up);
        }
        if offset.dy == ry {
            edges.push(RangeEdge::Down);
        }
        edges
    }
}

fn check_axis(axis: char, center: usize, range: usize, half: usize, limit: usize) -> Result<()> {
    let too_large = || {
        ChromalignError::InvalidConfig(format!(
            "search window on {axis} axis too large: center {center}, range {range}, size {half}"
        ))
    };
    let reach = range.checked_add(half).ok_or_else(too_large)?;
    let far = center.checked_add(reach).ok_or_else(too_large)?;
    if center < reach {
        return Err(ChromalignError::WindowOutOfBounds {
            axis,
            detail: format!(
                "center-range-size={}, it must be >= 0",
                center as i128 - reach as i128
            ),
        });
    }
    if far >= limit {
        return Err(ChromalignError::WindowOutOfBounds {
            axis,
            detail: format!("center+range+size={far}, it must be < {limit}"),
        });
    }
    Ok(())
}
