use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Read-only access to a single-channel intensity field.
///
/// Both the offset search and the compositor are generic over this trait, so
/// anything that can hand out a full-range sample per pixel can be aligned.
pub trait IntensitySampler: Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Intensity at column `x`, row `y`. Callers keep coordinates in bounds.
    fn sample(&self, x: usize, y: usize) -> u16;

    fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }
}

/// A single decoded plate (one colour exposure).
/// Pixel values are full-range u16 intensities.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u16>,
}

impl Frame {
    pub fn new(data: Array2<u16>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

impl IntensitySampler for Frame {
    fn width(&self) -> usize {
        self.data.ncols()
    }

    fn height(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    fn sample(&self, x: usize, y: usize) -> u16 {
        self.data[[y, x]]
    }
}

/// Integer translation applied to a plate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub dx: i64,
    pub dy: i64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0, dy: 0 };

    pub fn new(dx: i64, dy: i64) -> Self {
        Self { dx, dy }
    }
}

impl std::ops::Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

impl std::fmt::Display for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.dx, self.dy)
    }
}

/// Best offset found for an ordered pair of plates, with its residual.
///
/// `distance` is the mean absolute intensity difference over the sample
/// block at `offset`; lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub offset: Offset,
    pub distance: f64,
}

impl AlignmentResult {
    pub fn new(dx: i64, dy: i64, distance: f64) -> Self {
        Self {
            offset: Offset::new(dx, dy),
            distance,
        }
    }
}

/// One of the three ordered plate pairs `(i, (i + 1) % 3)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pair {
    ZeroOne,
    OneTwo,
    TwoZero,
}

impl Pair {
    pub const ALL: [Pair; 3] = [Pair::ZeroOne, Pair::OneTwo, Pair::TwoZero];

    /// Plate indices `(first, second)` of the pair.
    pub fn indices(self) -> (usize, usize) {
        match self {
            Pair::ZeroOne => (0, 1),
            Pair::OneTwo => (1, 2),
            Pair::TwoZero => (2, 0),
        }
    }

    pub fn index(self) -> usize {
        self.indices().0
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (a, b) = self.indices();
        write!(f, "#{a}<->#{b}")
    }
}

/// Where a pairwise estimate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EstimateOrigin {
    Searched,
    Hinted,
}

impl std::fmt::Display for EstimateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Searched => write!(f, "searched"),
            Self::Hinted => write!(f, "hint"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairEstimate {
    pub pair: Pair,
    pub result: AlignmentResult,
    pub origin: EstimateOrigin,
}

/// The three pairwise estimates of a closed plate triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    estimates: [PairEstimate; 3],
}

impl Triangle {
    /// Build a triangle from results for pairs (0,1), (1,2), (2,0), in that order.
    pub fn from_results(results: [AlignmentResult; 3], origin: EstimateOrigin) -> Self {
        let estimates = Pair::ALL.map(|pair| PairEstimate {
            pair,
            result: results[pair.index()],
            origin,
        });
        Self { estimates }
    }

    pub fn from_estimates(estimates: [PairEstimate; 3]) -> Self {
        let mut ordered = estimates;
        ordered.sort_by_key(|e| e.pair.index());
        Self { estimates: ordered }
    }

    pub fn get(&self, pair: Pair) -> &PairEstimate {
        &self.estimates[pair.index()]
    }

    pub fn result(&self, pair: Pair) -> AlignmentResult {
        self.estimates[pair.index()].result
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairEstimate> {
        self.estimates.iter()
    }
}
