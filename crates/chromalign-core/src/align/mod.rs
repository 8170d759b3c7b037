pub mod pairwise;
pub mod search;
pub mod triangulate;
pub mod window;

pub use pairwise::{estimate_triangle, EdgeWarning, PairHints, PairwiseOutcome};
pub use search::{search_offset, BruteForceSearch, OffsetSearch};
pub use triangulate::{resolve, Registration};
pub use window::{RangeEdge, SearchWindow};
