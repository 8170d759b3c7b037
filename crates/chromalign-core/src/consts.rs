/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of plates combined into one composite (R, G, B).
pub const PLATE_COUNT: usize = 3;

/// Default half-width of the offset search range, in pixels.
/// 64 gives 64+64+1 = 129 candidates per axis.
pub const DEFAULT_SEARCH_RANGE: usize = 64;

/// Default half-size of the sample block scored for every candidate.
/// 200 gives a 400x400 block.
pub const DEFAULT_BLOCK_HALF_SIZE: usize = 200;

/// Largest magnitude accepted for the per-channel bit shift.
pub const MAX_PIXEL_SHIFT: i32 = 31;

/// Largest representable sample value at 8 bits per channel.
pub const MAX_VALUE_8: u64 = u8::MAX as u64;

/// Largest representable sample value at 16 bits per channel.
pub const MAX_VALUE_16: u64 = u16::MAX as u64;
