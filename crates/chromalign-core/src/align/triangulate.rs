use crate::frame::{Offset, Pair, Triangle};

/// Absolute plate offsets in one shared frame, plus the output canvas size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Pair whose measurement anchors the other two offsets.
    pub anchor: Pair,
    /// Offset of each plate; the anchor pair's first plate sits at (0, 0).
    pub offsets: [Offset; 3],
    pub canvas_width: usize,
    pub canvas_height: usize,
}

/// Pair with the lowest residual distance. The first minimum in
/// (0,1), (1,2), (2,0) order wins ties.
pub fn anchor_pair(triangle: &Triangle) -> Pair {
    let mut anchor = Pair::ZeroOne;
    for pair in [Pair::OneTwo, Pair::TwoZero] {
        if triangle.result(pair).distance < triangle.result(anchor).distance {
            anchor = pair;
        }
    }
    anchor
}

/// Combine three pairwise estimates into one offset per plate.
///
/// Only two measurements of a closed triangle are independent. The anchor
/// plate takes (0, 0), its partner takes the anchor measurement, and the
/// remaining plate is reached through the other measurement touching the
/// anchor plate. Canvas size is the smallest width and height among `dims`.
pub fn resolve(triangle: &Triangle, dims: [(usize, usize); 3]) -> Registration {
    let anchor = anchor_pair(triangle);
    let o01 = triangle.result(Pair::ZeroOne).offset;
    let o12 = triangle.result(Pair::OneTwo).offset;
    let o20 = triangle.result(Pair::TwoZero).offset;

    let offsets = match anchor {
        Pair::ZeroOne => [Offset::ZERO, o01, -o20],
        Pair::OneTwo => [-o01, Offset::ZERO, o12],
        Pair::TwoZero => [o20, -o12, Offset::ZERO],
    };

    let (canvas_width, canvas_height) = canvas_size(dims);

    Registration {
        anchor,
        offsets,
        canvas_width,
        canvas_height,
    }
}

/// Component-wise minimum of the plate dimensions.
pub fn canvas_size(dims: [(usize, usize); 3]) -> (usize, usize) {
    dims.iter()
        .fold((usize::MAX, usize::MAX), |(w, h), &(dw, dh)| {
            (w.min(dw), h.min(dh))
        })
}
