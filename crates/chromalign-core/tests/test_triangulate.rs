use chromalign_core::align::triangulate::{anchor_pair, canvas_size};
use chromalign_core::align::resolve;
use chromalign_core::frame::{AlignmentResult, EstimateOrigin, Offset, Pair, Triangle};

const DIMS: [(usize, usize); 3] = [(100, 80), (100, 80), (100, 80)];

fn triangle(d01: f64, d12: f64, d20: f64) -> Triangle {
    Triangle::from_results(
        [
            AlignmentResult::new(2, -1, d01),
            AlignmentResult::new(-5, 3, d12),
            AlignmentResult::new(3, -2, d20),
        ],
        EstimateOrigin::Searched,
    )
}

#[test]
fn test_anchor_zero_one() {
    let reg = resolve(&triangle(1.0, 5.0, 9.0), DIMS);
    assert_eq!(reg.anchor, Pair::ZeroOne);
    assert_eq!(reg.offsets[0], Offset::ZERO);
    assert_eq!(reg.offsets[1], Offset::new(2, -1));
    assert_eq!(reg.offsets[2], Offset::new(-3, 2));
}

#[test]
fn test_anchor_one_two() {
    let reg = resolve(&triangle(5.0, 1.0, 9.0), DIMS);
    assert_eq!(reg.anchor, Pair::OneTwo);
    assert_eq!(reg.offsets[0], Offset::new(-2, 1));
    assert_eq!(reg.offsets[1], Offset::ZERO);
    assert_eq!(reg.offsets[2], Offset::new(-5, 3));
}

#[test]
fn test_anchor_two_zero() {
    let reg = resolve(&triangle(5.0, 9.0, 1.0), DIMS);
    assert_eq!(reg.anchor, Pair::TwoZero);
    assert_eq!(reg.offsets[0], Offset::new(3, -2));
    assert_eq!(reg.offsets[1], Offset::new(5, -3));
    assert_eq!(reg.offsets[2], Offset::ZERO);
}

#[test]
fn test_consistent_triangle_gives_same_relative_offsets_for_every_anchor() {
    // o01 + o12 + o20 == 0, so all anchors describe the same registration
    // up to a common translation.
    let regs = [
        resolve(&triangle(1.0, 2.0, 3.0), DIMS),
        resolve(&triangle(2.0, 1.0, 3.0), DIMS),
        resolve(&triangle(3.0, 2.0, 1.0), DIMS),
    ];
    for reg in &regs {
        let base = reg.offsets[0];
        let rel: Vec<(i64, i64)> = reg
            .offsets
            .iter()
            .map(|o| (o.dx - base.dx, o.dy - base.dy))
            .collect();
        assert_eq!(rel, vec![(0, 0), (2, -1), (-3, 2)]);
    }
}

#[test]
fn test_ties_keep_first_pair() {
    assert_eq!(anchor_pair(&triangle(2.0, 2.0, 2.0)), Pair::ZeroOne);
    assert_eq!(anchor_pair(&triangle(3.0, 2.0, 2.0)), Pair::OneTwo);
}

#[test]
fn test_canvas_is_componentwise_minimum() {
    let dims = [(120, 90), (100, 95), (130, 80)];
    assert_eq!(canvas_size(dims), (100, 80));

    let reg = resolve(&triangle(1.0, 2.0, 3.0), dims);
    assert_eq!((reg.canvas_width, reg.canvas_height), (100, 80));
}
