mod common;

use approx::assert_relative_eq;
use chromalign_core::align::Registration;
use chromalign_core::composite::{composite, BitDepth, PixelTransform};
use chromalign_core::error::ChromalignError;
use chromalign_core::frame::{Frame, Offset, Pair};

use common::from_rows;

fn registration(offsets: [Offset; 3], width: usize, height: usize) -> Registration {
    Registration {
        anchor: Pair::ZeroOne,
        offsets,
        canvas_width: width,
        canvas_height: height,
    }
}

/// 4x3 plate where each pixel holds `base + y * 4 + x`.
fn ramp(base: u16) -> Frame {
    let values: Vec<u16> = (0..12).map(|v| base + v).collect();
    from_rows(4, 3, &values)
}

#[test]
fn test_zero_offsets_copy_plates_into_channels() {
    let (r, g, b) = (ramp(0), ramp(100), ramp(200));
    let reg = registration([Offset::ZERO; 3], 4, 3);

    let out = composite([&r, &g, &b], &reg, &PixelTransform::default()).unwrap();
    assert_eq!(out.canvas.width(), 4);
    assert_eq!(out.canvas.height(), 3);
    assert_eq!(out.canvas.pixel(2, 1), [6, 106, 206, u16::MAX]);
}

#[test]
fn test_offsets_beyond_each_corner_clamp_to_corner_pixel() {
    let plate = ramp(0);
    let far = 10;
    let corners = [
        (Offset::new(-far, -far), 0),  // top-left
        (Offset::new(far, -far), 3),   // top-right
        (Offset::new(-far, far), 8),   // bottom-left
        (Offset::new(far, far), 11),   // bottom-right
    ];

    for (offset, expected) in corners {
        let reg = registration([offset; 3], 4, 3);
        let out = composite([&plate, &plate, &plate], &reg, &PixelTransform::default()).unwrap();
        for y in 0..3 {
            for x in 0..4 {
                let px = out.canvas.pixel(x, y);
                assert_eq!(&px[..3], &[expected; 3], "offset {offset} at ({x}, {y})");
            }
        }
    }
}

#[test]
fn test_offsets_at_the_corner_clamp_past_it() {
    let plate = ramp(0);
    // Destination (0, 0) lands exactly on the bottom-right pixel; every other
    // destination pixel overshoots and must clamp back to it.
    let reg = registration([Offset::new(3, 2); 3], 4, 3);
    let out = composite([&plate, &plate, &plate], &reg, &PixelTransform::default()).unwrap();
    assert_eq!(out.canvas.pixel(0, 0)[0], 11);
    assert_eq!(out.canvas.pixel(3, 2)[0], 11);

    // Axes clamp independently: x steps back one column while y pins to the
    // last row.
    let reg = registration([Offset::new(-1, 2); 3], 4, 3);
    let out = composite([&plate, &plate, &plate], &reg, &PixelTransform::default()).unwrap();
    assert_eq!(out.canvas.pixel(0, 0)[0], 8);
    assert_eq!(out.canvas.pixel(3, 0)[0], 10);
    assert_eq!(out.canvas.pixel(3, 2)[0], 10);
}

#[test]
fn test_larger_plate_clamps_to_canvas_bounds() {
    let small = ramp(0); // 4x3
    let big = from_rows(6, 5, &(0..30).collect::<Vec<u16>>());
    let reg = registration([Offset::ZERO, Offset::new(2, 2), Offset::ZERO], 4, 3);

    let out = composite([&small, &big, &small], &reg, &PixelTransform::default()).unwrap();
    // (3, 2) + (2, 2) = (5, 4) lies inside the 6x5 plate but outside the 4x3
    // canvas, so it clamps to (3, 2).
    assert_eq!(out.canvas.pixel(3, 2)[1], 2 * 6 + 3);
    // (0, 0) + (2, 2) = (2, 2) is inside the canvas and read directly.
    assert_eq!(out.canvas.pixel(0, 0)[1], 2 * 6 + 2);
    // (1, 0) + (2, 2) = (3, 2) is the last canvas column and row.
    assert_eq!(out.canvas.pixel(1, 0)[1], 2 * 6 + 3);
    // (2, 1) + (2, 2) = (4, 3): x clamps to 3, y clamps to 2.
    assert_eq!(out.canvas.pixel(2, 1)[1], 2 * 6 + 3);
    // Negative reads clamp to zero on the small plates as before.
    assert_eq!(out.canvas.pixel(3, 2)[0], 11);
}

#[test]
fn test_mean_intensity_with_right_shift() {
    let r = from_rows(2, 2, &[10, 21, 33, 47]);
    let g = from_rows(2, 2, &[100, 101, 102, 103]);
    let b = from_rows(2, 2, &[1000, 1999, 7, 65535]);
    let reg = registration([Offset::ZERO; 3], 2, 2);
    let transform = PixelTransform::new(BitDepth::Sixteen, 1).unwrap();

    let out = composite([&r, &g, &b], &reg, &transform).unwrap();

    let sum: u64 = [10u64, 21, 33, 47, 100, 101, 102, 103, 1000, 1999, 7, 65535]
        .iter()
        .map(|v| v >> 1)
        .sum();
    assert_relative_eq!(out.mean_intensity, sum as f64 / 12.0);
    assert_eq!(out.canvas.pixel(1, 1), [23, 51, 32767, u16::MAX]);
}

#[test]
fn test_left_shift_saturates_but_mean_uses_shifted_values() {
    let plate = from_rows(1, 1, &[40000]);
    let reg = registration([Offset::ZERO; 3], 1, 1);
    let transform = PixelTransform::new(BitDepth::Sixteen, -1).unwrap();

    let out = composite([&plate, &plate, &plate], &reg, &transform).unwrap();
    assert_eq!(out.canvas.pixel(0, 0), [u16::MAX; 4]);
    assert_relative_eq!(out.mean_intensity, 80000.0);
}

#[test]
fn test_eight_bit_output_narrows_and_uses_8_bit_alpha() {
    let plate = from_rows(2, 1, &[0x1234, 0x00FF]);
    let reg = registration([Offset::ZERO; 3], 2, 1);
    let transform = PixelTransform::new(BitDepth::Eight, 8).unwrap();

    let out = composite([&plate, &plate, &plate], &reg, &transform).unwrap();
    assert_eq!(out.canvas.bit_depth(), BitDepth::Eight);
    assert_eq!(out.canvas.pixel(0, 0), [0x12, 0x12, 0x12, 255]);
    assert_eq!(out.canvas.pixel(1, 0), [0, 0, 0, 255]);

    let img = out.canvas.to_dynamic_image();
    assert_eq!(img.to_rgba8().get_pixel(0, 0).0, [0x12, 0x12, 0x12, 255]);
}

#[test]
fn test_parallel_rows_match_sequential_result() {
    // 300x300 crosses the row-parallel threshold.
    let plate = common::textured(300, 300, 21);
    let reg = registration([Offset::new(1, -2), Offset::ZERO, Offset::new(-3, 0)], 300, 300);
    let out = composite([&plate, &plate, &plate], &reg, &PixelTransform::default()).unwrap();

    for &(x, y) in &[(0usize, 0usize), (150, 150), (299, 299), (0, 299)] {
        let px = out.canvas.pixel(x, y);
        let at = |dx: i64, dy: i64| {
            let sx = (x as i64 + dx).clamp(0, 299) as usize;
            let sy = (y as i64 + dy).clamp(0, 299) as usize;
            plate.data[[sy, sx]]
        };
        assert_eq!(px, [at(1, -2), at(0, 0), at(-3, 0), u16::MAX]);
    }
}

#[test]
fn test_canvas_larger_than_a_plate_is_rejected() {
    let small = ramp(0);
    let big = from_rows(6, 5, &[0; 30]);
    let reg = registration([Offset::ZERO; 3], 6, 5);
    let err = composite([&big, &small, &big], &reg, &PixelTransform::default()).unwrap_err();
    assert!(matches!(err, ChromalignError::InvalidConfig(_)));
}

#[test]
fn test_invalid_shift_is_rejected_before_compositing() {
    let plate = ramp(0);
    let reg = registration([Offset::ZERO; 3], 4, 3);
    let transform = PixelTransform {
        bit_depth: BitDepth::Sixteen,
        shift: -40,
    };
    let err = composite([&plate, &plate, &plate], &reg, &transform).unwrap_err();
    assert!(matches!(err, ChromalignError::InvalidShift(-40)));
}
