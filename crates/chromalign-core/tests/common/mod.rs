#![allow(dead_code)]

use std::path::Path;

use chromalign_core::align::SearchWindow;
use chromalign_core::frame::Frame;
use ndarray::Array2;

/// Deterministic high-frequency texture value for pixel `(x, y)`.
///
/// Every pixel differs from its neighbours, so a misaligned block never
/// scores as well as the true offset.
pub fn noise(x: u64, y: u64, seed: u64) -> u16 {
    let mut v = x.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ y.wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ seed.wrapping_mul(0x1656_67B1_9E37_79F9);
    v ^= v >> 29;
    v = v.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    v ^= v >> 32;
    (v & 0xFFFF) as u16
}

/// A `width` x `height` plate filled with texture.
pub fn textured(width: usize, height: usize, seed: u64) -> Frame {
    Frame::new(Array2::from_shape_fn((height, width), |(row, col)| {
        noise(col as u64, row as u64, seed)
    }))
}

/// Plate `b` such that `b(x + dx, y + dy) == a(x, y)` away from the borders.
pub fn shifted(frame: &Frame, dx: i64, dy: i64) -> Frame {
    let (w, h) = (frame.width() as i64, frame.height() as i64);
    Frame::new(Array2::from_shape_fn(
        (h as usize, w as usize),
        |(row, col)| {
            let sx = (col as i64 - dx).clamp(0, w - 1) as usize;
            let sy = (row as i64 - dy).clamp(0, h - 1) as usize;
            frame.data[[sy, sx]]
        },
    ))
}

/// Plate with the given values laid out row-major.
pub fn from_rows(width: usize, height: usize, values: &[u16]) -> Frame {
    let data = Array2::from_shape_vec((height, width), values.to_vec())
        .expect("values match dimensions");
    Frame::new(data)
}

/// Window centred on a 64x64 plate, small enough for fast tests.
pub fn small_window() -> SearchWindow {
    SearchWindow {
        center_x: 32,
        center_y: 32,
        range_x: 4,
        range_y: 4,
        half_x: 8,
        half_y: 8,
    }
}

/// Write a plate as a 16-bit grayscale PNG.
pub fn write_plate(frame: &Frame, path: &Path) {
    let img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_fn(
        frame.width() as u32,
        frame.height() as u32,
        |x, y| image::Luma([frame.data[[y as usize, x as usize]]]),
    );
    img.save(path).expect("write plate");
}
