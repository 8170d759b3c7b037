use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayViewMut2, Axis};
use serde::{Deserialize, Serialize};

use crate::align::Registration;
use crate::consts::{MAX_PIXEL_SHIFT, MAX_VALUE_16, MAX_VALUE_8, PARALLEL_PIXEL_THRESHOLD, PLATE_COUNT};
use crate::error::{ChromalignError, Result};
use crate::frame::{IntensitySampler, Offset};

/// Bits per channel of the output raster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitDepth {
    Eight,
    #[default]
    Sixteen,
}

impl BitDepth {
    pub fn bits(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    /// Largest channel value representable at this depth.
    pub fn max_value(self) -> u64 {
        match self {
            Self::Eight => MAX_VALUE_8,
            Self::Sixteen => MAX_VALUE_16,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = String;

    fn try_from(bits: u8) -> std::result::Result<Self, Self::Error> {
        match bits {
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            other => Err(format!("bit depth must be 8 or 16, got {other}")),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(depth: BitDepth) -> u8 {
        depth.bits()
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Per-channel value transform applied before a sample lands on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelTransform {
    #[serde(default)]
    pub bit_depth: BitDepth,
    /// Positive shifts right, negative shifts left. Range [-31, 31].
    #[serde(default)]
    pub shift: i32,
}

impl PixelTransform {
    pub fn new(bit_depth: BitDepth, shift: i32) -> Result<Self> {
        let transform = Self { bit_depth, shift };
        transform.validate()?;
        Ok(transform)
    }

    pub fn validate(&self) -> Result<()> {
        if !(-MAX_PIXEL_SHIFT..=MAX_PIXEL_SHIFT).contains(&self.shift) {
            return Err(ChromalignError::InvalidShift(self.shift));
        }
        Ok(())
    }

    #[inline]
    pub fn apply(&self, value: u16) -> u64 {
        let value = value as u64;
        match self.shift {
            s if s > 0 => value >> s,
            s if s < 0 => value << -s,
            _ => value,
        }
    }

    /// Saturate a shifted value into the output depth.
    #[inline]
    pub fn narrow(&self, value: u64) -> u16 {
        value.min(self.bit_depth.max_value()) as u16
    }
}

/// Finished RGBA raster. Channel values already fit the canvas bit depth.
#[derive(Clone, Debug)]
pub struct Canvas {
    /// Shape = (height, width, 4)
    data: Array3<u16>,
    bit_depth: BitDepth,
}

impl Canvas {
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u16; 4] {
        std::array::from_fn(|c| self.data[[y, x, c]])
    }

    /// Convert to an `image` buffer at the canvas bit depth.
    pub fn to_dynamic_image(&self) -> image::DynamicImage {
        let (w, h) = (self.width() as u32, self.height() as u32);
        match self.bit_depth {
            BitDepth::Sixteen => {
                let buf = image::ImageBuffer::from_fn(w, h, |x, y| {
                    image::Rgba(self.pixel(x as usize, y as usize))
                });
                image::DynamicImage::ImageRgba16(buf)
            }
            BitDepth::Eight => {
                let buf = image::RgbaImage::from_fn(w, h, |x, y| {
                    image::Rgba(self.pixel(x as usize, y as usize).map(|v| v as u8))
                });
                image::DynamicImage::ImageRgba8(buf)
            }
        }
    }
}

/// Composite output plus diagnostics.
#[derive(Clone, Debug)]
pub struct Composite {
    pub canvas: Canvas,
    /// Mean of every shifted channel value, taken before narrowing.
    pub mean_intensity: f64,
}

/// Clamp a source coordinate into `[0, len - 1]`.
#[inline]
pub fn clamp_coord(coord: i64, len: usize) -> usize {
    coord.clamp(0, len as i64 - 1) as usize
}

/// Resample the three plates into one RGBA canvas.
///
/// Plate `k` feeds channel `k`; its sample for destination `(i, j)` comes from
/// `(i + dx_k, j + dy_k)` clamped to the canvas bounds. The canvas never
/// exceeds a plate, so clamped reads stay inside every plate. Alpha is opaque.
pub fn composite<S>(
    plates: [&S; PLATE_COUNT],
    registration: &Registration,
    transform: &PixelTransform,
) -> Result<Composite>
where
    S: IntensitySampler + ?Sized,
{
    transform.validate()?;
    let (w, h) = (registration.canvas_width, registration.canvas_height);
    if w == 0 || h == 0 {
        return Err(ChromalignError::InvalidConfig(format!(
            "canvas must not be empty, got {w}x{h}"
        )));
    }
    for (k, plate) in plates.iter().enumerate() {
        if plate.width() < w || plate.height() < h {
            return Err(ChromalignError::InvalidConfig(format!(
                "canvas {w}x{h} exceeds plate #{k} ({}x{})",
                plate.width(),
                plate.height()
            )));
        }
    }

    let offsets = &registration.offsets;
    let mut data = Array3::<u16>::zeros((h, w, 4));

    let sum: u128 = if w * h >= PARALLEL_PIXEL_THRESHOLD {
        data.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(y, row)| render_row(row, y, h, &plates, offsets, transform))
            .sum()
    } else {
        data.axis_iter_mut(Axis(0))
            .enumerate()
            .map(|(y, row)| render_row(row, y, h, &plates, offsets, transform))
            .sum()
    };

    let mean_intensity = sum as f64 / (PLATE_COUNT * w * h) as f64;

    Ok(Composite {
        canvas: Canvas {
            data,
            bit_depth: transform.bit_depth,
        },
        mean_intensity,
    })
}

/// Fill one canvas row and return the sum of its shifted channel values.
fn render_row<S>(
    mut row: ArrayViewMut2<u16>,
    y: usize,
    height: usize,
    plates: &[&S; PLATE_COUNT],
    offsets: &[Offset; PLATE_COUNT],
    transform: &PixelTransform,
) -> u128
where
    S: IntensitySampler + ?Sized,
{
    let alpha = transform.bit_depth.max_value() as u16;
    let width = row.len_of(Axis(0));
    let src_y: [usize; PLATE_COUNT] =
        std::array::from_fn(|k| clamp_coord(y as i64 + offsets[k].dy, height));

    let mut sum = 0u128;
    for (x, mut px) in row.axis_iter_mut(Axis(0)).enumerate() {
        for k in 0..PLATE_COUNT {
            let src_x = clamp_coord(x as i64 + offsets[k].dx, width);
            let value = transform.apply(plates[k].sample(src_x, src_y[k]));
            sum += value as u128;
            px[k] = transform.narrow(value);
        }
        px[3] = alpha;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_direction() {
        let right = PixelTransform::new(BitDepth::Sixteen, 4).unwrap();
        let left = PixelTransform::new(BitDepth::Sixteen, -2).unwrap();
        let identity = PixelTransform::default();
        assert_eq!(right.apply(0x1230), 0x123);
        assert_eq!(left.apply(3), 12);
        assert_eq!(identity.apply(777), 777);
    }

    #[test]
    fn narrowing_saturates_at_depth() {
        let eight = PixelTransform::new(BitDepth::Eight, 0).unwrap();
        assert_eq!(eight.narrow(300), 255);
        assert_eq!(eight.narrow(42), 42);
        let sixteen = PixelTransform::new(BitDepth::Sixteen, -31).unwrap();
        assert_eq!(sixteen.narrow(sixteen.apply(1)), u16::MAX);
    }

    #[test]
    fn shift_out_of_range_is_rejected() {
        assert!(matches!(
            PixelTransform::new(BitDepth::Sixteen, 32),
            Err(ChromalignError::InvalidShift(32))
        ));
        assert!(PixelTransform::new(BitDepth::Eight, -31).is_ok());
    }

    #[test]
    fn bit_depth_from_bits() {
        assert_eq!(BitDepth::try_from(8u8), Ok(BitDepth::Eight));
        assert_eq!(BitDepth::try_from(16u8), Ok(BitDepth::Sixteen));
        assert!(BitDepth::try_from(12u8).is_err());
    }

    #[test]
    fn clamp_coord_limits() {
        assert_eq!(clamp_coord(-5, 10), 0);
        assert_eq!(clamp_coord(4, 10), 4);
        assert_eq!(clamp_coord(10, 10), 9);
    }
}
