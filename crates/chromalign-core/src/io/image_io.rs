use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::composite::Canvas;
use crate::error::Result;
use crate::frame::Frame;

const JPEG_QUALITY: u8 = 90;

/// Which component of a decoded file becomes the plate intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleChannel {
    Red,
    /// Plates are usually grayscale scans, where every component is equal.
    #[default]
    Green,
    Blue,
    Luma,
}

impl std::fmt::Display for SampleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "Red"),
            Self::Green => write!(f, "Green"),
            Self::Blue => write!(f, "Blue"),
            Self::Luma => write!(f, "Luma"),
        }
    }
}

/// Decode an image file into a 16-bit plate.
pub fn load_frame(path: &Path, channel: SampleChannel) -> Result<Frame> {
    let img = image::open(path)?;
    Ok(frame_from_image(&img, channel))
}

/// Extract one channel of an already decoded image as a 16-bit plate.
pub fn frame_from_image(img: &DynamicImage, channel: SampleChannel) -> Frame {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let data = match channel {
        SampleChannel::Luma => {
            let gray = img.to_luma16();
            Array2::from_shape_fn((h, w), |(row, col)| {
                gray.get_pixel(col as u32, row as u32).0[0]
            })
        }
        SampleChannel::Red | SampleChannel::Green | SampleChannel::Blue => {
            let idx = match channel {
                SampleChannel::Red => 0,
                SampleChannel::Green => 1,
                _ => 2,
            };
            let rgb = img.to_rgb16();
            Array2::from_shape_fn((h, w), |(row, col)| {
                rgb.get_pixel(col as u32, row as u32).0[idx]
            })
        }
    };
    Frame::new(data)
}

/// Decode the three plates concurrently.
pub fn load_frames(paths: &[PathBuf; 3], channel: SampleChannel) -> Result<[Frame; 3]> {
    let load = |idx: usize| -> Result<Frame> {
        let started = Instant::now();
        let frame = load_frame(&paths[idx], channel)?;
        info!(
            plate = idx,
            width = frame.width(),
            height = frame.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Plate loaded"
        );
        Ok(frame)
    };

    let (first, (second, third)) = rayon::join(|| load(0), || rayon::join(|| load(1), || load(2)));
    Ok([first?, second?, third?])
}

/// Read only the dimensions of an image file.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    Ok(image::image_dimensions(path)?)
}

/// Something that accepts the finished canvas.
pub trait CanvasSink {
    fn write(&self, canvas: &Canvas) -> Result<()>;
}

/// Writes the canvas to a file, choosing the encoder from the extension.
#[derive(Clone, Debug)]
pub struct FileSink {
    pub path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CanvasSink for FileSink {
    fn write(&self, canvas: &Canvas) -> Result<()> {
        save_canvas(canvas, &self.path)
    }
}

/// Save a canvas, choosing format from file extension.
///
/// PNG and TIFF keep the canvas bit depth. JPEG, GIF and BMP are 8-bit only,
/// so 16-bit canvases are reduced to their high byte for them.
pub fn save_canvas(canvas: &Canvas, path: &Path) -> Result<()> {
    let img = canvas.to_dynamic_image();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("tiff" | "tif") => img.save_with_format(path, ImageFormat::Tiff)?,
        Some("jpg" | "jpeg") => {
            let writer = BufWriter::new(File::create(path)?);
            let mut encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
            encoder.encode_image(&img.to_rgb8())?;
        }
        Some("gif") => {
            DynamicImage::ImageRgba8(img.to_rgba8()).save_with_format(path, ImageFormat::Gif)?
        }
        Some("bmp") => {
            DynamicImage::ImageRgba8(img.to_rgba8()).save_with_format(path, ImageFormat::Bmp)?
        }
        _ => save_png(&img, path)?,
    }
    Ok(())
}

fn save_png(img: &DynamicImage, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)?;
    Ok(())
}
