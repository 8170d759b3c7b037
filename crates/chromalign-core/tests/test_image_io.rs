mod common;

use chromalign_core::align::Registration;
use chromalign_core::composite::{composite, BitDepth, Canvas, PixelTransform};
use chromalign_core::frame::{Offset, Pair};
use chromalign_core::io::image_io::{
    load_frame, load_frames, probe_dimensions, save_canvas, CanvasSink, FileSink, SampleChannel,
};

use common::{from_rows, textured, write_plate};

fn canvas(bit_depth: BitDepth) -> Canvas {
    let r = from_rows(3, 2, &[0, 1000, 2000, 3000, 4000, 65535]);
    let g = from_rows(3, 2, &[7, 7, 7, 7, 7, 7]);
    let b = from_rows(3, 2, &[500, 400, 300, 200, 100, 0]);
    let reg = Registration {
        anchor: Pair::ZeroOne,
        offsets: [Offset::ZERO; 3],
        canvas_width: 3,
        canvas_height: 2,
    };
    let transform = PixelTransform::new(bit_depth, 0).unwrap();
    composite([&r, &g, &b], &reg, &transform).unwrap().canvas
}

#[test]
fn test_png_keeps_16_bit_values() {
    let canvas = canvas(BitDepth::Sixteen);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    save_canvas(&canvas, &path).unwrap();
    let img = image::open(&path).unwrap();
    assert_eq!(img.color(), image::ColorType::Rgba16);
    let rgba = img.to_rgba16();
    assert_eq!(rgba.get_pixel(2, 1).0, [65535, 7, 0, 65535]);
    assert_eq!(rgba.get_pixel(1, 0).0, [1000, 7, 400, 65535]);
}

#[test]
fn test_png_eight_bit_canvas() {
    let canvas = canvas(BitDepth::Eight);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    save_canvas(&canvas, &path).unwrap();
    let img = image::open(&path).unwrap();
    assert_eq!(img.color(), image::ColorType::Rgba8);
    // Values above 255 saturate during compositing.
    assert_eq!(img.to_rgba8().get_pixel(0, 0).0, [0, 7, 255, 255]);
}

#[test]
fn test_tiff_keeps_16_bit_values() {
    let canvas = canvas(BitDepth::Sixteen);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.TIF");

    save_canvas(&canvas, &path).unwrap();
    let img = image::open(&path).unwrap();
    assert_eq!(img.to_rgba16().get_pixel(0, 1).0, [3000, 7, 200, 65535]);
}

#[test]
fn test_eight_bit_only_formats_are_written() {
    let canvas = canvas(BitDepth::Sixteen);
    let dir = tempfile::tempdir().unwrap();

    for name in ["out.jpg", "out.jpeg", "out.bmp", "out.gif"] {
        let path = dir.path().join(name);
        save_canvas(&canvas, &path).unwrap();
        assert_eq!(probe_dimensions(&path).unwrap(), (3, 2), "{name}");
    }
}

#[test]
fn test_unknown_extension_falls_back_to_png() {
    let canvas = canvas(BitDepth::Sixteen);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.raster");

    FileSink::new(&path).write(&canvas).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn test_load_frame_extracts_requested_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.png");
    let img = image::RgbImage::from_fn(2, 2, |x, y| image::Rgb([10, 20 + x as u8, 30 + y as u8]));
    img.save(&path).unwrap();

    let red = load_frame(&path, SampleChannel::Red).unwrap();
    let green = load_frame(&path, SampleChannel::Green).unwrap();
    let blue = load_frame(&path, SampleChannel::Blue).unwrap();

    // 8-bit samples widen to 16 bits as v * 257.
    assert_eq!(red.data[[1, 1]], 10 * 257);
    assert_eq!(green.data[[0, 1]], 21 * 257);
    assert_eq!(blue.data[[1, 0]], 31 * 257);
}

#[test]
fn test_load_grayscale_16_bit_plate() {
    let frame = textured(5, 4, 3);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.png");
    write_plate(&frame, &path);

    for channel in [SampleChannel::Green, SampleChannel::Luma] {
        let loaded = load_frame(&path, channel).unwrap();
        assert_eq!(loaded.data, frame.data, "{channel}");
    }
}

#[test]
fn test_load_frames_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let frames = [textured(8, 6, 1), textured(9, 6, 2), textured(10, 6, 3)];
    let paths = ["a.png", "b.png", "c.png"].map(|n| dir.path().join(n));
    for (frame, path) in frames.iter().zip(paths.iter()) {
        write_plate(frame, path);
    }

    let loaded = load_frames(&paths, SampleChannel::Green).unwrap();
    for (a, b) in loaded.iter().zip(frames.iter()) {
        assert_eq!(a.data, b.data);
    }
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_frame(&dir.path().join("none.png"), SampleChannel::Green).is_err());
    assert!(probe_dimensions(&dir.path().join("none.png")).is_err());
}
