use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use chromalign_core::io::image_io::probe_dimensions;

#[derive(Args)]
pub struct InfoArgs {
    /// Plate image files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let mut dims = Vec::with_capacity(args.files.len());

    for (idx, file) in args.files.iter().enumerate() {
        let (w, h) = probe_dimensions(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        println!("#{idx}  {:<40} {}x{}", file.display(), w, h);
        dims.push((w, h));
    }

    if let Some((canvas, center)) = plate_layout(&dims) {
        println!();
        println!("Canvas:         {}x{}", canvas.0, canvas.1);
        println!("Default center: ({}, {})", center.0, center.1);
    }

    Ok(())
}

/// Canvas size and default search center for exactly three plates.
fn plate_layout(dims: &[(u32, u32)]) -> Option<((u32, u32), (u32, u32))> {
    let [first, ..] = dims else {
        return None;
    };
    if dims.len() != 3 {
        return None;
    }
    let canvas = dims
        .iter()
        .fold((u32::MAX, u32::MAX), |(w, h), &(dw, dh)| (w.min(dw), h.min(dh)));
    Some((canvas, (first.0 / 2, first.1 / 2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_uses_smallest_plate_and_first_center() {
        let dims = [(1001, 800), (990, 820), (1010, 790)];
        assert_eq!(plate_layout(&dims), Some(((990, 790), (500, 400))));
    }

    #[test]
    fn layout_needs_three_plates() {
        assert_eq!(plate_layout(&[(10, 10), (10, 10)]), None);
        assert_eq!(plate_layout(&[]), None);
    }
}
