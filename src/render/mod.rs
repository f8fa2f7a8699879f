//! Rasterized visualizations of discretized media.
//!
//! - [`render_grid`] - annotated 2D grid of quantized cells
//! - [`render_volume`] - 3D bar chart of the same grid
//! - [`render_waveform`] - amplitude envelope of an audio buffer
//!
//! Every renderer returns an in-memory `image::RgbImage` drawn with
//! `imageproc`; encoding and persistence are left to an
//! [`crate::artifact::ArtifactSink`].

use image::RgbImage;

use crate::error::{DiscretizeError, Result};
use crate::raster::Color;

mod font;
mod grid;
mod volume;
mod waveform;

pub use font::{LabelFont, DEFAULT_FONT_SIZE};
pub use grid::{render_grid, text_color, DEFAULT_CELL_SIZE, OUTLINE_COLOR, TEXT_THRESHOLD};
pub use volume::{render_volume, VolumeStyle};
pub use waveform::{render_waveform, DEFAULT_WAVEFORM_HEIGHT, DEFAULT_WAVEFORM_WIDTH};

/// Largest image any renderer allocates (8192 x 8192).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 26;

/// Check that a `width` x `height` image stays within [`MAX_CANVAS_PIXELS`].
///
/// # Errors
/// `InvalidRange` naming `name` when the area overflows or exceeds the cap.
pub fn check_canvas(name: &'static str, width: u64, height: u64) -> Result<(u32, u32)> {
    let dims = (u32::try_from(width), u32::try_from(height));
    match (width.checked_mul(height), dims) {
        (Some(area), (Ok(w), Ok(h))) if area <= MAX_CANVAS_PIXELS => Ok((w, h)),
        _ => Err(DiscretizeError::InvalidRange {
            name,
            value: format!("{}x{}", width, height),
            expected: "at most 67108864 pixels (8192x8192)",
        }),
    }
}

/// White image of the given size after [`check_canvas`].
pub(crate) fn blank_canvas(name: &'static str, width: u64, height: u64) -> Result<RgbImage> {
    let (w, h) = check_canvas(name, width, height)?;
    Ok(RgbImage::from_pixel(w, h, Color::WHITE.to_pixel()))
}
