//! 2D grid visualization: colored cells labelled with their level.

use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::blank_canvas;
use super::font::LabelFont;
use crate::error::{DiscretizeError, Result};
use crate::raster::{Color, QuantizedGrid};

pub const DEFAULT_CELL_SIZE: u32 = 60;

/// Cell outline color.
pub const OUTLINE_COLOR: Color = Color::gray(128);

/// Levels below this are labelled in white, the rest (including this one)
/// in black.
pub const TEXT_THRESHOLD: u8 = 128;

/// Label color for a level: white on dark cells, black on light cells.
pub fn text_color(level: u8) -> Color {
    if level < TEXT_THRESHOLD {
        Color::WHITE
    } else {
        Color::BLACK
    }
}

/// Render each cell as a `cell_size` square filled with its display color,
/// outlined in gray and labelled with its level, centred.
///
/// # Errors
/// `InvalidRange` if `cell_size` is zero or the image would exceed
/// [`super::MAX_CANVAS_PIXELS`].
pub fn render_grid(grid: &QuantizedGrid, cell_size: u32, font: &LabelFont) -> Result<RgbImage> {
    if cell_size == 0 {
        return Err(DiscretizeError::InvalidRange {
            name: "cell_size",
            value: "0".to_string(),
            expected: "at least 1 pixel",
        });
    }
    let mut img = blank_canvas(
        "grid canvas",
        grid.width() as u64 * cell_size as u64,
        grid.height() as u64 * cell_size as u64,
    )?;
    let (width, height) = img.dimensions();

    for (x, y, cell) in grid.grid().iter_cells() {
        // Within the canvas cap, so every offset fits an i32.
        let x0 = (x * cell_size) as i64;
        let y0 = (y * cell_size) as i64;
        let square = Rect::at(x0 as i32, y0 as i32).of_size(cell_size, cell_size);
        draw_filled_rect_mut(&mut img, square, cell.color.to_pixel());
        draw_hollow_rect_mut(&mut img, square, OUTLINE_COLOR.to_pixel());

        let half = (cell_size / 2) as i64;
        font.draw_centered(
            &mut img,
            x0 + half,
            y0 + half,
            &cell.level.to_string(),
            text_color(cell.level),
        );
    }

    log::debug!(
        "Rendered {}x{} grid at {} px/cell ({}x{} image)",
        grid.width(),
        grid.height(),
        cell_size,
        width,
        height
    );
    Ok(img)
}
