//! RGB to intensity conversion using the ITU-R BT.601 luminance formula.

use super::grid::{Color, IntensityGrid, RasterGrid};

/// Luminance of one RGB triple: `Y = 0.299*R + 0.587*G + 0.114*B`.
///
/// Integer math, coefficients scaled by 1000 (299 + 587 + 114 = 1000), so
/// white maps to exactly 255.
#[inline]
pub fn luminance(c: Color) -> u8 {
    let y = (299 * c.r as u32 + 587 * c.g as u32 + 114 * c.b as u32) / 1000;
    y as u8
}

/// Convert an RGB grid to a same-sized intensity grid.
pub fn to_intensity(grid: &RasterGrid) -> IntensityGrid {
    grid.map(|&c| luminance(c))
}
