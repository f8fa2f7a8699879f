//! Grid resampling with nearest-neighbour and bilinear rules.

use serde::{Deserialize, Serialize};

use super::grid::{Color, Grid};
use crate::error::{DiscretizeError, Result};

/// Interpolation rule used when changing grid resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    /// Pick the single source cell the target cell falls into.
    /// Produces visibly blocky output when enlarging.
    #[default]
    Nearest,
    /// Weighted average of the four surrounding source cells.
    Bilinear,
}

impl ResampleMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ResampleMethod::Nearest => "nearest",
            ResampleMethod::Bilinear => "bilinear",
        }
    }
}

/// Cell types that can be blended by bilinear interpolation.
pub trait Interpolate: Copy {
    /// Blend four neighbours with weights `fx` (horizontal) and `fy` (vertical).
    fn bilinear(tl: Self, tr: Self, bl: Self, br: Self, fx: f32, fy: f32) -> Self;
}

#[inline]
fn blend_channel(tl: u8, tr: u8, bl: u8, br: u8, fx: f32, fy: f32) -> u8 {
    let top = tl as f32 + (tr as f32 - tl as f32) * fx;
    let bottom = bl as f32 + (br as f32 - bl as f32) * fx;
    (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8
}

impl Interpolate for u8 {
    fn bilinear(tl: u8, tr: u8, bl: u8, br: u8, fx: f32, fy: f32) -> u8 {
        blend_channel(tl, tr, bl, br, fx, fy)
    }
}

impl Interpolate for Color {
    fn bilinear(tl: Color, tr: Color, bl: Color, br: Color, fx: f32, fy: f32) -> Color {
        Color {
            r: blend_channel(tl.r, tr.r, bl.r, br.r, fx, fy),
            g: blend_channel(tl.g, tr.g, bl.g, br.g, fx, fy),
            b: blend_channel(tl.b, tr.b, bl.b, br.b, fx, fy),
        }
    }
}

/// Validate a requested target size, returning it as unsigned dimensions.
///
/// Accepts signed values so that raw caller input can be checked before any
/// conversion. Both dimensions must be at least 1.
pub fn target_size(rows: i64, cols: i64) -> Result<(u32, u32)> {
    match (u32::try_from(rows), u32::try_from(cols)) {
        (Ok(r), Ok(c)) if r >= 1 && c >= 1 => Ok((r, c)),
        _ => Err(DiscretizeError::InvalidDimension { rows, cols }),
    }
}

/// Resample `grid` to exactly `target_rows x target_cols` cells.
///
/// # Errors
/// `InvalidDimension` if either target dimension is zero.
pub fn resample<T: Interpolate>(
    grid: &Grid<T>,
    target_rows: u32,
    target_cols: u32,
    method: ResampleMethod,
) -> Result<Grid<T>> {
    if target_rows == 0 || target_cols == 0 {
        return Err(DiscretizeError::InvalidDimension {
            rows: target_rows as i64,
            cols: target_cols as i64,
        });
    }

    log::debug!(
        "Resampling {}x{} -> {}x{} ({})",
        grid.width(),
        grid.height(),
        target_cols,
        target_rows,
        method.name()
    );

    Ok(match method {
        ResampleMethod::Nearest => nearest(grid, target_rows, target_cols),
        ResampleMethod::Bilinear => bilinear(grid, target_rows, target_cols),
    })
}

/// Source index for a nearest-neighbour lookup: `floor(dst * src_len / dst_len)`.
#[inline]
fn nearest_index(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    let idx = (dst as u64 * src_len as u64) / dst_len as u64;
    (idx as u32).min(src_len - 1)
}

fn nearest<T: Copy>(grid: &Grid<T>, rows: u32, cols: u32) -> Grid<T> {
    let (src_w, src_h) = (grid.width(), grid.height());
    Grid::from_fn(cols, rows, |x, y| {
        *grid.at(
            nearest_index(x, src_w, cols),
            nearest_index(y, src_h, rows),
        )
    })
}

/// Pixel-centre aligned source coordinate, clamped to the valid range.
/// Returns the lower neighbour, the upper neighbour and the fractional weight.
#[inline]
fn bilinear_coord(dst: u32, src_len: u32, dst_len: u32) -> (u32, u32, f32) {
    let scale = src_len as f32 / dst_len as f32;
    let pos = ((dst as f32 + 0.5) * scale - 0.5).clamp(0.0, (src_len - 1) as f32);
    let lo = pos.floor() as u32;
    let hi = (lo + 1).min(src_len - 1);
    (lo, hi, pos - lo as f32)
}

fn bilinear<T: Interpolate>(grid: &Grid<T>, rows: u32, cols: u32) -> Grid<T> {
    let (src_w, src_h) = (grid.width(), grid.height());
    Grid::from_fn(cols, rows, |x, y| {
        let (x0, x1, fx) = bilinear_coord(x, src_w, cols);
        let (y0, y1, fy) = bilinear_coord(y, src_h, rows);
        T::bilinear(
            *grid.at(x0, y0),
            *grid.at(x1, y0),
            *grid.at(x0, y1),
            *grid.at(x1, y1),
            fx,
            fy,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_size_rejects_non_positive() {
        assert!(target_size(0, 10).is_err());
        assert!(target_size(10, -1).is_err());
        assert!(target_size(i64::MAX, 1).is_err());
        assert_eq!(target_size(3, 7).unwrap(), (3, 7));
    }

    #[test]
    fn test_nearest_index_formula() {
        // floor(x * srcW / targetCols)
        assert_eq!(nearest_index(0, 10, 3), 0);
        assert_eq!(nearest_index(1, 10, 3), 3);
        assert_eq!(nearest_index(2, 10, 3), 6);
        // enlarging repeats source cells
        assert_eq!(nearest_index(5, 2, 6), 1);
        assert_eq!(nearest_index(2, 2, 6), 0);
    }

    #[test]
    fn test_bilinear_coord_clamps_edges() {
        let (lo, hi, f) = bilinear_coord(0, 4, 8);
        assert_eq!((lo, hi), (0, 1));
        assert_eq!(f, 0.0);
        let (lo, hi, _) = bilinear_coord(7, 4, 8);
        assert_eq!((lo, hi), (3, 3));
    }

    #[test]
    fn test_blend_channel_midpoint() {
        assert_eq!(blend_channel(0, 255, 0, 255, 0.5, 0.0), 128);
        assert_eq!(blend_channel(0, 0, 100, 100, 0.0, 0.25), 25);
    }
}
