//! Row-major 2D grids and the RGB color type.

use serde::Serialize;

use crate::error::{DiscretizeError, Result};

/// RGB color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray color with all three channels set to `v`.
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Scale every channel by `factor` (clamped to 0.0-1.0).
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * f).round() as u8,
            g: (self.g as f32 * f).round() as u8,
            b: (self.b as f32 * f).round() as u8,
        }
    }

    pub fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }
}

/// A 2D grid of cells stored in row-major order.
///
/// The dimensions are fixed at construction; `cells.len()` always equals
/// `width * height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// RGB raster as captured from a decoded image.
pub type RasterGrid = Grid<Color>;

/// Single-channel intensity (0-255) grid.
pub type IntensityGrid = Grid<u8>;

impl<T> Grid<T> {
    /// Build a grid from row-major cells.
    ///
    /// Fails with `EmptyInput` if either dimension is zero and with
    /// `BufferSizeMismatch` if the cell count does not match.
    pub fn from_cells(width: u32, height: u32, cells: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 || cells.is_empty() {
            return Err(DiscretizeError::EmptyInput { what: "grid" });
        }
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(DiscretizeError::BufferSizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell in row-major order.
    pub(crate) fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y * self.width + x) as usize)
    }

    /// Unchecked-by-contract accessor for in-bounds coordinates.
    pub(crate) fn at(&self, x: u32, y: u32) -> &T {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Iterate `(x, y, cell)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| ((i as u32) % width, (i as u32) / width, c))
    }

    /// Apply `f` to every cell, keeping positions.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl RasterGrid {
    /// Build a raster from packed RGB bytes (3 bytes per pixel, row-major).
    pub fn from_rgb_bytes(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 || data.is_empty() {
            return Err(DiscretizeError::EmptyInput { what: "image" });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(DiscretizeError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let cells = data
            .chunks_exact(3)
            .map(|rgb| Color::new(rgb[0], rgb[1], rgb[2]))
            .collect();
        Self::from_cells(width, height, cells)
    }

    /// Build a raster from an already-decoded `image` buffer.
    pub fn from_image(img: &image::RgbImage) -> Result<Self> {
        Self::from_rgb_bytes(img.width(), img.height(), img.as_raw())
    }

    /// Convert into an `image` buffer for encoding.
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| self.at(x, y).to_pixel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_rejects_zero_dimension() {
        let err = Grid::<u8>::from_cells(0, 3, vec![]).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_INPUT");
    }

    #[test]
    fn test_from_cells_rejects_wrong_length() {
        let err = Grid::from_cells(2, 2, vec![1u8, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            DiscretizeError::BufferSizeMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_row_major_access() {
        let grid = Grid::from_cells(3, 2, vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(0, 0), Some(&0));
        assert_eq!(grid.get(2, 0), Some(&2));
        assert_eq!(grid.get(0, 1), Some(&3));
        assert_eq!(grid.get(2, 1), Some(&5));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_iter_cells_positions() {
        let grid = Grid::from_cells(2, 2, vec!['a', 'b', 'c', 'd']).unwrap();
        let positions: Vec<_> = grid.iter_cells().map(|(x, y, c)| (x, y, *c)).collect();
        assert_eq!(
            positions,
            vec![(0, 0, 'a'), (1, 0, 'b'), (0, 1, 'c'), (1, 1, 'd')]
        );
    }

    #[test]
    fn test_rgb_bytes_round_trip_through_image() {
        let data = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30];
        let grid = RasterGrid::from_rgb_bytes(2, 2, &data).unwrap();
        assert_eq!(*grid.at(1, 1), Color::new(10, 20, 30));
        let img = grid.to_image();
        assert_eq!(img.as_raw(), &data);
        assert_eq!(RasterGrid::from_image(&img).unwrap(), grid);
    }

    #[test]
    fn test_color_scaled() {
        assert_eq!(Color::new(200, 100, 0).scaled(0.5), Color::new(100, 50, 0));
        assert_eq!(Color::WHITE.scaled(2.0), Color::WHITE);
    }
}
