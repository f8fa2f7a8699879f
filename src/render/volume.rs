//! 3D height-field visualization: one shaded bar per quantized cell.
//!
//! Uses a fixed cabinet projection: x runs left to right, grid rows recede
//! into depth (row 0 furthest away) and bar height is the cell level.

use image::RgbImage;
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use std::f32::consts::FRAC_1_SQRT_2;

use super::font::LabelFont;
use super::{blank_canvas, check_canvas};
use crate::error::{DiscretizeError, Result};
use crate::raster::{Color, QuantizedGrid};

/// Outer margin around the plot in pixels.
const MARGIN: f32 = 60.0;
/// Space reserved above the plot for the title.
const TITLE_BAND: f32 = 40.0;
/// Depth units are drawn at this fraction of an x unit (cabinet projection).
const DEPTH_RATIO: f32 = 0.5;
/// Largest share of the plot height the floor may take up.
const MAX_FLOOR_SHARE: f32 = 0.4;
const MAX_LEVEL: f32 = 255.0;
const AXIS_TICKS: [u8; 5] = [0, 64, 128, 192, 255];

const FRONT_SHADE: f32 = 0.85;
const SIDE_SHADE: f32 = 0.7;
const EDGE_SHADE: f32 = 0.5;
const FLOOR_COLOR: Color = Color::gray(235);
const AXIS_COLOR: Color = Color::gray(90);

/// Canvas size and bar footprint for [`render_volume`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeStyle {
    pub width: u32,
    pub height: u32,
    /// Bar side length in grid units; below 1.0 so neighbours stay apart.
    pub footprint: f32,
}

impl Default for VolumeStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            footprint: 0.8,
        }
    }
}

impl VolumeStyle {
    /// Smallest canvas edge that still leaves room for margins and title.
    pub const MIN_EDGE: u32 = 200;

    pub fn validate(&self) -> Result<()> {
        if self.width < Self::MIN_EDGE || self.height < Self::MIN_EDGE {
            return Err(DiscretizeError::InvalidRange {
                name: "volume canvas",
                value: format!("{}x{}", self.width, self.height),
                expected: "both edges at least 200 px",
            });
        }
        if !(self.footprint > 0.0 && self.footprint <= 1.0) {
            return Err(DiscretizeError::InvalidRange {
                name: "footprint",
                value: self.footprint.to_string(),
                expected: "greater than 0 and at most 1",
            });
        }
        check_canvas("volume canvas", self.width as u64, self.height as u64)?;
        Ok(())
    }
}

struct Projection {
    origin_x: f32,
    origin_y: f32,
    unit_x: f32,
    unit_z: f32,
}

impl Projection {
    fn new(style: &VolumeStyle, cols: u32, rows: u32) -> Self {
        let avail_w = style.width as f32 - 2.0 * MARGIN;
        let avail_h = style.height as f32 - 2.0 * MARGIN - TITLE_BAND;
        let depth_step = DEPTH_RATIO * FRAC_1_SQRT_2;

        let fit_w = avail_w / (cols as f32 + rows as f32 * depth_step);
        let fit_h = avail_h * MAX_FLOOR_SHARE / (rows as f32 * depth_step);
        let unit_x = fit_w.min(fit_h);

        let floor_h = rows as f32 * unit_x * depth_step;
        let used_w = (cols as f32 + rows as f32 * depth_step) * unit_x;

        Self {
            origin_x: MARGIN + (avail_w - used_w) / 2.0,
            origin_y: style.height as f32 - MARGIN,
            unit_x,
            unit_z: (avail_h - floor_h) / MAX_LEVEL,
        }
    }

    /// Screen position of grid point `(x, depth)` at height `z`.
    fn project(&self, x: f32, depth: f32, z: f32) -> (f32, f32) {
        let d = depth * self.unit_x * DEPTH_RATIO * FRAC_1_SQRT_2;
        (
            self.origin_x + x * self.unit_x + d,
            self.origin_y - z * self.unit_z - d,
        )
    }

    fn face(&self, corners: [(f32, f32, f32); 4]) -> [(f32, f32); 4] {
        corners.map(|(x, d, z)| self.project(x, d, z))
    }
}

fn to_px(p: (f32, f32)) -> (i64, i64) {
    (p.0.round() as i64, p.1.round() as i64)
}

/// Integer polygon for `draw_polygon_mut`: consecutive duplicates and a
/// closing point equal to the first are dropped. `None` when fewer than
/// three distinct corners remain, as for a bar seen exactly edge-on.
fn fill_outline(face: &[(f32, f32); 4]) -> Option<Vec<Point<i32>>> {
    let mut poly: Vec<Point<i32>> = Vec::with_capacity(face.len());
    for &(x, y) in face {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if poly.last() != Some(&p) {
            poly.push(p);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    (poly.len() >= 3).then_some(poly)
}

fn draw_face(img: &mut RgbImage, face: &[(f32, f32); 4], fill: Color, edge: Color) {
    if let Some(poly) = fill_outline(face) {
        draw_polygon_mut(img, &poly, fill.to_pixel());
    }
    for i in 0..face.len() {
        draw_line_segment_mut(img, face[i], face[(i + 1) % face.len()], edge.to_pixel());
    }
}

/// Render the quantized grid as a shaded 3D bar chart.
///
/// Bars are drawn back to front, left to right, so nearer bars cover the
/// faces of those behind them.
pub fn render_volume(grid: &QuantizedGrid, style: &VolumeStyle, font: &LabelFont) -> Result<RgbImage> {
    style.validate()?;
    let cols = grid.width();
    let rows = grid.height();
    let proj = Projection::new(style, cols, rows);
    let mut img = blank_canvas("volume canvas", style.width as u64, style.height as u64)?;

    let title = format!("3D Quantization ({} Levels)", grid.color_count());
    font.draw_centered(
        &mut img,
        style.width as i64 / 2,
        (MARGIN / 2.0 + TITLE_BAND / 2.0) as i64,
        &title,
        Color::BLACK,
    );

    let (c, r) = (cols as f32, rows as f32);
    let floor = proj.face([(0.0, 0.0, 0.0), (c, 0.0, 0.0), (c, r, 0.0), (0.0, r, 0.0)]);
    draw_face(&mut img, &floor, FLOOR_COLOR, AXIS_COLOR);

    // Intensity axis along the back-left edge.
    let axis_end = proj.project(0.0, r, MAX_LEVEL);
    draw_line_segment_mut(
        &mut img,
        proj.project(0.0, r, 0.0),
        axis_end,
        AXIS_COLOR.to_pixel(),
    );
    let axis_top = to_px(axis_end);
    for tick in AXIS_TICKS {
        let (tx, ty) = to_px(proj.project(0.0, r, tick as f32));
        draw_line_segment_mut(
            &mut img,
            ((tx - 4) as f32, ty as f32),
            (tx as f32, ty as f32),
            AXIS_COLOR.to_pixel(),
        );
        let label = tick.to_string();
        let (w, h) = font.measure(&label);
        font.draw(&mut img, tx - 8 - w as i64, ty - h as i64 / 2, &label, AXIS_COLOR);
    }
    let (_, axis_label_h) = font.measure("Intensity");
    font.draw(
        &mut img,
        axis_top.0 - 20,
        axis_top.1 - axis_label_h as i64 - 8,
        "Intensity",
        AXIS_COLOR,
    );

    let f = style.footprint;
    let inset = (1.0 - f) / 2.0;
    for row in 0..rows {
        let d0 = (rows - 1 - row) as f32 + inset;
        let d1 = d0 + f;
        for col in 0..cols {
            let Some(cell) = grid.grid().get(col, row) else {
                continue;
            };
            let x0 = col as f32 + inset;
            let x1 = x0 + f;
            let h = cell.level as f32;
            let edge = cell.color.scaled(EDGE_SHADE);

            if cell.level > 0 {
                let front = proj.face([(x0, d0, 0.0), (x1, d0, 0.0), (x1, d0, h), (x0, d0, h)]);
                draw_face(&mut img, &front, cell.color.scaled(FRONT_SHADE), edge);
                let side = proj.face([(x1, d0, 0.0), (x1, d1, 0.0), (x1, d1, h), (x1, d0, h)]);
                draw_face(&mut img, &side, cell.color.scaled(SIDE_SHADE), edge);
            }
            let top = proj.face([(x0, d0, h), (x1, d0, h), (x1, d1, h), (x0, d1, h)]);
            draw_face(&mut img, &top, cell.color, edge);
        }
    }

    log::debug!(
        "Rendered {} bars on {}x{} canvas",
        cols * rows,
        style.width,
        style.height
    );
    Ok(img)
}
