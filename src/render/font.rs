//! Label text rendering.
//!
//! A scalable TrueType/OpenType font is used when one can be loaded.
//! Otherwise labels fall back to a built-in 5x7 bitmap font scaled by an
//! integer factor, which always succeeds.

use ab_glyph::{FontVec, PxScale};
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::fmt;
use std::path::Path;

use crate::raster::Color;

/// Label size used when none is configured.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Bitmap glyph cell size in font units.
const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;
/// Horizontal gap between bitmap glyphs in font units.
const GLYPH_GAP: u32 = 1;

/// Rows of a 5x7 glyph, bit 4 is the leftmost column.
#[rustfmt::skip]
fn glyph_rows(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        _   => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

enum Typeface {
    Scalable(FontVec),
    Bitmap,
}

/// A font plus pixel size, ready to measure and draw labels.
pub struct LabelFont {
    typeface: Typeface,
    size_px: f32,
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.typeface {
            Typeface::Scalable(_) => "scalable",
            Typeface::Bitmap => "bitmap",
        };
        f.debug_struct("LabelFont")
            .field("typeface", &kind)
            .field("size_px", &self.size_px)
            .finish()
    }
}

impl LabelFont {
    /// The built-in bitmap font.
    pub fn bitmap(size_px: f32) -> Self {
        Self {
            typeface: Typeface::Bitmap,
            size_px,
        }
    }

    /// Parse a scalable font from raw TTF/OTF bytes.
    pub fn from_bytes(bytes: Vec<u8>, size_px: f32) -> Option<Self> {
        FontVec::try_from_vec(bytes).ok().map(|font| Self {
            typeface: Typeface::Scalable(font),
            size_px,
        })
    }

    /// Load a scalable font from `path`, falling back to the bitmap font when
    /// no path is given or the file cannot be read or parsed.
    pub fn load_or_fallback(path: Option<&Path>, size_px: f32) -> Self {
        let Some(path) = path else {
            return Self::bitmap(size_px);
        };
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(bytes, size_px).unwrap_or_else(|| {
                log::warn!(
                    "Font '{}' could not be parsed, using bitmap font",
                    path.display()
                );
                Self::bitmap(size_px)
            }),
            Err(e) => {
                log::warn!(
                    "Font '{}' unavailable ({}), using bitmap font",
                    path.display(),
                    e
                );
                Self::bitmap(size_px)
            }
        }
    }

    pub fn is_scalable(&self) -> bool {
        matches!(self.typeface, Typeface::Scalable(_))
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    /// Integer scale for the 5x7 bitmap: glyph height closest to `size_px`
    /// (a 7 px glyph plus spacing reads like an 8 px font).
    fn bitmap_scale(&self) -> u32 {
        ((self.size_px / 8.0).round() as u32).max(1)
    }

    /// Width and height in pixels of `text` when drawn.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match &self.typeface {
            Typeface::Bitmap => {
                let scale = self.bitmap_scale();
                let n = text.chars().count() as u32;
                if n == 0 {
                    return (0, GLYPH_H * scale);
                }
                let width = (n * (GLYPH_W + GLYPH_GAP) - GLYPH_GAP) * scale;
                (width, GLYPH_H * scale)
            }
            Typeface::Scalable(font) => text_size(PxScale::from(self.size_px), font, text),
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, img: &mut RgbImage, x: i64, y: i64, text: &str, color: Color) {
        match &self.typeface {
            Typeface::Bitmap => self.draw_bitmap(img, x, y, text, color),
            Typeface::Scalable(font) => draw_text_mut(
                img,
                color.to_pixel(),
                to_coord(x),
                to_coord(y),
                PxScale::from(self.size_px),
                font,
                text,
            ),
        }
    }

    /// Draw `text` centred on `(cx, cy)`.
    pub fn draw_centered(&self, img: &mut RgbImage, cx: i64, cy: i64, text: &str, color: Color) {
        let (w, h) = self.measure(text);
        self.draw(img, cx - w as i64 / 2, cy - h as i64 / 2, text, color);
    }

    fn draw_bitmap(&self, img: &mut RgbImage, x: i64, y: i64, text: &str, color: Color) {
        let scale = self.bitmap_scale();
        let advance = ((GLYPH_W + GLYPH_GAP) * scale) as i64;
        for (i, c) in text.chars().enumerate() {
            let gx = x.saturating_add((i as i64).saturating_mul(advance));
            for (row, bits) in glyph_rows(c).iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (0x10 >> col) != 0 {
                        let px = Rect::at(
                            to_coord(gx.saturating_add((col * scale) as i64)),
                            to_coord(y.saturating_add((row as u32 * scale) as i64)),
                        )
                        .of_size(scale, scale);
                        draw_filled_rect_mut(img, px, color.to_pixel());
                    }
                }
            }
        }
    }
}

/// Largest coordinate magnitude handed to imageproc. Leaves headroom for
/// glyph extents so its `i32` arithmetic cannot overflow.
const COORD_LIMIT: i64 = 1 << 30;

/// Saturate a layout coordinate into imageproc's `i32` space; anything that
/// far out is clipped anyway.
fn to_coord(v: i64) -> i32 {
    v.clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_falls_back_to_bitmap() {
        let font = LabelFont::load_or_fallback(
            Some(Path::new("/nonexistent/definitely-missing.ttf")),
            DEFAULT_FONT_SIZE,
        );
        assert!(!font.is_scalable());
    }

    #[test]
    fn test_garbage_font_bytes_rejected() {
        assert!(LabelFont::from_bytes(b"not a font".to_vec(), 16.0).is_none());
    }

    #[test]
    fn test_scalable_font_from_bytes() {
        let bytes = include_bytes!("../../tests/fixtures/DejaVuSansMono.ttf").to_vec();
        let font = LabelFont::from_bytes(bytes, 20.0).expect("fixture parses");
        assert!(font.is_scalable());
        let (w, h) = font.measure("255");
        assert!(w > 0 && h > 0);
        assert_eq!(font.measure("").0, 0);

        let mut img = RgbImage::from_pixel(60, 30, Color::WHITE.to_pixel());
        font.draw(&mut img, 2, 2, "255", Color::BLACK);
        assert!(img.pixels().any(|p| p.0[0] < 128));
    }

    #[test]
    fn test_bitmap_scale_from_size() {
        assert_eq!(LabelFont::bitmap(16.0).bitmap_scale(), 2);
        assert_eq!(LabelFont::bitmap(3.0).bitmap_scale(), 1);
        assert_eq!(LabelFont::bitmap(32.0).bitmap_scale(), 4);
    }

    #[test]
    fn test_bitmap_measure() {
        let font = LabelFont::bitmap(16.0);
        // 3 glyphs * 6 units - 1 gap = 17 units, x2 scale
        assert_eq!(font.measure("128"), (34, 14));
        assert_eq!(font.measure(""), (0, 14));
    }

    #[test]
    fn test_bitmap_draw_marks_pixels() {
        let mut img = RgbImage::from_pixel(20, 20, Color::WHITE.to_pixel());
        let font = LabelFont::bitmap(8.0);
        font.draw(&mut img, 0, 0, "1", Color::BLACK);
        // top row of '1' is 0x04: only the middle column is set
        assert_eq!(img.get_pixel(2, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_bitmap_draw_clips_off_canvas() {
        let mut img = RgbImage::from_pixel(4, 4, Color::WHITE.to_pixel());
        let font = LabelFont::bitmap(8.0);
        font.draw(&mut img, -3, -3, "8", Color::BLACK);
        font.draw(&mut img, i64::MAX, i64::MIN, "8", Color::BLACK);
        // row 6 of '8' is 0x0E, so its column 3 lands on (0, 3)
        assert_eq!(img.get_pixel(0, 3).0, [0, 0, 0]);
    }

    #[test]
    fn test_coordinates_saturate() {
        assert_eq!(to_coord(5), 5);
        assert_eq!(to_coord(i64::MAX), 1 << 30);
        assert_eq!(to_coord(i64::MIN), -(1 << 30));
    }

    #[test]
    fn test_unknown_char_uses_placeholder() {
        assert_eq!(glyph_rows('~'), glyph_rows('?'));
        assert_eq!(glyph_rows('a'), glyph_rows('A'));
    }
}
