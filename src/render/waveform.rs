//! Amplitude-over-time plot of an audio buffer.

use image::RgbImage;
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::blank_canvas;
use super::font::LabelFont;
use crate::audio::AudioBuffer;
use crate::error::{DiscretizeError, Result};
use crate::raster::Color;

pub const DEFAULT_WAVEFORM_WIDTH: u32 = 1000;
pub const DEFAULT_WAVEFORM_HEIGHT: u32 = 400;

const PAD: i64 = 40;
const WAVE_COLOR: Color = Color::new(31, 119, 180);
const FRAME_COLOR: Color = Color::gray(90);
const CENTER_COLOR: Color = Color::gray(200);

/// Lowest and highest finite sample in `samples`, clamped to `[-1, 1]`.
/// `None` when the slice holds no finite value.
fn column_extent(samples: &[f32]) -> Option<(f32, f32)> {
    samples
        .iter()
        .filter(|s| s.is_finite())
        .map(|s| s.clamp(-1.0, 1.0))
        .fold(None, |extent, s| match extent {
            None => Some((s, s)),
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
        })
}

/// Render a min/max envelope of `buffer`, one column per pixel.
pub fn render_waveform(
    buffer: &AudioBuffer,
    width: u32,
    height: u32,
    font: &LabelFont,
) -> Result<RgbImage> {
    if width <= 2 * PAD as u32 || height <= 2 * PAD as u32 {
        return Err(DiscretizeError::InvalidRange {
            name: "waveform canvas",
            value: format!("{}x{}", width, height),
            expected: "both edges larger than 80 px",
        });
    }
    let mut img = blank_canvas("waveform canvas", width as u64, height as u64)?;

    let plot_w = width as i64 - 2 * PAD;
    let plot_h = height as i64 - 2 * PAD;
    let center_y = (PAD + plot_h / 2) as f32;
    let half = (plot_h / 2) as f32;

    font.draw_centered(&mut img, width as i64 / 2, PAD / 2, "Waveform", Color::BLACK);
    draw_hollow_rect_mut(
        &mut img,
        Rect::at(PAD as i32, PAD as i32).of_size(plot_w as u32, plot_h as u32),
        FRAME_COLOR.to_pixel(),
    );
    draw_line_segment_mut(
        &mut img,
        ((PAD + 1) as f32, center_y),
        ((PAD + plot_w - 2) as f32, center_y),
        CENTER_COLOR.to_pixel(),
    );

    let samples = buffer.samples();
    let columns = (plot_w - 2).max(1) as usize;
    for col in 0..columns {
        let start = col * samples.len() / columns;
        let end = ((col + 1) * samples.len() / columns).max(start + 1).min(samples.len());
        if start >= samples.len() {
            break;
        }
        let Some((lo, hi)) = column_extent(&samples[start..end]) else {
            continue;
        };
        let x = (PAD + 1 + col as i64) as f32;
        let y_top = center_y - (hi * half).round();
        let y_bottom = center_y - (lo * half).round();
        draw_line_segment_mut(&mut img, (x, y_top), (x, y_bottom), WAVE_COLOR.to_pixel());
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_draws_only_center() {
        let buffer = AudioBuffer::new(vec![0.0; 500], 8000).unwrap();
        let font = LabelFont::bitmap(16.0);
        let img = render_waveform(&buffer, 300, 200, &font).unwrap();
        assert_eq!(img.dimensions(), (300, 200));
        // mid-plot, centre row carries the wave color; one row above stays white
        assert_eq!(img.get_pixel(150, 100).0, [31, 119, 180]);
        assert_eq!(img.get_pixel(150, 90).0, [255, 255, 255]);
    }

    #[test]
    fn test_column_extent_skips_non_finite() {
        assert_eq!(column_extent(&[f32::NAN, f32::NAN]), None);
        assert_eq!(column_extent(&[]), None);
        assert_eq!(
            column_extent(&[f32::NAN, 0.25, f32::INFINITY, -0.5]),
            Some((-0.5, 0.25))
        );
        assert_eq!(column_extent(&[3.0, -7.0]), Some((-1.0, 1.0)));
    }

    #[test]
    fn test_full_scale_reaches_plot_edges() {
        let samples: Vec<f32> = (0..2000).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let buffer = AudioBuffer::new(samples, 8000).unwrap();
        let font = LabelFont::bitmap(16.0);
        let img = render_waveform(&buffer, 300, 200, &font).unwrap();
        // plot_h = 120 around row 100, so every column spans rows 40..=160
        assert_eq!(img.get_pixel(60, 41).0, [31, 119, 180]);
        assert_eq!(img.get_pixel(60, 159).0, [31, 119, 180]);
    }

    #[test]
    fn test_too_small_canvas() {
        let buffer = AudioBuffer::new(vec![0.0; 10], 8000).unwrap();
        let font = LabelFont::bitmap(16.0);
        assert!(render_waveform(&buffer, 60, 400, &font).is_err());
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let buffer = AudioBuffer::new(vec![0.0; 10], 8000).unwrap();
        let font = LabelFont::bitmap(16.0);
        let err = render_waveform(&buffer, 100_000, 100_000, &font).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_RANGE");
    }
}
