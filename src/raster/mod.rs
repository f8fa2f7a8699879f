//! Image discretization: sampling and level quantization of raster grids.
//!
//! The image pipeline runs in this order:
//!
//! 1. **Resampling** - nearest or bilinear, to the target grid size
//! 2. **Luminance** - RGB to intensity using BT.601
//! 3. **Level quantization** - median cut down to N representative levels
//!
//! The quantized grid is then handed to [`crate::render`] for display.

mod grayscale;
mod grid;
mod quantize;
mod resample;

pub use grayscale::{luminance, to_intensity};
pub use grid::{Color, Grid, IntensityGrid, RasterGrid};
pub use quantize::{
    clamp_color_count, quantize, quantize_with, ColorMapping, QuantizedCell, QuantizedGrid,
    DEFAULT_COLOR_COUNT, MAX_COLOR_COUNT, MIN_COLOR_COUNT,
};
pub use resample::{resample, target_size, Interpolate, ResampleMethod};
