//! Operation dispatch: typed parameters, inputs and reports.
//!
//! Each [`Operation`] variant carries its own validated parameter struct.
//! Parameters are built once at the boundary; after that nothing in a
//! pipeline can fail on range checks except for structurally invalid input.

use serde::Serialize;

use crate::artifact::{ArtifactRef, ArtifactSink};
use crate::audio::{
    clamp_sample_count, find_start, quantize_samples, AudioBuffer, AudioSummary, BinarySample,
    DEFAULT_SILENCE_THRESHOLD, DEFAULT_SNIPPET_SAMPLES,
};
use crate::error::{DiscretizeError, Result};
use crate::raster::{
    clamp_color_count, quantize_with, resample, target_size, to_intensity, ColorMapping,
    RasterGrid, ResampleMethod, DEFAULT_COLOR_COUNT,
};
use crate::render::{
    check_canvas, render_grid, render_volume, render_waveform, LabelFont, VolumeStyle,
    DEFAULT_CELL_SIZE, DEFAULT_WAVEFORM_HEIGHT, DEFAULT_WAVEFORM_WIDTH,
};
use crate::text::{encode_text, EncodedChar};

pub const DEFAULT_GRID_ROWS: u32 = 10;
pub const DEFAULT_GRID_COLS: u32 = 10;

/// Parameters for the pixelation view.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub rows: u32,
    pub cols: u32,
    /// Rule used to shrink; re-expansion always uses nearest.
    pub method: ResampleMethod,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            cols: DEFAULT_GRID_COLS,
            method: ResampleMethod::Nearest,
        }
    }
}

impl SamplingParams {
    /// Rows and columns must be positive and the grid no larger than
    /// [`crate::render::MAX_CANVAS_PIXELS`] cells.
    pub fn new(rows: i64, cols: i64, method: ResampleMethod) -> Result<Self> {
        let (rows, cols) = target_size(rows, cols)?;
        check_canvas("grid", cols as u64, rows as u64)?;
        Ok(Self { rows, cols, method })
    }
}

/// Parameters for grid quantization and its two visualizations.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizationParams {
    pub rows: u32,
    pub cols: u32,
    /// Already clamped to `[2, 256]`.
    pub color_count: u16,
    pub cell_size: u32,
    pub method: ResampleMethod,
    pub mapping: ColorMapping,
    pub volume: VolumeStyle,
}

impl Default for QuantizationParams {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_ROWS,
            cols: DEFAULT_GRID_COLS,
            color_count: DEFAULT_COLOR_COUNT,
            cell_size: DEFAULT_CELL_SIZE,
            method: ResampleMethod::Bilinear,
            mapping: ColorMapping::Grayscale,
            volume: VolumeStyle::default(),
        }
    }
}

impl QuantizationParams {
    /// Validate raw values. `color_count` is clamped; dimensions and cell
    /// size must be positive, and the rendered grid image must fit the
    /// canvas cap.
    pub fn new(
        rows: i64,
        cols: i64,
        color_count: i64,
        cell_size: i64,
        method: ResampleMethod,
    ) -> Result<Self> {
        let (rows, cols) = target_size(rows, cols)?;
        let cell_size = match u32::try_from(cell_size) {
            Ok(c) if c >= 1 => c,
            _ => {
                return Err(DiscretizeError::InvalidRange {
                    name: "cell_size",
                    value: cell_size.to_string(),
                    expected: "a positive pixel count",
                })
            }
        };
        check_canvas("grid", cols as u64, rows as u64)?;
        check_canvas(
            "grid canvas",
            cols as u64 * cell_size as u64,
            rows as u64 * cell_size as u64,
        )?;
        Ok(Self {
            rows,
            cols,
            color_count: clamp_color_count(color_count),
            cell_size,
            method,
            ..Self::default()
        })
    }

    pub fn with_mapping(mut self, mapping: ColorMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_volume(mut self, volume: VolumeStyle) -> Result<Self> {
        volume.validate()?;
        self.volume = volume;
        Ok(self)
    }
}

/// Parameters for the audio binary snippet and waveform.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioParams {
    /// Already clamped to `[1, 1000]`.
    pub num_samples: usize,
    pub threshold: f32,
    pub waveform_width: u32,
    pub waveform_height: u32,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_SNIPPET_SAMPLES,
            threshold: DEFAULT_SILENCE_THRESHOLD,
            waveform_width: DEFAULT_WAVEFORM_WIDTH,
            waveform_height: DEFAULT_WAVEFORM_HEIGHT,
        }
    }
}

impl AudioParams {
    pub fn new(num_samples: i64, threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(DiscretizeError::InvalidRange {
                name: "threshold",
                value: threshold.to_string(),
                expected: "a finite, non-negative amplitude",
            });
        }
        Ok(Self {
            num_samples: clamp_sample_count(num_samples),
            threshold,
            ..Self::default()
        })
    }
}

/// Every operation the tool can run.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Sampling(SamplingParams),
    Quantization(QuantizationParams),
    AudioBinary(AudioParams),
    TextEncoding,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sampling(_) => "sampling",
            Operation::Quantization(_) => "quantization",
            Operation::AudioBinary(_) => "audio_binary",
            Operation::TextEncoding => "text_encoding",
        }
    }
}

/// Decoded input for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaInput {
    Image(RasterGrid),
    Audio(AudioBuffer),
    Text(String),
}

/// Result of one operation, ready to serialize for the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Report {
    Sampling {
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
        method: ResampleMethod,
        artifacts: Vec<ArtifactRef>,
    },
    Quantization {
        rows: u32,
        cols: u32,
        color_count: u16,
        /// Distinct levels actually used, ascending.
        levels: Vec<u8>,
        /// Level of every cell, one inner vector per row.
        grid: Vec<Vec<u8>>,
        artifacts: Vec<ArtifactRef>,
    },
    AudioBinary {
        summary: AudioSummary,
        start_index: usize,
        binary_snippet: Vec<BinarySample>,
        artifacts: Vec<ArtifactRef>,
    },
    TextEncoding {
        characters: Vec<EncodedChar>,
    },
}

/// Run `operation` on `input`, writing any rendered images to `sink`.
///
/// # Errors
/// `InputMismatch` if the input kind does not suit the operation, plus any
/// error raised by the pipeline itself.
pub fn execute(
    operation: &Operation,
    input: &MediaInput,
    font: &LabelFont,
    sink: &mut dyn ArtifactSink,
) -> Result<Report> {
    log::debug!("Executing {}", operation.name());
    match (operation, input) {
        (Operation::Sampling(params), MediaInput::Image(grid)) => run_sampling(grid, params, sink),
        (Operation::Quantization(params), MediaInput::Image(grid)) => {
            run_quantization(grid, params, font, sink)
        }
        (Operation::AudioBinary(params), MediaInput::Audio(buffer)) => {
            run_audio(buffer, params, font, sink)
        }
        (Operation::TextEncoding, MediaInput::Text(text)) => Ok(run_text(text)),
        (op, _) => Err(DiscretizeError::InputMismatch {
            operation: op.name(),
            expected: match op {
                Operation::Sampling(_) | Operation::Quantization(_) => "image",
                Operation::AudioBinary(_) => "audio",
                Operation::TextEncoding => "text",
            },
        }),
    }
}

/// Shrink to the target grid, then re-expand with nearest so the pixelation
/// is visible at the original size.
pub fn run_sampling(
    grid: &RasterGrid,
    params: &SamplingParams,
    sink: &mut dyn ArtifactSink,
) -> Result<Report> {
    let small = resample(grid, params.rows, params.cols, params.method)?;
    let expanded = resample(&small, grid.height(), grid.width(), ResampleMethod::Nearest)?;
    let artifact = sink.write_image("sampled", &expanded.to_image())?;

    Ok(Report::Sampling {
        width: grid.width(),
        height: grid.height(),
        rows: params.rows,
        cols: params.cols,
        method: params.method,
        artifacts: vec![artifact],
    })
}

/// Resample, reduce to intensity, quantize, and render both views.
pub fn run_quantization(
    grid: &RasterGrid,
    params: &QuantizationParams,
    font: &LabelFont,
    sink: &mut dyn ArtifactSink,
) -> Result<Report> {
    let small = resample(grid, params.rows, params.cols, params.method)?;
    let intensity = to_intensity(&small);
    let quantized = quantize_with(&intensity, params.color_count as i64, params.mapping);

    let grid_img = render_grid(&quantized, params.cell_size, font)?;
    let volume_img = render_volume(&quantized, &params.volume, font)?;
    let artifacts = vec![
        sink.write_image("quant_grid", &grid_img)?,
        sink.write_image("quant_3d", &volume_img)?,
    ];

    let levels_by_row: Vec<Vec<u8>> = quantized
        .grid()
        .cells()
        .chunks(quantized.width() as usize)
        .map(|row| row.iter().map(|c| c.level).collect())
        .collect();

    Ok(Report::Quantization {
        rows: params.rows,
        cols: params.cols,
        color_count: quantized.color_count(),
        levels: quantized.levels(),
        grid: levels_by_row,
        artifacts,
    })
}

/// Skip leading silence, encode a PCM snippet and render the waveform.
pub fn run_audio(
    buffer: &AudioBuffer,
    params: &AudioParams,
    font: &LabelFont,
    sink: &mut dyn ArtifactSink,
) -> Result<Report> {
    let start_index = find_start(buffer.samples(), params.threshold);
    let binary_snippet =
        quantize_samples(buffer.samples(), start_index, params.num_samples as i64);
    let waveform = render_waveform(buffer, params.waveform_width, params.waveform_height, font)?;
    let artifact = sink.write_image("waveform", &waveform)?;

    Ok(Report::AudioBinary {
        summary: buffer.summary(),
        start_index,
        binary_snippet,
        artifacts: vec![artifact],
    })
}

pub fn run_text(text: &str) -> Report {
    Report::TextEncoding {
        characters: encode_text(text),
    }
}
