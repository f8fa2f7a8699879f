//! Subcommand handlers.
//!
//! Each handler merges command-line flags over the config file, builds the
//! typed parameters, decodes the input and prints the JSON report to stdout.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::args::{Args, Command, ConfigAction};
use super::enums::Method;
use crate::artifact::DirectorySink;
use crate::audio::{read_wav, DEFAULT_SILENCE_THRESHOLD, DEFAULT_SNIPPET_SAMPLES};
use crate::config::{default_path as get_config_path, Config, ConfigError, DEFAULT_CONFIG_TOML};
use crate::error::DiscretizeError;
use crate::pipeline::{
    execute, AudioParams, MediaInput, Operation, QuantizationParams, Report, SamplingParams,
    DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS,
};
use crate::raster::{Color, ColorMapping, RasterGrid, ResampleMethod, DEFAULT_COLOR_COUNT};
use crate::render::{LabelFont, VolumeStyle, DEFAULT_CELL_SIZE, DEFAULT_FONT_SIZE};

pub const DEFAULT_OUTPUT_DIR: &str = "processed";

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discretize(#[from] DiscretizeError),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file already exists: {}", .0.display())]
    ConfigExists(PathBuf),
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError::Discretize(DiscretizeError::Io(e))
    }
}

/// Load the config file. An explicit path must exist; the default path may not.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => Config::load_required(p),
        None => Config::load(None),
    }
}

/// Run the parsed command line.
pub fn run(args: Args) -> Result<(), CommandError> {
    let explicit = args.config.as_deref();
    let out = args.out.as_deref();
    match &args.command {
        Command::Config { action } => handle_config_action(action, explicit),
        Command::Sample {
            input,
            rows,
            cols,
            method,
        } => {
            let config = load_config(explicit)?;
            let params = sampling_params(&config, *rows, *cols, *method)?;
            let bytes = std::fs::read(input)?;
            let grid = decode_image(input, &bytes)?;
            process(
                &Operation::Sampling(params),
                &MediaInput::Image(grid),
                &bytes,
                &label_font(&config, None, None),
                out_dir(out, &config),
            )
        }
        Command::Quantize {
            input,
            rows,
            cols,
            colors,
            cell_size,
            method,
            tint,
            font,
            font_size,
        } => {
            let config = load_config(explicit)?;
            let params =
                quantization_params(&config, *rows, *cols, *colors, *cell_size, *method, *tint)?;
            let font = label_font(&config, font.as_deref(), *font_size);
            let bytes = std::fs::read(input)?;
            let grid = decode_image(input, &bytes)?;
            process(
                &Operation::Quantization(params),
                &MediaInput::Image(grid),
                &bytes,
                &font,
                out_dir(out, &config),
            )
        }
        Command::Audio {
            input,
            num_samples,
            threshold,
        } => {
            let config = load_config(explicit)?;
            let params = audio_params(&config, *num_samples, *threshold)?;
            let bytes = std::fs::read(input)?;
            let buffer = read_wav(std::io::Cursor::new(bytes.as_slice()), input)?;
            process(
                &Operation::AudioBinary(params),
                &MediaInput::Audio(buffer),
                &bytes,
                &label_font(&config, None, None),
                out_dir(out, &config),
            )
        }
        Command::Text { text } => {
            let config = load_config(explicit)?;
            process(
                &Operation::TextEncoding,
                &MediaInput::Text(text.clone()),
                text.as_bytes(),
                &label_font(&config, None, None),
                out_dir(out, &config),
            )
        }
    }
}

/// Execute one decoded request and print its report. Artifacts land in
/// `out_dir`, keyed by the input bytes and the operation.
fn process(
    operation: &Operation,
    input: &MediaInput,
    bytes: &[u8],
    font: &LabelFont,
    out_dir: PathBuf,
) -> Result<(), CommandError> {
    let key = DirectorySink::request_key(bytes, &format!("{:?}", operation));
    let mut sink = DirectorySink::new(out_dir, key);
    if !matches!(input, MediaInput::Text(_)) {
        sink.ensure_dir_exists()?;
    }
    let report = execute(operation, input, font, &mut sink)?;
    print_report(&report)
}

/// `--out`, then the config file, then `processed`.
fn out_dir(flag: Option<&Path>, config: &Config) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.output.dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn sampling_params(
    config: &Config,
    rows: Option<i64>,
    cols: Option<i64>,
    method: Option<Method>,
) -> Result<SamplingParams, DiscretizeError> {
    let s = &config.sampling;
    SamplingParams::new(
        rows.or(s.rows).unwrap_or(DEFAULT_GRID_ROWS as i64),
        cols.or(s.cols).unwrap_or(DEFAULT_GRID_COLS as i64),
        method
            .map(ResampleMethod::from)
            .or(s.method)
            .unwrap_or(ResampleMethod::Nearest),
    )
}

fn quantization_params(
    config: &Config,
    rows: Option<i64>,
    cols: Option<i64>,
    colors: Option<i64>,
    cell_size: Option<i64>,
    method: Option<Method>,
    tint: Option<Color>,
) -> Result<QuantizationParams, DiscretizeError> {
    let q = &config.quantization;
    QuantizationParams::new(
        rows.or(q.rows).unwrap_or(DEFAULT_GRID_ROWS as i64),
        cols.or(q.cols).unwrap_or(DEFAULT_GRID_COLS as i64),
        colors.or(q.colors).unwrap_or(DEFAULT_COLOR_COUNT as i64),
        cell_size.or(q.cell_size).unwrap_or(DEFAULT_CELL_SIZE as i64),
        method
            .map(ResampleMethod::from)
            .or(q.method)
            .unwrap_or(ResampleMethod::Bilinear),
    )?
    .with_mapping(tint.map(ColorMapping::Tint).unwrap_or_default())
    .with_volume(volume_style(config))
}

fn audio_params(
    config: &Config,
    num_samples: Option<i64>,
    threshold: Option<f32>,
) -> Result<AudioParams, DiscretizeError> {
    AudioParams::new(
        num_samples
            .or(config.audio.num_samples)
            .unwrap_or(DEFAULT_SNIPPET_SAMPLES as i64),
        threshold
            .or(config.audio.threshold)
            .unwrap_or(DEFAULT_SILENCE_THRESHOLD),
    )
}

fn volume_style(config: &Config) -> VolumeStyle {
    let defaults = VolumeStyle::default();
    VolumeStyle {
        width: config.volume.width.unwrap_or(defaults.width),
        height: config.volume.height.unwrap_or(defaults.height),
        footprint: config.volume.footprint.unwrap_or(defaults.footprint),
    }
}

/// Label font: flags first, then the `[quantization]` config section.
fn label_font(config: &Config, flag_font: Option<&Path>, flag_size: Option<f32>) -> LabelFont {
    let path = flag_font.or(config.quantization.font.as_deref());
    let size = flag_size
        .or(config.quantization.font_size)
        .unwrap_or(DEFAULT_FONT_SIZE);
    LabelFont::load_or_fallback(path, size)
}

fn decode_image(path: &Path, bytes: &[u8]) -> Result<RasterGrid, DiscretizeError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DiscretizeError::ImageDecode {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgb8();
    log::info!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    RasterGrid::from_image(&img)
}

fn print_report(report: &Report) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: &ConfigAction,
    explicit: Option<&Path>,
) -> Result<(), CommandError> {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let config = load_config(explicit)?;
            let s = &config.sampling;
            let q = &config.quantization;
            let a = &config.audio;
            let v = volume_style(&config);

            println!("Current configuration:");
            println!(
                "  Sampling: {}x{} ({})",
                s.rows.unwrap_or(DEFAULT_GRID_ROWS as i64),
                s.cols.unwrap_or(DEFAULT_GRID_COLS as i64),
                s.method.unwrap_or(ResampleMethod::Nearest).name()
            );
            println!(
                "  Quantization: {}x{}, {} levels, {} px cells ({})",
                q.rows.unwrap_or(DEFAULT_GRID_ROWS as i64),
                q.cols.unwrap_or(DEFAULT_GRID_COLS as i64),
                q.colors.unwrap_or(DEFAULT_COLOR_COUNT as i64),
                q.cell_size.unwrap_or(DEFAULT_CELL_SIZE as i64),
                q.method.unwrap_or(ResampleMethod::Bilinear).name()
            );
            match &q.font {
                Some(font) => println!("  Font: {}", font.display()),
                None => println!("  Font: built-in bitmap"),
            }
            println!(
                "  Volume: {}x{}, footprint {}",
                v.width, v.height, v.footprint
            );
            println!(
                "  Audio: {} samples, threshold {}",
                a.num_samples.unwrap_or(DEFAULT_SNIPPET_SAMPLES as i64),
                a.threshold.unwrap_or(DEFAULT_SILENCE_THRESHOLD)
            );
            println!(
                "  Output: {}",
                config
                    .output
                    .dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
                    .display()
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            init_config(&config_path)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

/// Write the default config to `path`, refusing to overwrite.
pub fn init_config(path: &Path) -> Result<(), CommandError> {
    if path.exists() {
        return Err(CommandError::ConfigExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_init_config_writes_and_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        init_config(&path).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.quantization.colors, Some(16));
        assert!(matches!(
            init_config(&path),
            Err(CommandError::ConfigExists(_))
        ));
    }

    #[test]
    fn test_load_config_explicit_missing_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("none.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::parse("[sampling]\nrows = 3\ncols = 4\nmethod = \"bilinear\"\n").unwrap();
        let params = sampling_params(&config, None, Some(7), None).unwrap();
        assert_eq!(
            params,
            SamplingParams {
                rows: 3,
                cols: 7,
                method: ResampleMethod::Bilinear,
            }
        );
        let params = sampling_params(&config, None, None, Some(Method::Nearest)).unwrap();
        assert_eq!(params.method, ResampleMethod::Nearest);
    }

    #[test]
    fn test_quantize_tint_and_clamp() {
        let params = quantization_params(
            &Config::default(),
            None,
            None,
            Some(1),
            None,
            None,
            Some(Color::new(255, 0, 0)),
        )
        .unwrap();
        assert_eq!(params.color_count, 2);
        assert_eq!(params.mapping, ColorMapping::Tint(Color::new(255, 0, 0)));
        assert_eq!(params.cell_size, DEFAULT_CELL_SIZE);
    }

    #[test]
    fn test_invalid_rows_rejected() {
        let err = sampling_params(&Config::default(), Some(0), None, None).unwrap_err();
        assert!(matches!(err, DiscretizeError::InvalidDimension { .. }));
    }

    #[test]
    fn test_bad_volume_config_rejected() {
        let config = Config::parse("[volume]\nfootprint = 0.0\n").unwrap();
        let result = quantization_params(&config, None, None, None, None, None, None);
        assert!(matches!(
            result,
            Err(DiscretizeError::InvalidRange {
                name: "footprint",
                ..
            })
        ));
    }

    #[test]
    fn test_audio_params_merge() {
        let config = Config::parse("[audio]\nnum_samples = 40\nthreshold = 0.01\n").unwrap();
        let params = audio_params(&config, None, None).unwrap();
        assert_eq!(params.num_samples, 40);
        assert_eq!(params.threshold, 0.01);
        let params = audio_params(&config, Some(5000), Some(0.2)).unwrap();
        assert_eq!(params.num_samples, 1000);
        assert_eq!(params.threshold, 0.2);
    }

    #[test]
    fn test_out_dir_precedence() {
        let config = Config::parse("[output]\ndir = \"from-config\"\n").unwrap();
        assert_eq!(
            out_dir(Some(Path::new("flag")), &config),
            PathBuf::from("flag")
        );
        assert_eq!(out_dir(None, &config), PathBuf::from("from-config"));
        assert_eq!(
            out_dir(None, &Config::default()),
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        );
    }

    #[test]
    fn test_config_subcommand_runs_without_media() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let args = Args::parse_from([
            "discretize",
            "config",
            "init",
            "--config",
            path.to_str().unwrap(),
        ]);
        run(args).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_text_subcommand_writes_no_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();
        let out = temp_dir.path().join("out");
        let args = Args::parse_from([
            "discretize",
            "text",
            "Hi",
            "--config",
            config_path.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ]);
        run(args).unwrap();
        assert!(!out.exists());
    }
}
