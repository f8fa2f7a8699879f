//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Method;
use crate::raster::Color;

/// Demonstrates how continuous media becomes discrete data
#[derive(Parser, Debug)]
#[command(name = "discretize")]
#[command(version, about = "Sampling and quantization of images, audio and text", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path (must exist when given)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for rendered images
    #[arg(long, short, global = true)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pixelate an image by shrinking it to a coarse grid
    Sample {
        /// Image file (PNG or JPEG)
        input: PathBuf,

        /// Grid rows
        #[arg(long, allow_negative_numbers = true)]
        rows: Option<i64>,

        /// Grid columns
        #[arg(long, allow_negative_numbers = true)]
        cols: Option<i64>,

        /// Shrink rule
        #[arg(long, short)]
        method: Option<Method>,
    },
    /// Quantize an image to a few intensity levels and render grid and 3D views
    Quantize {
        /// Image file (PNG or JPEG)
        input: PathBuf,

        /// Grid rows
        #[arg(long, allow_negative_numbers = true)]
        rows: Option<i64>,

        /// Grid columns
        #[arg(long, allow_negative_numbers = true)]
        cols: Option<i64>,

        /// Number of levels (clamped to 2-256)
        #[arg(long, allow_negative_numbers = true)]
        colors: Option<i64>,

        /// Side of each grid cell in pixels
        #[arg(long, allow_negative_numbers = true)]
        cell_size: Option<i64>,

        /// Resize rule
        #[arg(long, short)]
        method: Option<Method>,

        /// Tint levels with a color instead of gray (e.g. "#3080ff")
        #[arg(long, value_parser = parse_hex_color)]
        tint: Option<Color>,

        /// Label font (TrueType/OpenType)
        #[arg(long)]
        font: Option<PathBuf>,

        /// Label font size in pixels
        #[arg(long, value_parser = parse_font_size)]
        font_size: Option<f32>,
    },
    /// Skip leading silence in a WAV file and print samples as 16-bit binary
    Audio {
        /// WAV file
        input: PathBuf,

        /// Number of samples to print (clamped to 1-1000)
        #[arg(long, short, allow_negative_numbers = true)]
        num_samples: Option<i64>,

        /// Amplitude at or below which leading samples count as silence
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Show the code, binary and hex of every character
    Text {
        /// Text to encode
        text: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,
    /// Create default config file
    Init,
}

/// Parse a `#rrggbb` (or `rrggbb`) color.
pub fn parse_hex_color(s: &str) -> Result<Color, String> {
    let hex_str = s.strip_prefix('#').unwrap_or(s);
    if hex_str.len() != 6 || !hex_str.is_ascii() {
        return Err(format!("Invalid color '{}'. Use #RRGGBB (e.g., #3080ff)", s));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex_str[i..i + 2], 16)
            .map_err(|_| format!("Invalid hex digits in color '{}'", s))
    };
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Parse and validate a font size (4-256 px)
pub fn parse_font_size(s: &str) -> Result<f32, String> {
    let size: f32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(4.0..=256.0).contains(&size) {
        return Err(format!("Font size must be between 4 and 256, got {}", size));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_defaults() {
        let args = Args::parse_from(["discretize", "sample", "in.png"]);
        assert!(args.config.is_none());
        assert!(args.out.is_none());
        match args.command {
            Command::Sample {
                input,
                rows,
                cols,
                method,
            } => {
                assert_eq!(input, PathBuf::from("in.png"));
                assert!(rows.is_none());
                assert!(cols.is_none());
                assert!(method.is_none());
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_sample_negative_rows_reach_validation() {
        let args = Args::parse_from(["discretize", "sample", "in.png", "--rows", "-3"]);
        match args.command {
            Command::Sample { rows, .. } => assert_eq!(rows, Some(-3)),
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_quantize_options() {
        let args = Args::parse_from([
            "discretize",
            "quantize",
            "in.jpg",
            "--colors",
            "4",
            "--cell-size",
            "30",
            "--method",
            "nearest",
            "--tint",
            "#ff0000",
        ]);
        match args.command {
            Command::Quantize {
                colors,
                cell_size,
                method,
                tint,
                ..
            } => {
                assert_eq!(colors, Some(4));
                assert_eq!(cell_size, Some(30));
                assert_eq!(method, Some(Method::Nearest));
                assert_eq!(tint, Some(Color::new(255, 0, 0)));
            }
            _ => panic!("Expected Quantize command"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::parse_from([
            "discretize",
            "audio",
            "a.wav",
            "-n",
            "5",
            "--out",
            "/tmp/out",
            "--config",
            "/tmp/c.toml",
        ]);
        assert_eq!(args.out, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        match args.command {
            Command::Audio { num_samples, .. } => assert_eq!(num_samples, Some(5)),
            _ => panic!("Expected Audio command"),
        }
    }

    #[test]
    fn test_text_subcommand() {
        let args = Args::parse_from(["discretize", "text", "Hi!"]);
        match args.command {
            Command::Text { text } => assert_eq!(text, "Hi!"),
            _ => panic!("Expected Text command"),
        }
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["discretize", "config", "show"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
        let args = Args::parse_from(["discretize", "config", "init"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let result = Args::try_parse_from(["discretize", "sample", "in.png", "--method", "cubic"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#3080ff"), Ok(Color::new(0x30, 0x80, 0xff)));
        assert_eq!(parse_hex_color("000000"), Ok(Color::new(0, 0, 0)));
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn test_parse_font_size() {
        assert_eq!(parse_font_size("16"), Ok(16.0));
        assert!(parse_font_size("2").is_err());
        assert!(parse_font_size("abc").is_err());
    }
}
