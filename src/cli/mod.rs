//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{parse_font_size, parse_hex_color, Args, Command, ConfigAction};
pub use commands::{
    handle_config_action, init_config, load_config, run, CommandError, DEFAULT_OUTPUT_DIR,
};
pub use enums::Method;
