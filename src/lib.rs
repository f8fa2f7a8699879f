//! discretize library crate.
//!
//! Turns continuous media into discrete data and visualizes each step:
//! image sampling, intensity quantization, audio PCM encoding and text
//! character codes. The `discretize` binary is a thin front end over
//! [`pipeline::execute`].

pub mod artifact;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod text;

pub use error::{DiscretizeError, Result};
