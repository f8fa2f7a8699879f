//! CLI enum types for resampling options.

use clap::ValueEnum;

use crate::raster::ResampleMethod;

/// Interpolation rule for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    Nearest,
    Bilinear,
}

impl From<Method> for ResampleMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Nearest => ResampleMethod::Nearest,
            Method::Bilinear => ResampleMethod::Bilinear,
        }
    }
}
