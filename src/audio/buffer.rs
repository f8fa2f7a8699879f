//! Mono amplitude buffer.

use serde::Serialize;

use crate::error::{DiscretizeError, Result};

/// Decoded mono audio: amplitudes nominally in `[-1.0, 1.0]` plus a sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer. Fails on an empty sample list, a non-finite sample
    /// or a zero sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(DiscretizeError::EmptyInput {
                what: "audio buffer",
            });
        }
        if let Some((index, value)) = samples.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(DiscretizeError::InvalidRange {
                name: "sample",
                value: format!("{} at index {}", value, index),
                expected: "finite amplitudes",
            });
        }
        if sample_rate == 0 {
            return Err(DiscretizeError::InvalidRange {
                name: "sample_rate",
                value: "0".to_string(),
                expected: "a positive integer",
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: construction rejects empty buffers.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn summary(&self) -> AudioSummary {
        AudioSummary {
            duration_secs: self.duration_secs(),
            sample_rate: self.sample_rate,
            total_samples: self.samples.len(),
        }
    }
}

/// Basic facts about a loaded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioSummary {
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub total_samples: usize,
}
