//! 16-bit PCM quantization and binary formatting of amplitude samples.

use serde::Serialize;
use std::fmt;

/// Fewest samples a snippet request can ask for.
pub const MIN_SNIPPET_SAMPLES: usize = 1;
/// Most samples a snippet request can ask for.
pub const MAX_SNIPPET_SAMPLES: usize = 1000;
pub const DEFAULT_SNIPPET_SAMPLES: usize = 20;

/// Clamp a requested sample count into `[1, 1000]`.
pub fn clamp_sample_count(requested: i64) -> usize {
    requested.clamp(MIN_SNIPPET_SAMPLES as i64, MAX_SNIPPET_SAMPLES as i64) as usize
}

/// Signed 16-bit PCM value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PcmSample(pub i16);

impl PcmSample {
    /// Convert a floating-point amplitude to 16-bit PCM.
    ///
    /// The amplitude is clamped to `[-1.0, 1.0]` (NaN becomes silence),
    /// scaled by 32767 and truncated toward zero. Only `-1.0` itself maps to
    /// `-32768`; every other value is symmetric around zero.
    pub fn from_amplitude(amplitude: f32) -> Self {
        let a = if amplitude.is_nan() {
            0.0
        } else {
            amplitude.clamp(-1.0, 1.0)
        };
        if a <= -1.0 {
            return PcmSample(i16::MIN);
        }
        PcmSample((a * i16::MAX as f32).trunc() as i16)
    }

    pub fn value(self) -> i16 {
        self.0
    }

    /// Two's-complement bits masked to 16 bits.
    pub fn to_binary(self) -> BinarySample {
        BinarySample(format!("{:016b}", self.0 as u16))
    }
}

/// Exactly 16 characters of `'0'`/`'1'`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BinarySample(String);

impl BinarySample {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BinarySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert `samples[start .. start + count]` to 16-bit binary strings.
///
/// `count` is clamped to `[1, 1000]`. Samples past the end of the buffer are
/// omitted, so the result may be shorter than `count` (or empty when `start`
/// is past the end).
pub fn quantize_samples(samples: &[f32], start: usize, count: i64) -> Vec<BinarySample> {
    let count = clamp_sample_count(count);
    let start = start.min(samples.len());
    let end = start.saturating_add(count).min(samples.len());
    samples[start..end]
        .iter()
        .map(|&a| PcmSample::from_amplitude(a).to_binary())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale_endpoints() {
        assert_eq!(PcmSample::from_amplitude(1.0).value(), 32767);
        assert_eq!(PcmSample::from_amplitude(-1.0).value(), -32768);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(PcmSample::from_amplitude(0.5).value(), 16383);
        // -0.00002 * 32767 = -0.655..
        assert_eq!(PcmSample::from_amplitude(-0.00002).value(), 0);
    }

    #[test]
    fn test_negative_scale_matches_positive() {
        assert_eq!(PcmSample::from_amplitude(-0.5).value(), -16383);
        assert_eq!(PcmSample::from_amplitude(-0.5).to_binary().as_str(), "1100000000000001");
        for a in [0.1f32, 0.25, 0.5, 0.75, 0.999] {
            assert_eq!(
                PcmSample::from_amplitude(-a).value(),
                -PcmSample::from_amplitude(a).value(),
                "amplitude {}",
                a
            );
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(PcmSample::from_amplitude(3.0).value(), 32767);
        assert_eq!(PcmSample::from_amplitude(-7.5).value(), -32768);
        assert_eq!(PcmSample::from_amplitude(f32::NAN).value(), 0);
    }

    #[test]
    fn test_binary_is_masked_twos_complement() {
        assert_eq!(PcmSample(-1).to_binary().as_str(), "1111111111111111");
        assert_eq!(PcmSample(1).to_binary().as_str(), "0000000000000001");
        assert_eq!(PcmSample(0).to_binary().as_str().len(), 16);
    }

    #[test]
    fn test_clamp_sample_count() {
        assert_eq!(clamp_sample_count(0), 1);
        assert_eq!(clamp_sample_count(-4), 1);
        assert_eq!(clamp_sample_count(20), 20);
        assert_eq!(clamp_sample_count(5000), 1000);
    }

    #[test]
    fn test_start_past_end_is_empty() {
        assert!(quantize_samples(&[0.1, 0.2], 5, 10).is_empty());
    }
}
