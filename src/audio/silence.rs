//! Leading-silence detection.

/// Amplitude at or below which a sample counts as silent.
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.001;

/// Index of the first sample whose absolute amplitude exceeds `threshold`.
///
/// Falls back to `0` (the start of the buffer) when every sample is silent.
pub fn find_start(samples: &[f32], threshold: f32) -> usize {
    match samples.iter().position(|s| s.abs() > threshold) {
        Some(idx) => idx,
        None => {
            log::debug!(
                "No sample above {} in {} samples, starting at 0",
                threshold,
                samples.len()
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        let samples = [0.001, -0.001, 0.0011];
        assert_eq!(find_start(&samples, DEFAULT_SILENCE_THRESHOLD), 2);
    }

    #[test]
    fn test_negative_amplitude_counts() {
        assert_eq!(find_start(&[0.0, -0.4, 0.9], DEFAULT_SILENCE_THRESHOLD), 1);
    }

    #[test]
    fn test_custom_threshold() {
        let samples = [0.0, 0.05, 0.2];
        assert_eq!(find_start(&samples, 0.1), 2);
    }
}
