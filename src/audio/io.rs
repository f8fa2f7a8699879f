//! WAV decoding into a mono [`AudioBuffer`] using the hound crate.

use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;

use super::AudioBuffer;
use crate::error::{DiscretizeError, Result};

/// Load a WAV file, averaging all channels down to mono.
///
/// Integer PCM is normalized by `2^(bits-1)`; float samples are taken as-is.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| DiscretizeError::AudioDecode {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode(reader, path)
}

/// Decode WAV data from any reader (for in-memory input).
pub fn read_wav<R: Read>(source: R, label: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::new(source).map_err(|e| DiscretizeError::AudioDecode {
        path: label.to_path_buf(),
        source: e,
    })?;
    decode(reader, label)
}

fn decode<R: Read>(reader: WavReader<R>, path: &Path) -> Result<AudioBuffer> {
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let decode_err = |e| DiscretizeError::AudioDecode {
        path: path.to_path_buf(),
        source: e,
    };

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err)?,
        SampleFormat::Int => {
            let max_val = (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(decode_err)?
        }
    };

    let mono: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    log::debug!(
        "Decoded {}: {} Hz, {} channel(s), {} mono samples",
        path.display(),
        spec.sample_rate,
        channels,
        mono.len()
    );

    AudioBuffer::new(mono, spec.sample_rate)
}
