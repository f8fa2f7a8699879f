//! Audio discretization: silence skipping and 16-bit PCM encoding.

mod buffer;
mod io;
mod pcm;
mod silence;

pub use buffer::{AudioBuffer, AudioSummary};
pub use io::{load_wav, read_wav};
pub use pcm::{
    clamp_sample_count, quantize_samples, BinarySample, PcmSample, DEFAULT_SNIPPET_SAMPLES,
    MAX_SNIPPET_SAMPLES, MIN_SNIPPET_SAMPLES,
};
pub use silence::{find_start, DEFAULT_SILENCE_THRESHOLD};
