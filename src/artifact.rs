//! Destinations for rendered artifacts.
//!
//! Pipelines never choose file names or directories themselves; they hand
//! each image to an [`ArtifactSink`] together with a role name such as
//! `"quant_grid"`, and report back whatever location the sink returns.

use image::{ImageFormat, RgbImage};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::{DiscretizeError, Result};

/// Where one artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRef {
    pub role: String,
    pub location: String,
}

/// A writable destination for rendered images.
pub trait ArtifactSink {
    fn write_image(&mut self, role: &str, image: &RgbImage) -> Result<ArtifactRef>;
}

/// Writes PNG files into a directory, named `<role>_<key>.png`.
///
/// The key is derived from the request so that concurrent requests sharing
/// one directory never overwrite each other's files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    key: String,
}

impl DirectorySink {
    /// Does not create the directory - call `ensure_dir_exists()` or use
    /// `new_initialized()`.
    pub fn new(dir: PathBuf, key: String) -> Self {
        Self { dir, key }
    }

    pub fn new_initialized(dir: PathBuf, key: String) -> Result<Self> {
        let sink = Self::new(dir, key);
        sink.ensure_dir_exists()?;
        Ok(sink)
    }

    pub fn ensure_dir_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Deterministic request key: first 8 bytes of SHA-256 over the input
    /// bytes and a description of the parameters, hex encoded.
    pub fn request_key(input: &[u8], params: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input);
        hasher.update([0u8]);
        hasher.update(params.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, role: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.png", role, self.key))
    }
}

impl ArtifactSink for DirectorySink {
    fn write_image(&mut self, role: &str, image: &RgbImage) -> Result<ArtifactRef> {
        let path = self.path_for(role);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| DiscretizeError::Artifact {
                name: path.display().to_string(),
                source: e,
            })?;
        log::info!("Wrote {} ({}x{})", path.display(), image.width(), image.height());
        Ok(ArtifactRef {
            role: role.to_string(),
            location: path.display().to_string(),
        })
    }
}

/// Keeps artifacts in memory; used by tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<(String, RgbImage)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: &str) -> Option<&RgbImage> {
        self.artifacts
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, img)| img)
    }

    pub fn roles(&self) -> Vec<&str> {
        self.artifacts.iter().map(|(r, _)| r.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn write_image(&mut self, role: &str, image: &RgbImage) -> Result<ArtifactRef> {
        self.artifacts.push((role.to_string(), image.clone()));
        Ok(ArtifactRef {
            role: role.to_string(),
            location: format!("memory:{}", role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_request_key_is_deterministic() {
        let a = DirectorySink::request_key(b"pixels", "rows=10");
        let b = DirectorySink::request_key(b"pixels", "rows=10");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_request_key_depends_on_params() {
        let a = DirectorySink::request_key(b"pixels", "rows=10");
        let b = DirectorySink::request_key(b"pixels", "rows=11");
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_initialized_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("processed");
        assert!(!out.exists());
        let sink = DirectorySink::new_initialized(out.clone(), "abc".to_string()).unwrap();
        assert!(out.exists());
        assert_eq!(sink.dir(), out);
    }

    #[test]
    fn test_directory_sink_writes_png() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink =
            DirectorySink::new_initialized(temp_dir.path().to_path_buf(), "k1".to_string()).unwrap();
        let img = RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
        let artifact = sink.write_image("sampled", &img).unwrap();
        assert_eq!(artifact.role, "sampled");
        let path = temp_dir.path().join("sampled_k1.png");
        assert_eq!(artifact.location, path.display().to_string());
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded, img);
    }

    #[test]
    fn test_directory_sink_missing_dir_errors() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(temp_dir.path().join("absent"), "k".to_string());
        let img = RgbImage::new(1, 1);
        let err = sink.write_image("x", &img).unwrap_err();
        assert_eq!(err.error_code(), "ARTIFACT_WRITE");
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.write_image("a", &RgbImage::new(1, 1)).unwrap();
        sink.write_image("b", &RgbImage::new(2, 2)).unwrap();
        assert_eq!(sink.roles(), vec!["a", "b"]);
        assert_eq!(sink.get("b").unwrap().width(), 2);
        assert!(sink.get("c").is_none());
    }
}
