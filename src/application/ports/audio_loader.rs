use std::path::{Path, PathBuf};

use crate::domain::Waveform;

/// Loads an audio file from disk as a 16kHz mono waveform.
pub trait AudioLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Waveform, AudioLoaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioLoaderError {
    #[error("audio file not found: {0}")]
    NotFound(PathBuf),
    #[error("audio processing failed: {0}")]
    DecodingFailed(String),
}
