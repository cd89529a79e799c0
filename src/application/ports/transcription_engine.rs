use std::path::Path;

use async_trait::async_trait;

use super::audio_loader::AudioLoaderError;
use super::model_loader::ModelLoadError;
use crate::domain::Waveform;

/// Speech-to-text over a decoded waveform or an audio file on disk.
///
/// The file form is used for transient chunk files; the waveform form
/// materializes nothing on disk.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe_waveform(&self, waveform: &Waveform) -> Result<String, TranscriptionError>;

    async fn transcribe_path(&self, path: &Path) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio decoding failed: {0}")]
    AudioDecodingFailed(#[from] AudioLoaderError),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(#[from] ModelLoadError),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}
