mod audio_loader;
mod llm_client;
mod model_loader;
mod transcription_engine;

pub use audio_loader::{AudioLoader, AudioLoaderError};
pub use llm_client::{LlmClient, LlmClientError};
pub use model_loader::{ModelLoadError, ModelLoader};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
