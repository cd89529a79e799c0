mod settings;

pub use settings::{LlmSettings, Settings, TranscriptionSettings, parse_fallback_models};
