mod candle_whisper_engine;
mod model_resolver;
mod symphonia_loader;

pub use candle_whisper_engine::{CandleModelLoader, CandleWhisperEngine, WhisperBundle};
pub use model_resolver::{ModelResolver, ResolvedModel};
pub use symphonia_loader::SymphoniaAudioLoader;
