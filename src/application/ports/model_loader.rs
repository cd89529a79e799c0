use std::path::Path;

/// Loads one named speech-model candidate from a cache directory.
///
/// The resolver drives this once per candidate, so an implementation only
/// has to know how to fetch and open a single model.
pub trait ModelLoader {
    type Handle;

    fn attempt(&self, candidate: &str, cache_dir: &Path) -> Result<Self::Handle, ModelLoadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    /// Cached model files are corrupt or fail an integrity check. The
    /// resolver clears the cache and retries the same candidate once.
    #[error("model cache integrity failure: {0}")]
    Integrity(String),
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("model cache directory error: {0}")]
    Cache(String),
}
