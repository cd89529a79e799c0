use std::fs;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::application::ports::{ModelLoadError, ModelLoader};

/// A successfully loaded model together with the candidate name that won.
#[derive(Debug)]
pub struct ResolvedModel<H> {
    pub name: String,
    pub handle: H,
}

/// Walks an ordered list of model candidates until one loads.
///
/// Candidates are the primary model followed by the configured fallbacks
/// (minus the primary when duplicated). An integrity failure clears the
/// whole cache directory and retries that candidate exactly once; any other
/// failure moves on to the next candidate. When every candidate fails the
/// last underlying error is returned.
pub struct ModelResolver {
    cache_dir: PathBuf,
    primary: String,
    fallbacks: Vec<String>,
}

impl ModelResolver {
    pub fn new(cache_dir: PathBuf, primary: String, fallbacks: Vec<String>) -> Self {
        let fallbacks = fallbacks
            .into_iter()
            .filter(|m| !m.is_empty() && *m != primary)
            .collect();
        Self {
            cache_dir,
            primary,
            fallbacks,
        }
    }

    pub fn candidates(&self) -> Vec<&str> {
        std::iter::once(self.primary.as_str())
            .chain(self.fallbacks.iter().map(String::as_str))
            .collect()
    }

    pub fn resolve<L: ModelLoader>(
        &self,
        loader: &L,
    ) -> Result<ResolvedModel<L::Handle>, ModelLoadError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| ModelLoadError::Cache(e.to_string()))?;

        let mut last_error =
            ModelLoadError::Unavailable("no model candidates configured".to_string());

        for candidate in self.candidates() {
            info!(
                model = candidate,
                cache = %self.cache_dir.display(),
                "Loading speech model"
            );
            match self.attempt_with_recovery(loader, candidate) {
                Ok(handle) => {
                    info!(model = candidate, "Speech model ready");
                    return Ok(ResolvedModel {
                        name: candidate.to_string(),
                        handle,
                    });
                }
                Err(e) => {
                    error!(model = candidate, error = %e, "Failed to load speech model");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn attempt_with_recovery<L: ModelLoader>(
        &self,
        loader: &L,
        candidate: &str,
    ) -> Result<L::Handle, ModelLoadError> {
        match loader.attempt(candidate, &self.cache_dir) {
            Err(ModelLoadError::Integrity(message)) => {
                warn!(
                    model = candidate,
                    error = %message,
                    "Integrity failure detected, clearing model cache and retrying"
                );
                self.clear_cache()?;
                loader.attempt(candidate, &self.cache_dir)
            }
            other => other,
        }
    }

    fn clear_cache(&self) -> Result<(), ModelLoadError> {
        if self.cache_dir.exists() {
            let _ = fs::remove_dir_all(&self.cache_dir);
        }
        fs::create_dir_all(&self.cache_dir).map_err(|e| ModelLoadError::Cache(e.to_string()))
    }
}
