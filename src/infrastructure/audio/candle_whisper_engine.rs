use std::path::Path;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;
use tokio::sync::{Mutex, OnceCell};

use super::model_resolver::{ModelResolver, ResolvedModel};
use super::symphonia_loader::SymphoniaAudioLoader;
use crate::application::ports::{
    AudioLoader, ModelLoadError, ModelLoader, TranscriptionEngine, TranscriptionError,
};
use crate::domain::Waveform;

/// Repository carrying the byte-packed mel filter bank used by all models.
const MEL_FILTERS_REPO: &str = "FL33TW00D-HF/whisper-base";

/// Everything needed to run inference with one loaded Whisper model.
///
/// The model itself sits behind an async mutex: inference mutates the KV
/// cache, and the backend is not safe for concurrent calls on one handle.
pub struct WhisperBundle {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
}

/// Fetches and opens one Whisper candidate from the cache directory.
pub struct CandleModelLoader {
    device: Device,
}

impl CandleModelLoader {
    pub fn new() -> Self {
        Self {
            device: Device::Cpu,
        }
    }
}

impl Default for CandleModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLoader for CandleModelLoader {
    type Handle = WhisperBundle;

    fn attempt(&self, candidate: &str, cache_dir: &Path) -> Result<WhisperBundle, ModelLoadError> {
        let repo_id = model_repo(candidate);

        let api = ApiBuilder::new()
            .with_cache_dir(cache_dir.to_path_buf())
            .build()
            .map_err(|e| ModelLoadError::Cache(e.to_string()))?;

        let repo = api.repo(Repo::new(repo_id, RepoType::Model));
        let config_path = repo
            .get("config.json")
            .map_err(|e| classify("config.json", e.to_string()))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| classify("tokenizer.json", e.to_string()))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| classify("model.safetensors", e.to_string()))?;

        let mel_repo = api.repo(Repo::new(MEL_FILTERS_REPO.to_string(), RepoType::Model));
        let mel_bytes_path = mel_repo
            .get("melfilters.bytes")
            .map_err(|e| classify("melfilters.bytes", e.to_string()))?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| classify("read config", e.to_string()))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| ModelLoadError::Integrity(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| classify("tokenizer", e.to_string()))?;

        let mel_bytes =
            std::fs::read(&mel_bytes_path).map_err(|e| classify("mel filters", e.to_string()))?;
        let mel_filters = read_mel_filters(&mel_bytes, &config)?;

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &self.device)
                .map_err(|e| classify("weights", e.to_string()))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| classify("model", e.to_string()))?;

        Ok(WhisperBundle {
            model: Mutex::new(model),
            tokenizer,
            config,
            device: self.device.clone(),
            mel_filters,
        })
    }
}

/// Bare size names resolve to the official OpenAI checkpoints; anything
/// with a slash is taken as a full Hugging Face repository id.
fn model_repo(candidate: &str) -> String {
    if candidate.contains('/') {
        candidate.to_string()
    } else {
        format!("openai/whisper-{}", candidate)
    }
}

fn classify(stage: &str, message: String) -> ModelLoadError {
    if looks_like_corruption(&message) {
        ModelLoadError::Integrity(format!("{}: {}", stage, message))
    } else {
        ModelLoadError::Unavailable(format!("{}: {}", stage, message))
    }
}

fn looks_like_corruption(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("checksum")
        || message.contains("corrupt")
        || message.contains("invalid header")
        || message.contains("unexpected end of file")
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, ModelLoadError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(ModelLoadError::Integrity(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    let filters: Vec<f32> = bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(filters)
}

/// Whisper transcription via candle, loaded lazily on first use.
///
/// The first caller resolves the model through the fallback chain; the
/// `OnceCell` keeps concurrent first calls single-flight so only one load
/// is ever in flight per engine instance.
pub struct CandleWhisperEngine {
    resolver: ModelResolver,
    loader: CandleModelLoader,
    language: Option<String>,
    bundle: OnceCell<ResolvedModel<WhisperBundle>>,
}

impl CandleWhisperEngine {
    pub fn new(resolver: ModelResolver, language: Option<String>) -> Self {
        Self {
            resolver,
            loader: CandleModelLoader::new(),
            language,
            bundle: OnceCell::new(),
        }
    }

    /// Name of the candidate that actually loaded, if any load happened yet.
    pub fn resolved_model(&self) -> Option<&str> {
        self.bundle.get().map(|r| r.name.as_str())
    }

    async fn bundle(&self) -> Result<&ResolvedModel<WhisperBundle>, TranscriptionError> {
        self.bundle
            .get_or_try_init(|| async { Ok(self.resolver.resolve(&self.loader)?) })
            .await
    }
}

#[async_trait]
impl TranscriptionEngine for CandleWhisperEngine {
    async fn transcribe_waveform(&self, waveform: &Waveform) -> Result<String, TranscriptionError> {
        if waveform.is_empty() {
            return Ok(String::new());
        }

        let resolved = self.bundle().await?;
        let bundle = &resolved.handle;

        let language_token = match self.language.as_deref() {
            Some(language) => {
                let token = bundle.tokenizer.token_to_id(&format!("<|{}|>", language));
                if token.is_none() {
                    tracing::warn!(
                        language,
                        model = %resolved.name,
                        "Language token not found in tokenizer, letting the model decide"
                    );
                }
                token
            }
            None => None,
        };

        let pcm = waveform.samples();
        let mut mel_tensors = Vec::new();

        for (i, window) in pcm.chunks(m::N_SAMPLES).enumerate() {
            let samples = if window.len() < m::N_SAMPLES {
                let mut padded = window.to_vec();
                padded.resize(m::N_SAMPLES, 0.0);
                padded
            } else {
                window.to_vec()
            };

            let mel_data = m::audio::pcm_to_mel(&bundle.config, &samples, &bundle.mel_filters);
            let n_mel = bundle.config.num_mel_bins;
            let n_frames = mel_data.len() / n_mel;

            let mel_tensor = Tensor::from_vec(mel_data, (1, n_mel, n_frames), &bundle.device)
                .map_err(|e| {
                    TranscriptionError::TranscriptionFailed(format!("mel tensor: {}", e))
                })?;

            mel_tensors.push((i, mel_tensor));
        }

        let mut segments: Vec<String> = Vec::new();
        let mut model = bundle.model.lock().await;

        for (i, mel_tensor) in mel_tensors {
            tracing::debug!(window = i, model = %resolved.name, "Transcribing audio window");
            let text = decode_window(
                &mut model,
                &bundle.tokenizer,
                &bundle.device,
                &mel_tensor,
                language_token,
            )?;
            if !text.is_empty() {
                segments.push(text);
            }
        }

        let transcript = segments.join(" ");

        tracing::info!(
            windows = segments.len(),
            chars = transcript.len(),
            model = %resolved.name,
            "Waveform transcription completed"
        );

        Ok(transcript)
    }

    async fn transcribe_path(&self, path: &Path) -> Result<String, TranscriptionError> {
        let waveform = SymphoniaAudioLoader.load(path)?;
        self.transcribe_waveform(&waveform).await
    }
}

fn decode_window(
    model: &mut m::model::Whisper,
    tokenizer: &Tokenizer,
    device: &Device,
    mel: &Tensor,
    language_token: Option<u32>,
) -> Result<String, TranscriptionError> {
    let sot_token = token_id(tokenizer, m::SOT_TOKEN)?;
    let transcribe_token = token_id(tokenizer, m::TRANSCRIBE_TOKEN)?;
    let no_timestamps_token = token_id(tokenizer, m::NO_TIMESTAMPS_TOKEN)?;
    let eot_token = token_id(tokenizer, m::EOT_TOKEN)?;

    let audio_features = model
        .encoder
        .forward(mel, true)
        .map_err(|e| TranscriptionError::TranscriptionFailed(format!("encoder: {}", e)))?;

    let mut tokens = vec![sot_token];
    if let Some(language) = language_token {
        tokens.push(language);
    }
    tokens.push(transcribe_token);
    tokens.push(no_timestamps_token);

    let prompt_len = tokens.len();
    let max_tokens = 224;
    let mut decoded_text = String::new();

    for _ in 0..max_tokens {
        let token_tensor = Tensor::new(tokens.as_slice(), device)
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?
            .unsqueeze(0)
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

        let decoder_output = model
            .decoder
            .forward(&token_tensor, &audio_features, tokens.len() == prompt_len)
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("decoder: {}", e)))?;

        let logits = model
            .decoder
            .final_linear(
                &decoder_output
                    .squeeze(0)
                    .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?,
            )
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("linear: {}", e)))?;

        let seq_len = logits
            .dim(0)
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;
        let last_logits = logits
            .get(seq_len - 1)
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

        let next_token = last_logits
            .argmax(0)
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?
            .to_scalar::<u32>()
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

        if next_token == eot_token {
            break;
        }

        tokens.push(next_token);

        if let Some(text) = tokenizer.id_to_token(next_token) {
            let text = text.replace("Ġ", " ").replace("▁", " ");
            decoded_text.push_str(&text);
        }
    }

    model.reset_kv_cache();

    Ok(decoded_text.trim().to_string())
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, TranscriptionError> {
    tokenizer.token_to_id(token).ok_or_else(|| {
        TranscriptionError::TranscriptionFailed(format!("token not found: {}", token))
    })
}
