use std::env;
use std::path::PathBuf;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub transcription: TranscriptionSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    /// Primary Whisper model, a size name or a full Hugging Face repo id.
    pub model: String,
    /// Language hint passed to the model (ISO 639-1 code).
    pub language: String,
    /// Directory holding downloaded model weights.
    pub cache_dir: PathBuf,
    /// Models tried in order when the primary fails to load.
    pub fallback_models: Vec<String>,
    /// Duration of each chunk for long recordings, in minutes.
    pub chunk_minutes: u32,
    pub chunking_enabled: bool,
    /// Recordings up to this many minutes skip chunking entirely.
    pub single_pass_max_minutes: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "medium".to_string(),
            language: "cs".to_string(),
            cache_dir: PathBuf::from(".cache/whisper"),
            fallback_models: vec!["small".to_string(), "tiny".to_string()],
            chunk_minutes: 10,
            chunking_enabled: true,
            single_pass_max_minutes: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub system_prompt: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "meta-llama/Meta-Llama-3.1-70B-Instruct".to_string(),
            base_url: "https://api.featherless.ai/v1".to_string(),
            temperature: 0.1,
            system_prompt: "You are an expert instructional coach. Evaluate the teacher's \
                            practice based only on the lesson transcript and metadata provided, \
                            and respond with a single valid JSON object."
                .to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let transcription_defaults = TranscriptionSettings::default();
        let llm_defaults = LlmSettings::default();

        let model = env_or("WHISPER_MODEL", transcription_defaults.model);

        let transcription = TranscriptionSettings {
            language: env_or("WHISPER_LANGUAGE", transcription_defaults.language),
            cache_dir: env::var("WHISPER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(transcription_defaults.cache_dir),
            fallback_models: env::var("WHISPER_MODEL_FALLBACKS")
                .map(|raw| parse_fallback_models(&raw, &model))
                .unwrap_or(transcription_defaults.fallback_models),
            chunk_minutes: env_parsed("WHISPER_CHUNK_MINUTES", transcription_defaults.chunk_minutes)
                .max(1),
            chunking_enabled: env_flag(
                "WHISPER_CHUNKING_ENABLED",
                transcription_defaults.chunking_enabled,
            ),
            single_pass_max_minutes: env_parsed(
                "WHISPER_SINGLE_PASS_MAX_MINUTES",
                transcription_defaults.single_pass_max_minutes,
            ),
            model,
        };

        let llm = LlmSettings {
            api_key: env::var("FEATHERLESS_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env_or("LLM_MODEL", llm_defaults.model),
            base_url: env_or("LLM_BASE_URL", llm_defaults.base_url),
            temperature: env_parsed("LLM_TEMPERATURE", llm_defaults.temperature),
            system_prompt: env_or("LLM_SYSTEM_PROMPT", llm_defaults.system_prompt),
        };

        Self { transcription, llm }
    }
}

/// Split a comma-separated fallback list, dropping blanks and the primary.
pub fn parse_fallback_models(raw: &str, primary: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty() && *m != primary)
        .map(ToString::to_string)
        .collect()
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| {
            let v = v.to_lowercase();
            v == "true" || v == "1" || v == "yes"
        })
        .unwrap_or(default)
}
