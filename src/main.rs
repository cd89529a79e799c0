use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use hospitace::application::services::{ChunkingPolicy, EvaluationService, TranscriptionService};
use hospitace::config::Settings;
use hospitace::domain::LessonContext;
use hospitace::infrastructure::audio::{CandleWhisperEngine, ModelResolver, SymphoniaAudioLoader};
use hospitace::infrastructure::llm::OpenAiChatClient;
use hospitace::infrastructure::observability::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(TracingConfig::default());

    let settings = Settings::from_env();

    let mut args = std::env::args().skip(1);
    let audio_path = args
        .next()
        .map(PathBuf::from)
        .context("usage: hospitace <audio-file> [lesson-metadata.json]")?;
    let metadata_path = args.next().map(PathBuf::from);

    let loader = Arc::new(SymphoniaAudioLoader);
    let resolver = ModelResolver::new(
        settings.transcription.cache_dir.clone(),
        settings.transcription.model.clone(),
        settings.transcription.fallback_models.clone(),
    );
    let engine = Arc::new(CandleWhisperEngine::new(
        resolver,
        Some(settings.transcription.language.clone()),
    ));
    let policy = ChunkingPolicy {
        enabled: settings.transcription.chunking_enabled,
        chunk_minutes: settings.transcription.chunk_minutes,
        single_pass_max_minutes: settings.transcription.single_pass_max_minutes,
    };
    let transcription = TranscriptionService::new(loader, engine, policy);

    match metadata_path {
        None => {
            let transcript = transcription.transcribe_file(&audio_path).await?;
            println!("{transcript}");
        }
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading lesson metadata from {}", path.display()))?;
            let context: LessonContext =
                serde_json::from_str(&raw).context("parsing lesson metadata")?;

            let api_key = settings
                .llm
                .api_key
                .clone()
                .context("FEATHERLESS_API_KEY must be set for evaluation")?;
            let llm = Arc::new(OpenAiChatClient::new(
                api_key,
                Some(settings.llm.base_url.clone()),
                Some(settings.llm.model.clone()),
                settings.llm.temperature,
            ));

            let evaluation =
                EvaluationService::new(transcription, llm, settings.llm.system_prompt.clone());
            let report = evaluation.evaluate(&audio_path, context).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
