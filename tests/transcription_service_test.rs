use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use hospitace::application::ports::{
    AudioLoader, AudioLoaderError, TranscriptionEngine, TranscriptionError,
};
use hospitace::application::services::{
    ChunkingPolicy, TranscriptionPipelineError, TranscriptionService,
};
use hospitace::domain::{TARGET_SAMPLE_RATE, Waveform};

fn waveform_of_minutes(minutes: f64) -> Waveform {
    let samples = (minutes * 60.0 * TARGET_SAMPLE_RATE as f64) as usize;
    Waveform::new(vec![0.0; samples], TARGET_SAMPLE_RATE)
}

struct StaticLoader {
    waveform: Waveform,
}

impl AudioLoader for StaticLoader {
    fn load(&self, _path: &Path) -> Result<Waveform, AudioLoaderError> {
        Ok(self.waveform.clone())
    }
}

/// Engine double that replays scripted chunk results and records how it
/// was driven: how many whole-waveform passes ran, which staged chunk
/// files it saw, and whether those files existed at transcription time.
struct ScriptedEngine {
    responses: Mutex<VecDeque<Result<String, TranscriptionError>>>,
    waveform_calls: AtomicUsize,
    chunk_files: Mutex<Vec<(PathBuf, bool)>>,
}

impl ScriptedEngine {
    fn new(responses: Vec<Result<String, TranscriptionError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            waveform_calls: AtomicUsize::new(0),
            chunk_files: Mutex::new(Vec::new()),
        }
    }

    fn next_response(&self) -> Result<String, TranscriptionError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }

    fn chunk_files(&self) -> Vec<(PathBuf, bool)> {
        self.chunk_files.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TranscriptionEngine for ScriptedEngine {
    async fn transcribe_waveform(&self, _waveform: &Waveform) -> Result<String, TranscriptionError> {
        self.waveform_calls.fetch_add(1, Ordering::SeqCst);
        self.next_response()
    }

    async fn transcribe_path(&self, path: &Path) -> Result<String, TranscriptionError> {
        self.chunk_files
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists()));
        self.next_response()
    }
}

fn service(
    waveform: Waveform,
    engine: std::sync::Arc<ScriptedEngine>,
    policy: ChunkingPolicy,
) -> TranscriptionService<StaticLoader, ScriptedEngine> {
    TranscriptionService::new(std::sync::Arc::new(StaticLoader { waveform }), engine, policy)
}

fn chunked_policy() -> ChunkingPolicy {
    ChunkingPolicy {
        enabled: true,
        chunk_minutes: 1,
        single_pass_max_minutes: 0,
    }
}

#[tokio::test]
async fn given_short_recording_when_transcribing_then_single_pass_without_chunking() {
    let engine = std::sync::Arc::new(ScriptedEngine::new(vec![Ok("whole lesson".to_string())]));
    let service = service(
        waveform_of_minutes(1.0),
        engine.clone(),
        ChunkingPolicy::default(),
    );

    let transcript = service.transcribe_file(Path::new("lesson.mp3")).await.unwrap();

    assert_eq!(transcript, "whole lesson");
    assert_eq!(engine.waveform_calls.load(Ordering::SeqCst), 1);
    assert!(engine.chunk_files().is_empty());
}

#[tokio::test]
async fn given_recording_at_exact_threshold_when_transcribing_then_still_single_pass() {
    let engine = std::sync::Arc::new(ScriptedEngine::new(vec![Ok("whole lesson".to_string())]));
    let service = service(
        waveform_of_minutes(15.0),
        engine.clone(),
        ChunkingPolicy::default(),
    );

    let transcript = service.transcribe_file(Path::new("lesson.mp3")).await.unwrap();

    assert_eq!(transcript, "whole lesson");
    assert_eq!(engine.waveform_calls.load(Ordering::SeqCst), 1);
    assert!(engine.chunk_files().is_empty());
}

#[tokio::test]
async fn given_chunking_disabled_when_transcribing_long_recording_then_single_pass() {
    let engine = std::sync::Arc::new(ScriptedEngine::new(vec![Ok("whole lesson".to_string())]));
    let policy = ChunkingPolicy {
        enabled: false,
        ..chunked_policy()
    };
    let service = service(waveform_of_minutes(2.5), engine.clone(), policy);

    let transcript = service.transcribe_file(Path::new("lesson.mp3")).await.unwrap();

    assert_eq!(transcript, "whole lesson");
    assert_eq!(engine.waveform_calls.load(Ordering::SeqCst), 1);
    assert!(engine.chunk_files().is_empty());
}

#[tokio::test]
async fn given_long_recording_when_transcribing_then_segments_joined_with_single_space() {
    let engine = std::sync::Arc::new(ScriptedEngine::new(vec![
        Ok("hello".to_string()),
        Ok("".to_string()),
        Ok("world".to_string()),
    ]));
    let service = service(waveform_of_minutes(2.5), engine.clone(), chunked_policy());

    let transcript = service.transcribe_file(Path::new("lesson.mp3")).await.unwrap();

    assert_eq!(transcript, "hello world");
    assert_eq!(engine.waveform_calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.chunk_files().len(), 3);
}

#[tokio::test]
async fn given_long_recording_when_transcribing_then_chunk_files_exist_during_and_not_after() {
    let engine = std::sync::Arc::new(ScriptedEngine::new(vec![
        Ok("a".to_string()),
        Ok("b".to_string()),
        Ok("c".to_string()),
    ]));
    let service = service(waveform_of_minutes(2.5), engine.clone(), chunked_policy());

    service.transcribe_file(Path::new("lesson.mp3")).await.unwrap();

    let chunk_files = engine.chunk_files();
    assert_eq!(chunk_files.len(), 3);
    for (path, existed_during_call) in chunk_files {
        assert!(existed_during_call, "{} was never staged", path.display());
        assert!(!path.exists(), "{} not cleaned up", path.display());
    }
}

#[tokio::test]
async fn given_failing_chunk_when_transcribing_then_operation_aborts_and_temp_file_removed() {
    let engine = std::sync::Arc::new(ScriptedEngine::new(vec![
        Ok("first".to_string()),
        Err(TranscriptionError::TranscriptionFailed(
            "decode blew up".to_string(),
        )),
    ]));
    let service = service(waveform_of_minutes(2.5), engine.clone(), chunked_policy());

    let result = service.transcribe_file(Path::new("lesson.mp3")).await;

    assert!(matches!(
        result,
        Err(TranscriptionPipelineError::Engine(
            TranscriptionError::TranscriptionFailed(_)
        ))
    ));

    // Third chunk must never have been attempted
    let chunk_files = engine.chunk_files();
    assert_eq!(chunk_files.len(), 2);
    for (path, _) in chunk_files {
        assert!(!path.exists(), "{} not cleaned up", path.display());
    }
}

#[tokio::test]
async fn given_missing_audio_file_when_transcribing_then_not_found_surfaces() {
    struct MissingLoader;

    impl AudioLoader for MissingLoader {
        fn load(&self, path: &Path) -> Result<Waveform, AudioLoaderError> {
            Err(AudioLoaderError::NotFound(path.to_path_buf()))
        }
    }

    let engine = std::sync::Arc::new(ScriptedEngine::new(Vec::new()));
    let service = TranscriptionService::new(
        std::sync::Arc::new(MissingLoader),
        engine,
        ChunkingPolicy::default(),
    );

    let result = service.transcribe_file(Path::new("nope.mp3")).await;

    assert!(matches!(
        result,
        Err(TranscriptionPipelineError::Audio(AudioLoaderError::NotFound(_)))
    ));
}

#[tokio::test]
async fn given_whitespace_only_chunks_when_transcribing_then_transcript_is_empty() {
    let engine = std::sync::Arc::new(ScriptedEngine::new(vec![
        Ok("   ".to_string()),
        Ok("\n".to_string()),
        Ok("".to_string()),
    ]));
    let service = service(waveform_of_minutes(2.5), engine.clone(), chunked_policy());

    let transcript = service.transcribe_file(Path::new("lesson.mp3")).await.unwrap();

    assert_eq!(transcript, "");
}
