use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ports::{
    AudioLoader, AudioLoaderError, TranscriptionEngine, TranscriptionError,
};
use crate::domain::{ChunkSpan, Waveform, chunk_spans};

/// How long recordings are split before transcription.
#[derive(Debug, Clone)]
pub struct ChunkingPolicy {
    pub enabled: bool,
    /// Duration of each chunk, in minutes.
    pub chunk_minutes: u32,
    /// Recordings up to this many minutes are transcribed in one pass.
    pub single_pass_max_minutes: u32,
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            chunk_minutes: 10,
            single_pass_max_minutes: 15,
        }
    }
}

/// Drives the audio loader and the transcription engine over a recording.
///
/// Short recordings go through the engine in a single pass. Long ones are
/// split into fixed-duration chunks; each chunk is staged to a scoped
/// temporary WAV file, transcribed through the engine's file interface, and
/// the non-empty results are joined in chunk order with a single space.
/// The first failing chunk aborts the whole operation.
pub struct TranscriptionService<L, E>
where
    L: AudioLoader + ?Sized,
    E: TranscriptionEngine + ?Sized,
{
    loader: Arc<L>,
    engine: Arc<E>,
    policy: ChunkingPolicy,
}

impl<L, E> TranscriptionService<L, E>
where
    L: AudioLoader + ?Sized,
    E: TranscriptionEngine + ?Sized,
{
    pub fn new(loader: Arc<L>, engine: Arc<E>, policy: ChunkingPolicy) -> Self {
        Self {
            loader,
            engine,
            policy,
        }
    }

    pub async fn transcribe_file(&self, path: &Path) -> Result<String, TranscriptionPipelineError> {
        let waveform = self.loader.load(path)?;
        let duration_secs = waveform.duration_secs();
        let threshold_secs = f64::from(self.policy.single_pass_max_minutes) * 60.0;

        if !self.policy.enabled || duration_secs <= threshold_secs {
            debug!(duration_secs, "Transcribing recording in a single pass");
            return Ok(self.engine.transcribe_waveform(&waveform).await?);
        }

        let chunk_samples =
            self.policy.chunk_minutes as usize * 60 * waveform.sample_rate() as usize;
        let spans = chunk_spans(waveform.len(), chunk_samples);

        info!(
            chunks = spans.len(),
            chunk_minutes = self.policy.chunk_minutes,
            duration_secs,
            "Splitting long recording into chunks"
        );

        let mut segments: Vec<String> = Vec::new();
        for span in &spans {
            info!(
                chunk = span.index + 1,
                total = spans.len(),
                start_secs = span.start as f64 / waveform.sample_rate() as f64,
                "Transcribing audio chunk"
            );
            let text = self.transcribe_span(&waveform, span).await?;
            if !text.is_empty() {
                segments.push(text);
            }
        }

        let transcript = segments.join(" ");
        info!(
            chunks = spans.len(),
            segments = segments.len(),
            chars = transcript.len(),
            "Chunked transcription completed"
        );

        Ok(transcript)
    }

    /// Stage one span to a temp WAV and transcribe it. The temp file is
    /// removed when the guard drops, on the error paths included.
    async fn transcribe_span(
        &self,
        waveform: &Waveform,
        span: &ChunkSpan,
    ) -> Result<String, TranscriptionPipelineError> {
        let staged = tempfile::Builder::new()
            .prefix("hospitace-chunk-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| TranscriptionPipelineError::ChunkStaging(e.to_string()))?;

        write_wav_mono(waveform.span_samples(span), waveform.sample_rate(), staged.path())
            .map_err(|e| TranscriptionPipelineError::ChunkStaging(e.to_string()))?;

        let text = self.engine.transcribe_path(staged.path()).await?;
        Ok(text.trim().to_string())
    }
}

fn write_wav_mono(samples: &[f32], sample_rate: u32, path: &Path) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionPipelineError {
    #[error("audio loading: {0}")]
    Audio(#[from] AudioLoaderError),
    #[error("transcription: {0}")]
    Engine(#[from] TranscriptionError),
    #[error("chunk staging: {0}")]
    ChunkStaging(String),
}
