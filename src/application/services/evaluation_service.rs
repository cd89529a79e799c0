use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::prompt::build_user_prompt;
use super::transcription_service::{TranscriptionPipelineError, TranscriptionService};
use crate::application::ports::{AudioLoader, LlmClient, LlmClientError, TranscriptionEngine};
use crate::domain::LessonContext;

/// Transcribes a recording and asks the LLM for a pedagogical evaluation.
pub struct EvaluationService<L, E>
where
    L: AudioLoader + ?Sized,
    E: TranscriptionEngine + ?Sized,
{
    transcription: TranscriptionService<L, E>,
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

/// Result of one full evaluation pass.
#[derive(Debug, Clone, Serialize)]
pub struct LessonEvaluation {
    pub context: LessonContext,
    pub transcript: String,
    pub evaluation: EvaluationOutcome,
}

/// The model is asked for JSON; replies that do not parse are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvaluationOutcome {
    Structured(Value),
    Raw(String),
}

impl<L, E> EvaluationService<L, E>
where
    L: AudioLoader + ?Sized,
    E: TranscriptionEngine + ?Sized,
{
    pub fn new(
        transcription: TranscriptionService<L, E>,
        llm: Arc<dyn LlmClient>,
        system_prompt: String,
    ) -> Self {
        Self {
            transcription,
            llm,
            system_prompt,
        }
    }

    pub async fn evaluate(
        &self,
        audio_path: &Path,
        context: LessonContext,
    ) -> Result<LessonEvaluation, EvaluationError> {
        let transcript = self.transcription.transcribe_file(audio_path).await?;
        info!(chars = transcript.len(), "Transcription finished");

        let user_prompt = build_user_prompt(&context, &transcript);
        let reply = self.llm.complete(&self.system_prompt, &user_prompt).await?;

        let evaluation = match serde_json::from_str::<Value>(reply.trim()) {
            Ok(value) => {
                info!("Evaluator returned valid JSON");
                EvaluationOutcome::Structured(value)
            }
            Err(_) => {
                warn!("Evaluator response was not valid JSON, keeping raw text");
                EvaluationOutcome::Raw(reply)
            }
        };

        Ok(LessonEvaluation {
            context,
            transcript,
            evaluation,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionPipelineError),
    #[error("evaluation: {0}")]
    Llm(#[from] LlmClientError),
}
