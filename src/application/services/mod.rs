mod evaluation_service;
mod prompt;
mod transcription_service;

pub use evaluation_service::{
    EvaluationError, EvaluationOutcome, EvaluationService, LessonEvaluation,
};
pub use prompt::build_user_prompt;
pub use transcription_service::{
    ChunkingPolicy, TranscriptionPipelineError, TranscriptionService,
};
