use crate::domain::LessonContext;

/// Render the user message sent to the evaluator model.
///
/// The filled lesson context goes first as pretty-printed JSON, followed by
/// the transcript and the output-format reminder. The system prompt (the
/// rubric itself) is configured separately.
pub fn build_user_prompt(context: &LessonContext, transcript: &str) -> String {
    let metadata = serde_json::to_string_pretty(&context.placeholder_mapping())
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "==================== FILLED CONTEXT (PARAMETERS) ====================\n\
         {metadata}\n\n\
         ==================== LESSON TRANSCRIPT ====================\n\
         {transcript}\n\n\
         Respond with the evaluation as a single valid JSON object and nothing else."
    )
}
