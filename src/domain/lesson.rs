use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Lesson metadata supplied alongside the audio upload.
///
/// Unknown keys are preserved in `extra_metadata` so callers can pass
/// arbitrary context through to the evaluation prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonContext {
    pub teacher_name: String,
    pub school_name: String,
    pub region: String,
    pub age_group: String,
    pub subject: String,
    pub lesson_type: String,
    pub curriculum_goal: Option<String>,
    pub language_of_instruction: String,
    #[serde(flatten)]
    pub extra_metadata: Map<String, Value>,
}

impl Default for LessonContext {
    fn default() -> Self {
        Self {
            teacher_name: "Unknown Teacher".to_string(),
            school_name: "Unknown School".to_string(),
            region: "Unspecified Region".to_string(),
            age_group: "Upper primary (9-11 years)".to_string(),
            subject: "General Studies".to_string(),
            lesson_type: "Practice / consolidation".to_string(),
            curriculum_goal: None,
            language_of_instruction: "Czech".to_string(),
            extra_metadata: Map::new(),
        }
    }
}

impl LessonContext {
    /// Uppercase placeholder mapping embedded into the LLM user prompt.
    pub fn placeholder_mapping(&self) -> Value {
        json!({
            "TEACHER_NAME": self.teacher_name,
            "SCHOOL_NAME": self.school_name,
            "REGION": self.region,
            "AGE_GROUP": self.age_group,
            "SUBJECT": self.subject,
            "LESSON_TYPE": self.lesson_type,
            "CURRICULUM_GOAL": self.curriculum_goal.as_deref().unwrap_or("Not provided"),
            "LANGUAGE": self.language_of_instruction,
        })
    }
}
