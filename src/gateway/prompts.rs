//! Prompt text and response schemas for the two model calls.

use serde_json::{json, Value};

use crate::config::TutorSettings;
use crate::domain::{EducationLevel, WordItem};

pub fn word_list_prompt(level: EducationLevel, exclude: &[String], tutor: &TutorSettings) -> String {
  let exclusion = serde_json::to_string(exclude).unwrap_or_else(|_| "[]".to_string());
  format!(
    r#"Generate a list of {count} distinct, useful English vocabulary words suitable for a student in {region} at the "{level}" level.
Ensure the words are not in this exclusion list: {exclusion}.
The words should be challenging enough to learn but appropriate for the level.
For the 'example' field, provide a simple sentence using the word.
For the 'definition' field, provide the English definition followed by the {language} meaning in parentheses. Example: "To run fast (跑，奔跑)"."#,
    count = tutor.batch_size,
    region = tutor.region,
    level = level.display_name(),
    language = tutor.native_language,
  )
}

pub fn feedback_prompt(word: &WordItem, sentence: &str, tutor: &TutorSettings) -> String {
  format!(
    r#"The user is a student from {region} learning the English word: "{word}" ({pos}, meaning: {definition}).
The user wrote this sentence using the word: "{sentence}".

Task:
1. Determine if the sentence uses the word correctly (context, grammar, spelling).
2. If it is correct and natural: set isCorrect to true. Provide positive feedback in {language}. You may suggest a slightly more native phrasing in 'improvedSentence' if applicable.
3. If it is incorrect: set isCorrect to false.
   - Explain the specific error (grammar, wrong meaning, unnatural collocation) in {language}.
   - Do NOT give the full answer immediately. Guide the user to fix it themselves.
   - Use the 'feedback' field to speak directly to the user encouragingly (e.g., "尝试得很棒，但是...").

Return JSON matching the schema."#,
    region = tutor.region,
    word = word.word,
    pos = word.part_of_speech,
    definition = word.definition,
    language = tutor.native_language,
  )
}

/// ARRAY of WordItem objects, every field required.
pub fn word_list_schema() -> Value {
  json!({
    "type": "ARRAY",
    "items": {
      "type": "OBJECT",
      "properties": {
        "word": { "type": "STRING" },
        "definition": { "type": "STRING" },
        "partOfSpeech": { "type": "STRING" },
        "example": { "type": "STRING" }
      },
      "required": ["word", "definition", "partOfSpeech", "example"]
    }
  })
}

/// FeedbackResponse object; `improvedSentence` is optional.
pub fn feedback_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "isCorrect": { "type": "BOOLEAN" },
      "feedback": { "type": "STRING" },
      "improvedSentence": { "type": "STRING" }
    },
    "required": ["isCorrect", "feedback"]
  })
}
