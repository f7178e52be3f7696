use serde::{Deserialize, Serialize};

/// Shown when the grader could not be reached or answered garbage.
pub const SERVICE_UNAVAILABLE_FEEDBACK: &str = "抱歉，暂时无法验证您的句子，请稍后再试。";

/// Verdict on one sentence attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
  pub is_correct: bool,
  pub feedback: String,
  /// A more native phrasing, only offered once the attempt is correct or close
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub improved_sentence: Option<String>,
}

impl FeedbackResponse {
  pub fn service_unavailable() -> Self {
    Self {
      is_correct: false,
      feedback: SERVICE_UNAVAILABLE_FEEDBACK.to_string(),
      improved_sentence: None,
    }
  }

  /// Models occasionally send `""` for the optional field; treat it as absent.
  pub fn normalized(mut self) -> Self {
    if self
      .improved_sentence
      .as_deref()
      .is_some_and(|s| s.trim().is_empty())
    {
      self.improved_sentence = None;
    }
    self
  }
}
