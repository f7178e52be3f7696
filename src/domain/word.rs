use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vocabulary item as produced by the word generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordItem {
  pub word: String,
  /// English definition followed by the native-language gloss in parentheses
  pub definition: String,
  pub part_of_speech: String,
  /// Reference sentence, only shown when the learner asks for a hint
  pub example: String,
}

/// A word the learner used correctly, with the sentence that proved it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteredItem {
  #[serde(flatten)]
  pub item: WordItem,
  pub user_sentence: String,
  pub mastered_at: DateTime<Utc>,
}

impl MasteredItem {
  pub fn new(item: WordItem, user_sentence: String, mastered_at: DateTime<Utc>) -> Self {
    Self {
      item,
      user_sentence,
      mastered_at,
    }
  }

  pub fn word(&self) -> &str {
    &self.item.word
  }
}
