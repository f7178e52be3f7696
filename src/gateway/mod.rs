//! Outbound calls to the generative model.
//!
//! Word generation and sentence grading sit behind two narrow traits so the
//! session logic can run against fakes and the backing model can be swapped.
//! Every call is a single request with no retry.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{EducationLevel, FeedbackResponse, WordItem};

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("model not configured: {0}")]
  NotConfigured(&'static str),
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("HTTP {status}: {body}")]
  HttpStatus { status: reqwest::StatusCode, body: String },
  #[error("JSON decode failed: {0}")]
  Json(#[from] serde_json::Error),
  #[error("empty response from model")]
  EmptyResponse,
  #[error("model returned no words")]
  NoWords,
}

/// Supplies fresh vocabulary for a level.
#[async_trait]
pub trait WordSource: Send + Sync {
  /// `exclude` only steers the model; duplicates that come back anyway are kept.
  async fn fetch_words(
    &self,
    level: EducationLevel,
    exclude: &[String],
  ) -> Result<Vec<WordItem>, GatewayError>;
}

/// Judges whether a sentence uses the target word correctly.
#[async_trait]
pub trait SentenceGrader: Send + Sync {
  async fn evaluate_sentence(
    &self,
    word: &WordItem,
    sentence: &str,
  ) -> Result<FeedbackResponse, GatewayError>;
}
