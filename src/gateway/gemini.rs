//! Gemini `generateContent` client with JSON-schema constrained output.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::prompts::{feedback_prompt, feedback_schema, word_list_prompt, word_list_schema};
use super::{GatewayError, SentenceGrader, WordSource};
use crate::config::{GeminiSettings, TutorSettings};
use crate::domain::{EducationLevel, FeedbackResponse, WordItem};

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
  #[serde(default)]
  pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
  pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
  #[serde(default)]
  pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
  pub text: Option<String>,
}

impl GenerateContentResponse {
  /// Text of the first candidate, parts joined. None when there is nothing to parse.
  pub fn text(&self) -> Option<String> {
    let content = self.candidates.first()?.content.as_ref()?;
    let text: String = content
      .parts
      .iter()
      .filter_map(|p| p.text.as_deref())
      .collect();
    if text.trim().is_empty() { None } else { Some(text) }
  }
}

#[derive(Clone)]
pub struct GeminiClient {
  settings: GeminiSettings,
  tutor: TutorSettings,
  client: reqwest::Client,
}

impl GeminiClient {
  pub fn new(settings: GeminiSettings, tutor: TutorSettings) -> Self {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build().unwrap_or_else(|e| {
      tracing::warn!("Falling back to default HTTP client: {}", e);
      reqwest::Client::new()
    });

    Self {
      settings,
      tutor,
      client,
    }
  }

  pub fn is_available(&self) -> bool {
    self
      .settings
      .api_key
      .as_deref()
      .is_some_and(|k| !k.trim().is_empty())
  }

  fn url(&self) -> String {
    format!(
      "{}/models/{}:generateContent",
      self.settings.endpoint.trim_end_matches('/'),
      self.settings.model
    )
  }

  /// One round trip; the reply text must deserialize into `T`.
  async fn generate_json<T: DeserializeOwned>(
    &self,
    prompt: String,
    schema: Value,
    temperature: f32,
  ) -> Result<T, GatewayError> {
    let api_key = self
      .settings
      .api_key
      .as_deref()
      .filter(|k| !k.trim().is_empty())
      .ok_or(GatewayError::NotConfigured("GEMINI_API_KEY"))?;

    let body = request_body(&prompt, schema, temperature);
    let resp = self
      .client
      .post(self.url())
      .header("x-goog-api-key", api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(GatewayError::HttpStatus { status, body });
    }

    let bytes = resp.bytes().await?;
    let parsed: GenerateContentResponse = serde_json::from_slice(&bytes).map_err(|e| {
      tracing::error!(
        "Failed to parse Gemini response JSON: {}. Body: {}",
        e,
        String::from_utf8_lossy(&bytes)
      );
      GatewayError::Json(e)
    })?;

    let text = parsed.text().ok_or(GatewayError::EmptyResponse)?;
    Ok(serde_json::from_str(strip_code_fence(&text))?)
  }
}

#[async_trait]
impl WordSource for GeminiClient {
  async fn fetch_words(
    &self,
    level: EducationLevel,
    exclude: &[String],
  ) -> Result<Vec<WordItem>, GatewayError> {
    let prompt = word_list_prompt(level, exclude, &self.tutor);
    let words: Vec<WordItem> = self
      .generate_json(prompt, word_list_schema(), self.settings.word_temperature)
      .await
      .inspect_err(|e| tracing::error!(level = level.as_str(), "Error fetching words: {}", e))?;

    if words.is_empty() {
      return Err(GatewayError::NoWords);
    }
    tracing::info!(level = level.as_str(), count = words.len(), "Fetched words");
    Ok(words)
  }
}

#[async_trait]
impl SentenceGrader for GeminiClient {
  async fn evaluate_sentence(
    &self,
    word: &WordItem,
    sentence: &str,
  ) -> Result<FeedbackResponse, GatewayError> {
    let prompt = feedback_prompt(word, sentence, &self.tutor);
    let feedback: FeedbackResponse = self
      .generate_json(prompt, feedback_schema(), self.settings.grading_temperature)
      .await?;
    Ok(feedback.normalized())
  }
}

pub fn request_body(prompt: &str, schema: Value, temperature: f32) -> Value {
  json!({
    "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
    "generationConfig": {
      "responseMimeType": "application/json",
      "responseSchema": schema,
      "temperature": temperature
    }
  })
}

/// Models sometimes wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
  let trimmed = text.trim();
  match trimmed.strip_prefix("```") {
    Some(rest) => {
      let rest = rest.strip_prefix("json").unwrap_or(rest);
      rest.strip_suffix("```").unwrap_or(rest).trim()
    }
    None => trimmed,
  }
}
