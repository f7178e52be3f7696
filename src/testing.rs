//! Test helpers: scripted model fakes and a throwaway database.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::db::{self, DbPool};
use crate::domain::{EducationLevel, FeedbackResponse, WordItem};
use crate::gateway::{GatewayError, SentenceGrader, WordSource};

/// `n` words named `{prefix}0`, `{prefix}1`, ...
pub fn words(prefix: &str, n: usize) -> Vec<WordItem> {
  (0..n)
    .map(|i| WordItem {
      word: format!("{prefix}{i}"),
      definition: format!("definition of {prefix}{i} (释义)"),
      part_of_speech: "noun".to_string(),
      example: format!("This is {prefix}{i}."),
    })
    .collect()
}

pub fn feedback(correct: bool) -> FeedbackResponse {
  FeedbackResponse {
    is_correct: correct,
    feedback: if correct { "很好！" } else { "再试一次。" }.to_string(),
    improved_sentence: None,
  }
}

type WordCalls = Arc<Mutex<Vec<(EducationLevel, Vec<String>)>>>;

/// Replays queued results in order, then reports `NoWords`.
pub struct ScriptedWords {
  script: Mutex<VecDeque<Result<Vec<WordItem>, GatewayError>>>,
  calls: WordCalls,
}

impl ScriptedWords {
  pub fn new(script: Vec<Result<Vec<WordItem>, GatewayError>>) -> Self {
    Self {
      script: Mutex::new(script.into()),
      calls: Arc::default(),
    }
  }

  /// Level and exclusion list of every call, in order
  pub fn calls(&self) -> WordCalls {
    self.calls.clone()
  }
}

#[async_trait]
impl WordSource for ScriptedWords {
  async fn fetch_words(
    &self,
    level: EducationLevel,
    exclude: &[String],
  ) -> Result<Vec<WordItem>, GatewayError> {
    self.calls.lock().unwrap().push((level, exclude.to_vec()));
    self
      .script
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(Err(GatewayError::NoWords))
  }
}

/// Never answers.
pub struct StalledWords;

#[async_trait]
impl WordSource for StalledWords {
  async fn fetch_words(&self, _: EducationLevel, _: &[String]) -> Result<Vec<WordItem>, GatewayError> {
    std::future::pending().await
  }
}

#[derive(Default)]
pub struct ScriptedGrader {
  script: Mutex<VecDeque<Result<FeedbackResponse, GatewayError>>>,
  calls: Arc<Mutex<usize>>,
}

impl ScriptedGrader {
  pub fn new(script: Vec<Result<FeedbackResponse, GatewayError>>) -> Self {
    Self {
      script: Mutex::new(script.into()),
      calls: Arc::default(),
    }
  }

  pub fn calls(&self) -> Arc<Mutex<usize>> {
    self.calls.clone()
  }
}

#[async_trait]
impl SentenceGrader for ScriptedGrader {
  async fn evaluate_sentence(
    &self,
    _word: &WordItem,
    _sentence: &str,
  ) -> Result<FeedbackResponse, GatewayError> {
    *self.calls.lock().unwrap() += 1;
    self
      .script
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(Err(GatewayError::EmptyResponse))
  }
}

pub struct StalledGrader;

#[async_trait]
impl SentenceGrader for StalledGrader {
  async fn evaluate_sentence(&self, _: &WordItem, _: &str) -> Result<FeedbackResponse, GatewayError> {
    std::future::pending().await
  }
}

/// A migrated database file in a temporary directory, removed on drop.
pub struct TestEnv {
  pub temp: TempDir,
  pub pool: DbPool,
}

impl TestEnv {
  pub fn new() -> rusqlite::Result<Self> {
    let temp =
      TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    let pool = db::init_db(&temp.path().join("linguacraft.db"))?;
    Ok(Self { temp, pool })
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }
}
