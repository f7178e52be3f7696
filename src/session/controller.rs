//! Per-learner state machine: onboarding → learning ⇄ review.
//!
//! The controller never awaits. Operations that need the model hand back a
//! request ticket; the caller performs the call and feeds the result to the
//! matching `complete_*` method. Tickets carry the generation they were issued
//! in, and any change of level or word bumps the generation, so a reply that
//! arrives after the learner moved on is dropped instead of applied.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use super::mastered::MasteredList;
use crate::domain::{EducationLevel, FeedbackResponse, MasteredItem, Screen, WordItem};
use crate::gateway::GatewayError;

/// Shown on the onboarding screen when the first batch could not be fetched
pub const START_FAILED_NOTICE: &str = "启动失败，请检查您的网络连接或 API Key。";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
  #[error("another request is still in flight")]
  Busy,
  #[error("no word is being practised")]
  NotLearning,
  #[error("sentence is empty")]
  EmptySentence,
  #[error("sentence was already accepted")]
  AlreadyCorrect,
  #[error("current word has not been used correctly yet")]
  NotMastered,
  #[error("session state unavailable")]
  Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
  /// First batch after picking a level
  Start,
  /// Queue ran out mid-session
  Refill,
}

/// What an in-flight call was for, used when it is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
  Fetch(FetchPurpose),
  Grading,
}

#[derive(Debug, Clone)]
pub struct WordRequest {
  pub token: RequestToken,
  pub level: EducationLevel,
  pub exclude: Vec<String>,
  pub purpose: FetchPurpose,
}

#[derive(Debug, Clone)]
pub struct GradeRequest {
  pub token: RequestToken,
  pub word: WordItem,
  pub sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  Started { count: usize },
  StartFailed,
  Refilled { count: usize },
  RefillFailed,
  Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeOutcome {
  Graded(FeedbackResponse),
  Discarded,
}

/// The learner's work on the current word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAttempt {
  pub sentence: String,
  pub feedback: Option<FeedbackResponse>,
  pub is_checking: bool,
  pub show_hint: bool,
}

impl WordAttempt {
  pub fn is_correct(&self) -> bool {
    self.feedback.as_ref().is_some_and(|f| f.is_correct)
  }
}

/// Read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub screen: Screen,
  pub level: Option<EducationLevel>,
  pub is_loading: bool,
  pub is_checking: bool,
  pub word_queue: Vec<WordItem>,
  pub current_index: usize,
  pub current_word: Option<WordItem>,
  pub attempt: WordAttempt,
  pub mastered_items: Vec<MasteredItem>,
  pub notice: Option<String>,
}

pub struct SessionController {
  level: Option<EducationLevel>,
  screen: Screen,
  word_queue: Vec<WordItem>,
  current_index: usize,
  /// Shared with every other session
  mastered: Arc<MasteredList>,
  is_loading: bool,
  attempt: WordAttempt,
  generation: u64,
  notice: Option<String>,
}

impl SessionController {
  pub fn new(mastered: Arc<MasteredList>) -> Self {
    Self {
      level: None,
      screen: Screen::Onboarding,
      word_queue: Vec::new(),
      current_index: 0,
      mastered,
      is_loading: false,
      attempt: WordAttempt::default(),
      generation: 0,
      notice: None,
    }
  }

  pub fn screen(&self) -> Screen {
    self.screen
  }

  pub fn level(&self) -> Option<EducationLevel> {
    self.level
  }

  pub fn is_loading(&self) -> bool {
    self.is_loading
  }

  pub fn is_checking(&self) -> bool {
    self.attempt.is_checking
  }

  pub fn word_queue(&self) -> &[WordItem] {
    &self.word_queue
  }

  pub fn current_index(&self) -> usize {
    self.current_index
  }

  pub fn current_word(&self) -> Option<&WordItem> {
    self.word_queue.get(self.current_index)
  }

  /// Newest first, including entries recorded by other sessions
  pub fn mastered(&self) -> Vec<MasteredItem> {
    self.mastered.snapshot()
  }

  pub fn attempt(&self) -> &WordAttempt {
    &self.attempt
  }

  /// Returns the pending notice and clears it, so it is shown once.
  pub fn take_notice(&mut self) -> Option<String> {
    self.notice.take()
  }

  pub fn snapshot(&self) -> SessionSnapshot {
    SessionSnapshot {
      screen: self.screen,
      level: self.level,
      is_loading: self.is_loading,
      is_checking: self.attempt.is_checking,
      word_queue: self.word_queue.clone(),
      current_index: self.current_index,
      current_word: self.current_word().cloned(),
      attempt: self.attempt.clone(),
      mastered_items: self.mastered.snapshot(),
      notice: self.notice.clone(),
    }
  }

  fn token(&self) -> RequestToken {
    RequestToken(self.generation)
  }

  fn is_current(&self, token: RequestToken) -> bool {
    token == self.token()
  }

  fn active_word(&self) -> Result<&WordItem, SessionError> {
    if self.screen != Screen::Learning {
      return Err(SessionError::NotLearning);
    }
    self.current_word().ok_or(SessionError::NotLearning)
  }

  fn ensure_idle(&self) -> Result<(), SessionError> {
    if self.is_loading || self.attempt.is_checking {
      Err(SessionError::Busy)
    } else {
      Ok(())
    }
  }

  // ==================== Level selection and word fetching ====================

  /// Start a session at `level`. The returned request asks for the first batch.
  pub fn select_level(&mut self, level: EducationLevel) -> Result<WordRequest, SessionError> {
    self.ensure_idle()?;

    self.generation += 1;
    self.level = Some(level);
    self.is_loading = true;
    self.word_queue.clear();
    self.current_index = 0;
    self.attempt = WordAttempt::default();
    self.notice = None;

    tracing::info!(level = level.as_str(), "Level selected");

    Ok(WordRequest {
      token: self.token(),
      level,
      exclude: self.mastered.words(),
      purpose: FetchPurpose::Start,
    })
  }

  pub fn complete_word_fetch(
    &mut self,
    request: &WordRequest,
    result: Result<Vec<WordItem>, GatewayError>,
  ) -> FetchOutcome {
    if !self.is_current(request.token) {
      tracing::debug!(purpose = ?request.purpose, "Discarding stale word batch");
      return FetchOutcome::Discarded;
    }
    self.is_loading = false;

    let result = result.and_then(|words| {
      if words.is_empty() {
        Err(GatewayError::NoWords)
      } else {
        Ok(words)
      }
    });

    match (request.purpose, result) {
      (FetchPurpose::Start, Ok(words)) => {
        let count = words.len();
        self.word_queue = words;
        self.current_index = 0;
        self.screen = Screen::Learning;
        FetchOutcome::Started { count }
      }
      (FetchPurpose::Start, Err(e)) => {
        tracing::warn!("Failed to start session: {}", e);
        self.notice = Some(START_FAILED_NOTICE.to_string());
        self.level = None;
        self.word_queue.clear();
        self.current_index = 0;
        self.screen = Screen::Onboarding;
        FetchOutcome::StartFailed
      }
      (FetchPurpose::Refill, Ok(words)) => {
        let count = words.len();
        self.word_queue = words;
        self.current_index = 0;
        FetchOutcome::Refilled { count }
      }
      (FetchPurpose::Refill, Err(e)) => {
        tracing::error!("Failed to load more words: {}", e);
        self.word_queue.clear();
        self.current_index = 0;
        FetchOutcome::RefillFailed
      }
    }
  }

  /// Release the flags held by a call whose future was dropped before it finished.
  pub fn abandon(&mut self, token: RequestToken, kind: PendingKind) {
    if !self.is_current(token) {
      return;
    }

    match kind {
      PendingKind::Fetch(purpose) if self.is_loading => {
        tracing::info!(?purpose, "Word fetch abandoned");
        self.is_loading = false;
        match purpose {
          FetchPurpose::Start => {
            self.level = None;
            self.screen = Screen::Onboarding;
          }
          // The old queue is used up; leave it as a failed refill would
          FetchPurpose::Refill => {
            self.word_queue.clear();
            self.current_index = 0;
          }
        }
      }
      PendingKind::Grading if self.attempt.is_checking => {
        tracing::info!("Sentence check abandoned");
        self.attempt.is_checking = false;
      }
      _ => return,
    }
    self.generation += 1;
  }

  // ==================== Per-word attempt ====================

  pub fn submit_sentence(&mut self, sentence: &str) -> Result<GradeRequest, SessionError> {
    let word = self.active_word()?.clone();
    self.ensure_idle()?;
    if self.attempt.is_correct() {
      return Err(SessionError::AlreadyCorrect);
    }
    if sentence.trim().is_empty() {
      return Err(SessionError::EmptySentence);
    }

    self.attempt.sentence = sentence.to_string();
    self.attempt.feedback = None;
    self.attempt.is_checking = true;

    Ok(GradeRequest {
      token: self.token(),
      word,
      sentence: sentence.to_string(),
    })
  }

  pub fn complete_grading(&mut self, request: &GradeRequest, feedback: FeedbackResponse) -> GradeOutcome {
    if !self.is_current(request.token) {
      tracing::debug!(word = %request.word.word, "Discarding stale feedback");
      return GradeOutcome::Discarded;
    }

    self.attempt.is_checking = false;
    self.attempt.feedback = Some(feedback.clone());
    GradeOutcome::Graded(feedback)
  }

  pub fn reveal_hint(&mut self) -> Result<(), SessionError> {
    self.active_word()?;
    self.attempt.show_hint = true;
    Ok(())
  }

  // ==================== Moving through the queue ====================

  /// Record the accepted sentence and move on. Returns a refill request when
  /// the queue is exhausted.
  pub fn advance(&mut self) -> Result<Option<WordRequest>, SessionError> {
    let word = self.active_word()?.clone();
    self.ensure_idle()?;
    if !self.attempt.is_correct() {
      return Err(SessionError::NotMastered);
    }

    let item = MasteredItem::new(word, self.attempt.sentence.clone(), Utc::now());
    self.mastered.record(item);

    Ok(self.move_to_next_word())
  }

  pub fn skip(&mut self) -> Result<Option<WordRequest>, SessionError> {
    let word = self.active_word()?;
    tracing::debug!(word = %word.word, "Word skipped");
    self.ensure_idle()?;
    Ok(self.move_to_next_word())
  }

  fn move_to_next_word(&mut self) -> Option<WordRequest> {
    self.attempt = WordAttempt::default();
    self.generation += 1;

    let next_index = self.current_index + 1;
    if next_index < self.word_queue.len() {
      self.current_index = next_index;
      return None;
    }

    let level = self.level?;
    self.is_loading = true;
    Some(WordRequest {
      token: self.token(),
      level,
      exclude: self.refill_exclusions(),
      purpose: FetchPurpose::Refill,
    })
  }

  /// Mastered words then queued words, first occurrence kept.
  fn refill_exclusions(&self) -> Vec<String> {
    let mut seen = HashSet::new();
    self
      .mastered
      .words()
      .into_iter()
      .chain(self.word_queue.iter().map(|w| w.word.clone()))
      .filter(|w| seen.insert(w.clone()))
      .collect()
  }

  // ==================== Navigation ====================

  /// Switch between learning and review. Does nothing from onboarding.
  pub fn toggle_review(&mut self) -> Screen {
    self.screen = match self.screen {
      Screen::Learning => Screen::Review,
      Screen::Review => Screen::Learning,
      Screen::Onboarding => Screen::Onboarding,
    };
    self.screen
  }

  /// Drop the level and queue. The mastered list is kept. Returns false from onboarding.
  pub fn return_home(&mut self) -> bool {
    if self.screen == Screen::Onboarding {
      return false;
    }

    self.generation += 1;
    self.level = None;
    self.word_queue.clear();
    self.current_index = 0;
    self.attempt = WordAttempt::default();
    self.is_loading = false;
    self.screen = Screen::Onboarding;
    tracing::info!("Returned to onboarding");
    true
  }
}
