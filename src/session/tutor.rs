//! Drives a session's model calls.
//!
//! The controller mutex is only taken to issue a ticket and to apply the
//! result; it is never held while waiting on the network.

use std::sync::{Arc, Mutex, MutexGuard};

use super::controller::{
  FetchOutcome, GradeOutcome, PendingKind, RequestToken, SessionController, SessionError,
  WordRequest,
};
use crate::domain::{EducationLevel, FeedbackResponse};
use crate::gateway::{SentenceGrader, WordSource};

pub type SharedSession = Arc<Mutex<SessionController>>;

fn lock(session: &SharedSession) -> Result<MutexGuard<'_, SessionController>, SessionError> {
  session.lock().map_err(|_| {
    tracing::error!("Session mutex poisoned - a thread panicked while holding the lock");
    SessionError::Unavailable
  })
}

/// Releases the controller's loading/checking flag if the owning future is
/// dropped before the call completes (client went away, request timed out).
struct InFlight<'a> {
  session: &'a SharedSession,
  token: RequestToken,
  kind: PendingKind,
  settled: bool,
}

impl<'a> InFlight<'a> {
  fn new(session: &'a SharedSession, token: RequestToken, kind: PendingKind) -> Self {
    Self {
      session,
      token,
      kind,
      settled: false,
    }
  }

  fn settle(&mut self) {
    self.settled = true;
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    if self.settled {
      return;
    }
    if let Ok(mut controller) = self.session.lock() {
      controller.abandon(self.token, self.kind);
    }
  }
}

pub struct Tutor {
  words: Arc<dyn WordSource>,
  grader: Arc<dyn SentenceGrader>,
}

impl Tutor {
  pub fn new(words: Arc<dyn WordSource>, grader: Arc<dyn SentenceGrader>) -> Self {
    Self { words, grader }
  }

  pub async fn select_level(
    &self,
    session: &SharedSession,
    level: EducationLevel,
  ) -> Result<FetchOutcome, SessionError> {
    let request = lock(session)?.select_level(level)?;
    Ok(self.fetch(session, request).await)
  }

  /// Grade a sentence. A failed call is reported to the learner as a
  /// "service unavailable" verdict rather than an error.
  pub async fn submit_sentence(
    &self,
    session: &SharedSession,
    sentence: &str,
  ) -> Result<GradeOutcome, SessionError> {
    let request = lock(session)?.submit_sentence(sentence)?;
    let mut in_flight = InFlight::new(session, request.token, PendingKind::Grading);

    let feedback = match self
      .grader
      .evaluate_sentence(&request.word, &request.sentence)
      .await
    {
      Ok(feedback) => feedback,
      Err(e) => {
        tracing::error!("Error evaluating sentence: {}", e);
        FeedbackResponse::service_unavailable()
      }
    };

    in_flight.settle();
    Ok(lock(session)?.complete_grading(&request, feedback))
  }

  /// Returns the refill outcome when advancing emptied the queue.
  pub async fn advance(&self, session: &SharedSession) -> Result<Option<FetchOutcome>, SessionError> {
    let refill = lock(session)?.advance()?;
    Ok(self.refill(session, refill).await)
  }

  pub async fn skip(&self, session: &SharedSession) -> Result<Option<FetchOutcome>, SessionError> {
    let refill = lock(session)?.skip()?;
    Ok(self.refill(session, refill).await)
  }

  async fn refill(&self, session: &SharedSession, request: Option<WordRequest>) -> Option<FetchOutcome> {
    match request {
      Some(request) => Some(self.fetch(session, request).await),
      None => None,
    }
  }

  async fn fetch(&self, session: &SharedSession, request: WordRequest) -> FetchOutcome {
    let mut in_flight = InFlight::new(session, request.token, PendingKind::Fetch(request.purpose));
    let result = self.words.fetch_words(request.level, &request.exclude).await;
    in_flight.settle();

    match lock(session) {
      Ok(mut controller) => controller.complete_word_fetch(&request, result),
      Err(_) => FetchOutcome::Discarded,
    }
  }
}
