//! Application state shared by all handlers.

use std::sync::Arc;

use crate::db::MasteryRepository;
use crate::gateway::{SentenceGrader, WordSource};
use crate::session::{SessionStore, Tutor};

#[derive(Clone)]
pub struct AppState {
  /// Per-browser controllers, keyed by the session cookie
  pub sessions: Arc<SessionStore>,
  pub tutor: Arc<Tutor>,
}

impl AppState {
  pub fn new(
    repository: Arc<dyn MasteryRepository>,
    words: Arc<dyn WordSource>,
    grader: Arc<dyn SentenceGrader>,
  ) -> Self {
    Self {
      sessions: Arc::new(SessionStore::new(repository)),
      tutor: Arc::new(Tutor::new(words, grader)),
    }
  }
}
