//! In-memory session storage keyed by cookie.
//!
//! Each browser gets its own controller. Sessions expire after
//! `SESSION_EXPIRY_HOURS` of inactivity; the mastered list outlives them in
//! the repository.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::controller::SessionController;
use super::mastered::MasteredList;
use super::tutor::SharedSession;
use crate::config;
use crate::db::MasteryRepository;

struct SessionEntry {
  session: SharedSession,
  last_access: DateTime<Utc>,
}

pub struct SessionStore {
  sessions: Mutex<HashMap<String, SessionEntry>>,
  mastered: Arc<MasteredList>,
}

impl SessionStore {
  pub fn new(repository: Arc<dyn MasteryRepository>) -> Self {
    Self {
      sessions: Mutex::new(HashMap::new()),
      mastered: Arc::new(MasteredList::load(repository)),
    }
  }

  // Map entries are replaced whole, so a poisoned lock still guards a consistent map
  fn entries(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Get or create the session for the given ID
  pub fn get_or_create(&self, session_id: &str) -> SharedSession {
    let mut sessions = self.entries();

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions);
    }

    let now = Utc::now();
    if let Some(entry) = sessions.get_mut(session_id) {
      entry.last_access = now;
      return entry.session.clone();
    }

    tracing::debug!("Creating learner session");
    let session = Arc::new(Mutex::new(SessionController::new(self.mastered.clone())));
    sessions.insert(
      session_id.to_string(),
      SessionEntry {
        session: session.clone(),
        last_access: now,
      },
    );
    session
  }

  pub fn contains(&self, session_id: &str) -> bool {
    self.entries().contains_key(session_id)
  }

  pub fn len(&self) -> usize {
    self.entries().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  let before = sessions.len();
  sessions.retain(|_, entry| entry.last_access > expiry);
  let removed = before - sessions.len();
  if removed > 0 {
    tracing::debug!(removed, "Expired learner sessions");
  }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}
