//! The mastered list shared by every learner session.
//!
//! Loaded from the repository once at startup. Each new entry is prepended and
//! the whole list written back under the same lock, so concurrent sessions
//! never overwrite each other's entries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::db::{LogOnError, MasteryRepository};
use crate::domain::MasteredItem;

pub struct MasteredList {
  items: Mutex<Vec<MasteredItem>>,
  repository: Arc<dyn MasteryRepository>,
}

impl MasteredList {
  pub fn load(repository: Arc<dyn MasteryRepository>) -> Self {
    let items = repository
      .load()
      .log_warn_default("Failed to load mastered words");
    tracing::debug!(count = items.len(), "Loaded mastered list");

    Self {
      items: Mutex::new(items),
      repository,
    }
  }

  // Entries are only ever prepended whole, so a poisoned lock still guards a valid list
  fn items(&self) -> MutexGuard<'_, Vec<MasteredItem>> {
    self.items.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Newest first
  pub fn snapshot(&self) -> Vec<MasteredItem> {
    self.items().clone()
  }

  pub fn words(&self) -> Vec<String> {
    self.items().iter().map(|m| m.word().to_string()).collect()
  }

  pub fn len(&self) -> usize {
    self.items().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Prepend and persist the full list.
  pub fn record(&self, item: MasteredItem) {
    let mut items = self.items();
    tracing::info!(word = item.word(), "Word mastered");
    items.insert(0, item);
    self
      .repository
      .save_all(&items)
      .log_warn("Failed to persist mastered words");
  }
}
