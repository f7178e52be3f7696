//! Durable storage for the learner's mastered words.
//!
//! The whole list lives under a single settings key as one JSON array and is
//! rewritten on every change. There is no merge: whoever saves last wins.

use std::sync::Mutex;
use thiserror::Error;

use super::{get_setting, set_setting, try_lock, DbPool};
use crate::domain::MasteredItem;

/// Settings key holding the serialized mastered list
pub const MASTERED_ITEMS_KEY: &str = "mastered_items";

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),
  #[error("stored mastered list is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),
  #[error("storage lock poisoned")]
  LockPoisoned,
}

/// Load/replace access to the mastered list, newest first.
pub trait MasteryRepository: Send + Sync {
  fn load(&self) -> Result<Vec<MasteredItem>, StorageError>;
  fn save_all(&self, items: &[MasteredItem]) -> Result<(), StorageError>;
}

pub struct SqliteMasteryRepository {
  pool: DbPool,
}

impl SqliteMasteryRepository {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

impl MasteryRepository for SqliteMasteryRepository {
  fn load(&self) -> Result<Vec<MasteredItem>, StorageError> {
    let conn = try_lock(&self.pool).map_err(|_| StorageError::LockPoisoned)?;
    match get_setting(&conn, MASTERED_ITEMS_KEY)? {
      Some(raw) => Ok(serde_json::from_str(&raw)?),
      None => Ok(Vec::new()),
    }
  }

  fn save_all(&self, items: &[MasteredItem]) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items)?;
    let conn = try_lock(&self.pool).map_err(|_| StorageError::LockPoisoned)?;
    set_setting(&conn, MASTERED_ITEMS_KEY, &raw)?;
    tracing::debug!(count = items.len(), "Saved mastered list");
    Ok(())
  }
}

/// Keeps the list in process memory only.
#[derive(Default)]
pub struct MemoryMasteryRepository {
  items: Mutex<Vec<MasteredItem>>,
  saves: Mutex<usize>,
}

impl MemoryMasteryRepository {
  pub fn with_items(items: Vec<MasteredItem>) -> Self {
    Self {
      items: Mutex::new(items),
      saves: Mutex::new(0),
    }
  }

  /// Number of `save_all` calls so far
  pub fn save_count(&self) -> usize {
    self.saves.lock().map(|n| *n).unwrap_or(0)
  }
}

impl MasteryRepository for MemoryMasteryRepository {
  fn load(&self) -> Result<Vec<MasteredItem>, StorageError> {
    let items = self.items.lock().map_err(|_| StorageError::LockPoisoned)?;
    Ok(items.clone())
  }

  fn save_all(&self, items: &[MasteredItem]) -> Result<(), StorageError> {
    *self.items.lock().map_err(|_| StorageError::LockPoisoned)? = items.to_vec();
    *self.saves.lock().map_err(|_| StorageError::LockPoisoned)? += 1;
    Ok(())
  }
}
