//! Project path functions - single source of truth for file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows running isolated instances side by side:
//! ```bash
//! DATA_DIR=data/demo PORT=3001 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
  DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database holding the mastered list
pub fn db_path() -> String {
  format!("{}/linguacraft.db", data_dir())
}

/// Stylesheets and other static assets - not under DATA_DIR
pub const STATIC_DIR: &str = "static";

#[cfg(test)]
mod tests {
  use super::*;

  // OnceLock initializes once, so only the default shape is checked here.

  #[test]
  fn test_data_dir_default() {
    let dir = data_dir();
    assert!(!dir.is_empty());
  }

  #[test]
  fn test_db_path_format() {
    let path = db_path();
    assert!(path.ends_with("/linguacraft.db"));
  }
}
