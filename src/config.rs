//! Application configuration.
//!
//! Every setting is resolved with the same priority:
//! `config.toml` > environment (`.env` is loaded first) > built-in default.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

// ==================== Defaults ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Word generation runs warmer so batches vary between refills
pub const WORD_TEMPERATURE: f32 = 0.7;
pub const GRADING_TEMPERATURE: f32 = 0.4;

/// Words requested per batch
pub const WORD_BATCH_SIZE: usize = 5;

pub const NATIVE_LANGUAGE: &str = "Simplified Chinese (简体中文)";
pub const LEARNER_REGION: &str = "Mainland China";

// ==================== Session Configuration ====================

/// Browser session expiration time in hours
pub const SESSION_EXPIRY_HOURS: i64 = 12;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Cookie carrying the browser session id
pub const SESSION_COOKIE_NAME: &str = "lc_session";

// ==================== config.toml ====================

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
  server: Option<ServerSection>,
  database: Option<DatabaseSection>,
  gemini: Option<GeminiSection>,
  tutor: Option<TutorSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
  addr: Option<String>,
  port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiSection {
  api_key: Option<String>,
  model: Option<String>,
  endpoint: Option<String>,
  timeout_secs: Option<u64>,
  word_temperature: Option<f32>,
  grading_temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct TutorSection {
  batch_size: Option<usize>,
  native_language: Option<String>,
  region: Option<String>,
}

// ==================== Resolved settings ====================

#[derive(Clone)]
pub struct GeminiSettings {
  pub api_key: Option<String>,
  pub model: String,
  pub endpoint: String,
  /// None leaves the HTTP client without a request timeout
  pub timeout: Option<Duration>,
  pub word_temperature: f32,
  pub grading_temperature: f32,
}

impl std::fmt::Debug for GeminiSettings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeminiSettings")
      .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
      .field("model", &self.model)
      .field("endpoint", &self.endpoint)
      .field("timeout", &self.timeout)
      .field("word_temperature", &self.word_temperature)
      .field("grading_temperature", &self.grading_temperature)
      .finish()
  }
}

impl Default for GeminiSettings {
  fn default() -> Self {
    Self {
      api_key: None,
      model: GEMINI_MODEL.to_string(),
      endpoint: GEMINI_ENDPOINT.to_string(),
      timeout: None,
      word_temperature: WORD_TEMPERATURE,
      grading_temperature: GRADING_TEMPERATURE,
    }
  }
}

/// Who the learner is, as far as the prompts are concerned.
#[derive(Debug, Clone)]
pub struct TutorSettings {
  pub batch_size: usize,
  pub native_language: String,
  pub region: String,
}

impl Default for TutorSettings {
  fn default() -> Self {
    Self {
      batch_size: WORD_BATCH_SIZE,
      native_language: NATIVE_LANGUAGE.to_string(),
      region: LEARNER_REGION.to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Settings {
  pub server_addr: String,
  pub server_port: u16,
  pub database_path: PathBuf,
  pub gemini: GeminiSettings,
  pub tutor: TutorSettings,
}

impl Settings {
  /// Load `.env`, then `config.toml` (or `$CONFIG_PATH`), then resolve.
  pub fn load() -> Self {
    let _ = dotenvy::dotenv();

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let file = match std::fs::read_to_string(&config_path) {
      Ok(contents) => match toml::from_str::<FileConfig>(&contents) {
        Ok(file) => {
          tracing::info!("Using configuration from {}", config_path);
          file
        }
        Err(e) => {
          tracing::warn!("Ignoring malformed {}: {}", config_path, e);
          FileConfig::default()
        }
      },
      Err(_) => FileConfig::default(),
    };

    Self::resolve(file, |key| std::env::var(key).ok())
  }

  /// Merge a parsed config file with an environment lookup.
  pub fn resolve(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let server = file.server.unwrap_or_default();
    let database = file.database.unwrap_or_default();
    let gemini = file.gemini.unwrap_or_default();
    let tutor = file.tutor.unwrap_or_default();

    let server_addr = server
      .addr
      .or_else(|| env("SERVER_ADDR"))
      .unwrap_or_else(|| SERVER_ADDR.to_string());
    let server_port = server
      .port
      .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
      .unwrap_or(SERVER_PORT);

    let database_path = match database.path.or_else(|| env("DATABASE_PATH")) {
      Some(path) => PathBuf::from(path),
      None => PathBuf::from(paths::db_path()),
    };

    let gemini = GeminiSettings {
      api_key: gemini
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env("GEMINI_API_KEY"))
        .or_else(|| env("API_KEY")),
      model: gemini
        .model
        .or_else(|| env("GEMINI_MODEL"))
        .unwrap_or_else(|| GEMINI_MODEL.to_string()),
      endpoint: gemini
        .endpoint
        .or_else(|| env("GEMINI_ENDPOINT"))
        .unwrap_or_else(|| GEMINI_ENDPOINT.to_string()),
      timeout: gemini
        .timeout_secs
        .or_else(|| env("GEMINI_TIMEOUT_SECS").and_then(|s| s.parse().ok()))
        .map(Duration::from_secs),
      word_temperature: gemini.word_temperature.unwrap_or(WORD_TEMPERATURE),
      grading_temperature: gemini.grading_temperature.unwrap_or(GRADING_TEMPERATURE),
    };

    let tutor = TutorSettings {
      batch_size: tutor.batch_size.filter(|n| *n > 0).unwrap_or(WORD_BATCH_SIZE),
      native_language: tutor
        .native_language
        .unwrap_or_else(|| NATIVE_LANGUAGE.to_string()),
      region: tutor.region.unwrap_or_else(|| LEARNER_REGION.to_string()),
    };

    Self {
      server_addr,
      server_port,
      database_path,
      gemini,
      tutor,
    }
  }

  /// Get the full server bind address
  pub fn bind_addr(&self) -> String {
    format!("{}:{}", self.server_addr, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn test_defaults_without_file_or_env() {
    let settings = Settings::resolve(FileConfig::default(), env_of(&[]));

    assert_eq!(settings.bind_addr(), "0.0.0.0:3000");
    assert!(settings.database_path.ends_with("linguacraft.db"));
    assert_eq!(settings.gemini.api_key, None);
    assert_eq!(settings.gemini.model, "gemini-2.5-flash");
    assert_eq!(settings.gemini.timeout, None);
    assert_eq!(settings.tutor.batch_size, 5);
  }

  #[test]
  fn test_env_fills_missing_values() {
    let settings = Settings::resolve(
      FileConfig::default(),
      env_of(&[("PORT", "8080"), ("API_KEY", "from-api-key"), ("GEMINI_TIMEOUT_SECS", "30")]),
    );

    assert_eq!(settings.server_port, 8080);
    assert_eq!(settings.gemini.api_key.as_deref(), Some("from-api-key"));
    assert_eq!(settings.gemini.timeout, Some(Duration::from_secs(30)));
  }

  #[test]
  fn test_gemini_api_key_preferred_over_api_key() {
    let settings = Settings::resolve(
      FileConfig::default(),
      env_of(&[("GEMINI_API_KEY", "gemini"), ("API_KEY", "generic")]),
    );
    assert_eq!(settings.gemini.api_key.as_deref(), Some("gemini"));
  }

  #[test]
  fn test_config_file_wins_over_env() {
    let file: FileConfig = toml::from_str(
      r#"
      [server]
      port = 4000

      [database]
      path = "/tmp/custom.db"

      [gemini]
      model = "gemini-2.0-flash"

      [tutor]
      batch_size = 8
      native_language = "Japanese"
      "#,
    )
    .unwrap();

    let settings = Settings::resolve(
      file,
      env_of(&[("PORT", "9999"), ("DATABASE_PATH", "/elsewhere.db"), ("GEMINI_MODEL", "x")]),
    );

    assert_eq!(settings.server_port, 4000);
    assert_eq!(settings.database_path, PathBuf::from("/tmp/custom.db"));
    assert_eq!(settings.gemini.model, "gemini-2.0-flash");
    assert_eq!(settings.tutor.batch_size, 8);
    assert_eq!(settings.tutor.native_language, "Japanese");
    assert_eq!(settings.tutor.region, LEARNER_REGION);
  }

  #[test]
  fn test_zero_batch_size_falls_back_to_default() {
    let file: FileConfig = toml::from_str("[tutor]\nbatch_size = 0\n").unwrap();
    let settings = Settings::resolve(file, env_of(&[]));
    assert_eq!(settings.tutor.batch_size, WORD_BATCH_SIZE);
  }

  #[test]
  fn test_debug_redacts_api_key() {
    let gemini = GeminiSettings {
      api_key: Some("super-secret".into()),
      ..GeminiSettings::default()
    };
    let printed = format!("{:?}", gemini);
    assert!(!printed.contains("super-secret"));
    assert!(printed.contains("<redacted>"));
  }
}
