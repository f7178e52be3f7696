use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingua_craft::config::Settings;
use lingua_craft::db::{self, SqliteMasteryRepository};
use lingua_craft::gateway::GeminiClient;
use lingua_craft::handlers;
use lingua_craft::state::AppState;

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lingua_craft=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = Settings::load();
  tracing::debug!(?settings, "Loaded settings");

  let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");
  let repository = Arc::new(SqliteMasteryRepository::new(pool));

  let gemini = Arc::new(GeminiClient::new(settings.gemini.clone(), settings.tutor.clone()));
  if !gemini.is_available() {
    tracing::warn!("No Gemini API key configured (GEMINI_API_KEY or API_KEY); level selection will fail");
  }

  let state = AppState::new(repository, gemini.clone(), gemini);
  let app = handlers::router(state);

  let bind_addr = settings.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", settings.server_port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
