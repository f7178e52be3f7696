pub mod api;
pub mod intents;
pub mod learner;
pub mod pages;
pub mod templates;

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::paths;
use crate::state::AppState;

pub use api::session_state;
pub use intents::{advance, return_home, reveal_hint, select_level, skip, submit_sentence, toggle_review};
pub use learner::Learner;
pub use pages::{confirm_home, index};

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/level", post(select_level))
    .route("/sentence", post(submit_sentence))
    .route("/advance", post(advance))
    .route("/skip", post(skip))
    .route("/hint", post(reveal_hint))
    .route("/review/toggle", post(toggle_review))
    .route("/home", get(confirm_home).post(return_home))
    .route("/api/state", get(session_state))
    .nest_service("/static", ServeDir::new(paths::STATIC_DIR))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
