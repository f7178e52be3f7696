use axum::response::{IntoResponse, Json, Response};

use super::learner::Learner;

/// GET /api/state - the session as JSON
pub async fn session_state(learner: Learner) -> Response {
  let snapshot = match learner.lock() {
    Ok(c) => c.snapshot(),
    Err(response) => return response,
  };
  (learner.jar, Json(snapshot)).into_response()
}
