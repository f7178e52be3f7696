//! POST handlers. Each forwards one learner action and redirects back to `/`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use std::fmt::Debug;

use super::learner::Learner;
use super::templates::{ConfirmForm, LevelForm, SentenceForm};
use crate::domain::EducationLevel;
use crate::session::SessionError;
use crate::state::AppState;

fn back_home(jar: CookieJar) -> Response {
  (jar, Redirect::to("/")).into_response()
}

/// Rejected actions just re-render; only an unusable session is an error.
fn finish<T: Debug>(jar: CookieJar, action: &str, result: Result<T, SessionError>) -> Response {
  match result {
    Ok(outcome) => tracing::debug!(action, ?outcome, "Action applied"),
    Err(SessionError::Unavailable) => {
      return (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response();
    }
    Err(e) => tracing::debug!(action, "Action rejected: {}", e),
  }
  back_home(jar)
}

/// POST /level
pub async fn select_level(
  State(state): State<AppState>,
  learner: Learner,
  Form(form): Form<LevelForm>,
) -> Response {
  let Some(level) = EducationLevel::from_str(&form.level) else {
    tracing::debug!(level = %form.level, "Unknown level");
    return back_home(learner.jar);
  };

  let result = state.tutor.select_level(&learner.session, level).await;
  finish(learner.jar, "select_level", result)
}

/// POST /sentence
pub async fn submit_sentence(
  State(state): State<AppState>,
  learner: Learner,
  Form(form): Form<SentenceForm>,
) -> Response {
  let result = state
    .tutor
    .submit_sentence(&learner.session, &form.sentence)
    .await;
  finish(learner.jar, "submit_sentence", result)
}

/// POST /advance
pub async fn advance(State(state): State<AppState>, learner: Learner) -> Response {
  let result = state.tutor.advance(&learner.session).await;
  finish(learner.jar, "advance", result)
}

/// POST /skip
pub async fn skip(State(state): State<AppState>, learner: Learner) -> Response {
  let result = state.tutor.skip(&learner.session).await;
  finish(learner.jar, "skip", result)
}

/// POST /hint
pub async fn reveal_hint(learner: Learner) -> Response {
  let result = match learner.lock() {
    Ok(mut c) => c.reveal_hint(),
    Err(response) => return response,
  };
  finish(learner.jar, "reveal_hint", result)
}

/// POST /review/toggle
pub async fn toggle_review(learner: Learner) -> Response {
  let screen = match learner.lock() {
    Ok(mut c) => c.toggle_review(),
    Err(response) => return response,
  };
  finish(learner.jar, "toggle_review", Ok::<_, SessionError>(screen))
}

/// POST /home - `confirm=yes` drops the level and queue
pub async fn return_home(learner: Learner, Form(form): Form<ConfirmForm>) -> Response {
  if form.confirm != "yes" {
    return back_home(learner.jar);
  }

  let returned = match learner.lock() {
    Ok(mut c) => c.return_home(),
    Err(response) => return response,
  };
  finish(learner.jar, "return_home", Ok::<_, SessionError>(returned))
}
