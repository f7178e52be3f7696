//! Resolves the browser's learning session from its cookie.

use axum::{
  extract::FromRequestParts,
  http::{request::Parts, StatusCode},
  response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::convert::Infallible;
use std::sync::MutexGuard;

use crate::config::{SESSION_COOKIE_NAME, SESSION_EXPIRY_HOURS};
use crate::session::{generate_session_id, SessionController, SharedSession};
use crate::state::AppState;

/// The caller's session. A first visit gets a fresh ID; return `jar` in the
/// response so the cookie is set.
pub struct Learner {
  pub session: SharedSession,
  pub jar: CookieJar,
}

impl Learner {
  /// Lock the controller, or a 500 response if a previous holder panicked
  pub fn lock(&self) -> Result<MutexGuard<'_, SessionController>, Response> {
    self.session.lock().map_err(|_| {
      tracing::error!("Session mutex poisoned - a thread panicked while holding the lock");
      (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
    })
  }
}

impl FromRequestParts<AppState> for Learner {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);

    let existing = jar
      .get(SESSION_COOKIE_NAME)
      .map(|c| c.value().to_string())
      .filter(|id| !id.is_empty());

    let (session_id, jar) = match existing {
      Some(id) => (id, jar),
      None => {
        let id = generate_session_id();
        let cookie = Cookie::build((SESSION_COOKIE_NAME, id.clone()))
          .path("/")
          .http_only(true)
          .same_site(SameSite::Lax)
          .max_age(time::Duration::hours(SESSION_EXPIRY_HOURS))
          .build();
        (id, jar.add(cookie))
      }
    };

    Ok(Self {
      session: state.sessions.get_or_create(&session_id),
      jar,
    })
  }
}
