//! GET pages: the current screen and the exit confirmation.

use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};

use super::learner::Learner;
use super::templates::{
  progress_markers, ConfirmHomeTemplate, Header, LearningTemplate, LevelOption, MasteredView,
  OnboardingTemplate, ReviewTemplate,
};
use crate::domain::Screen;

/// GET / - render whichever screen the session is on
pub async fn index(learner: Learner) -> Response {
  let (snapshot, notice) = {
    let mut controller = match learner.lock() {
      Ok(c) => c,
      Err(response) => return response,
    };
    let notice = controller.take_notice();
    (controller.snapshot(), notice)
  };

  let body = match snapshot.screen {
    Screen::Onboarding => OnboardingTemplate {
      levels: LevelOption::all(snapshot.level),
      is_loading: snapshot.is_loading,
      notice,
    }
    .render(),
    Screen::Learning => LearningTemplate {
      header: Header::from_snapshot(&snapshot),
      is_loading: snapshot.is_loading,
      progress: progress_markers(snapshot.word_queue.len(), snapshot.current_index),
      is_correct: snapshot.attempt.is_correct(),
      word: snapshot.current_word,
      sentence: snapshot.attempt.sentence,
      feedback: snapshot.attempt.feedback,
      is_checking: snapshot.attempt.is_checking,
      show_hint: snapshot.attempt.show_hint,
    }
    .render(),
    Screen::Review => ReviewTemplate {
      header: Header::from_snapshot(&snapshot),
      items: snapshot.mastered_items.iter().map(MasteredView::from).collect(),
    }
    .render(),
  };

  (learner.jar, Html(body.unwrap_or_default())).into_response()
}

/// GET /home - ask before discarding the queue
pub async fn confirm_home(learner: Learner) -> Response {
  let snapshot = match learner.lock() {
    Ok(c) => c.snapshot(),
    Err(response) => return response,
  };

  if snapshot.screen == Screen::Onboarding {
    return (learner.jar, Redirect::to("/")).into_response();
  }

  let template = ConfirmHomeTemplate {
    header: Header::from_snapshot(&snapshot),
  };
  (learner.jar, Html(template.render().unwrap_or_default())).into_response()
}
