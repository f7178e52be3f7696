//! Template, view and form structs for the learner pages.

use askama::Template;
use serde::Deserialize;

use crate::domain::{EducationLevel, FeedbackResponse, MasteredItem, WordItem};
use crate::session::SessionSnapshot;

/// Header shared by the learning, review and confirmation pages
pub struct Header {
  pub level_label: &'static str,
  pub on_review: bool,
  pub mastered_count: usize,
}

impl Header {
  pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
    Self {
      level_label: snapshot.level.map(|l| l.short_label()).unwrap_or(""),
      on_review: snapshot.screen == crate::domain::Screen::Review,
      mastered_count: snapshot.mastered_items.len(),
    }
  }
}

pub struct LevelOption {
  pub id: &'static str,
  pub label: &'static str,
  pub sub_label: &'static str,
  pub selected: bool,
}

impl LevelOption {
  pub fn all(selected: Option<EducationLevel>) -> Vec<Self> {
    EducationLevel::ALL
      .iter()
      .map(|level| Self {
        id: level.as_str(),
        label: level.short_label(),
        sub_label: level.sub_label(),
        selected: selected == Some(*level),
      })
      .collect()
  }
}

#[derive(Template)]
#[template(path = "onboarding.html")]
pub struct OnboardingTemplate {
  pub levels: Vec<LevelOption>,
  pub is_loading: bool,
  pub notice: Option<String>,
}

/// Progress marker class per queued word: done, current or pending
pub fn progress_markers(queue_len: usize, current: usize) -> Vec<&'static str> {
  (0..queue_len)
    .map(|i| match i.cmp(&current) {
      std::cmp::Ordering::Less => "done",
      std::cmp::Ordering::Equal => "current",
      std::cmp::Ordering::Greater => "pending",
    })
    .collect()
}

#[derive(Template)]
#[template(path = "learning.html")]
pub struct LearningTemplate {
  pub header: Header,
  pub is_loading: bool,
  pub progress: Vec<&'static str>,
  pub word: Option<WordItem>,
  pub sentence: String,
  pub feedback: Option<FeedbackResponse>,
  pub is_checking: bool,
  pub is_correct: bool,
  pub show_hint: bool,
}

pub struct MasteredView {
  pub word: String,
  pub part_of_speech: String,
  pub definition: String,
  pub user_sentence: String,
  pub mastered_on: String,
}

impl From<&MasteredItem> for MasteredView {
  fn from(item: &MasteredItem) -> Self {
    Self {
      word: item.item.word.clone(),
      part_of_speech: item.item.part_of_speech.clone(),
      definition: item.item.definition.clone(),
      user_sentence: item.user_sentence.clone(),
      mastered_on: item.mastered_at.format("%Y-%m-%d").to_string(),
    }
  }
}

#[derive(Template)]
#[template(path = "review.html")]
pub struct ReviewTemplate {
  pub header: Header,
  pub items: Vec<MasteredView>,
}

#[derive(Template)]
#[template(path = "confirm_home.html")]
pub struct ConfirmHomeTemplate {
  pub header: Header,
}

#[derive(Deserialize)]
pub struct LevelForm {
  pub level: String,
}

#[derive(Deserialize)]
pub struct SentenceForm {
  pub sentence: String,
}

#[derive(Deserialize)]
pub struct ConfirmForm {
  #[serde(default)]
  pub confirm: String,
}
