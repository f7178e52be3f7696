pub mod feedback;
pub mod level;
pub mod word;

use serde::{Deserialize, Serialize};

pub use feedback::{FeedbackResponse, SERVICE_UNAVAILABLE_FEEDBACK};
pub use level::EducationLevel;
pub use word::{MasteredItem, WordItem};

/// Which top-level view the learner is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
  #[default]
  Onboarding,
  Learning,
  Review,
}
