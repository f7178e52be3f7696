use serde::{Deserialize, Serialize};

/// Proficiency tier the learner picks on the onboarding screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
  Primary,
  Middle,
  High,
  University,
  Professional,
}

impl EducationLevel {
  pub const ALL: [EducationLevel; 5] = [
    Self::Primary,
    Self::Middle,
    Self::High,
    Self::University,
    Self::Professional,
  ];

  /// Accepts either the form id (`middle`) or the full display name.
  pub fn from_str(s: &str) -> Option<Self> {
    let s = s.trim();
    Self::ALL
      .into_iter()
      .find(|level| level.as_str() == s || level.display_name() == s)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Primary => "primary",
      Self::Middle => "middle",
      Self::High => "high",
      Self::University => "university",
      Self::Professional => "professional",
    }
  }

  /// Full name, also used verbatim in the word-generation prompt.
  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Primary => "Primary School (小学)",
      Self::Middle => "Junior High School (初中)",
      Self::High => "Senior High School (高中)",
      Self::University => "University (大学/四六级)",
      Self::Professional => "Professional/Study Abroad (雅思/托福/职场)",
    }
  }

  /// The parenthesised part of the display name, shown in the header.
  pub fn short_label(&self) -> &'static str {
    let name = self.display_name();
    name
      .split_once('(')
      .and_then(|(_, rest)| rest.strip_suffix(')'))
      .unwrap_or(name)
  }

  pub fn sub_label(&self) -> &'static str {
    match self {
      Self::Primary => "基础词汇",
      Self::Middle => "中考必备",
      Self::High => "高考冲刺",
      Self::University => "四六级 / 考研",
      Self::Professional => "雅思 / 托福 / 商务",
    }
  }
}

impl std::fmt::Display for EducationLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.display_name())
  }
}
