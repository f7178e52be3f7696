pub mod controller;
pub mod mastered;
pub mod store;
pub mod tutor;

pub use controller::{
  FetchOutcome, GradeOutcome, SessionController, SessionError, SessionSnapshot, WordAttempt,
  START_FAILED_NOTICE,
};
pub use mastered::MasteredList;
pub use store::{generate_session_id, SessionStore};
pub use tutor::{SharedSession, Tutor};
