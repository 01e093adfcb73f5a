//! Error types for `bolsa-core`.
//!
//! Every failure a user action can hit maps onto one [`ErrorKind`]. The
//! `Display` text of an [`Error`] is what the views show in their error
//! banner; nothing here is ever fatal to the process.

use thiserror::Error;

use crate::application::ApplicationStatus;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or malformed. Raised before any request.
  #[error("{0}")]
  Validation(String),

  /// Bad credentials, or a session token the backend no longer accepts.
  #[error("authentication failed: {0}")]
  Auth(String),

  /// The current principal does not own the resource it tried to mutate.
  #[error("not allowed: {0}")]
  Authorization(String),

  #[error("activity {activity_id} is already attached to {target}")]
  DuplicateActivity { target: String, activity_id: i64 },

  #[error("dni {dni} has already applied to offer {offer_id}")]
  DuplicateApplication { dni: i64, offer_id: i64 },

  #[error("application of dni {dni} to offer {offer_id} is {status} and can no longer be withdrawn")]
  ApplicationClosed {
    dni:      i64,
    offer_id: i64,
    status:   ApplicationStatus,
  },

  /// The request failed in transit or the backend answered non-2xx.
  #[error("network error: {0}")]
  Network(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("token storage error: {0}")]
  Io(#[from] std::io::Error),
}

/// The user-facing category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  Auth,
  Authorization,
  Duplicate,
  Network,
  NotFound,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) | Self::ApplicationClosed { .. } => {
        ErrorKind::Validation
      }
      Self::Auth(_) => ErrorKind::Auth,
      Self::Authorization(_) => ErrorKind::Authorization,
      Self::DuplicateActivity { .. } | Self::DuplicateApplication { .. } => {
        ErrorKind::Duplicate
      }
      Self::Network(_) | Self::Serialization(_) | Self::Io(_) => {
        ErrorKind::Network
      }
      Self::NotFound(_) => ErrorKind::NotFound,
    }
  }

  /// A `Validation` error for a missing field.
  pub fn required(field: &str) -> Self {
    Self::Validation(format!("{field} is required"))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_follow_the_taxonomy() {
    assert_eq!(Error::required("title").kind(), ErrorKind::Validation);
    assert_eq!(
      Error::DuplicateApplication { dni: 1, offer_id: 2 }.kind(),
      ErrorKind::Duplicate
    );
    assert_eq!(
      Error::ApplicationClosed {
        dni:      1,
        offer_id: 2,
        status:   ApplicationStatus::Hired,
      }
      .kind(),
      ErrorKind::Validation
    );
    assert_eq!(Error::Network("timeout".into()).kind(), ErrorKind::Network);
  }

  #[test]
  fn messages_are_user_readable() {
    let err = Error::DuplicateActivity {
      target:      "offer 5".into(),
      activity_id: 7,
    };
    assert_eq!(err.to_string(), "activity 7 is already attached to offer 5");
    assert_eq!(Error::required("email").to_string(), "email is required");
  }
}
