//! Error type for `caris-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule was violated — duplicate link, forbidden transition,
  /// missing entity, denied access, expired invitation.
  #[error(transparent)]
  Core(#[from] caris_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored discriminant no schema version should have produced.
  #[error("unrecognised stored value: {0}")]
  Decode(String),

  #[error("email already registered: {0}")]
  EmailTaken(String),
}

impl Error {
  /// The domain error, if this is one — used by callers that map domain
  /// failures to user-facing responses.
  pub fn as_core(&self) -> Option<&caris_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

impl caris_core::error::DomainError for Error {
  fn domain(&self) -> Option<&caris_core::Error> { self.as_core() }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
