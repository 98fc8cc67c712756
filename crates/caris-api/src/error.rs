//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use caris_core::error::DomainError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Duplicate link or forbidden state transition.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  /// The invitation expired before it could be used.
  #[error("gone: {0}")]
  Gone(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend failure onto an HTTP-shaped error. Domain errors get
  /// specific statuses; anything else is an opaque 500.
  pub fn from_store<E>(err: E) -> Self
  where
    E: DomainError + std::error::Error + Send + Sync + 'static,
  {
    use caris_core::Error as Core;
    match err.domain() {
      Some(core) => match core {
        Core::LinkNotFound
        | Core::PatientNotFound(_)
        | Core::ProfessionalNotFound(_)
        | Core::EntryNotFound(_) => Self::NotFound(core.to_string()),
        Core::DuplicateActiveLink | Core::InvalidLinkState { .. } => {
          Self::Conflict(core.to_string())
        }
        Core::PermissionDenied => Self::Forbidden(core.to_string()),
        Core::InvitationExpired => Self::Gone(core.to_string()),
      },
      None => Self::Store(Box::new(err)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Gone(m) => (StatusCode::GONE, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
