//! Error types for `caris-core`.
//!
//! Every variant is recoverable at the request boundary; nothing here is
//! fatal to the process. The core never logs — callers translate these into
//! user-facing responses.

use thiserror::Error;
use uuid::Uuid;

use crate::link::LinkStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// An invitation was attempted while a non-revoked link already exists
  /// for the (professional, patient) pair.
  #[error("a non-revoked link already exists for this professional and patient")]
  DuplicateActiveLink,

  /// A state transition was attempted from a state that forbids it.
  /// The link is left untouched — no partial mutation, no audit record.
  #[error("cannot {action} a link in the {from} state")]
  InvalidLinkState {
    from:   LinkStatus,
    action: &'static str,
  },

  #[error("link not found")]
  LinkNotFound,

  #[error("patient not found: {0}")]
  PatientNotFound(Uuid),

  #[error("professional not found: {0}")]
  ProfessionalNotFound(Uuid),

  #[error("journal entry not found: {0}")]
  EntryNotFound(Uuid),

  /// A professional attempted to read patient data without a qualifying
  /// active, consented link.
  #[error("no active consent permits this access")]
  PermissionDenied,

  /// A pending invitation was found to be past its TTL on access.
  #[error("this invitation has expired")]
  InvitationExpired,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so generic callers (e.g. the HTTP
/// layer) can recover the domain error for user-facing mapping without
/// knowing the concrete backend.
pub trait DomainError {
  /// The wrapped domain error, if this failure is one.
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}
