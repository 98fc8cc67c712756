//! Consent ledger types — the append-only audit trail of a link.
//!
//! Records are never updated or deleted; no such operation exists anywhere
//! in the contract. Corrections are expressed by appending a new record
//! with [`ConsentAction::Modified`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::link::Permissions;

/// The kind of consent-affecting action being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentAction {
  Granted,
  Revoked,
  Modified,
}

impl ConsentAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Granted => "granted",
      Self::Revoked => "revoked",
      Self::Modified => "modified",
    }
  }
}

/// One immutable audit entry describing a consent-affecting link transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
  pub record_id:   Uuid,
  pub link_id:     Uuid,
  pub action:      ConsentAction,
  pub recorded_at: DateTime<Utc>,
  /// The four capability flags as they stood at the moment of the action.
  pub permissions: Permissions,
  pub reason:      Option<String>,
  /// Requester network origin, kept for audit purposes only.
  pub origin:      Option<String>,
}

impl ConsentRecord {
  /// Build a record for a transition that just took place on `link_id`.
  pub fn new(
    link_id: Uuid,
    action: ConsentAction,
    permissions: Permissions,
    reason: Option<String>,
    origin: Option<String>,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      record_id: Uuid::new_v4(),
      link_id,
      action,
      recorded_at: now,
      permissions,
      reason,
      origin,
    }
  }
}
