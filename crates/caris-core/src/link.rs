//! The link — the relationship entity between one professional and one
//! patient, carrying lifecycle status, the consent flag, and the four
//! capability flags.
//!
//! Transition validation lives here as pure functions over [`Link`]; the
//! storage backend re-checks the precondition inside its transaction before
//! persisting. A transition attempted from a forbidden state returns
//! [`Error::InvalidLinkState`] and leaves the link untouched.

use chrono::{DateTime, Utc};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Days a pending invitation stays acceptable before lazy expiry.
pub const INVITE_TTL_DAYS: i64 = 30;

// ─── Invite code ─────────────────────────────────────────────────────────────

/// Length of a generated invitation code.
pub const INVITE_CODE_LEN: usize = 8;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A human-shareable token identifying a pending link for acceptance.
///
/// Generated codes are uppercase alphanumeric; lookup is case-insensitive.
/// Uniqueness across all stored links is the store's responsibility — the
/// store must check every freshly generated code against existing ones and
/// regenerate on collision rather than trusting the probability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteCode(String);

impl InviteCode {
  /// Draw a fresh candidate code from `rng`.
  pub fn generate(rng: &mut impl RngCore) -> Self {
    let mut bytes = [0u8; INVITE_CODE_LEN];
    rng.fill_bytes(&mut bytes);
    let code = bytes
      .iter()
      .map(|b| CODE_ALPHABET[*b as usize % CODE_ALPHABET.len()] as char)
      .collect();
    Self(code)
  }

  /// Wrap an already-stored code read back from the database.
  pub fn from_stored(code: impl Into<String>) -> Self { Self(code.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Case-insensitive exact match.
  pub fn matches(&self, candidate: &str) -> bool {
    self.0.eq_ignore_ascii_case(candidate.trim())
  }
}

impl std::fmt::Display for InviteCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a link.
///
/// `Pending` → `Active` (accept); `Pending` → `Expired` (lazy, terminal);
/// `Active` → `Revoked` (revoke); `Revoked` → `Active` (reactivate);
/// `Revoked` → `Pending` (reissue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
  Pending,
  Active,
  Revoked,
  Expired,
}

impl LinkStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Active => "active",
      Self::Revoked => "revoked",
      Self::Expired => "expired",
    }
  }
}

impl std::fmt::Display for LinkStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Permissions ─────────────────────────────────────────────────────────────

/// The four independent capability flags gating what a linked professional
/// may see. Rituals are treated as more sensitive and are opt-in only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
  pub full_history: bool,
  pub emotions:     bool,
  pub cycles:       bool,
  pub rituals:      bool,
}

impl Default for Permissions {
  fn default() -> Self {
    Self {
      full_history: true,
      emotions:     true,
      cycles:       true,
      rituals:      false,
    }
  }
}

impl Permissions {
  /// Partial consent never grants the two most sensitive capabilities.
  pub fn downgraded_partial(mut self) -> Self {
    self.full_history = false;
    self.rituals = false;
    self
  }
}

// ─── Link ────────────────────────────────────────────────────────────────────

/// The professional ↔ patient relationship.
///
/// Invariant (enforced by the store): at most one non-revoked link exists
/// per (professional, patient) pair. A revoked link is reissued in place —
/// the row and its consent trail survive; only the code is regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
  pub link_id:         Uuid,
  pub professional_id: Uuid,
  pub patient_id:      Uuid,
  pub invite_code:     InviteCode,
  pub status:          LinkStatus,
  /// Whether any data may be shown at all. Independent of `status`; the
  /// access gate requires both.
  pub consent_granted: bool,
  pub permissions:     Permissions,
  pub invited_at:      DateTime<Utc>,
  pub accepted_at:     Option<DateTime<Utc>>,
  /// When consent was last granted or restored.
  pub consented_at:    Option<DateTime<Utc>>,
  pub revoked_at:      Option<DateTime<Utc>>,
  pub revocation_reason: Option<String>,
  /// Professional-authored free text; never shown to the patient.
  pub notes:           Option<String>,
}

impl Link {
  /// A fresh professional-initiated invitation.
  pub fn invite(
    professional_id: Uuid,
    patient_id: Uuid,
    invite_code: InviteCode,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      link_id: Uuid::new_v4(),
      professional_id,
      patient_id,
      invite_code,
      status: LinkStatus::Pending,
      consent_granted: false,
      permissions: Permissions::default(),
      invited_at: now,
      accepted_at: None,
      consented_at: None,
      revoked_at: None,
      revocation_reason: None,
      notes: None,
    }
  }

  fn require(&self, expected: LinkStatus, action: &'static str) -> Result<()> {
    if self.status != expected {
      return Err(Error::InvalidLinkState { from: self.status, action });
    }
    Ok(())
  }

  /// True iff the invitation is still `Pending` and past its TTL.
  ///
  /// Expiry is evaluated lazily on access; any read path that observes a
  /// stale pending link must call [`Link::expire`] before proceeding.
  pub fn invitation_expired(&self, now: DateTime<Utc>) -> bool {
    self.status == LinkStatus::Pending
      && (now - self.invited_at).num_days() > INVITE_TTL_DAYS
  }

  /// Patient accepts the invitation and grants consent.
  ///
  /// With `full_consent == false` the two most sensitive capabilities
  /// (`full_history`, `rituals`) are forced off regardless of defaults.
  pub fn accept(
    &mut self,
    full_consent: bool,
    now: DateTime<Utc>,
  ) -> Result<()> {
    self.require(LinkStatus::Pending, "accept")?;
    self.status = LinkStatus::Active;
    self.consent_granted = true;
    self.accepted_at = Some(now);
    self.consented_at = Some(now);
    if !full_consent {
      self.permissions = self.permissions.downgraded_partial();
    }
    Ok(())
  }

  /// Withdraw consent. Valid from `Active` only; either side may initiate,
  /// with the caller-supplied reason distinguishing who did.
  pub fn revoke(
    &mut self,
    reason: Option<String>,
    now: DateTime<Utc>,
  ) -> Result<()> {
    self.require(LinkStatus::Active, "revoke")?;
    self.status = LinkStatus::Revoked;
    self.consent_granted = false;
    self.revoked_at = Some(now);
    self.revocation_reason = reason;
    Ok(())
  }

  /// Patient restores a lapsed consent without a new invitation.
  /// The invite code is unchanged — contrast with [`Link::reissue`].
  pub fn reactivate(&mut self, now: DateTime<Utc>) -> Result<()> {
    self.require(LinkStatus::Revoked, "reactivate")?;
    self.status = LinkStatus::Active;
    self.consent_granted = true;
    self.consented_at = Some(now);
    self.revoked_at = None;
    self.revocation_reason = None;
    Ok(())
  }

  /// Professional re-invites after revocation: same row, same link id, same
  /// consent trail, new code, back to `Pending`.
  pub fn reissue(
    &mut self,
    new_code: InviteCode,
    now: DateTime<Utc>,
  ) -> Result<()> {
    self.require(LinkStatus::Revoked, "reissue")?;
    self.status = LinkStatus::Pending;
    self.consent_granted = false;
    self.invite_code = new_code;
    self.invited_at = now;
    self.revoked_at = None;
    self.revocation_reason = None;
    Ok(())
  }

  /// Mark a stale pending invitation expired. Terminal.
  pub fn expire(&mut self) -> Result<()> {
    self.require(LinkStatus::Pending, "expire")?;
    self.status = LinkStatus::Expired;
    Ok(())
  }

  /// Replace the capability flags on an active link.
  pub fn set_permissions(&mut self, permissions: Permissions) -> Result<()> {
    self.require(LinkStatus::Active, "modify permissions on")?;
    self.permissions = permissions;
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
