//! The `ConsentStore` trait.
//!
//! Implemented by storage backends (e.g. `caris-store-sqlite`). The web
//! layer (`caris-api`) depends on this abstraction, not on any concrete
//! backend.
//!
//! Every link transition must be applied as a single atomic unit: read the
//! current status, validate, write the new status plus the ledger append —
//! committing together or not at all. Implementations must re-validate the
//! precondition immediately before writing rather than trusting state read
//! earlier in the request.

use std::future::Future;

use uuid::Uuid;

use crate::{
  consent::ConsentRecord,
  gate::JournalEntryView,
  journal::{CycleCount, EmotionCount, JournalEntry, NewJournalEntry},
  link::{Link, Permissions},
  principal::{NewPatient, NewProfessional, Patient, Principal, Professional},
};

/// Abstraction over a CÁRIS consent store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ConsentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Principals ────────────────────────────────────────────────────────

  /// Create and persist a new patient. Fails if the email is taken.
  fn add_patient(
    &self,
    input: NewPatient,
  ) -> impl Future<Output = Result<Patient, Self::Error>> + Send + '_;

  /// Retrieve a patient by id. Returns `None` if not found.
  fn get_patient(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by email — invitation flows address patients
  /// by the email they registered with.
  fn find_patient_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send + 'a;

  /// Create and persist a new professional. Fails if the email is taken.
  fn add_professional(
    &self,
    input: NewProfessional,
  ) -> impl Future<Output = Result<Professional, Self::Error>> + Send + '_;

  fn get_professional(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Professional>, Self::Error>> + Send + '_;

  // ── Links and the invitation protocol ─────────────────────────────────

  /// Professional invites a patient: creates a `Pending` link with a fresh
  /// unique invite code and default permissions.
  ///
  /// Fails with `DuplicateActiveLink` if a non-revoked link already exists
  /// for the pair, and with `PatientNotFound`/`ProfessionalNotFound` when
  /// either side is unknown.
  fn create_invitation(
    &self,
    professional_id: Uuid,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Link, Self::Error>> + Send + '_;

  /// Retrieve a link by id, applying lazy expiry first. Returns `None` if
  /// not found.
  fn get_link(
    &self,
    link_id: Uuid,
  ) -> impl Future<Output = Result<Option<Link>, Self::Error>> + Send + '_;

  /// The unique non-revoked link for a pair, if any. Applies lazy expiry.
  fn find_link(
    &self,
    professional_id: Uuid,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Option<Link>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by invite code. Applies lazy expiry: a stale
  /// `Pending` link is transitioned to `Expired` before being returned.
  fn find_link_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Link>, Self::Error>> + Send + 'a;

  /// All links held by a patient, every status, newest invitation first.
  fn list_links_for_patient(
    &self,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Link>, Self::Error>> + Send + '_;

  /// Patients the professional currently has active, consented access to.
  fn list_patients_for_professional(
    &self,
    professional_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Patient>, Self::Error>> + Send + '_;

  // ── Link transitions ──────────────────────────────────────────────────
  //
  // Each of these runs atomically and, where the transition affects
  // consent, appends the matching ledger record in the same transaction.

  /// Patient accepts a pending invitation. Appends a `Granted` record.
  ///
  /// A stale pending link is expired instead, failing with
  /// `InvitationExpired`.
  fn accept_invitation(
    &self,
    link_id: Uuid,
    full_consent: bool,
    origin: Option<String>,
  ) -> impl Future<Output = Result<Link, Self::Error>> + Send + '_;

  /// Withdraw consent on an active link. Appends a `Revoked` record.
  ///
  /// `initiator` must be one of the link's two parties (the patient owning
  /// the consent, or the professional renouncing access); anyone else gets
  /// `PermissionDenied`. When `reason` is absent a default naming the
  /// initiating side is stored.
  fn revoke_link(
    &self,
    link_id: Uuid,
    initiator: Principal,
    reason: Option<String>,
    origin: Option<String>,
  ) -> impl Future<Output = Result<Link, Self::Error>> + Send + '_;

  /// Patient restores a previously revoked consent without a new
  /// invitation; the code is unchanged. Appends a `Granted` record.
  fn reactivate_link(
    &self,
    link_id: Uuid,
    origin: Option<String>,
  ) -> impl Future<Output = Result<Link, Self::Error>> + Send + '_;

  /// Professional re-invites after revocation: regenerates the code and
  /// returns the link to `Pending` in place. No ledger record — consent is
  /// neither granted nor withdrawn by a reissue.
  fn reissue_invitation(
    &self,
    link_id: Uuid,
  ) -> impl Future<Output = Result<Link, Self::Error>> + Send + '_;

  /// Replace the capability flags on an active link. Appends a `Modified`
  /// record with the new snapshot.
  fn update_permissions(
    &self,
    link_id: Uuid,
    permissions: Permissions,
    origin: Option<String>,
  ) -> impl Future<Output = Result<Link, Self::Error>> + Send + '_;

  // ── Consent ledger ────────────────────────────────────────────────────

  /// Full audit trail for a link, oldest first. Read-only: no update or
  /// delete operation exists.
  fn consent_history(
    &self,
    link_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ConsentRecord>, Self::Error>> + Send + '_;

  // ── Journal ───────────────────────────────────────────────────────────

  /// Record a new diary entry. Timestamps are set by the store.
  fn add_entry(
    &self,
    input: NewJournalEntry,
  ) -> impl Future<Output = Result<JournalEntry, Self::Error>> + Send + '_;

  /// Rewrite an entry's tags and content; `updated_at` is refreshed by the
  /// store.
  fn update_entry(
    &self,
    entry_id: Uuid,
    cycle: crate::journal::Cycle,
    emotion: String,
    content: String,
  ) -> impl Future<Output = Result<JournalEntry, Self::Error>> + Send + '_;

  /// All of a patient's own entries, newest first. No gating — owners see
  /// everything.
  fn entries_for_patient(
    &self,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<JournalEntry>, Self::Error>> + Send + '_;

  /// Emotion frequency counts over a patient's entries, most frequent
  /// first.
  fn emotion_stats(
    &self,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EmotionCount>, Self::Error>> + Send + '_;

  /// Entry counts per cycle over a patient's entries, most frequent first.
  /// Cycles with no entries are not listed.
  fn cycle_stats(
    &self,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CycleCount>, Self::Error>> + Send + '_;

  /// A patient's journal as seen by a professional.
  ///
  /// The access gate is evaluated at query time — never cached. Fails with
  /// `PermissionDenied` when no active, consented link exists; otherwise
  /// entries are window-limited and field-masked per the link's
  /// permissions.
  fn entries_for_professional(
    &self,
    professional_id: Uuid,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<JournalEntryView>, Self::Error>> + Send + '_;
}
