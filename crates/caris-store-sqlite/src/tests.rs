//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use caris_core::{
  consent::ConsentAction,
  gate::{DataCategory, can_view},
  journal::{Cycle, NewJournalEntry},
  link::{LinkStatus, Permissions},
  principal::{NewPatient, NewProfessional, Principal, ProfessionalKind},
  store::ConsentStore,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{Error, SqliteStore, encode::encode_dt};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn patient(s: &SqliteStore, email: &str) -> Uuid {
  s.add_patient(NewPatient {
    display_name: "Alice".into(),
    email:        email.into(),
  })
  .await
  .unwrap()
  .patient_id
}

async fn professional(s: &SqliteStore, email: &str) -> Uuid {
  s.add_professional(NewProfessional {
    display_name: "Dr. Sousa".into(),
    email:        email.into(),
    kind:         ProfessionalKind::Psychologist,
    license_id:   Some("CRP-12345".into()),
    specialty:    None,
  })
  .await
  .unwrap()
  .professional_id
}

/// Shorthand: one professional, one patient, one accepted link.
async fn accepted_pair(s: &SqliteStore) -> (Uuid, Uuid, Uuid) {
  let prof = professional(s, "prof@example.com").await;
  let pat = patient(s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();
  s.accept_invitation(link.link_id, true, None).await.unwrap();
  (prof, pat, link.link_id)
}

fn assert_invalid_state(err: Error) {
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::InvalidLinkState { .. })
  ));
}

/// Backdate a link's invitation so it looks stale.
async fn backdate_invitation(s: &SqliteStore, link_id: Uuid, days: i64) {
  let at = encode_dt(Utc::now() - Duration::days(days));
  let id = link_id.hyphenated().to_string();
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE links SET invited_at = ?2 WHERE link_id = ?1",
        rusqlite::params![id, at],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

/// Backdate a journal entry's creation time.
async fn backdate_entry(s: &SqliteStore, entry_id: Uuid, days: i64) {
  let at = encode_dt(Utc::now() - Duration::days(days));
  let id = entry_id.hyphenated().to_string();
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE journal_entries SET created_at = ?2 WHERE entry_id = ?1",
        rusqlite::params![id, at],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

// ─── Principals ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_patient() {
  let s = store().await;
  let id = patient(&s, "alice@example.com").await;

  let fetched = s.get_patient(id).await.unwrap().unwrap();
  assert_eq!(fetched.patient_id, id);
  assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn duplicate_patient_email_rejected() {
  let s = store().await;
  patient(&s, "alice@example.com").await;

  let err = s
    .add_patient(NewPatient {
      display_name: "Other Alice".into(),
      email:        "alice@example.com".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
}

#[tokio::test]
async fn find_patient_by_email_is_case_insensitive() {
  let s = store().await;
  let id = patient(&s, "alice@example.com").await;

  let found = s
    .find_patient_by_email("Alice@Example.COM")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.patient_id, id);
}

#[tokio::test]
async fn get_professional_roundtrip() {
  let s = store().await;
  let id = professional(&s, "prof@example.com").await;

  let p = s.get_professional(id).await.unwrap().unwrap();
  assert_eq!(p.kind, ProfessionalKind::Psychologist);
  assert_eq!(p.license_id.as_deref(), Some("CRP-12345"));
  assert!(p.accepting_patients);
}

// ─── Invitations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_invitation_defaults() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;

  let link = s.create_invitation(prof, pat).await.unwrap();
  assert_eq!(link.status, LinkStatus::Pending);
  assert!(!link.consent_granted);
  assert!(link.permissions.full_history);
  assert!(link.permissions.emotions);
  assert!(link.permissions.cycles);
  assert!(!link.permissions.rituals);
  assert!(link.accepted_at.is_none());
}

#[tokio::test]
async fn invitation_requires_registered_parties() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;

  let err = s.create_invitation(prof, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::PatientNotFound(_))
  ));

  let pat = patient(&s, "alice@example.com").await;
  let err = s.create_invitation(Uuid::new_v4(), pat).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::ProfessionalNotFound(_))
  ));
}

#[tokio::test]
async fn duplicate_live_link_rejected() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;

  s.create_invitation(prof, pat).await.unwrap();
  let err = s.create_invitation(prof, pat).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::DuplicateActiveLink)
  ));
}

#[tokio::test]
async fn invitation_codes_are_unique() {
  let s = store().await;
  let pat = patient(&s, "alice@example.com").await;

  let mut codes = HashSet::new();
  for i in 0..50 {
    let prof = professional(&s, &format!("prof{i}@example.com")).await;
    let link = s.create_invitation(prof, pat).await.unwrap();
    codes.insert(link.invite_code.as_str().to_owned());
  }
  assert_eq!(codes.len(), 50);
}

#[tokio::test]
async fn find_by_code_is_case_insensitive() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();

  let lower = link.invite_code.as_str().to_ascii_lowercase();
  let found = s.find_link_by_code(&lower).await.unwrap().unwrap();
  assert_eq!(found.link_id, link.link_id);

  assert!(s.find_link_by_code("NOPE0000").await.unwrap().is_none());
}

// ─── Accept ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn accept_grants_consent_and_records_it() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();

  let accepted = s
    .accept_invitation(link.link_id, true, Some("203.0.113.7".into()))
    .await
    .unwrap();
  assert_eq!(accepted.status, LinkStatus::Active);
  assert!(accepted.consent_granted);
  assert!(accepted.accepted_at.is_some());

  let history = s.consent_history(link.link_id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].action, ConsentAction::Granted);
  assert_eq!(history[0].origin.as_deref(), Some("203.0.113.7"));
  assert!(history[0].permissions.full_history);
}

#[tokio::test]
async fn partial_consent_always_clears_sensitive_flags() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();

  let accepted = s
    .accept_invitation(link.link_id, false, None)
    .await
    .unwrap();
  assert!(!accepted.permissions.full_history);
  assert!(!accepted.permissions.rituals);
  assert!(accepted.permissions.emotions);
  assert!(accepted.permissions.cycles);

  // The ledger snapshot reflects the downgraded flags.
  let history = s.consent_history(link.link_id).await.unwrap();
  assert!(!history[0].permissions.full_history);
}

#[tokio::test]
async fn double_accept_rejected_without_side_effects() {
  let s = store().await;
  let (_, _, link_id) = accepted_pair(&s).await;

  assert_invalid_state(
    s.accept_invitation(link_id, true, None).await.unwrap_err(),
  );
  // Still exactly one ledger record.
  assert_eq!(s.consent_history(link_id).await.unwrap().len(), 1);
}

// ─── Expiry ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stale_pending_link_expires_on_access() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();
  backdate_invitation(&s, link.link_id, 31).await;

  let observed = s
    .find_link_by_code(link.invite_code.as_str())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(observed.status, LinkStatus::Expired);

  // The transition was persisted, and a later accept is a state error.
  let again = s.get_link(link.link_id).await.unwrap().unwrap();
  assert_eq!(again.status, LinkStatus::Expired);
  assert_invalid_state(
    s.accept_invitation(link.link_id, true, None)
      .await
      .unwrap_err(),
  );
}

#[tokio::test]
async fn stale_accept_expires_and_reports_it() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();
  backdate_invitation(&s, link.link_id, 40).await;

  // Accept is itself the first access that notices the stale invite.
  let err = s
    .accept_invitation(link.link_id, true, None)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::InvitationExpired)
  ));
  let after = s.get_link(link.link_id).await.unwrap().unwrap();
  assert_eq!(after.status, LinkStatus::Expired);
  assert!(s.consent_history(link.link_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn fresh_pending_link_does_not_expire() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();
  backdate_invitation(&s, link.link_id, 29).await;

  let observed = s.get_link(link.link_id).await.unwrap().unwrap();
  assert_eq!(observed.status, LinkStatus::Pending);
}

// ─── Revoke / reactivate / reissue ───────────────────────────────────────────

#[tokio::test]
async fn revoke_by_patient_records_reason() {
  let s = store().await;
  let (_, pat, link_id) = accepted_pair(&s).await;

  let revoked = s
    .revoke_link(
      link_id,
      Principal::Patient(pat),
      Some("privacy".into()),
      None,
    )
    .await
    .unwrap();
  assert_eq!(revoked.status, LinkStatus::Revoked);
  assert!(!revoked.consent_granted);
  assert_eq!(revoked.revocation_reason.as_deref(), Some("privacy"));

  let history = s.consent_history(link_id).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[1].action, ConsentAction::Revoked);
  assert_eq!(history[1].reason.as_deref(), Some("privacy"));
}

#[tokio::test]
async fn revoke_by_professional_gets_default_reason() {
  let s = store().await;
  let (prof, _, link_id) = accepted_pair(&s).await;

  let revoked = s
    .revoke_link(link_id, Principal::Professional(prof), None, None)
    .await
    .unwrap();
  assert_eq!(
    revoked.revocation_reason.as_deref(),
    Some("revoked by professional")
  );
}

#[tokio::test]
async fn revoke_by_stranger_is_denied() {
  let s = store().await;
  let (_, _, link_id) = accepted_pair(&s).await;

  let err = s
    .revoke_link(link_id, Principal::Patient(Uuid::new_v4()), None, None)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::PermissionDenied)
  ));

  // Nothing happened.
  let link = s.get_link(link_id).await.unwrap().unwrap();
  assert_eq!(link.status, LinkStatus::Active);
  assert_eq!(s.consent_history(link_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reactivate_restores_access_and_appends_grant() {
  let s = store().await;
  let (_, pat, link_id) = accepted_pair(&s).await;
  s.revoke_link(link_id, Principal::Patient(pat), None, None)
    .await
    .unwrap();

  let code_before = s
    .get_link(link_id)
    .await
    .unwrap()
    .unwrap()
    .invite_code;

  let restored = s.reactivate_link(link_id, None).await.unwrap();
  assert_eq!(restored.status, LinkStatus::Active);
  assert!(restored.consent_granted);
  assert_eq!(restored.invite_code, code_before);

  let history = s.consent_history(link_id).await.unwrap();
  assert_eq!(history.len(), 3);
  assert_eq!(history[2].action, ConsentAction::Granted);
  assert_eq!(history[2].reason.as_deref(), Some("reactivated by patient"));
}

#[tokio::test]
async fn reissue_only_from_revoked() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();

  // Pending: rejected, link unchanged.
  assert_invalid_state(s.reissue_invitation(link.link_id).await.unwrap_err());
  let snapshot = s.get_link(link.link_id).await.unwrap().unwrap();
  assert_eq!(snapshot, link);

  // Active: rejected.
  s.accept_invitation(link.link_id, true, None).await.unwrap();
  assert_invalid_state(s.reissue_invitation(link.link_id).await.unwrap_err());

  // Revoked: allowed, new code, same id.
  s.revoke_link(link.link_id, Principal::Patient(pat), None, None)
    .await
    .unwrap();
  let reissued = s.reissue_invitation(link.link_id).await.unwrap();
  assert_eq!(reissued.link_id, link.link_id);
  assert_eq!(reissued.status, LinkStatus::Pending);
  assert_ne!(reissued.invite_code, link.invite_code);
  assert!(!reissued.consent_granted);
}

#[tokio::test]
async fn invite_after_revocation_reuses_the_row() {
  let s = store().await;
  let (prof, pat, link_id) = accepted_pair(&s).await;
  s.revoke_link(link_id, Principal::Patient(pat), None, None)
    .await
    .unwrap();

  // A new invitation for the same pair goes through the existing row.
  let reinvited = s.create_invitation(prof, pat).await.unwrap();
  assert_eq!(reinvited.link_id, link_id);
  assert_eq!(reinvited.status, LinkStatus::Pending);

  // And its consent trail is intact.
  assert_eq!(s.consent_history(link_id).await.unwrap().len(), 2);
}

// ─── Permissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_permissions_appends_modified_record() {
  let s = store().await;
  let (_, _, link_id) = accepted_pair(&s).await;

  let updated = s
    .update_permissions(
      link_id,
      Permissions { rituals: true, ..Permissions::default() },
      None,
    )
    .await
    .unwrap();
  assert!(updated.permissions.rituals);

  let history = s.consent_history(link_id).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[1].action, ConsentAction::Modified);
  assert!(history[1].permissions.rituals);
}

#[tokio::test]
async fn update_permissions_rejected_off_active() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();

  assert_invalid_state(
    s.update_permissions(link.link_id, Permissions::default(), None)
      .await
      .unwrap_err(),
  );
}

// ─── Full scenario ───────────────────────────────────────────────────────────

#[tokio::test]
async fn invite_accept_revoke_reissue_scenario() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;

  // Invite.
  let link = s.create_invitation(prof, pat).await.unwrap();
  assert_eq!(link.status, LinkStatus::Pending);
  assert!(!link.consent_granted);

  // Accept with full consent.
  let link = s.accept_invitation(link.link_id, true, None).await.unwrap();
  assert_eq!(link.status, LinkStatus::Active);
  assert!(link.consent_granted);
  for cat in [
    DataCategory::FullHistory,
    DataCategory::Emotions,
    DataCategory::Cycles,
  ] {
    assert!(can_view(Some(&link), cat));
  }

  // Revoke with a reason.
  let old_code = link.invite_code.clone();
  let link = s
    .revoke_link(
      link.link_id,
      Principal::Patient(pat),
      Some("privacy".into()),
      None,
    )
    .await
    .unwrap();
  assert_eq!(link.status, LinkStatus::Revoked);
  for cat in [
    DataCategory::FullHistory,
    DataCategory::Emotions,
    DataCategory::Cycles,
    DataCategory::Rituals,
  ] {
    assert!(!can_view(Some(&link), cat));
  }

  // Reissue.
  let reissued = s.reissue_invitation(link.link_id).await.unwrap();
  assert_eq!(reissued.link_id, link.link_id);
  assert_eq!(reissued.status, LinkStatus::Pending);
  assert_ne!(reissued.invite_code, old_code);

  // Ledger: granted, then revoked. Reissue adds nothing.
  let history = s.consent_history(link.link_id).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].action, ConsentAction::Granted);
  assert_eq!(history[1].action, ConsentAction::Revoked);
}

// ─── Journal ─────────────────────────────────────────────────────────────────

async fn entry(s: &SqliteStore, pat: Uuid, emotion: &str) -> Uuid {
  s.add_entry(NewJournalEntry {
    patient_id: pat,
    cycle:      Cycle::Heal,
    emotion:    emotion.into(),
    content:    "wrote a little".into(),
  })
  .await
  .unwrap()
  .entry_id
}

#[tokio::test]
async fn add_and_list_entries() {
  let s = store().await;
  let pat = patient(&s, "alice@example.com").await;

  entry(&s, pat, "Gratitude").await;
  entry(&s, pat, "Serenity").await;

  let entries = s.entries_for_patient(pat).await.unwrap();
  assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn add_entry_requires_patient() {
  let s = store().await;
  let err = s
    .add_entry(NewJournalEntry {
      patient_id: Uuid::new_v4(),
      cycle:      Cycle::Create,
      emotion:    "Joy".into(),
      content:    "x".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::PatientNotFound(_))
  ));
}

#[tokio::test]
async fn update_entry_refreshes_tags() {
  let s = store().await;
  let pat = patient(&s, "alice@example.com").await;
  let id = entry(&s, pat, "Fear").await;

  let updated = s
    .update_entry(id, Cycle::Grow, "Courage".into(), "rewritten".into())
    .await
    .unwrap();
  assert_eq!(updated.cycle, Cycle::Grow);
  assert_eq!(updated.emotion, "Courage");
  assert!(updated.updated_at >= updated.created_at);
}

#[tokio::test]
async fn emotion_stats_order_by_frequency() {
  let s = store().await;
  let pat = patient(&s, "alice@example.com").await;

  entry(&s, pat, "Joy").await;
  entry(&s, pat, "Joy").await;
  entry(&s, pat, "Fear").await;

  let stats = s.emotion_stats(pat).await.unwrap();
  assert_eq!(stats[0].emotion, "Joy");
  assert_eq!(stats[0].count, 2);
  assert_eq!(stats[1].emotion, "Fear");
  assert_eq!(stats[1].count, 1);
}

#[tokio::test]
async fn cycle_stats_group_entries() {
  let s = store().await;
  let pat = patient(&s, "alice@example.com").await;

  for cycle in [Cycle::Heal, Cycle::Heal, Cycle::Grow] {
    s.add_entry(NewJournalEntry {
      patient_id: pat,
      cycle,
      emotion: "Calm".into(),
      content: "x".into(),
    })
    .await
    .unwrap();
  }

  let stats = s.cycle_stats(pat).await.unwrap();
  assert_eq!(stats.len(), 2);
  assert_eq!(stats[0].cycle, Cycle::Heal);
  assert_eq!(stats[0].count, 2);
  assert_eq!(stats[1].cycle, Cycle::Grow);
  assert_eq!(stats[1].count, 1);
}

// ─── Gated professional reads ────────────────────────────────────────────────

#[tokio::test]
async fn professional_read_without_link_is_denied() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;

  let err = s.entries_for_professional(prof, pat).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::PermissionDenied)
  ));
}

#[tokio::test]
async fn revoke_is_visible_to_the_next_read() {
  let s = store().await;
  let (prof, pat, link_id) = accepted_pair(&s).await;
  entry(&s, pat, "Joy").await;

  assert_eq!(s.entries_for_professional(prof, pat).await.unwrap().len(), 1);

  s.revoke_link(link_id, Principal::Patient(pat), None, None)
    .await
    .unwrap();

  let err = s.entries_for_professional(prof, pat).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(caris_core::Error::PermissionDenied)
  ));
}

#[tokio::test]
async fn limited_history_returns_trailing_window_only() {
  let s = store().await;
  let prof = professional(&s, "prof@example.com").await;
  let pat = patient(&s, "alice@example.com").await;
  let link = s.create_invitation(prof, pat).await.unwrap();
  // Partial consent: no full history.
  s.accept_invitation(link.link_id, false, None).await.unwrap();

  // 20 entries spread over 60 days; 5 of them within the window.
  for i in 0..20 {
    let id = entry(&s, pat, "Calm").await;
    backdate_entry(&s, id, i * 3).await; // 0, 3, 6, ..., 57 days old
  }

  let views = s.entries_for_professional(prof, pat).await.unwrap();
  assert_eq!(views.len(), 5);
}

#[tokio::test]
async fn masked_fields_are_omitted_not_rows() {
  let s = store().await;
  let (prof, pat, link_id) = accepted_pair(&s).await;
  entry(&s, pat, "Joy").await;

  s.update_permissions(
    link_id,
    Permissions { emotions: false, cycles: false, ..Permissions::default() },
    None,
  )
  .await
  .unwrap();

  let views = s.entries_for_professional(prof, pat).await.unwrap();
  assert_eq!(views.len(), 1);
  assert!(views[0].emotion.is_none());
  assert!(views[0].cycle.is_none());
  assert!(!views[0].content.is_empty());
}

#[tokio::test]
async fn full_history_sees_everything() {
  let s = store().await;
  let (prof, pat, _) = accepted_pair(&s).await;

  for i in 0..4 {
    let id = entry(&s, pat, "Calm").await;
    backdate_entry(&s, id, i * 20).await;
  }

  let views = s.entries_for_professional(prof, pat).await.unwrap();
  assert_eq!(views.len(), 4);
  assert!(views[0].emotion.is_some());
  assert!(views[0].cycle.is_some());
}

// ─── Link listings ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_patients_requires_active_consent() {
  let s = store().await;
  let (prof, pat, link_id) = accepted_pair(&s).await;

  let patients = s.list_patients_for_professional(prof).await.unwrap();
  assert_eq!(patients.len(), 1);
  assert_eq!(patients[0].patient_id, pat);

  s.revoke_link(link_id, Principal::Patient(pat), None, None)
    .await
    .unwrap();
  assert!(
    s.list_patients_for_professional(prof)
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn list_links_for_patient_covers_all_statuses() {
  let s = store().await;
  let pat = patient(&s, "alice@example.com").await;

  let p1 = professional(&s, "one@example.com").await;
  let p2 = professional(&s, "two@example.com").await;
  let l1 = s.create_invitation(p1, pat).await.unwrap();
  s.accept_invitation(l1.link_id, true, None).await.unwrap();
  s.create_invitation(p2, pat).await.unwrap();

  let links = s.list_links_for_patient(pat).await.unwrap();
  assert_eq!(links.len(), 2);
}
