//! [`SqliteStore`] — the SQLite implementation of [`ConsentStore`].
//!
//! Each link transition runs inside one rusqlite transaction: the current
//! row is re-read and re-validated immediately before writing, and the
//! status update plus the consent-ledger append commit as a unit. A failed
//! precondition rolls back with nothing persisted.

use std::path::Path;

use chrono::Utc;
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use caris_core::{
  consent::{ConsentAction, ConsentRecord},
  gate::{JournalEntryView, JournalScope},
  journal::{Cycle, CycleCount, EmotionCount, JournalEntry, NewJournalEntry},
  link::{InviteCode, Link, Permissions},
  principal::{NewPatient, NewProfessional, Patient, Principal, Professional},
  store::ConsentStore,
};

use crate::{
  Error, Result,
  encode::{
    RawConsentRecord, RawJournalEntry, RawLink, RawPatient, RawProfessional,
    decode_cycle, encode_action, encode_cycle, encode_dt, encode_kind,
    encode_permissions, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

const LINK_COLS: &str = "link_id, professional_id, patient_id, invite_code, \
   status, consent_granted, full_history, emotions, cycles, rituals, \
   invited_at, accepted_at, consented_at, revoked_at, revocation_reason, \
   notes";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CÁRIS consent store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the dedicated database thread, flattening the two error
  /// layers (connection transport, domain/storage).
  async fn call<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn map_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLink> {
  Ok(RawLink {
    link_id:           row.get(0)?,
    professional_id:   row.get(1)?,
    patient_id:        row.get(2)?,
    invite_code:       row.get(3)?,
    status:            row.get(4)?,
    consent_granted:   row.get(5)?,
    full_history:      row.get(6)?,
    emotions:          row.get(7)?,
    cycles:            row.get(8)?,
    rituals:           row.get(9)?,
    invited_at:        row.get(10)?,
    accepted_at:       row.get(11)?,
    consented_at:      row.get(12)?,
    revoked_at:        row.get(13)?,
    revocation_reason: row.get(14)?,
    notes:             row.get(15)?,
  })
}

fn map_patient(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPatient> {
  Ok(RawPatient {
    patient_id:   row.get(0)?,
    display_name: row.get(1)?,
    email:        row.get(2)?,
    created_at:   row.get(3)?,
  })
}

fn map_professional(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawProfessional> {
  Ok(RawProfessional {
    professional_id:    row.get(0)?,
    display_name:       row.get(1)?,
    email:              row.get(2)?,
    kind:               row.get(3)?,
    license_id:         row.get(4)?,
    specialty:          row.get(5)?,
    accepting_patients: row.get(6)?,
    created_at:         row.get(7)?,
  })
}

fn map_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJournalEntry> {
  Ok(RawJournalEntry {
    entry_id:   row.get(0)?,
    patient_id: row.get(1)?,
    cycle:      row.get(2)?,
    emotion:    row.get(3)?,
    content:    row.get(4)?,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

// ─── Transaction-scoped helpers ──────────────────────────────────────────────

fn query_link(
  conn: &rusqlite::Connection,
  where_sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> Result<Option<Link>> {
  let sql = format!("SELECT {LINK_COLS} FROM links WHERE {where_sql}");
  let raw = conn.query_row(&sql, params, map_link).optional()?;
  raw.map(RawLink::into_link).transpose()
}

fn require_link(conn: &rusqlite::Connection, link_id: Uuid) -> Result<Link> {
  query_link(conn, "link_id = ?1", &[&encode_uuid(link_id)])?
    .ok_or(Error::Core(caris_core::Error::LinkNotFound))
}

/// Persist every mutable column of `link` back to its row.
fn write_link(conn: &rusqlite::Connection, link: &Link) -> Result<()> {
  conn.execute(
    "UPDATE links SET
       invite_code = ?2, status = ?3, consent_granted = ?4,
       full_history = ?5, emotions = ?6, cycles = ?7, rituals = ?8,
       invited_at = ?9, accepted_at = ?10, consented_at = ?11,
       revoked_at = ?12, revocation_reason = ?13, notes = ?14
     WHERE link_id = ?1",
    rusqlite::params![
      encode_uuid(link.link_id),
      link.invite_code.as_str(),
      encode_status(link.status),
      link.consent_granted,
      link.permissions.full_history,
      link.permissions.emotions,
      link.permissions.cycles,
      link.permissions.rituals,
      encode_dt(link.invited_at),
      link.accepted_at.map(encode_dt),
      link.consented_at.map(encode_dt),
      link.revoked_at.map(encode_dt),
      link.revocation_reason,
      link.notes,
    ],
  )?;
  Ok(())
}

/// Append one row to the consent ledger. INSERT only — nothing in this
/// crate updates or deletes `consent_records`.
fn append_consent(
  conn: &rusqlite::Connection,
  record: &ConsentRecord,
) -> Result<()> {
  conn.execute(
    "INSERT INTO consent_records
       (record_id, link_id, action, recorded_at, permissions, reason, origin)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(record.record_id),
      encode_uuid(record.link_id),
      encode_action(record.action),
      encode_dt(record.recorded_at),
      encode_permissions(&record.permissions)?,
      record.reason,
      record.origin,
    ],
  )?;
  Ok(())
}

/// Lazy expiry: a stale pending link observed by any read path is
/// transitioned to `Expired` before that path proceeds. Returns whether the
/// transition fired.
fn expire_if_stale(
  conn: &rusqlite::Connection,
  link: &mut Link,
) -> Result<bool> {
  if !link.invitation_expired(Utc::now()) {
    return Ok(false);
  }
  link.expire()?;
  write_link(conn, link)?;
  Ok(true)
}

/// Generate an invitation code that no stored link holds.
///
/// Collision probability is negligible, but the check is mandatory — each
/// candidate is verified against the table, not trusted.
fn fresh_code(conn: &rusqlite::Connection) -> Result<InviteCode> {
  loop {
    let code = InviteCode::generate(&mut OsRng);
    let taken: bool = conn
      .query_row(
        "SELECT 1 FROM links WHERE invite_code = ?1",
        rusqlite::params![code.as_str()],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false);
    if !taken {
      return Ok(code);
    }
  }
}

fn patient_exists(conn: &rusqlite::Connection, id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM patients WHERE patient_id = ?1",
        rusqlite::params![encode_uuid(id)],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn professional_exists(conn: &rusqlite::Connection, id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM professionals WHERE professional_id = ?1",
        rusqlite::params![encode_uuid(id)],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn entries_newest_first(
  conn: &rusqlite::Connection,
  patient_id: Uuid,
) -> Result<Vec<JournalEntry>> {
  let mut stmt = conn.prepare(
    "SELECT entry_id, patient_id, cycle, emotion, content, created_at,
            updated_at
     FROM journal_entries WHERE patient_id = ?1
     ORDER BY created_at DESC",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(patient_id)], map_entry)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawJournalEntry::into_entry).collect()
}

// ─── ConsentStore impl ───────────────────────────────────────────────────────

impl ConsentStore for SqliteStore {
  type Error = Error;

  // ── Principals ────────────────────────────────────────────────────────────

  async fn add_patient(&self, input: NewPatient) -> Result<Patient> {
    self
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM patients WHERE email = ?1",
            rusqlite::params![input.email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Err(Error::EmailTaken(input.email));
        }

        let patient = Patient {
          patient_id:   Uuid::new_v4(),
          display_name: input.display_name,
          email:        input.email,
          created_at:   Utc::now(),
        };
        conn.execute(
          "INSERT INTO patients (patient_id, display_name, email, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            encode_uuid(patient.patient_id),
            patient.display_name,
            patient.email,
            encode_dt(patient.created_at),
          ],
        )?;
        Ok(patient)
      })
      .await
  }

  async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>> {
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT patient_id, display_name, email, created_at
             FROM patients WHERE patient_id = ?1",
            rusqlite::params![encode_uuid(id)],
            map_patient,
          )
          .optional()?;
        raw.map(RawPatient::into_patient).transpose()
      })
      .await
  }

  async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>> {
    let email = email.to_owned();
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT patient_id, display_name, email, created_at
             FROM patients WHERE email = ?1",
            rusqlite::params![email],
            map_patient,
          )
          .optional()?;
        raw.map(RawPatient::into_patient).transpose()
      })
      .await
  }

  async fn add_professional(
    &self,
    input: NewProfessional,
  ) -> Result<Professional> {
    self
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM professionals WHERE email = ?1",
            rusqlite::params![input.email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Err(Error::EmailTaken(input.email));
        }

        let professional = Professional {
          professional_id: Uuid::new_v4(),
          display_name: input.display_name,
          email: input.email,
          kind: input.kind,
          license_id: input.license_id,
          specialty: input.specialty,
          accepting_patients: true,
          created_at: Utc::now(),
        };
        conn.execute(
          "INSERT INTO professionals
             (professional_id, display_name, email, kind, license_id,
              specialty, accepting_patients, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            encode_uuid(professional.professional_id),
            professional.display_name,
            professional.email,
            encode_kind(professional.kind),
            professional.license_id,
            professional.specialty,
            professional.accepting_patients,
            encode_dt(professional.created_at),
          ],
        )?;
        Ok(professional)
      })
      .await
  }

  async fn get_professional(&self, id: Uuid) -> Result<Option<Professional>> {
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT professional_id, display_name, email, kind, license_id,
                    specialty, accepting_patients, created_at
             FROM professionals WHERE professional_id = ?1",
            rusqlite::params![encode_uuid(id)],
            map_professional,
          )
          .optional()?;
        raw.map(RawProfessional::into_professional).transpose()
      })
      .await
  }

  // ── Links and the invitation protocol ─────────────────────────────────────

  async fn create_invitation(
    &self,
    professional_id: Uuid,
    patient_id: Uuid,
  ) -> Result<Link> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !professional_exists(&tx, professional_id)? {
          return Err(
            caris_core::Error::ProfessionalNotFound(professional_id).into(),
          );
        }
        if !patient_exists(&tx, patient_id)? {
          return Err(caris_core::Error::PatientNotFound(patient_id).into());
        }

        let prof_str = encode_uuid(professional_id);
        let pat_str = encode_uuid(patient_id);

        let live = query_link(
          &tx,
          "professional_id = ?1 AND patient_id = ?2 AND status != 'revoked'",
          &[&prof_str, &pat_str],
        )?;
        if live.is_some() {
          return Err(caris_core::Error::DuplicateActiveLink.into());
        }

        // A revoked pair is re-invited in place: the row and its consent
        // trail survive, only the code changes.
        if let Some(mut revoked) = query_link(
          &tx,
          "professional_id = ?1 AND patient_id = ?2 AND status = 'revoked'",
          &[&prof_str, &pat_str],
        )? {
          let code = fresh_code(&tx)?;
          revoked.reissue(code, Utc::now())?;
          write_link(&tx, &revoked)?;
          tx.commit()?;
          return Ok(revoked);
        }

        let code = fresh_code(&tx)?;
        let link = Link::invite(professional_id, patient_id, code, Utc::now());
        tx.execute(
          &format!(
            "INSERT INTO links ({LINK_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16)"
          ),
          rusqlite::params![
            encode_uuid(link.link_id),
            prof_str,
            pat_str,
            link.invite_code.as_str(),
            encode_status(link.status),
            link.consent_granted,
            link.permissions.full_history,
            link.permissions.emotions,
            link.permissions.cycles,
            link.permissions.rituals,
            encode_dt(link.invited_at),
            Option::<String>::None,
            Option::<String>::None,
            Option::<String>::None,
            Option::<String>::None,
            Option::<String>::None,
          ],
        )?;
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn get_link(&self, link_id: Uuid) -> Result<Option<Link>> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let link =
          query_link(&tx, "link_id = ?1", &[&encode_uuid(link_id)])?;
        let link = match link {
          Some(mut l) => {
            expire_if_stale(&tx, &mut l)?;
            Some(l)
          }
          None => None,
        };
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn find_link(
    &self,
    professional_id: Uuid,
    patient_id: Uuid,
  ) -> Result<Option<Link>> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let link = query_link(
          &tx,
          "professional_id = ?1 AND patient_id = ?2 AND status != 'revoked'",
          &[&encode_uuid(professional_id), &encode_uuid(patient_id)],
        )?;
        let link = match link {
          Some(mut l) => {
            expire_if_stale(&tx, &mut l)?;
            Some(l)
          }
          None => None,
        };
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn find_link_by_code(&self, code: &str) -> Result<Option<Link>> {
    // The invite_code column is COLLATE NOCASE, so equality is already
    // case-insensitive.
    let code = code.trim().to_owned();
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let link = query_link(&tx, "invite_code = ?1", &[&code])?;
        let link = match link {
          Some(mut l) => {
            expire_if_stale(&tx, &mut l)?;
            Some(l)
          }
          None => None,
        };
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn list_links_for_patient(&self, patient_id: Uuid) -> Result<Vec<Link>> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raws = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {LINK_COLS} FROM links WHERE patient_id = ?1
             ORDER BY invited_at DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![encode_uuid(patient_id)], map_link)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut links = Vec::with_capacity(raws.len());
        for raw in raws {
          let mut link = raw.into_link()?;
          expire_if_stale(&tx, &mut link)?;
          links.push(link);
        }
        tx.commit()?;
        Ok(links)
      })
      .await
  }

  async fn list_patients_for_professional(
    &self,
    professional_id: Uuid,
  ) -> Result<Vec<Patient>> {
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.patient_id, p.display_name, p.email, p.created_at
           FROM patients p
           JOIN links l ON l.patient_id = p.patient_id
           WHERE l.professional_id = ?1
             AND l.status = 'active'
             AND l.consent_granted = 1
           ORDER BY p.display_name",
        )?;
        let raws = stmt
          .query_map(
            rusqlite::params![encode_uuid(professional_id)],
            map_patient,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPatient::into_patient).collect()
      })
      .await
  }

  // ── Link transitions ──────────────────────────────────────────────────────

  async fn accept_invitation(
    &self,
    link_id: Uuid,
    full_consent: bool,
    origin: Option<String>,
  ) -> Result<Link> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut link = require_link(&tx, link_id)?;
        let now = Utc::now();

        // A stale invitation expires on this access; the expiry commits
        // even though the accept itself fails.
        if expire_if_stale(&tx, &mut link)? {
          tx.commit()?;
          return Err(caris_core::Error::InvitationExpired.into());
        }

        link.accept(full_consent, now)?;
        write_link(&tx, &link)?;
        append_consent(
          &tx,
          &ConsentRecord::new(
            link.link_id,
            ConsentAction::Granted,
            link.permissions,
            None,
            origin,
            now,
          ),
        )?;
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn revoke_link(
    &self,
    link_id: Uuid,
    initiator: Principal,
    reason: Option<String>,
    origin: Option<String>,
  ) -> Result<Link> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut link = require_link(&tx, link_id)?;

        let default_reason = match initiator {
          Principal::Patient(id) if id == link.patient_id => {
            "revoked by patient"
          }
          Principal::Professional(id) if id == link.professional_id => {
            "revoked by professional"
          }
          _ => return Err(caris_core::Error::PermissionDenied.into()),
        };
        let reason = reason.or_else(|| Some(default_reason.to_owned()));

        let now = Utc::now();
        link.revoke(reason.clone(), now)?;
        write_link(&tx, &link)?;
        append_consent(
          &tx,
          &ConsentRecord::new(
            link.link_id,
            ConsentAction::Revoked,
            link.permissions,
            reason,
            origin,
            now,
          ),
        )?;
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn reactivate_link(
    &self,
    link_id: Uuid,
    origin: Option<String>,
  ) -> Result<Link> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut link = require_link(&tx, link_id)?;
        let now = Utc::now();

        link.reactivate(now)?;
        write_link(&tx, &link)?;
        append_consent(
          &tx,
          &ConsentRecord::new(
            link.link_id,
            ConsentAction::Granted,
            link.permissions,
            Some("reactivated by patient".to_owned()),
            origin,
            now,
          ),
        )?;
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn reissue_invitation(&self, link_id: Uuid) -> Result<Link> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut link = require_link(&tx, link_id)?;

        let code = fresh_code(&tx)?;
        link.reissue(code, Utc::now())?;
        write_link(&tx, &link)?;
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  async fn update_permissions(
    &self,
    link_id: Uuid,
    permissions: Permissions,
    origin: Option<String>,
  ) -> Result<Link> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut link = require_link(&tx, link_id)?;
        let now = Utc::now();

        link.set_permissions(permissions)?;
        write_link(&tx, &link)?;
        append_consent(
          &tx,
          &ConsentRecord::new(
            link.link_id,
            ConsentAction::Modified,
            link.permissions,
            None,
            origin,
            now,
          ),
        )?;
        tx.commit()?;
        Ok(link)
      })
      .await
  }

  // ── Consent ledger ────────────────────────────────────────────────────────

  async fn consent_history(&self, link_id: Uuid) -> Result<Vec<ConsentRecord>> {
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, link_id, action, recorded_at, permissions,
                  reason, origin
           FROM consent_records WHERE link_id = ?1
           ORDER BY recorded_at ASC, record_id ASC",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![encode_uuid(link_id)], |row| {
            Ok(RawConsentRecord {
              record_id:   row.get(0)?,
              link_id:     row.get(1)?,
              action:      row.get(2)?,
              recorded_at: row.get(3)?,
              permissions: row.get(4)?,
              reason:      row.get(5)?,
              origin:      row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawConsentRecord::into_record).collect()
      })
      .await
  }

  // ── Journal ───────────────────────────────────────────────────────────────

  async fn add_entry(&self, input: NewJournalEntry) -> Result<JournalEntry> {
    self
      .call(move |conn| {
        if !patient_exists(conn, input.patient_id)? {
          return Err(
            caris_core::Error::PatientNotFound(input.patient_id).into(),
          );
        }

        let now = Utc::now();
        let entry = JournalEntry {
          entry_id:   Uuid::new_v4(),
          patient_id: input.patient_id,
          cycle:      input.cycle,
          emotion:    input.emotion,
          content:    input.content,
          created_at: now,
          updated_at: now,
        };
        conn.execute(
          "INSERT INTO journal_entries
             (entry_id, patient_id, cycle, emotion, content, created_at,
              updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(entry.entry_id),
            encode_uuid(entry.patient_id),
            encode_cycle(entry.cycle),
            entry.emotion,
            entry.content,
            encode_dt(entry.created_at),
            encode_dt(entry.updated_at),
          ],
        )?;
        Ok(entry)
      })
      .await
  }

  async fn update_entry(
    &self,
    entry_id: Uuid,
    cycle: Cycle,
    emotion: String,
    content: String,
  ) -> Result<JournalEntry> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            "SELECT entry_id, patient_id, cycle, emotion, content,
                    created_at, updated_at
             FROM journal_entries WHERE entry_id = ?1",
            rusqlite::params![encode_uuid(entry_id)],
            map_entry,
          )
          .optional()?;
        let mut entry = raw
          .ok_or(Error::Core(caris_core::Error::EntryNotFound(entry_id)))?
          .into_entry()?;

        entry.cycle = cycle;
        entry.emotion = emotion;
        entry.content = content;
        entry.updated_at = Utc::now();

        tx.execute(
          "UPDATE journal_entries
           SET cycle = ?2, emotion = ?3, content = ?4, updated_at = ?5
           WHERE entry_id = ?1",
          rusqlite::params![
            encode_uuid(entry.entry_id),
            encode_cycle(entry.cycle),
            entry.emotion,
            entry.content,
            encode_dt(entry.updated_at),
          ],
        )?;
        tx.commit()?;
        Ok(entry)
      })
      .await
  }

  async fn entries_for_patient(
    &self,
    patient_id: Uuid,
  ) -> Result<Vec<JournalEntry>> {
    self
      .call(move |conn| entries_newest_first(conn, patient_id))
      .await
  }

  async fn emotion_stats(&self, patient_id: Uuid) -> Result<Vec<EmotionCount>> {
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT emotion, COUNT(*) AS n
           FROM journal_entries WHERE patient_id = ?1
           GROUP BY emotion ORDER BY n DESC, emotion ASC",
        )?;
        let counts = stmt
          .query_map(rusqlite::params![encode_uuid(patient_id)], |row| {
            Ok(EmotionCount { emotion: row.get(0)?, count: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
      })
      .await
  }

  async fn cycle_stats(&self, patient_id: Uuid) -> Result<Vec<CycleCount>> {
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT cycle, COUNT(*) AS n
           FROM journal_entries WHERE patient_id = ?1
           GROUP BY cycle ORDER BY n DESC, cycle ASC",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![encode_uuid(patient_id)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws
          .into_iter()
          .map(|(slug, count)| {
            Ok(CycleCount { cycle: decode_cycle(&slug)?, count })
          })
          .collect()
      })
      .await
  }

  async fn entries_for_professional(
    &self,
    professional_id: Uuid,
    patient_id: Uuid,
  ) -> Result<Vec<JournalEntryView>> {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let now = Utc::now();

        // Gate evaluated here, at query time — never cached across
        // requests. A revocation is visible to the very next read.
        let link = query_link(
          &tx,
          "professional_id = ?1 AND patient_id = ?2 AND status != 'revoked'",
          &[&encode_uuid(professional_id), &encode_uuid(patient_id)],
        )?;
        let link = match link {
          Some(mut l) => {
            expire_if_stale(&tx, &mut l)?;
            Some(l)
          }
          None => None,
        };

        let scope = JournalScope::for_link(link.as_ref(), now)
          .ok_or(Error::Core(caris_core::Error::PermissionDenied))?;

        let entries = entries_newest_first(&tx, patient_id)?;
        tx.commit()?;

        Ok(
          entries
            .into_iter()
            .filter_map(|entry| scope.project(entry))
            .collect(),
        )
      })
      .await
  }
}
