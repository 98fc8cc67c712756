//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The permission snapshot
//! on a consent record is stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings; enums as their stable discriminants.

use caris_core::{
  consent::{ConsentAction, ConsentRecord},
  journal::{Cycle, JournalEntry},
  link::{InviteCode, Link, LinkStatus, Permissions},
  principal::{Patient, Professional, ProfessionalKind},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── LinkStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: LinkStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<LinkStatus> {
  match s {
    "pending" => Ok(LinkStatus::Pending),
    "active" => Ok(LinkStatus::Active),
    "revoked" => Ok(LinkStatus::Revoked),
    "expired" => Ok(LinkStatus::Expired),
    other => Err(Error::Decode(format!("unknown link status: {other:?}"))),
  }
}

// ─── ConsentAction ───────────────────────────────────────────────────────────

pub fn encode_action(a: ConsentAction) -> &'static str { a.as_str() }

pub fn decode_action(s: &str) -> Result<ConsentAction> {
  match s {
    "granted" => Ok(ConsentAction::Granted),
    "revoked" => Ok(ConsentAction::Revoked),
    "modified" => Ok(ConsentAction::Modified),
    other => Err(Error::Decode(format!("unknown consent action: {other:?}"))),
  }
}

// ─── ProfessionalKind ────────────────────────────────────────────────────────

pub fn encode_kind(k: ProfessionalKind) -> &'static str {
  match k {
    ProfessionalKind::Psychologist => "psychologist",
    ProfessionalKind::Psychotherapist => "psychotherapist",
    ProfessionalKind::Coach => "coach",
    ProfessionalKind::Psychiatrist => "psychiatrist",
    ProfessionalKind::OccupationalTherapist => "occupational_therapist",
    ProfessionalKind::Other => "other",
  }
}

pub fn decode_kind(s: &str) -> Result<ProfessionalKind> {
  match s {
    "psychologist" => Ok(ProfessionalKind::Psychologist),
    "psychotherapist" => Ok(ProfessionalKind::Psychotherapist),
    "coach" => Ok(ProfessionalKind::Coach),
    "psychiatrist" => Ok(ProfessionalKind::Psychiatrist),
    "occupational_therapist" => Ok(ProfessionalKind::OccupationalTherapist),
    "other" => Ok(ProfessionalKind::Other),
    other => Err(Error::Decode(format!("unknown professional kind: {other:?}"))),
  }
}

// ─── Cycle ───────────────────────────────────────────────────────────────────

pub fn encode_cycle(c: Cycle) -> &'static str { c.slug() }

pub fn decode_cycle(s: &str) -> Result<Cycle> {
  Cycle::from_slug(s)
    .ok_or_else(|| Error::Decode(format!("unknown cycle slug: {s:?}")))
}

// ─── Permissions ─────────────────────────────────────────────────────────────

pub fn encode_permissions(p: &Permissions) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn decode_permissions(s: &str) -> Result<Permissions> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `patients` row.
pub struct RawPatient {
  pub patient_id:   String,
  pub display_name: String,
  pub email:        String,
  pub created_at:   String,
}

impl RawPatient {
  pub fn into_patient(self) -> Result<Patient> {
    Ok(Patient {
      patient_id:   decode_uuid(&self.patient_id)?,
      display_name: self.display_name,
      email:        self.email,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `professionals` row.
pub struct RawProfessional {
  pub professional_id:    String,
  pub display_name:       String,
  pub email:              String,
  pub kind:               String,
  pub license_id:         Option<String>,
  pub specialty:          Option<String>,
  pub accepting_patients: bool,
  pub created_at:         String,
}

impl RawProfessional {
  pub fn into_professional(self) -> Result<Professional> {
    Ok(Professional {
      professional_id: decode_uuid(&self.professional_id)?,
      display_name: self.display_name,
      email: self.email,
      kind: decode_kind(&self.kind)?,
      license_id: self.license_id,
      specialty: self.specialty,
      accepting_patients: self.accepting_patients,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `links` row.
pub struct RawLink {
  pub link_id:           String,
  pub professional_id:   String,
  pub patient_id:        String,
  pub invite_code:       String,
  pub status:            String,
  pub consent_granted:   bool,
  pub full_history:      bool,
  pub emotions:          bool,
  pub cycles:            bool,
  pub rituals:           bool,
  pub invited_at:        String,
  pub accepted_at:       Option<String>,
  pub consented_at:      Option<String>,
  pub revoked_at:        Option<String>,
  pub revocation_reason: Option<String>,
  pub notes:             Option<String>,
}

impl RawLink {
  pub fn into_link(self) -> Result<Link> {
    Ok(Link {
      link_id: decode_uuid(&self.link_id)?,
      professional_id: decode_uuid(&self.professional_id)?,
      patient_id: decode_uuid(&self.patient_id)?,
      invite_code: InviteCode::from_stored(self.invite_code),
      status: decode_status(&self.status)?,
      consent_granted: self.consent_granted,
      permissions: Permissions {
        full_history: self.full_history,
        emotions:     self.emotions,
        cycles:       self.cycles,
        rituals:      self.rituals,
      },
      invited_at: decode_dt(&self.invited_at)?,
      accepted_at: decode_dt_opt(self.accepted_at.as_deref())?,
      consented_at: decode_dt_opt(self.consented_at.as_deref())?,
      revoked_at: decode_dt_opt(self.revoked_at.as_deref())?,
      revocation_reason: self.revocation_reason,
      notes: self.notes,
    })
  }
}

/// Raw strings read directly from a `consent_records` row.
pub struct RawConsentRecord {
  pub record_id:   String,
  pub link_id:     String,
  pub action:      String,
  pub recorded_at: String,
  pub permissions: String,
  pub reason:      Option<String>,
  pub origin:      Option<String>,
}

impl RawConsentRecord {
  pub fn into_record(self) -> Result<ConsentRecord> {
    Ok(ConsentRecord {
      record_id: decode_uuid(&self.record_id)?,
      link_id: decode_uuid(&self.link_id)?,
      action: decode_action(&self.action)?,
      recorded_at: decode_dt(&self.recorded_at)?,
      permissions: decode_permissions(&self.permissions)?,
      reason: self.reason,
      origin: self.origin,
    })
  }
}

/// Raw strings read directly from a `journal_entries` row.
pub struct RawJournalEntry {
  pub entry_id:   String,
  pub patient_id: String,
  pub cycle:      String,
  pub emotion:    String,
  pub content:    String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawJournalEntry {
  pub fn into_entry(self) -> Result<JournalEntry> {
    Ok(JournalEntry {
      entry_id: decode_uuid(&self.entry_id)?,
      patient_id: decode_uuid(&self.patient_id)?,
      cycle: decode_cycle(&self.cycle)?,
      emotion: self.emotion,
      content: self.content,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
