//! Principals — the two independent identity kinds of CÁRIS.
//!
//! Patients and professionals are registered through external flows; this
//! crate only consumes their identities. There is no shared base type: the
//! two kinds differ in shape, and code that needs "either" discriminates on
//! the [`Principal`] tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A journal owner. Holds zero or more links on the patient side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
  pub patient_id:   Uuid,
  pub display_name: String,
  /// Unique across patients.
  pub email:        String,
  pub created_at:   DateTime<Utc>,
}

/// The registered occupation of a health professional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalKind {
  Psychologist,
  Psychotherapist,
  Coach,
  Psychiatrist,
  OccupationalTherapist,
  Other,
}

/// A registered health professional. Holds zero or more links on the
/// professional side; sees patient data only through the access gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
  pub professional_id: Uuid,
  pub display_name:    String,
  /// Unique across professionals.
  pub email:           String,
  pub kind:            ProfessionalKind,
  /// Professional registry number (e.g. CRP for psychologists).
  pub license_id:      Option<String>,
  pub specialty:       Option<String>,
  pub accepting_patients: bool,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::ConsentStore::add_patient`].
/// The id and creation timestamp are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
  pub display_name: String,
  pub email:        String,
}

/// Input to [`crate::store::ConsentStore::add_professional`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfessional {
  pub display_name: String,
  pub email:        String,
  pub kind:         ProfessionalKind,
  #[serde(default)]
  pub license_id:   Option<String>,
  #[serde(default)]
  pub specialty:    Option<String>,
}

/// A request-scoped identity, supplied explicitly by the caller of each
/// operation — never fetched from ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Principal {
  Patient(Uuid),
  Professional(Uuid),
}

impl Principal {
  pub fn id(&self) -> Uuid {
    match self {
      Self::Patient(id) | Self::Professional(id) => *id,
    }
  }

  pub fn is_patient(&self) -> bool { matches!(self, Self::Patient(_)) }
}
