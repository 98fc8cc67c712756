//! Journal domain — diary entries and the four CÁRIS emotional cycles.
//!
//! Entries are owned by exactly one patient and tagged with exactly one
//! cycle and one free-text emotion label. Professionals never touch these
//! types directly; they see [`crate::gate::JournalEntryView`] instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Cycle ───────────────────────────────────────────────────────────────────

/// One of the four emotional cycles an entry is written under.
///
/// The set is closed; the slug doubles as the database discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
  /// Generating ideas, starting projects, manifesting creativity.
  Create,
  /// Nurturing relationships, caring for oneself, maintaining what exists.
  Nurture,
  /// Expansion, learning, personal development.
  Grow,
  /// Introspection, emotional healing, inner renewal.
  Heal,
}

impl Cycle {
  pub const ALL: [Cycle; 4] =
    [Cycle::Create, Cycle::Nurture, Cycle::Grow, Cycle::Heal];

  /// Stable identifier stored in the `cycle` column.
  pub fn slug(&self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Nurture => "nurture",
      Self::Grow => "grow",
      Self::Heal => "heal",
    }
  }

  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Create => "Create",
      Self::Nurture => "Nurture",
      Self::Grow => "Grow",
      Self::Heal => "Heal",
    }
  }

  /// One-line description shown alongside the cycle name.
  pub fn description(&self) -> &'static str {
    match self {
      Self::Create => "Generating ideas, starting projects, manifesting creativity",
      Self::Nurture => "Nurturing relationships, caring for oneself, maintaining what exists",
      Self::Grow => "Expansion, learning, personal development",
      Self::Heal => "Introspection, emotional healing, inner renewal",
    }
  }

  /// Hex colour used by dashboard charts.
  pub fn color_code(&self) -> &'static str {
    match self {
      Self::Create => "#D4AF37",
      Self::Nurture => "#00A86B",
      Self::Grow => "#9370DB",
      Self::Heal => "#4682B4",
    }
  }

  pub fn from_slug(slug: &str) -> Option<Self> {
    Self::ALL.iter().copied().find(|c| c.slug() == slug)
  }
}

impl std::fmt::Display for Cycle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.display_name())
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// A diary entry as its owner sees it — nothing masked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
  pub entry_id:   Uuid,
  pub patient_id: Uuid,
  pub cycle:      Cycle,
  /// Free-text emotion label, e.g. "Gratitude".
  pub emotion:    String,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ConsentStore::add_entry`].
/// Both timestamps are set by the store; they are not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
  pub patient_id: Uuid,
  pub cycle:      Cycle,
  pub emotion:    String,
  pub content:    String,
}

/// One row of a patient's emotion frequency table, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
  pub emotion: String,
  pub count:   u64,
}

/// Entry count for one cycle of a patient's journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCount {
  pub cycle: Cycle,
  pub count: u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slug_roundtrip() {
    for cycle in Cycle::ALL {
      assert_eq!(Cycle::from_slug(cycle.slug()), Some(cycle));
    }
    assert_eq!(Cycle::from_slug("unknown"), None);
  }
}
