//! The access gate — pure decisions over a link, no mutation, no caching.
//!
//! Every journal read performed on behalf of a professional must consult
//! [`can_view`] at read time: consent can be revoked at any moment and the
//! very next read must reflect it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  journal::{Cycle, JournalEntry},
  link::{Link, LinkStatus},
};

/// Entries visible without the `FullHistory` capability are limited to this
/// trailing window.
pub const RECENT_WINDOW_DAYS: i64 = 14;

/// A requested data category, one per capability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
  FullHistory,
  Emotions,
  Cycles,
  Rituals,
}

/// Allow/deny for one professional read of one data category.
///
/// Denies when the link is absent, not active, not consented, or the
/// specific capability flag is off.
pub fn can_view(link: Option<&Link>, category: DataCategory) -> bool {
  let Some(link) = link else { return false };
  if link.status != LinkStatus::Active || !link.consent_granted {
    return false;
  }
  match category {
    DataCategory::FullHistory => link.permissions.full_history,
    DataCategory::Emotions => link.permissions.emotions,
    DataCategory::Cycles => link.permissions.cycles,
    DataCategory::Rituals => link.permissions.rituals,
  }
}

// ─── Journal filtering ───────────────────────────────────────────────────────

/// The filtering contract for one professional journal query, derived from
/// the link at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalScope {
  /// `Some(cutoff)` when history depth is limited: only entries created at
  /// or after the cutoff are returned.
  pub not_before:    Option<DateTime<Utc>>,
  /// Whether the emotion field is included in per-entry output.
  pub show_emotions: bool,
  /// Whether the cycle field is included in per-entry output.
  pub show_cycles:   bool,
}

impl JournalScope {
  /// Derive the scope for a professional query, or `None` when the gate
  /// denies access outright (no link, inactive, or consent withdrawn).
  pub fn for_link(link: Option<&Link>, now: DateTime<Utc>) -> Option<Self> {
    let link = link?;
    if link.status != LinkStatus::Active || !link.consent_granted {
      return None;
    }
    let not_before = if link.permissions.full_history {
      None
    } else {
      Some(now - Duration::days(RECENT_WINDOW_DAYS))
    };
    Some(Self {
      not_before,
      show_emotions: link.permissions.emotions,
      show_cycles: link.permissions.cycles,
    })
  }

  /// Apply the scope to one entry. Returns `None` when the entry falls
  /// outside the visible window; otherwise a view with denied fields
  /// omitted (field omission, not row omission).
  pub fn project(&self, entry: JournalEntry) -> Option<JournalEntryView> {
    if let Some(cutoff) = self.not_before
      && entry.created_at < cutoff
    {
      return None;
    }
    Some(JournalEntryView {
      entry_id:   entry.entry_id,
      patient_id: entry.patient_id,
      cycle:      self.show_cycles.then_some(entry.cycle),
      emotion:    self.show_emotions.then_some(entry.emotion),
      content:    entry.content,
      created_at: entry.created_at,
      updated_at: entry.updated_at,
    })
  }
}

/// A diary entry as a linked professional sees it. Fields the patient has
/// not consented to share are absent rather than blanked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryView {
  pub entry_id:   Uuid,
  pub patient_id: Uuid,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cycle:      Option<Cycle>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub emotion:    Option<String>,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::link::InviteCode;

  fn active_link() -> Link {
    let mut l = Link::invite(
      Uuid::new_v4(),
      Uuid::new_v4(),
      InviteCode::from_stored("GATE0001"),
      Utc::now(),
    );
    l.accept(true, Utc::now()).unwrap();
    l
  }

  fn entry(patient_id: Uuid, age_days: i64) -> JournalEntry {
    let at = Utc::now() - Duration::days(age_days);
    JournalEntry {
      entry_id: Uuid::new_v4(),
      patient_id,
      cycle: Cycle::Heal,
      emotion: "Serenity".into(),
      content: "quiet evening".into(),
      created_at: at,
      updated_at: at,
    }
  }

  #[test]
  fn no_link_denies_everything() {
    for cat in [
      DataCategory::FullHistory,
      DataCategory::Emotions,
      DataCategory::Cycles,
      DataCategory::Rituals,
    ] {
      assert!(!can_view(None, cat));
    }
  }

  #[test]
  fn revoked_link_denies_immediately() {
    let mut l = active_link();
    assert!(can_view(Some(&l), DataCategory::Emotions));
    l.revoke(None, Utc::now()).unwrap();
    assert!(!can_view(Some(&l), DataCategory::Emotions));
    assert!(!can_view(Some(&l), DataCategory::Cycles));
    assert!(JournalScope::for_link(Some(&l), Utc::now()).is_none());
  }

  #[test]
  fn rituals_denied_by_default() {
    let l = active_link();
    assert!(can_view(Some(&l), DataCategory::FullHistory));
    assert!(!can_view(Some(&l), DataCategory::Rituals));
  }

  #[test]
  fn limited_history_trims_old_entries() {
    let mut l = active_link();
    l.permissions.full_history = false;
    let scope = JournalScope::for_link(Some(&l), Utc::now()).unwrap();

    let pid = l.patient_id;
    assert!(scope.project(entry(pid, 3)).is_some());
    assert!(scope.project(entry(pid, 15)).is_none());
  }

  #[test]
  fn denied_fields_are_omitted_not_rows() {
    let mut l = active_link();
    l.permissions.emotions = false;
    l.permissions.cycles = false;
    let scope = JournalScope::for_link(Some(&l), Utc::now()).unwrap();

    let view = scope.project(entry(l.patient_id, 1)).unwrap();
    assert!(view.emotion.is_none());
    assert!(view.cycle.is_none());
    assert_eq!(view.content, "quiet evening");
  }
}
