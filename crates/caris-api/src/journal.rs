//! Handlers for journal entries and the gated professional view.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/patients/:id/journal` | Owner writes an entry |
//! | `GET`  | `/patients/:id/journal` | Owner reads everything, newest first |
//! | `GET`  | `/patients/:id/journal/stats` | Emotion frequency counts |
//! | `GET`  | `/patients/:pid/journal/as/:prof_id` | Gated, masked view |
//! | `PUT`  | `/journal/:id` | Rewrite tags and content |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use caris_core::{
  error::DomainError,
  gate::JournalEntryView,
  journal::{Cycle, CycleCount, EmotionCount, JournalEntry, NewJournalEntry},
  store::ConsentStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct EntryBody {
  pub cycle:   Cycle,
  pub emotion: String,
  pub content: String,
}

/// `POST /patients/:id/journal`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EntryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .add_entry(NewJournalEntry {
      patient_id: id,
      cycle:      body.cycle,
      emotion:    body.emotion,
      content:    body.content,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /patients/:id/journal` — the owner's unmasked view.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<JournalEntry>>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let entries = store
    .entries_for_patient(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entries))
}

/// Dashboard aggregations: emotion frequencies and per-cycle entry counts.
#[derive(Debug, Serialize)]
pub struct JournalStats {
  pub emotions: Vec<EmotionCount>,
  pub cycles:   Vec<CycleCount>,
}

/// `GET /patients/:id/journal/stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<JournalStats>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let emotions = store
    .emotion_stats(id)
    .await
    .map_err(ApiError::from_store)?;
  let cycles = store
    .cycle_stats(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(JournalStats { emotions, cycles }))
}

/// `GET /patients/:patient_id/journal/as/:professional_id`
///
/// Evaluates the consent gate at request time. 403 when no active,
/// consented link exists; otherwise entries come back window-limited and
/// field-masked per the link's permissions.
pub async fn professional_view<S>(
  State(store): State<Arc<S>>,
  Path((patient_id, professional_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<JournalEntryView>>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let entries = store
    .entries_for_professional(professional_id, patient_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entries))
}

/// `PUT /journal/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EntryBody>,
) -> Result<Json<JournalEntry>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .update_entry(id, body.cycle, body.emotion, body.content)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(entry))
}
