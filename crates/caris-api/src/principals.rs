//! Handlers for `/patients` and `/professionals` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/patients` | Body: `{"display_name":..,"email":..}` |
//! | `GET`  | `/patients/:id` | 404 if not found |
//! | `POST` | `/professionals` | Body includes `kind`, optional `license_id` |
//! | `GET`  | `/professionals/:id` | 404 if not found |
//! | `GET`  | `/professionals/:id/patients` | Active, consented links only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use caris_core::{
  error::DomainError,
  principal::{NewPatient, NewProfessional, Patient, Professional},
  store::ConsentStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /patients`
pub async fn create_patient<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPatient>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let patient = store
    .add_patient(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(patient)))
}

/// `GET /patients/:id`
pub async fn get_patient<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let patient = store
    .get_patient(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("patient {id} not found")))?;
  Ok(Json(patient))
}

/// `POST /professionals`
pub async fn create_professional<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewProfessional>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let professional = store
    .add_professional(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(professional)))
}

/// `GET /professionals/:id`
pub async fn get_professional<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Professional>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let professional = store
    .get_professional(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("professional {id} not found"))
    })?;
  Ok(Json(professional))
}

/// `GET /professionals/:id/patients` — patients the professional currently
/// has active, consented access to.
pub async fn list_patients<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Patient>>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let patients = store
    .list_patients_for_professional(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(patients))
}
