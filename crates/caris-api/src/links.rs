//! Handlers for `/links` — the invitation protocol and consent lifecycle.
//!
//! Consent-affecting requests carry an optional `origin` (requester network
//! origin) that is stored on the ledger record for audit.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use caris_core::{
  consent::ConsentRecord,
  error::DomainError,
  link::{Link, Permissions},
  principal::Principal,
  store::ConsentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub professional_id: Uuid,
  pub patient_id:      Uuid,
}

/// `POST /links` — professional invites a patient.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .create_invitation(body.professional_id, body.patient_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(link)))
}

// ─── Lookups ──────────────────────────────────────────────────────────────────

/// `GET /links/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Link>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .get_link(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("link {id} not found")))?;
  Ok(Json(link))
}

/// `GET /links/by-code/:code` — case-insensitive; the patient pastes the
/// code they were given.
pub async fn by_code<S>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<Link>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .find_link_by_code(&code)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("no link with code {code}")))?;
  Ok(Json(link))
}

/// `GET /patients/:id/links` — every link a patient holds, any status.
pub async fn for_patient<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Link>>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let links = store
    .list_links_for_patient(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(links))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
  /// `false` grants partial consent: full history and rituals stay hidden.
  pub full_consent: bool,
  #[serde(default)]
  pub origin:       Option<String>,
}

/// `POST /links/:id/accept`
pub async fn accept<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AcceptBody>,
) -> Result<Json<Link>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .accept_invitation(id, body.full_consent, body.origin)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(link))
}

#[derive(Debug, Deserialize)]
pub struct RevokeBody {
  /// Who is withdrawing: the patient owning the consent, or the
  /// professional renouncing access.
  pub initiator: Principal,
  #[serde(default)]
  pub reason:    Option<String>,
  #[serde(default)]
  pub origin:    Option<String>,
}

/// `POST /links/:id/revoke`
pub async fn revoke<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RevokeBody>,
) -> Result<Json<Link>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .revoke_link(id, body.initiator, body.reason, body.origin)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(link))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReactivateBody {
  #[serde(default)]
  pub origin: Option<String>,
}

/// `POST /links/:id/reactivate` — patient restores a revoked consent
/// without a new invitation.
pub async fn reactivate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReactivateBody>,
) -> Result<Json<Link>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .reactivate_link(id, body.origin)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(link))
}

/// `POST /links/:id/reissue` — professional re-invites after revocation;
/// the code is regenerated in place.
pub async fn reissue<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Link>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .reissue_invitation(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(link))
}

#[derive(Debug, Deserialize)]
pub struct PermissionsBody {
  pub permissions: Permissions,
  #[serde(default)]
  pub origin:      Option<String>,
}

/// `PUT /links/:id/permissions` — replace the capability flags on an
/// active link; appends a `modified` ledger record.
pub async fn permissions<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PermissionsBody>,
) -> Result<Json<Link>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let link = store
    .update_permissions(id, body.permissions, body.origin)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(link))
}

// ─── Ledger ───────────────────────────────────────────────────────────────────

/// `GET /links/:id/consents` — full audit trail, oldest first.
pub async fn consents<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ConsentRecord>>, ApiError>
where
  S: ConsentStore,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  let records = store
    .consent_history(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}
