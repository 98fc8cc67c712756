//! JSON REST API for the CÁRIS consent core.
//!
//! Exposes an axum [`Router`] backed by any
//! [`caris_core::store::ConsentStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility; operations that need an acting
//! identity take it explicitly in the request body rather than reading
//! ambient session state.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", caris_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod journal;
pub mod links;
pub mod principals;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use caris_core::{error::DomainError, store::ConsentStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ConsentStore + Clone + Send + Sync + 'static,
  S::Error: DomainError + std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Principals
    .route("/patients", post(principals::create_patient::<S>))
    .route("/patients/{id}", get(principals::get_patient::<S>))
    .route("/professionals", post(principals::create_professional::<S>))
    .route("/professionals/{id}", get(principals::get_professional::<S>))
    .route(
      "/professionals/{id}/patients",
      get(principals::list_patients::<S>),
    )
    // Links and the invitation protocol
    .route("/links", post(links::create::<S>))
    .route("/links/{id}", get(links::get_one::<S>))
    .route("/links/by-code/{code}", get(links::by_code::<S>))
    .route("/links/{id}/accept", post(links::accept::<S>))
    .route("/links/{id}/revoke", post(links::revoke::<S>))
    .route("/links/{id}/reactivate", post(links::reactivate::<S>))
    .route("/links/{id}/reissue", post(links::reissue::<S>))
    .route("/links/{id}/permissions", put(links::permissions::<S>))
    .route("/links/{id}/consents", get(links::consents::<S>))
    .route("/patients/{id}/links", get(links::for_patient::<S>))
    // Journal
    .route(
      "/patients/{id}/journal",
      get(journal::list::<S>).post(journal::create::<S>),
    )
    .route("/patients/{id}/journal/stats", get(journal::stats::<S>))
    .route(
      "/patients/{patient_id}/journal/as/{professional_id}",
      get(journal::professional_view::<S>),
    )
    .route("/journal/{id}", put(journal::update::<S>))
    .with_state(store)
}
