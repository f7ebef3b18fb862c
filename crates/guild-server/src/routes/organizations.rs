//! Handlers for organization endpoints.
//!
//! Organizations live in the account root, which is private: only the
//! account itself may list or extend them.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use guild_core::{schema::Organization, store::GuildStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::{ApiError, store_err},
  principal::require_account,
};

fn require_self(headers: &HeaderMap, id: Uuid) -> Result<Uuid, ApiError> {
  let who = require_account(headers)?;
  if who != id {
    return Err(ApiError::Forbidden(
      "only the account itself may access its organizations".into(),
    ));
  }
  Ok(who)
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /accounts/:id/organizations` — body: `{"name":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require_self(&headers, id)?;

  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("organization name is empty".into()));
  }

  if store.get_account(id).await.map_err(store_err)?.is_none() {
    return Err(ApiError::NotFound(format!("account {id} not found")));
  }
  if store.get_root(id).await.map_err(store_err)?.is_none() {
    return Err(ApiError::Conflict(format!(
      "account {id} has not been migrated"
    )));
  }

  let organization = store
    .create_organization(id, body.name)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(organization)))
}

/// `GET /accounts/:id/organizations`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Vec<Organization>>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require_self(&headers, id)?;
  let organizations = store.list_organizations(id).await.map_err(store_err)?;
  Ok(Json(organizations))
}

#[derive(Debug, Deserialize)]
pub struct ActivityBody {
  pub name: String,
}

/// `POST /organizations/:id/activities` — the caller must own the
/// organization (it must appear in their root list).
pub async fn add_activity<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<ActivityBody>,
) -> Result<Json<Organization>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = require_account(&headers)?;

  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("activity name is empty".into()));
  }

  if store.get_organization(id).await.map_err(store_err)?.is_none() {
    return Err(ApiError::NotFound(format!("organization {id} not found")));
  }

  let owns = store
    .get_root(who)
    .await
    .map_err(store_err)?
    .is_some_and(|root| root.organizations.contains(&id));
  if !owns {
    return Err(ApiError::Forbidden(
      "organization does not belong to the acting account".into(),
    ));
  }

  let organization =
    store.add_activity(id, body.name).await.map_err(store_err)?;
  Ok(Json(organization))
}
