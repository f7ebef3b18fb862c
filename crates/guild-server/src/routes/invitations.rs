//! Handlers for invitation endpoints.
//!
//! An invitation's group is the enforcement point: everyone may append a
//! join request (write-only), only the creator reads or administers them.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use guild_core::{
  acl::{Group, Principal},
  schema::{Invitation, JoinRequest},
  store::GuildStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::{ApiError, store_err},
  principal::{acting_principal, require_account},
};

use super::ListParams;

async fn load_invitation<S>(
  store: &S,
  id: Uuid,
) -> Result<(Invitation, Group), ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let invitation = store
    .get_invitation(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("invitation {id} not found")))?;

  let group = store
    .get_group(invitation.group_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("group {} not found", invitation.group_id))
    })?;

  Ok((invitation, group))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub organization_id: Uuid,
}

/// `POST /accounts/:id/invitations` — body: `{"organization_id":"..."}`
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
  let who = require_account(&headers)?;
  if who != id {
    return Err(ApiError::Forbidden(
      "only the account itself may create its invitations".into(),
    ));
  }

  if store
    .get_organization(body.organization_id)
    .await
    .map_err(store_err)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!(
      "organization {} not found",
      body.organization_id
    )));
  }
  if store.get_root(id).await.map_err(store_err)?.is_none() {
    return Err(ApiError::Conflict(format!(
      "account {id} has not been migrated"
    )));
  }

  let invitation = store
    .create_invitation(id, body.organization_id)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(invitation)))
}

/// `GET /accounts/:id/invitations[?include_archived=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
  headers: HeaderMap,
) -> Result<Json<Vec<Invitation>>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = require_account(&headers)?;
  if who != id {
    return Err(ApiError::Forbidden(
      "only the account itself may list its invitations".into(),
    ));
  }

  let invitations = store
    .list_invitations(id, params.include_archived)
    .await
    .map_err(store_err)?;
  Ok(Json(invitations))
}

/// `POST /invitations/:id/revoke` — creator only; kills the link.
pub async fn revoke<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Invitation>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = acting_principal(&headers)?;
  let (invitation, group) = load_invitation(store.as_ref(), id).await?;

  if !group.can_admin(who) {
    return Err(ApiError::Forbidden(
      "only the invitation creator may revoke it".into(),
    ));
  }
  if invitation.is_revoked() {
    return Err(ApiError::Conflict(format!(
      "invitation {id} is already revoked"
    )));
  }

  let invitation = store.revoke_invitation(id).await.map_err(store_err)?;
  Ok(Json(invitation))
}

/// `POST /invitations/:id/archive` — creator only; hides it from views.
pub async fn archive<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Invitation>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = acting_principal(&headers)?;
  let (invitation, group) = load_invitation(store.as_ref(), id).await?;

  if !group.can_admin(who) {
    return Err(ApiError::Forbidden(
      "only the invitation creator may archive it".into(),
    ));
  }
  if invitation.is_archived() {
    return Err(ApiError::Conflict(format!(
      "invitation {id} is already archived"
    )));
  }

  let invitation = store.archive_invitation(id).await.map_err(store_err)?;
  Ok(Json(invitation))
}

/// `POST /invitations/:id/requests` — file a join request. Anyone holding
/// the link may write; the requester must be a migrated account.
pub async fn submit_request<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let requester = require_account(&headers)?;
  let (invitation, group) = load_invitation(store.as_ref(), id).await?;

  if !group.can_write(Principal::Account(requester)) {
    return Err(ApiError::Forbidden(
      "caller may not write to this invitation".into(),
    ));
  }
  if invitation.is_revoked() {
    return Err(ApiError::Conflict(format!("invitation {id} is revoked")));
  }

  let migrated = store
    .get_root(requester)
    .await
    .map_err(store_err)?
    .is_some_and(|root| root.my_requests.is_some());
  if !migrated {
    return Err(ApiError::Conflict(format!(
      "account {requester} has not been migrated"
    )));
  }

  let request = store
    .submit_request(id, requester)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /invitations/:id/requests[?include_archived=true]` — creator only
/// (the everyone grant is write-only).
pub async fn list_requests<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
  headers: HeaderMap,
) -> Result<Json<Vec<JoinRequest>>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = acting_principal(&headers)?;
  let (_, group) = load_invitation(store.as_ref(), id).await?;

  if !group.can_read(who) {
    return Err(ApiError::Forbidden(
      "only the invitation creator may read its requests".into(),
    ));
  }

  let requests = store
    .list_requests(id, params.include_archived)
    .await
    .map_err(store_err)?;
  Ok(Json(requests))
}
