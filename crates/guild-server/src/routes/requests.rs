//! Handlers for join-request endpoints.
//!
//! Deciding and archiving a request is an admin action on the invitation it
//! was filed against, so the invitation's group is consulted each time.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::HeaderMap,
};
use guild_core::{
  schema::JoinRequest,
  store::{Decision, GuildStore},
};
use uuid::Uuid;

use crate::{
  error::{ApiError, store_err},
  principal::{acting_principal, require_account},
};

use super::ListParams;

/// Load a request and authorise the caller as admin of its invitation.
async fn load_for_admin<S>(
  store: &S,
  request_id: Uuid,
  headers: &HeaderMap,
) -> Result<JoinRequest, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = acting_principal(headers)?;

  let request = store
    .get_request(request_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("join request {request_id} not found"))
    })?;

  let invitation = store
    .get_invitation(request.invitation_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "invitation {} not found",
        request.invitation_id
      ))
    })?;

  let group = store
    .get_group(invitation.group_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("group {} not found", invitation.group_id))
    })?;

  if !group.can_admin(who) {
    return Err(ApiError::Forbidden(
      "only the invitation creator may administer its requests".into(),
    ));
  }

  Ok(request)
}

async fn decide<S>(
  store: &S,
  request_id: Uuid,
  headers: &HeaderMap,
  decision: Decision,
) -> Result<Json<JoinRequest>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let request = load_for_admin(store, request_id, headers).await?;

  if !request.status.is_pending() {
    return Err(ApiError::Conflict(format!(
      "join request {request_id} is already decided"
    )));
  }

  let request = store
    .decide_request(request_id, decision)
    .await
    .map_err(store_err)?;
  Ok(Json(request))
}

/// `POST /requests/:id/approve`
pub async fn approve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<JoinRequest>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  decide(store.as_ref(), id, &headers, Decision::Approved).await
}

/// `POST /requests/:id/reject`
pub async fn reject<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<JoinRequest>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  decide(store.as_ref(), id, &headers, Decision::Rejected).await
}

/// `POST /requests/:id/archive`
pub async fn archive<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<JoinRequest>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let request = load_for_admin(store.as_ref(), id, &headers).await?;

  if request.archived_at.is_some() {
    return Err(ApiError::Conflict(format!(
      "join request {id} is already archived"
    )));
  }

  let request = store.archive_request(id).await.map_err(store_err)?;
  Ok(Json(request))
}

/// `GET /accounts/:id/requests[?include_archived=true]` — the requests the
/// account has filed; private to the account.
pub async fn list_mine<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
  headers: HeaderMap,
) -> Result<Json<Vec<JoinRequest>>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = require_account(&headers)?;
  if who != id {
    return Err(ApiError::Forbidden(
      "only the account itself may list its requests".into(),
    ));
  }

  let requests = store
    .list_my_requests(id, params.include_archived)
    .await
    .map_err(store_err)?;
  Ok(Json(requests))
}
