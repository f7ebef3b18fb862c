//! Handlers for `/accounts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/accounts` | Creates an account and runs the migration |
//! | `POST` | `/accounts/:id/login` | Session-start hook; re-runs the migration |
//! | `GET`  | `/accounts/:id` | Root and age are visible to the account itself only |
//! | `GET`  | `/accounts/:id/profile` | Readable per the profile's group (everyone) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use guild_core::{
  acl::Principal,
  age::user_age_today,
  migration::migrate_account,
  schema::{Account, AccountRoot, Profile},
  store::GuildStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  error::{ApiError, store_err},
  principal::acting_principal,
};

/// An account with its top-level documents resolved. `root` and `age` are
/// populated only when the caller is the account itself.
#[derive(Debug, Serialize)]
pub struct AccountView {
  pub account: Account,
  pub root:    Option<AccountRoot>,
  pub profile: Option<Profile>,
  pub age:     Option<i32>,
}

async fn view<S>(
  store: &S,
  account: Account,
  who: Principal,
) -> Result<AccountView, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let is_self = who == Principal::Account(account.account_id);

  let root = if is_self {
    store.get_root(account.account_id).await.map_err(store_err)?
  } else {
    None
  };
  let profile = store
    .get_profile(account.account_id)
    .await
    .map_err(store_err)?;
  let age = user_age_today(root.as_ref());

  Ok(AccountView { account, root, profile, age })
}

/// `POST /accounts` — create an account and run the migration on it, as the
/// framework would on sign-up.
pub async fn create<S>(
  State(store): State<Arc<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let account = store.create_account().await.map_err(store_err)?;
  let report = migrate_account(store.as_ref(), account.account_id)
    .await
    .map_err(store_err)?;
  tracing::info!(account = %account.account_id, ?report, "account created");

  let account = store
    .get_account(account.account_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound("account vanished".into()))?;

  // The creator is the account; return the self view.
  let who = Principal::Account(account.account_id);
  Ok((StatusCode::CREATED, Json(view(store.as_ref(), account, who).await?)))
}

/// `POST /accounts/:id/login` — run the migration at session start and
/// return the self view.
pub async fn login<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if store.get_account(id).await.map_err(store_err)?.is_none() {
    return Err(ApiError::NotFound(format!("account {id} not found")));
  }

  let report = migrate_account(store.as_ref(), id)
    .await
    .map_err(store_err)?;
  if !report.is_noop() {
    tracing::info!(account = %id, ?report, "backfilled account fields at login");
  }

  let account = store
    .get_account(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;

  Ok(Json(view(store.as_ref(), account, Principal::Account(id)).await?))
}

/// `GET /accounts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<AccountView>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = acting_principal(&headers)?;
  let account = store
    .get_account(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;

  Ok(Json(view(store.as_ref(), account, who).await?))
}

/// `GET /accounts/:id/profile` — the public per-account document, gated by
/// its group (which the migration creates as `everyone: reader`).
pub async fn get_profile<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<Profile>, ApiError>
where
  S: GuildStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let who = acting_principal(&headers)?;

  let profile = store
    .get_profile(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} has no profile")))?;

  let group = store
    .get_group(profile.group_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("group {} not found", profile.group_id))
    })?;

  if !group.can_read(who) {
    return Err(ApiError::Forbidden("profile is not readable".into()));
  }

  Ok(Json(profile))
}
