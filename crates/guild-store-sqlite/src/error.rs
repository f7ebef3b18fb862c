//! Error type for `guild-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] guild_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("account not found: {0}")]
  AccountNotFound(uuid::Uuid),

  #[error("organization not found: {0}")]
  OrganizationNotFound(uuid::Uuid),

  #[error("invitation not found: {0}")]
  InvitationNotFound(uuid::Uuid),

  #[error("join request not found: {0}")]
  RequestNotFound(uuid::Uuid),

  #[error("group not found: {0}")]
  GroupNotFound(uuid::Uuid),

  #[error("account {0} already has a root document")]
  RootAlreadyAttached(uuid::Uuid),

  #[error("account {0} already has a profile")]
  ProfileAlreadyAttached(uuid::Uuid),

  #[error("account {0} has not been migrated")]
  RootNotMigrated(uuid::Uuid),

  #[error("invitation {0} is revoked")]
  InvitationRevoked(uuid::Uuid),

  #[error("invitation {0} is already revoked")]
  AlreadyRevoked(uuid::Uuid),

  #[error("{0} is already archived")]
  AlreadyArchived(uuid::Uuid),

  #[error("join request {0} is already decided")]
  AlreadyDecided(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
