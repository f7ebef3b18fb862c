//! Error types for `guild-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("organization not found: {0}")]
  OrganizationNotFound(Uuid),

  #[error("invitation not found: {0}")]
  InvitationNotFound(Uuid),

  #[error("join request not found: {0}")]
  RequestNotFound(Uuid),

  #[error("group not found: {0}")]
  GroupNotFound(Uuid),

  #[error("account {0} already has a root document")]
  RootAlreadyAttached(Uuid),

  #[error("account {0} already has a profile")]
  ProfileAlreadyAttached(Uuid),

  /// Raised when a write needs a root list that migration has not
  /// initialised yet.
  #[error("account {0} has not been migrated")]
  RootNotMigrated(Uuid),

  #[error("invitation {0} is revoked")]
  InvitationRevoked(Uuid),

  #[error("invitation {0} is already revoked")]
  AlreadyRevoked(Uuid),

  #[error("{0} is already archived")]
  AlreadyArchived(Uuid),

  #[error("join request {0} is already decided")]
  AlreadyDecided(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
