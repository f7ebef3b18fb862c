//! The account migration — run at account creation and at every log-in.
//!
//! Older accounts predate some top-level fields, so each step is a presence
//! check followed by a conditional default write. Steps are independent and
//! individually idempotent: re-running the migration after it has completed
//! touches nothing.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Error,
  acl::Group,
  schema::{NewProfile, NewRoot},
  store::{GuildStore, RootList},
};

/// `date_of_birth` assigned to roots the migration creates. Only applies
/// when the root itself was absent; existing roots keep their value.
pub fn default_date_of_birth() -> NaiveDate {
  NaiveDate::from_ymd_opt(1990, 1, 1).expect("hardcoded date is valid")
}

/// Which migration steps fired. A second run on the same account reports
/// all-false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
  pub created_root:            bool,
  pub initialized_invitations: bool,
  pub initialized_requests:    bool,
  pub created_profile:         bool,
}

impl MigrationReport {
  pub fn is_noop(&self) -> bool { *self == Self::default() }
}

/// Ensure the account's top-level documents exist, backfilling any that are
/// absent with defaults. Present values are never overwritten.
pub async fn migrate_account<S: GuildStore>(
  store: &S,
  account_id: Uuid,
) -> Result<MigrationReport, S::Error> {
  let account = store
    .get_account(account_id)
    .await?
    .ok_or(Error::AccountNotFound(account_id))?;

  let mut report = MigrationReport::default();

  if account.root.is_none() {
    store
      .attach_root(account_id, NewRoot {
        date_of_birth:  default_date_of_birth(),
        organizations:  Vec::new(),
        my_invitations: Vec::new(),
        my_requests:    Vec::new(),
      })
      .await?;
    report.created_root = true;
  }

  // Roots written under the earlier schema lack the two newer lists.
  // A root created above already has both, so these stay no-ops for it.
  if let Some(root) = store.get_root(account_id).await? {
    if root.my_invitations.is_none() {
      store
        .init_root_list(account_id, RootList::MyInvitations)
        .await?;
      report.initialized_invitations = true;
    }

    if root.my_requests.is_none() {
      store.init_root_list(account_id, RootList::MyRequests).await?;
      report.initialized_requests = true;
    }
  }

  if account.profile.is_none() {
    store
      .attach_profile(
        account_id,
        NewProfile::default(),
        Group::everyone_reader(),
      )
      .await?;
    report.created_profile = true;
  }

  Ok(report)
}
