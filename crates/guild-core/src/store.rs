//! The `GuildStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `guild-store-sqlite`).
//! Higher layers (`guild-server`, the account migration) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  acl::Group,
  schema::{
    Account, AccountRoot, Invitation, JoinRequest, JoinStatus, NewProfile,
    NewRoot, Organization, Profile,
  },
};

// ─── Supporting types ────────────────────────────────────────────────────────

/// The two root lists that later schema versions added and the migration
/// backfills on older roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootList {
  MyInvitations,
  MyRequests,
}

/// The outcome of deciding a pending join request. Encoding the decision as
/// its own type keeps `pending -> pending` unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Approved,
  Rejected,
}

impl Decision {
  pub fn status(self) -> JoinStatus {
    match self {
      Self::Approved => JoinStatus::Approved,
      Self::Rejected => JoinStatus::Rejected,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Guild document store backend.
///
/// Writes that stamp a lifecycle timestamp (revoke, archive, decide) stamp
/// it at most once; a second stamp is an error, mirroring how the per-field
/// migration writes fire only when the field is absent.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GuildStore: Send + Sync {
  type Error: std::error::Error
    + From<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create and persist a bare account with neither root nor profile; the
  /// caller is expected to run the migration next.
  fn create_account(
    &self,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Retrieve an account by UUID. Returns `None` if not found.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  // ── Roots ─────────────────────────────────────────────────────────────

  /// The account's root document, or `None` when the account has none yet.
  fn get_root(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Option<AccountRoot>, Self::Error>> + Send + '_;

  /// Create a root document and point the account at it.
  ///
  /// Returns an error if the account already has a root: existing roots
  /// are never replaced or overwritten.
  fn attach_root(
    &self,
    account_id: Uuid,
    root: NewRoot,
  ) -> impl Future<Output = Result<AccountRoot, Self::Error>> + Send + '_;

  /// Initialise an absent root list to empty. Present lists — empty or
  /// not — are left untouched.
  fn init_root_list(
    &self,
    account_id: Uuid,
    list: RootList,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create a profile under `group` and point the account at it.
  ///
  /// Returns an error if the account already has a profile.
  fn attach_profile(
    &self,
    account_id: Uuid,
    profile: NewProfile,
    group: Group,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// The account's profile, or `None` when it has none yet.
  fn get_profile(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  fn get_group(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Create an organization and append it to the account's
  /// `root.organizations`. Requires a migrated account.
  fn create_organization(
    &self,
    account_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  fn get_organization(
    &self,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  /// The account's organizations, in root-list order.
  fn list_organizations(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + '_;

  /// Append an activity to an organization's list and return the updated
  /// organization.
  fn add_activity(
    &self,
    organization_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  // ── Invitations ───────────────────────────────────────────────────────

  /// Create an invitation for `organization_id`, owned by `account_id`,
  /// under a fresh [`Group::invitation_requests`] policy, and append it to
  /// the creator's `root.my_invitations`.
  fn create_invitation(
    &self,
    account_id: Uuid,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<Invitation, Self::Error>> + Send + '_;

  fn get_invitation(
    &self,
    invitation_id: Uuid,
  ) -> impl Future<Output = Result<Option<Invitation>, Self::Error>> + Send + '_;

  /// Invitations created by the account, oldest first. Archived ones are
  /// hidden unless `include_archived`.
  fn list_invitations(
    &self,
    account_id: Uuid,
    include_archived: bool,
  ) -> impl Future<Output = Result<Vec<Invitation>, Self::Error>> + Send + '_;

  /// Stamp `revoked_at`, blocking further join requests. Errors if already
  /// revoked.
  fn revoke_invitation(
    &self,
    invitation_id: Uuid,
  ) -> impl Future<Output = Result<Invitation, Self::Error>> + Send + '_;

  /// Stamp `archived_at`, hiding the invitation from default list views.
  /// Errors if already archived.
  fn archive_invitation(
    &self,
    invitation_id: Uuid,
  ) -> impl Future<Output = Result<Invitation, Self::Error>> + Send + '_;

  // ── Join requests ─────────────────────────────────────────────────────

  /// File a join request by `account_id` against `invitation_id`,
  /// appending it to the invitation's request list and the requester's
  /// `root.my_requests`.
  ///
  /// Errors if the invitation is revoked or the requester is unmigrated.
  fn submit_request(
    &self,
    invitation_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<JoinRequest, Self::Error>> + Send + '_;

  fn get_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<JoinRequest>, Self::Error>> + Send + '_;

  /// Requests filed against an invitation, oldest first.
  fn list_requests(
    &self,
    invitation_id: Uuid,
    include_archived: bool,
  ) -> impl Future<Output = Result<Vec<JoinRequest>, Self::Error>> + Send + '_;

  /// Requests filed by an account, oldest first.
  fn list_my_requests(
    &self,
    account_id: Uuid,
    include_archived: bool,
  ) -> impl Future<Output = Result<Vec<JoinRequest>, Self::Error>> + Send + '_;

  /// Move a pending request to `Approved` or `Rejected`. Errors if the
  /// request was already decided.
  fn decide_request(
    &self,
    request_id: Uuid,
    decision: Decision,
  ) -> impl Future<Output = Result<JoinRequest, Self::Error>> + Send + '_;

  /// Stamp `archived_at` on a request. Errors if already archived.
  fn archive_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<JoinRequest, Self::Error>> + Send + '_;
}
