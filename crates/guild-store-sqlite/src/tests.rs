//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use guild_core::{
  acl::{Group, Principal},
  migration::{MigrationReport, default_date_of_birth, migrate_account},
  schema::{JoinStatus, NewProfile, NewRoot},
  store::{Decision, GuildStore, RootList},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn empty_root(dob: NaiveDate) -> NewRoot {
  NewRoot {
    date_of_birth:  dob,
    organizations:  Vec::new(),
    my_invitations: Vec::new(),
    my_requests:    Vec::new(),
  }
}

async fn migrated_account(s: &SqliteStore) -> Uuid {
  let account = s.create_account().await.unwrap();
  migrate_account(s, account.account_id).await.unwrap();
  account.account_id
}

// ─── Accounts & roots ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_account() {
  let s = store().await;

  let account = s.create_account().await.unwrap();
  assert!(account.root.is_none());
  assert!(account.profile.is_none());

  let fetched = s.get_account(account.account_id).await.unwrap().unwrap();
  assert_eq!(fetched.account_id, account.account_id);
}

#[tokio::test]
async fn get_account_missing_returns_none() {
  let s = store().await;
  assert!(s.get_account(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn attach_root_twice_errors() {
  let s = store().await;
  let account = s.create_account().await.unwrap();

  let dob = NaiveDate::from_ymd_opt(1985, 3, 2).unwrap();
  s.attach_root(account.account_id, empty_root(dob))
    .await
    .unwrap();

  let err = s
    .attach_root(account.account_id, empty_root(dob))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RootAlreadyAttached(_)));
}

#[tokio::test]
async fn init_root_list_leaves_present_lists_alone() {
  let s = store().await;
  let account_id = migrated_account(&s).await;
  let org = s
    .create_organization(account_id, "Chess club".into())
    .await
    .unwrap();
  let invitation = s
    .create_invitation(account_id, org.organization_id)
    .await
    .unwrap();

  // Present and non-empty; a second init must not clear it.
  s.init_root_list(account_id, RootList::MyInvitations)
    .await
    .unwrap();

  let root = s.get_root(account_id).await.unwrap().unwrap();
  assert_eq!(
    root.my_invitations.as_deref(),
    Some(&[invitation.invitation_id][..])
  );
}

// ─── Migration ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn migration_on_fresh_account_creates_everything() {
  let s = store().await;
  let account = s.create_account().await.unwrap();

  let report = migrate_account(&s, account.account_id).await.unwrap();
  assert!(report.created_root);
  assert!(report.created_profile);
  // The fresh root already carries both lists.
  assert!(!report.initialized_invitations);
  assert!(!report.initialized_requests);

  let account = s.get_account(account.account_id).await.unwrap().unwrap();
  assert!(account.root.is_some());
  assert!(account.profile.is_some());

  let root = s.get_root(account.account_id).await.unwrap().unwrap();
  assert_eq!(root.date_of_birth, default_date_of_birth());
  assert!(root.organizations.is_empty());
  assert_eq!(root.my_invitations.as_deref(), Some(&[][..]));
  assert_eq!(root.my_requests.as_deref(), Some(&[][..]));

  let profile = s.get_profile(account.account_id).await.unwrap().unwrap();
  assert_eq!(profile.name, "");
  assert_eq!(profile.first_name, "");
}

#[tokio::test]
async fn migration_is_idempotent() {
  let s = store().await;
  let account = s.create_account().await.unwrap();

  migrate_account(&s, account.account_id).await.unwrap();
  let root_before = s.get_root(account.account_id).await.unwrap().unwrap();
  let profile_before = s.get_profile(account.account_id).await.unwrap().unwrap();

  let second = migrate_account(&s, account.account_id).await.unwrap();
  assert!(second.is_noop());
  assert_eq!(second, MigrationReport::default());

  let root_after = s.get_root(account.account_id).await.unwrap().unwrap();
  let profile_after = s.get_profile(account.account_id).await.unwrap().unwrap();
  assert_eq!(root_after.root_id, root_before.root_id);
  assert_eq!(root_after.date_of_birth, root_before.date_of_birth);
  assert_eq!(profile_after.profile_id, profile_before.profile_id);
}

#[tokio::test]
async fn migration_backfills_lists_on_empty_root() {
  let s = store().await;
  let account = s.create_account().await.unwrap();
  let dob = NaiveDate::from_ymd_opt(1972, 11, 30).unwrap();

  // Simulate an account written under the earlier schema: root attached,
  // then the two newer list columns forced back to absent.
  let root = s
    .attach_root(account.account_id, empty_root(dob))
    .await
    .unwrap();
  s.raw_clear_root_lists(root.root_id).await;

  let before = s.get_root(account.account_id).await.unwrap().unwrap();
  assert!(before.my_invitations.is_none());
  assert!(before.my_requests.is_none());

  let report = migrate_account(&s, account.account_id).await.unwrap();
  assert!(!report.created_root);
  assert!(report.initialized_invitations);
  assert!(report.initialized_requests);
  assert!(report.created_profile);

  let after = s.get_root(account.account_id).await.unwrap().unwrap();
  // Backfilled to present-but-empty; the existing date of birth is kept.
  assert_eq!(after.my_invitations.as_deref(), Some(&[][..]));
  assert_eq!(after.my_requests.as_deref(), Some(&[][..]));
  assert_eq!(after.date_of_birth, dob);
}

#[tokio::test]
async fn migration_never_overwrites_existing_date_of_birth() {
  let s = store().await;
  let account = s.create_account().await.unwrap();
  let dob = NaiveDate::from_ymd_opt(2001, 7, 4).unwrap();

  s.attach_root(account.account_id, empty_root(dob))
    .await
    .unwrap();
  migrate_account(&s, account.account_id).await.unwrap();

  let root = s.get_root(account.account_id).await.unwrap().unwrap();
  assert_eq!(root.date_of_birth, dob);
  assert_ne!(root.date_of_birth, default_date_of_birth());
}

#[tokio::test]
async fn migration_creates_root_when_only_profile_present() {
  let s = store().await;
  let account = s.create_account().await.unwrap();
  s.attach_profile(
    account.account_id,
    NewProfile::default(),
    Group::everyone_reader(),
  )
  .await
  .unwrap();

  let report = migrate_account(&s, account.account_id).await.unwrap();
  assert!(report.created_root);
  assert!(!report.created_profile);

  let root = s.get_root(account.account_id).await.unwrap().unwrap();
  assert_eq!(root.date_of_birth, default_date_of_birth());
}

#[tokio::test]
async fn migration_on_missing_account_errors() {
  let s = store().await;
  let err = migrate_account(&s, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(guild_core::Error::AccountNotFound(_))
  ));
}

#[tokio::test]
async fn migrated_profile_is_readable_by_everyone() {
  let s = store().await;
  let account_id = migrated_account(&s).await;

  let profile = s.get_profile(account_id).await.unwrap().unwrap();
  let group = s.get_group(profile.group_id).await.unwrap().unwrap();

  assert!(group.can_read(Principal::Everyone));
  assert!(group.can_read(Principal::Account(Uuid::new_v4())));
  assert!(!group.can_write(Principal::Account(Uuid::new_v4())));
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn attach_profile_twice_errors() {
  let s = store().await;
  let account_id = migrated_account(&s).await;

  let err = s
    .attach_profile(account_id, NewProfile::default(), Group::everyone_reader())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::ProfileAlreadyAttached(_)));
}

// ─── Organizations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_organization_appends_to_root_list() {
  let s = store().await;
  let account_id = migrated_account(&s).await;

  let first = s
    .create_organization(account_id, "Rowing club".into())
    .await
    .unwrap();
  let second = s
    .create_organization(account_id, "Book circle".into())
    .await
    .unwrap();

  let root = s.get_root(account_id).await.unwrap().unwrap();
  assert_eq!(root.organizations, vec![
    first.organization_id,
    second.organization_id
  ]);

  let listed = s.list_organizations(account_id).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].name, "Rowing club");
  assert_eq!(listed[1].name, "Book circle");
}

#[tokio::test]
async fn create_organization_requires_migrated_account() {
  let s = store().await;
  let account = s.create_account().await.unwrap();

  let err = s
    .create_organization(account.account_id, "No root yet".into())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RootNotMigrated(_)));
}

#[tokio::test]
async fn add_activity_appends_in_order() {
  let s = store().await;
  let account_id = migrated_account(&s).await;
  let org = s
    .create_organization(account_id, "Rowing club".into())
    .await
    .unwrap();

  s.add_activity(org.organization_id, "Sculling".into())
    .await
    .unwrap();
  let updated = s
    .add_activity(org.organization_id, "Sweep rowing".into())
    .await
    .unwrap();

  let names: Vec<_> =
    updated.activities.iter().map(|a| a.name.as_str()).collect();
  assert_eq!(names, ["Sculling", "Sweep rowing"]);
}

#[tokio::test]
async fn add_activity_on_missing_organization_errors() {
  let s = store().await;
  let err = s
    .add_activity(Uuid::new_v4(), "Nope".into())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::OrganizationNotFound(_)));
}

// ─── Invitations ─────────────────────────────────────────────────────────────

async fn org_with_invitation(s: &SqliteStore) -> (Uuid, Uuid) {
  let creator = migrated_account(s).await;
  let org = s
    .create_organization(creator, "Rowing club".into())
    .await
    .unwrap();
  let invitation = s
    .create_invitation(creator, org.organization_id)
    .await
    .unwrap();
  (creator, invitation.invitation_id)
}

#[tokio::test]
async fn create_invitation_appends_to_my_invitations() {
  let s = store().await;
  let (creator, invitation_id) = org_with_invitation(&s).await;

  let root = s.get_root(creator).await.unwrap().unwrap();
  assert_eq!(root.my_invitations.as_deref(), Some(&[invitation_id][..]));

  let listed = s.list_invitations(creator, false).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].invitation_id, invitation_id);
  assert_eq!(listed[0].created_by, creator);
}

#[tokio::test]
async fn create_invitation_for_missing_organization_errors() {
  let s = store().await;
  let creator = migrated_account(&s).await;

  let err = s
    .create_invitation(creator, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::OrganizationNotFound(_)));
}

#[tokio::test]
async fn invitation_group_policy() {
  let s = store().await;
  let (creator, invitation_id) = org_with_invitation(&s).await;

  let invitation = s.get_invitation(invitation_id).await.unwrap().unwrap();
  let group = s.get_group(invitation.group_id).await.unwrap().unwrap();

  let stranger = Principal::Account(Uuid::new_v4());
  assert!(group.can_write(stranger));
  assert!(!group.can_read(stranger));
  assert!(group.can_admin(Principal::Account(creator)));
}

#[tokio::test]
async fn revoke_invitation_blocks_new_requests() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;
  let requester = migrated_account(&s).await;

  s.revoke_invitation(invitation_id).await.unwrap();

  let err = s
    .submit_request(invitation_id, requester)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::InvitationRevoked(_)));
}

#[tokio::test]
async fn revoke_twice_errors() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;

  s.revoke_invitation(invitation_id).await.unwrap();
  let err = s.revoke_invitation(invitation_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::AlreadyRevoked(_)));
}

#[tokio::test]
async fn archived_invitations_hidden_from_default_view() {
  let s = store().await;
  let (creator, invitation_id) = org_with_invitation(&s).await;

  s.archive_invitation(invitation_id).await.unwrap();

  let visible = s.list_invitations(creator, false).await.unwrap();
  assert!(visible.is_empty());

  let all = s.list_invitations(creator, true).await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].is_archived());
}

// ─── Join requests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_request_appends_to_both_lists() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;
  let requester = migrated_account(&s).await;

  let request = s.submit_request(invitation_id, requester).await.unwrap();
  assert_eq!(request.status, JoinStatus::Pending);

  let on_invitation = s.list_requests(invitation_id, false).await.unwrap();
  assert_eq!(on_invitation.len(), 1);
  assert_eq!(on_invitation[0].request_id, request.request_id);

  let root = s.get_root(requester).await.unwrap().unwrap();
  assert_eq!(root.my_requests.as_deref(), Some(&[request.request_id][..]));

  let mine = s.list_my_requests(requester, false).await.unwrap();
  assert_eq!(mine.len(), 1);
  assert_eq!(mine[0].account_id, requester);
}

#[tokio::test]
async fn submit_request_requires_migrated_requester() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;
  let unmigrated = s.create_account().await.unwrap();

  let err = s
    .submit_request(invitation_id, unmigrated.account_id)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::RootNotMigrated(_)));
}

#[tokio::test]
async fn decide_request_pending_to_approved() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;
  let requester = migrated_account(&s).await;

  let request = s.submit_request(invitation_id, requester).await.unwrap();
  let decided = s
    .decide_request(request.request_id, Decision::Approved)
    .await
    .unwrap();
  assert_eq!(decided.status, JoinStatus::Approved);

  let fetched = s.get_request(request.request_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, JoinStatus::Approved);
}

#[tokio::test]
async fn decide_request_twice_errors() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;
  let requester = migrated_account(&s).await;

  let request = s.submit_request(invitation_id, requester).await.unwrap();
  s.decide_request(request.request_id, Decision::Rejected)
    .await
    .unwrap();

  let err = s
    .decide_request(request.request_id, Decision::Approved)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::AlreadyDecided(_)));

  // The first decision stands.
  let fetched = s.get_request(request.request_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, JoinStatus::Rejected);
}

#[tokio::test]
async fn archived_requests_hidden_from_default_view() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;
  let requester = migrated_account(&s).await;

  let request = s.submit_request(invitation_id, requester).await.unwrap();
  s.archive_request(request.request_id).await.unwrap();

  assert!(s.list_requests(invitation_id, false).await.unwrap().is_empty());
  assert!(s.list_my_requests(requester, false).await.unwrap().is_empty());

  let all = s.list_requests(invitation_id, true).await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].archived_at.is_some());
}

#[tokio::test]
async fn requests_keep_insertion_order() {
  let s = store().await;
  let (_, invitation_id) = org_with_invitation(&s).await;

  let first = migrated_account(&s).await;
  let second = migrated_account(&s).await;

  let r1 = s.submit_request(invitation_id, first).await.unwrap();
  let r2 = s.submit_request(invitation_id, second).await.unwrap();

  let listed = s.list_requests(invitation_id, false).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|r| r.request_id).collect();
  assert_eq!(ids, vec![r1.request_id, r2.request_id]);
}

// ─── Test-only raw access ────────────────────────────────────────────────────

impl SqliteStore {
  /// Force the two newer root lists back to NULL, reproducing a root
  /// written before they existed.
  async fn raw_clear_root_lists(&self, root_id: Uuid) {
    let id_str = crate::encode::encode_uuid(root_id);
    self
      .conn_for_tests()
      .call(move |conn| {
        conn.execute(
          "UPDATE roots SET my_invitations = NULL, my_requests = NULL
           WHERE root_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await
      .expect("raw update");
  }
}
