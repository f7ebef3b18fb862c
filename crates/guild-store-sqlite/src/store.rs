//! [`SqliteStore`] — the SQLite implementation of [`GuildStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use guild_core::{
  acl::Group,
  schema::{
    Account, AccountRoot, Activity, Invitation, JoinRequest, JoinStatus,
    NewProfile, NewRoot, Organization, Profile,
  },
  store::{Decision, GuildStore, RootList},
};

use crate::{
  Error, Result,
  encode::{
    RawAccount, RawGroup, RawInvitation, RawOrganization, RawProfile,
    RawRequest, RawRoot, encode_activities, encode_date, encode_dt,
    encode_id_list, encode_members, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Guild document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Raw connection handle for test fixtures that need to write states the
  /// public API no longer produces (e.g. pre-migration roots).
  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection {
    &self.conn
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Row fetch helpers ─────────────────────────────────────────────────────

  async fn fetch_account(&self, id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT account_id, created_at, root_id, profile_id
               FROM accounts WHERE account_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawAccount {
                  account_id: row.get(0)?,
                  created_at: row.get(1)?,
                  root_id:    row.get(2)?,
                  profile_id: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn fetch_root(&self, account_id: Uuid) -> Result<Option<AccountRoot>> {
    let id_str = encode_uuid(account_id);

    let raw: Option<RawRoot> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT r.root_id, r.date_of_birth, r.organizations,
                      r.my_invitations, r.my_requests
               FROM roots r
               JOIN accounts a ON a.root_id = r.root_id
               WHERE a.account_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawRoot {
                  root_id:        row.get(0)?,
                  date_of_birth:  row.get(1)?,
                  organizations:  row.get(2)?,
                  my_invitations: row.get(3)?,
                  my_requests:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRoot::into_root).transpose()
  }

  async fn fetch_organization(
    &self,
    organization_id: Uuid,
  ) -> Result<Option<Organization>> {
    let id_str = encode_uuid(organization_id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT organization_id, name, activities
               FROM organizations WHERE organization_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawOrganization {
                  organization_id: row.get(0)?,
                  name:            row.get(1)?,
                  activities:      row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  async fn fetch_invitation(
    &self,
    invitation_id: Uuid,
  ) -> Result<Option<Invitation>> {
    let id_str = encode_uuid(invitation_id);

    let raw: Option<RawInvitation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT invitation_id, organization_id, created_by, group_id,
                      created_at, revoked_at, archived_at
               FROM invitations WHERE invitation_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawInvitation {
                  invitation_id:   row.get(0)?,
                  organization_id: row.get(1)?,
                  created_by:      row.get(2)?,
                  group_id:        row.get(3)?,
                  created_at:      row.get(4)?,
                  revoked_at:      row.get(5)?,
                  archived_at:     row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawInvitation::into_invitation).transpose()
  }

  async fn fetch_request(
    &self,
    request_id: Uuid,
  ) -> Result<Option<JoinRequest>> {
    let id_str = encode_uuid(request_id);

    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT request_id, invitation_id, account_id, status,
                      created_at, archived_at
               FROM join_requests WHERE request_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawRequest {
                  request_id:    row.get(0)?,
                  invitation_id: row.get(1)?,
                  account_id:    row.get(2)?,
                  status:        row.get(3)?,
                  created_at:    row.get(4)?,
                  archived_at:   row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  // ── Write helpers ─────────────────────────────────────────────────────────

  async fn insert_group(&self, group: &Group) -> Result<()> {
    let id_str = encode_uuid(group.group_id);
    let members_str = encode_members(&group.members)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO groups (group_id, members) VALUES (?1, ?2)",
          rusqlite::params![id_str, members_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Overwrite one of the root's id-list columns with a new value.
  async fn write_root_list(
    &self,
    root_id: Uuid,
    column: &'static str,
    ids: &[Uuid],
  ) -> Result<()> {
    let root_str = encode_uuid(root_id);
    let list_str = encode_id_list(ids)?;
    // `column` comes from a fixed set of literals, never from input.
    let sql = format!("UPDATE roots SET {column} = ?1 WHERE root_id = ?2");

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![list_str, root_str])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The account's root, or [`Error::RootNotMigrated`] when the account has
  /// none (missing accounts surface as [`Error::AccountNotFound`]).
  async fn require_root(&self, account_id: Uuid) -> Result<AccountRoot> {
    let account = self
      .fetch_account(account_id)
      .await?
      .ok_or(Error::AccountNotFound(account_id))?;

    if account.root.is_none() {
      return Err(Error::RootNotMigrated(account_id));
    }

    self
      .fetch_root(account_id)
      .await?
      .ok_or(Error::RootNotMigrated(account_id))
  }
}

// ─── GuildStore impl ─────────────────────────────────────────────────────────

impl GuildStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self) -> Result<Account> {
    let account = Account {
      account_id: Uuid::new_v4(),
      created_at: Utc::now(),
      root:       None,
      profile:    None,
    };

    let id_str = encode_uuid(account.account_id);
    let at_str = encode_dt(account.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (account_id, created_at) VALUES (?1, ?2)",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(account)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    self.fetch_account(id).await
  }

  // ── Roots ─────────────────────────────────────────────────────────────────

  async fn get_root(&self, account_id: Uuid) -> Result<Option<AccountRoot>> {
    self.fetch_root(account_id).await
  }

  async fn attach_root(
    &self,
    account_id: Uuid,
    root: NewRoot,
  ) -> Result<AccountRoot> {
    let account = self
      .fetch_account(account_id)
      .await?
      .ok_or(Error::AccountNotFound(account_id))?;

    if account.root.is_some() {
      return Err(Error::RootAlreadyAttached(account_id));
    }

    let attached = AccountRoot {
      root_id:        Uuid::new_v4(),
      date_of_birth:  root.date_of_birth,
      organizations:  root.organizations,
      my_invitations: Some(root.my_invitations),
      my_requests:    Some(root.my_requests),
    };

    let root_str = encode_uuid(attached.root_id);
    let account_str = encode_uuid(account_id);
    let dob_str = encode_date(attached.date_of_birth);
    let orgs_str = encode_id_list(&attached.organizations)?;
    let invitations_str = attached
      .my_invitations
      .as_deref()
      .map(encode_id_list)
      .transpose()?;
    let requests_str = attached
      .my_requests
      .as_deref()
      .map(encode_id_list)
      .transpose()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO roots (root_id, date_of_birth, organizations,
                              my_invitations, my_requests)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            root_str,
            dob_str,
            orgs_str,
            invitations_str,
            requests_str,
          ],
        )?;
        tx.execute(
          "UPDATE accounts SET root_id = ?1 WHERE account_id = ?2",
          rusqlite::params![root_str, account_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(attached)
  }

  async fn init_root_list(
    &self,
    account_id: Uuid,
    list: RootList,
  ) -> Result<()> {
    let account = self
      .fetch_account(account_id)
      .await?
      .ok_or(Error::AccountNotFound(account_id))?;

    let root_id = account.root.ok_or(Error::RootNotMigrated(account_id))?;
    let root_str = encode_uuid(root_id);

    let sql = match list {
      RootList::MyInvitations => {
        "UPDATE roots SET my_invitations = '[]'
         WHERE root_id = ?1 AND my_invitations IS NULL"
      }
      RootList::MyRequests => {
        "UPDATE roots SET my_requests = '[]'
         WHERE root_id = ?1 AND my_requests IS NULL"
      }
    };

    self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params![root_str])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn attach_profile(
    &self,
    account_id: Uuid,
    profile: NewProfile,
    group: Group,
  ) -> Result<Profile> {
    let account = self
      .fetch_account(account_id)
      .await?
      .ok_or(Error::AccountNotFound(account_id))?;

    if account.profile.is_some() {
      return Err(Error::ProfileAlreadyAttached(account_id));
    }

    self.insert_group(&group).await?;

    let attached = Profile {
      profile_id: Uuid::new_v4(),
      name:       profile.name,
      first_name: profile.first_name,
      group_id:   group.group_id,
    };

    let profile_str = encode_uuid(attached.profile_id);
    let account_str = encode_uuid(account_id);
    let group_str = encode_uuid(attached.group_id);
    let name = attached.name.clone();
    let first_name = attached.first_name.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO profiles (profile_id, name, first_name, group_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![profile_str, name, first_name, group_str],
        )?;
        tx.execute(
          "UPDATE accounts SET profile_id = ?1 WHERE account_id = ?2",
          rusqlite::params![profile_str, account_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(attached)
  }

  async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(account_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT p.profile_id, p.name, p.first_name, p.group_id
               FROM profiles p
               JOIN accounts a ON a.profile_id = p.profile_id
               WHERE a.account_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawProfile {
                  profile_id: row.get(0)?,
                  name:       row.get(1)?,
                  first_name: row.get(2)?,
                  group_id:   row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>> {
    let id_str = encode_uuid(group_id);

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT group_id, members FROM groups WHERE group_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawGroup {
                  group_id: row.get(0)?,
                  members:  row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn create_organization(
    &self,
    account_id: Uuid,
    name: String,
  ) -> Result<Organization> {
    let root = self.require_root(account_id).await?;

    let organization = Organization {
      organization_id: Uuid::new_v4(),
      name,
      activities: Vec::new(),
    };

    let id_str = encode_uuid(organization.organization_id);
    let name_str = organization.name.clone();
    let activities_str = encode_activities(&organization.activities)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO organizations (organization_id, name, activities)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, activities_str],
        )?;
        Ok(())
      })
      .await?;

    let mut organizations = root.organizations;
    organizations.push(organization.organization_id);
    self
      .write_root_list(root.root_id, "organizations", &organizations)
      .await?;

    Ok(organization)
  }

  async fn get_organization(
    &self,
    organization_id: Uuid,
  ) -> Result<Option<Organization>> {
    self.fetch_organization(organization_id).await
  }

  async fn list_organizations(
    &self,
    account_id: Uuid,
  ) -> Result<Vec<Organization>> {
    let Some(root) = self.fetch_root(account_id).await? else {
      return Ok(Vec::new());
    };

    let id_strs: Vec<String> =
      root.organizations.iter().copied().map(encode_uuid).collect();

    let raws: Vec<RawOrganization> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT organization_id, name, activities
           FROM organizations WHERE organization_id = ?1",
        )?;
        let mut out = Vec::with_capacity(id_strs.len());
        for id in &id_strs {
          let raw = stmt
            .query_row(rusqlite::params![id], |row| {
              Ok(RawOrganization {
                organization_id: row.get(0)?,
                name:            row.get(1)?,
                activities:      row.get(2)?,
              })
            })
            .optional()?;
          // Dangling ids in the root list are skipped rather than fatal.
          if let Some(raw) = raw {
            out.push(raw);
          }
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(RawOrganization::into_organization)
      .collect()
  }

  async fn add_activity(
    &self,
    organization_id: Uuid,
    name: String,
  ) -> Result<Organization> {
    let mut organization = self
      .fetch_organization(organization_id)
      .await?
      .ok_or(Error::OrganizationNotFound(organization_id))?;

    organization.activities.push(Activity { name });

    let id_str = encode_uuid(organization_id);
    let activities_str = encode_activities(&organization.activities)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE organizations SET activities = ?1 WHERE organization_id = ?2",
          rusqlite::params![activities_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(organization)
  }

  // ── Invitations ───────────────────────────────────────────────────────────

  async fn create_invitation(
    &self,
    account_id: Uuid,
    organization_id: Uuid,
  ) -> Result<Invitation> {
    let root = self.require_root(account_id).await?;
    let Some(mut my_invitations) = root.my_invitations else {
      return Err(Error::RootNotMigrated(account_id));
    };

    if self.fetch_organization(organization_id).await?.is_none() {
      return Err(Error::OrganizationNotFound(organization_id));
    }

    let group = Group::invitation_requests(account_id);
    self.insert_group(&group).await?;

    let invitation = Invitation {
      invitation_id: Uuid::new_v4(),
      organization_id,
      created_by: account_id,
      group_id: group.group_id,
      created_at: Utc::now(),
      revoked_at: None,
      archived_at: None,
    };

    let id_str = encode_uuid(invitation.invitation_id);
    let org_str = encode_uuid(organization_id);
    let creator_str = encode_uuid(account_id);
    let group_str = encode_uuid(invitation.group_id);
    let at_str = encode_dt(invitation.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO invitations (invitation_id, organization_id,
                                    created_by, group_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, org_str, creator_str, group_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    my_invitations.push(invitation.invitation_id);
    self
      .write_root_list(root.root_id, "my_invitations", &my_invitations)
      .await?;

    Ok(invitation)
  }

  async fn get_invitation(
    &self,
    invitation_id: Uuid,
  ) -> Result<Option<Invitation>> {
    self.fetch_invitation(invitation_id).await
  }

  async fn list_invitations(
    &self,
    account_id: Uuid,
    include_archived: bool,
  ) -> Result<Vec<Invitation>> {
    let creator_str = encode_uuid(account_id);

    let raws: Vec<RawInvitation> = self
      .conn
      .call(move |conn| {
        let sql = if include_archived {
          "SELECT invitation_id, organization_id, created_by, group_id,
                  created_at, revoked_at, archived_at
           FROM invitations WHERE created_by = ?1 ORDER BY rowid"
        } else {
          "SELECT invitation_id, organization_id, created_by, group_id,
                  created_at, revoked_at, archived_at
           FROM invitations
           WHERE created_by = ?1 AND archived_at IS NULL ORDER BY rowid"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![creator_str], |row| {
            Ok(RawInvitation {
              invitation_id:   row.get(0)?,
              organization_id: row.get(1)?,
              created_by:      row.get(2)?,
              group_id:        row.get(3)?,
              created_at:      row.get(4)?,
              revoked_at:      row.get(5)?,
              archived_at:     row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawInvitation::into_invitation)
      .collect()
  }

  async fn revoke_invitation(&self, invitation_id: Uuid) -> Result<Invitation> {
    let mut invitation = self
      .fetch_invitation(invitation_id)
      .await?
      .ok_or(Error::InvitationNotFound(invitation_id))?;

    if invitation.is_revoked() {
      return Err(Error::AlreadyRevoked(invitation_id));
    }

    let now = Utc::now();
    let id_str = encode_uuid(invitation_id);
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE invitations SET revoked_at = ?1 WHERE invitation_id = ?2",
          rusqlite::params![at_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    invitation.revoked_at = Some(now);
    Ok(invitation)
  }

  async fn archive_invitation(
    &self,
    invitation_id: Uuid,
  ) -> Result<Invitation> {
    let mut invitation = self
      .fetch_invitation(invitation_id)
      .await?
      .ok_or(Error::InvitationNotFound(invitation_id))?;

    if invitation.is_archived() {
      return Err(Error::AlreadyArchived(invitation_id));
    }

    let now = Utc::now();
    let id_str = encode_uuid(invitation_id);
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE invitations SET archived_at = ?1 WHERE invitation_id = ?2",
          rusqlite::params![at_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    invitation.archived_at = Some(now);
    Ok(invitation)
  }

  // ── Join requests ─────────────────────────────────────────────────────────

  async fn submit_request(
    &self,
    invitation_id: Uuid,
    account_id: Uuid,
  ) -> Result<JoinRequest> {
    let invitation = self
      .fetch_invitation(invitation_id)
      .await?
      .ok_or(Error::InvitationNotFound(invitation_id))?;

    if invitation.is_revoked() {
      return Err(Error::InvitationRevoked(invitation_id));
    }

    let root = self.require_root(account_id).await?;
    let Some(mut my_requests) = root.my_requests else {
      return Err(Error::RootNotMigrated(account_id));
    };

    let request = JoinRequest {
      request_id: Uuid::new_v4(),
      invitation_id,
      account_id,
      status: JoinStatus::Pending,
      created_at: Utc::now(),
      archived_at: None,
    };

    let id_str = encode_uuid(request.request_id);
    let invitation_str = encode_uuid(invitation_id);
    let account_str = encode_uuid(account_id);
    let status_str = encode_status(request.status).to_owned();
    let at_str = encode_dt(request.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO join_requests (request_id, invitation_id, account_id,
                                      status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            id_str,
            invitation_str,
            account_str,
            status_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    my_requests.push(request.request_id);
    self
      .write_root_list(root.root_id, "my_requests", &my_requests)
      .await?;

    Ok(request)
  }

  async fn get_request(&self, request_id: Uuid) -> Result<Option<JoinRequest>> {
    self.fetch_request(request_id).await
  }

  async fn list_requests(
    &self,
    invitation_id: Uuid,
    include_archived: bool,
  ) -> Result<Vec<JoinRequest>> {
    let invitation_str = encode_uuid(invitation_id);
    self
      .list_requests_where("invitation_id", invitation_str, include_archived)
      .await
  }

  async fn list_my_requests(
    &self,
    account_id: Uuid,
    include_archived: bool,
  ) -> Result<Vec<JoinRequest>> {
    let account_str = encode_uuid(account_id);
    self
      .list_requests_where("account_id", account_str, include_archived)
      .await
  }

  async fn decide_request(
    &self,
    request_id: Uuid,
    decision: Decision,
  ) -> Result<JoinRequest> {
    let mut request = self
      .fetch_request(request_id)
      .await?
      .ok_or(Error::RequestNotFound(request_id))?;

    if !request.status.is_pending() {
      return Err(Error::AlreadyDecided(request_id));
    }

    request.status = decision.status();

    let id_str = encode_uuid(request_id);
    let status_str = encode_status(request.status).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE join_requests SET status = ?1 WHERE request_id = ?2",
          rusqlite::params![status_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn archive_request(&self, request_id: Uuid) -> Result<JoinRequest> {
    let mut request = self
      .fetch_request(request_id)
      .await?
      .ok_or(Error::RequestNotFound(request_id))?;

    if request.archived_at.is_some() {
      return Err(Error::AlreadyArchived(request_id));
    }

    let now = Utc::now();
    let id_str = encode_uuid(request_id);
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE join_requests SET archived_at = ?1 WHERE request_id = ?2",
          rusqlite::params![at_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    request.archived_at = Some(now);
    Ok(request)
  }
}

impl SqliteStore {
  /// Shared query for the two request list views; `column` is one of the
  /// fixed literals `invitation_id` / `account_id`.
  async fn list_requests_where(
    &self,
    column: &'static str,
    key: String,
    include_archived: bool,
  ) -> Result<Vec<JoinRequest>> {
    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let filter = if include_archived {
          String::new()
        } else {
          " AND archived_at IS NULL".to_owned()
        };
        let sql = format!(
          "SELECT request_id, invitation_id, account_id, status,
                  created_at, archived_at
           FROM join_requests WHERE {column} = ?1{filter} ORDER BY rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![key], |row| {
            Ok(RawRequest {
              request_id:    row.get(0)?,
              invitation_id: row.get(1)?,
              account_id:    row.get(2)?,
              status:        row.get(3)?,
              created_at:    row.get(4)?,
              archived_at:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }
}
