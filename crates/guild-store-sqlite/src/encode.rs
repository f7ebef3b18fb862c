//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as ISO 8601
//! dates. Structured fields (id lists, activities, group members) are stored
//! as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use guild_core::{
  acl::{Group, GroupMember},
  schema::{
    Account, AccountRoot, Activity, Invitation, JoinRequest, JoinStatus,
    Organization, Profile,
  },
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JoinStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: JoinStatus) -> &'static str {
  match s {
    JoinStatus::Pending => "pending",
    JoinStatus::Approved => "approved",
    JoinStatus::Rejected => "rejected",
  }
}

pub fn decode_status(s: &str) -> Result<JoinStatus> {
  match s {
    "pending" => Ok(JoinStatus::Pending),
    "approved" => Ok(JoinStatus::Approved),
    "rejected" => Ok(JoinStatus::Rejected),
    other => Err(Error::DateParse(format!("unknown join status: {other:?}"))),
  }
}

// ─── Id lists ────────────────────────────────────────────────────────────────

pub fn encode_id_list(ids: &[Uuid]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_id_list(s: &str) -> Result<Vec<Uuid>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Activities ──────────────────────────────────────────────────────────────

pub fn encode_activities(activities: &[Activity]) -> Result<String> {
  Ok(serde_json::to_string(activities)?)
}

pub fn decode_activities(s: &str) -> Result<Vec<Activity>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Group members ───────────────────────────────────────────────────────────

pub fn encode_members(members: &[GroupMember]) -> Result<String> {
  Ok(serde_json::to_string(members)?)
}

pub fn decode_members(s: &str) -> Result<Vec<GroupMember>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id: String,
  pub created_at: String,
  pub root_id:    Option<String>,
  pub profile_id: Option<String>,
}

impl RawAccount {
  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id: decode_uuid(&self.account_id)?,
      created_at: decode_dt(&self.created_at)?,
      root:       self.root_id.as_deref().map(decode_uuid).transpose()?,
      profile:    self.profile_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

/// Raw strings read directly from a `roots` row.
pub struct RawRoot {
  pub root_id:        String,
  pub date_of_birth:  String,
  pub organizations:  String,
  pub my_invitations: Option<String>,
  pub my_requests:    Option<String>,
}

impl RawRoot {
  pub fn into_root(self) -> Result<AccountRoot> {
    Ok(AccountRoot {
      root_id:        decode_uuid(&self.root_id)?,
      date_of_birth:  decode_date(&self.date_of_birth)?,
      organizations:  decode_id_list(&self.organizations)?,
      my_invitations: self
        .my_invitations
        .as_deref()
        .map(decode_id_list)
        .transpose()?,
      my_requests:    self
        .my_requests
        .as_deref()
        .map(decode_id_list)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id: String,
  pub name:       String,
  pub first_name: String,
  pub group_id:   String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id: decode_uuid(&self.profile_id)?,
      name:       self.name,
      first_name: self.first_name,
      group_id:   decode_uuid(&self.group_id)?,
    })
  }
}

/// Raw strings read directly from an `organizations` row.
pub struct RawOrganization {
  pub organization_id: String,
  pub name:            String,
  pub activities:      String,
}

impl RawOrganization {
  pub fn into_organization(self) -> Result<Organization> {
    Ok(Organization {
      organization_id: decode_uuid(&self.organization_id)?,
      name:            self.name,
      activities:      decode_activities(&self.activities)?,
    })
  }
}

/// Raw strings read directly from an `invitations` row.
pub struct RawInvitation {
  pub invitation_id:   String,
  pub organization_id: String,
  pub created_by:      String,
  pub group_id:        String,
  pub created_at:      String,
  pub revoked_at:      Option<String>,
  pub archived_at:     Option<String>,
}

impl RawInvitation {
  pub fn into_invitation(self) -> Result<Invitation> {
    Ok(Invitation {
      invitation_id:   decode_uuid(&self.invitation_id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      created_by:      decode_uuid(&self.created_by)?,
      group_id:        decode_uuid(&self.group_id)?,
      created_at:      decode_dt(&self.created_at)?,
      revoked_at:      self.revoked_at.as_deref().map(decode_dt).transpose()?,
      archived_at:     self.archived_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `join_requests` row.
pub struct RawRequest {
  pub request_id:    String,
  pub invitation_id: String,
  pub account_id:    String,
  pub status:        String,
  pub created_at:    String,
  pub archived_at:   Option<String>,
}

impl RawRequest {
  pub fn into_request(self) -> Result<JoinRequest> {
    Ok(JoinRequest {
      request_id:    decode_uuid(&self.request_id)?,
      invitation_id: decode_uuid(&self.invitation_id)?,
      account_id:    decode_uuid(&self.account_id)?,
      status:        decode_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
      archived_at:   self.archived_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `groups` row.
pub struct RawGroup {
  pub group_id: String,
  pub members:  String,
}

impl RawGroup {
  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      group_id: decode_uuid(&self.group_id)?,
      members:  decode_members(&self.members)?,
    })
  }
}
