//! Document shapes for the Guild membership store.
//!
//! Documents reference each other by UUID. Fields that accounts created
//! under an older schema may lack are `Option`s; the account migration
//! ([`crate::migration::migrate_account`]) backfills them, and after it
//! completes every account has a root and a profile, and every root has
//! all three of its lists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Organizations ───────────────────────────────────────────────────────────

/// A single activity offered by an organization. Leaf value, stored inline
/// on its owning organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  pub name: String,
}

/// An organization and the ordered list of activities it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
  pub organization_id: Uuid,
  pub name:            String,
  pub activities:      Vec<Activity>,
}

// ─── Invitations & join requests ─────────────────────────────────────────────

/// Lifecycle of a join request. `Pending` is the only state a request is
/// created in; it is decided at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStatus {
  Pending,
  Approved,
  Rejected,
}

impl JoinStatus {
  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending) }
}

/// One access request against an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
  pub request_id:    Uuid,
  /// The invitation this request was filed against.
  pub invitation_id: Uuid,
  /// The requesting account.
  pub account_id:    Uuid,
  pub status:        JoinStatus,
  pub created_at:    DateTime<Utc>,
  /// Set when the request is hidden from default views.
  pub archived_at:   Option<DateTime<Utc>>,
}

/// An invitation link for one organization.
///
/// The invitation's request list is the access-control boundary of the
/// system: its group grants `everyone: write_only` (anyone holding the link
/// may file a request) and `creator: admin` (only the creator reads and
/// decides them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
  pub invitation_id:   Uuid,
  /// Load the organization by this id to display its name.
  pub organization_id: Uuid,
  pub created_by:      Uuid,
  /// Access policy protecting the request list.
  pub group_id:        Uuid,
  pub created_at:      DateTime<Utc>,
  /// Set when the link is dead: new requests are refused.
  pub revoked_at:      Option<DateTime<Utc>>,
  /// Set when the invitation is hidden from default views.
  pub archived_at:     Option<DateTime<Utc>>,
}

impl Invitation {
  pub fn is_revoked(&self) -> bool { self.revoked_at.is_some() }

  pub fn is_archived(&self) -> bool { self.archived_at.is_some() }
}

// ─── Per-account documents ───────────────────────────────────────────────────

/// The per-account public document, readable by everyone via its group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id: Uuid,
  pub name:       String,
  pub first_name: String,
  /// Access policy; `everyone: reader` as created by the migration.
  pub group_id:   Uuid,
}

/// The per-account private document holding the user's own data.
///
/// `my_invitations` and `my_requests` were added after `organizations`, so
/// roots written under the earlier schema lack them; `None` models that
/// absence until the migration initialises them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRoot {
  pub root_id:        Uuid,
  pub date_of_birth:  NaiveDate,
  /// Organizations this account owns, in creation order.
  pub organizations:  Vec<Uuid>,
  /// Invitations this account created.
  pub my_invitations: Option<Vec<Uuid>>,
  /// Join requests this account filed.
  pub my_requests:    Option<Vec<Uuid>>,
}

/// The top-level per-user aggregate: a profile reference and a root
/// reference, either of which may be absent before migration runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub account_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub root:       Option<Uuid>,
  pub profile:    Option<Uuid>,
}

// ─── Input types ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::GuildStore::attach_root`].
/// `root_id` is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRoot {
  pub date_of_birth:  NaiveDate,
  pub organizations:  Vec<Uuid>,
  pub my_invitations: Vec<Uuid>,
  pub my_requests:    Vec<Uuid>,
}

/// Input to [`crate::store::GuildStore::attach_profile`].
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
  pub name:       String,
  pub first_name: String,
}
