//! Capability groups attached to documents at creation time.
//!
//! A group maps principals to roles. Enforcement happens at the API layer;
//! the store only persists groups next to the documents they protect.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Principals & roles ──────────────────────────────────────────────────────

/// Who is acting. `Everyone` is the anonymous caller and also the wildcard
/// member matching any caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Principal {
  Everyone,
  Account(Uuid),
}

/// What a member may do. `Admin` implies read and write; `Writer` implies
/// read; `WriteOnly` deliberately does not — it is the role handed to
/// `everyone` on an invitation's request list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Reader,
  WriteOnly,
  Writer,
  Admin,
}

impl Role {
  pub fn grants_read(self) -> bool {
    matches!(self, Self::Reader | Self::Writer | Self::Admin)
  }

  pub fn grants_write(self) -> bool {
    matches!(self, Self::WriteOnly | Self::Writer | Self::Admin)
  }

  pub fn grants_admin(self) -> bool { matches!(self, Self::Admin) }
}

// ─── Groups ──────────────────────────────────────────────────────────────────

/// One principal-to-role grant inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
  pub principal: Principal,
  pub role:      Role,
}

/// An access-control group. Persisted alongside the document it protects;
/// membership never changes after creation at this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub group_id: Uuid,
  pub members:  Vec<GroupMember>,
}

impl Group {
  pub fn new(members: Vec<GroupMember>) -> Self {
    Self { group_id: Uuid::new_v4(), members }
  }

  /// The policy for profiles: readable by everyone.
  pub fn everyone_reader() -> Self {
    Self::new(vec![GroupMember {
      principal: Principal::Everyone,
      role:      Role::Reader,
    }])
  }

  /// The policy for an invitation's request list: anyone holding the link
  /// may append a request, only the creator reads and administers it.
  pub fn invitation_requests(creator: Uuid) -> Self {
    Self::new(vec![
      GroupMember {
        principal: Principal::Everyone,
        role:      Role::WriteOnly,
      },
      GroupMember {
        principal: Principal::Account(creator),
        role:      Role::Admin,
      },
    ])
  }

  fn roles_for(&self, who: Principal) -> impl Iterator<Item = Role> + '_ {
    self
      .members
      .iter()
      .filter(move |m| {
        m.principal == Principal::Everyone || m.principal == who
      })
      .map(|m| m.role)
  }

  pub fn can_read(&self, who: Principal) -> bool {
    self.roles_for(who).any(Role::grants_read)
  }

  pub fn can_write(&self, who: Principal) -> bool {
    self.roles_for(who).any(Role::grants_write)
  }

  pub fn can_admin(&self, who: Principal) -> bool {
    self.roles_for(who).any(Role::grants_admin)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn everyone_reader_grants_read_to_anyone() {
    let group = Group::everyone_reader();
    let stranger = Principal::Account(Uuid::new_v4());

    assert!(group.can_read(Principal::Everyone));
    assert!(group.can_read(stranger));
    assert!(!group.can_write(stranger));
    assert!(!group.can_admin(stranger));
  }

  #[test]
  fn invitation_requests_write_only_does_not_grant_read() {
    let creator = Uuid::new_v4();
    let group = Group::invitation_requests(creator);
    let stranger = Principal::Account(Uuid::new_v4());

    assert!(group.can_write(stranger));
    assert!(!group.can_read(stranger));
    assert!(!group.can_admin(stranger));
  }

  #[test]
  fn invitation_requests_creator_is_admin() {
    let creator = Uuid::new_v4();
    let group = Group::invitation_requests(creator);
    let who = Principal::Account(creator);

    assert!(group.can_admin(who));
    assert!(group.can_read(who));
    assert!(group.can_write(who));
  }

  #[test]
  fn account_member_does_not_match_other_accounts() {
    let a = Uuid::new_v4();
    let group = Group::new(vec![GroupMember {
      principal: Principal::Account(a),
      role:      Role::Writer,
    }]);

    assert!(group.can_write(Principal::Account(a)));
    assert!(!group.can_write(Principal::Account(Uuid::new_v4())));
    assert!(!group.can_write(Principal::Everyone));
  }
}
