//! Route handlers, grouped by resource.

pub mod accounts;
pub mod invitations;
pub mod organizations;
pub mod requests;

use serde::Deserialize;

/// Common query parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_archived: bool,
}
