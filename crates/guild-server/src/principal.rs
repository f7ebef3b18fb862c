//! Acting-principal extraction.
//!
//! This is a development server: the caller identifies itself with an
//! `x-guild-account` header carrying its account UUID, and an absent header
//! means the anonymous [`Principal::Everyone`]. Real authentication is an
//! outer concern.

use axum::http::HeaderMap;
use guild_core::acl::Principal;
use uuid::Uuid;

use crate::error::ApiError;

pub const ACCOUNT_HEADER: &str = "x-guild-account";

/// Who is making this request.
pub fn acting_principal(headers: &HeaderMap) -> Result<Principal, ApiError> {
  let Some(value) = headers.get(ACCOUNT_HEADER) else {
    return Ok(Principal::Everyone);
  };

  let s = value
    .to_str()
    .map_err(|_| ApiError::BadRequest("malformed account header".into()))?;

  let id = Uuid::parse_str(s).map_err(|_| {
    ApiError::BadRequest(format!("invalid account id in header: {s:?}"))
  })?;

  Ok(Principal::Account(id))
}

/// The acting account's UUID, for operations anonymous callers cannot
/// perform.
pub fn require_account(headers: &HeaderMap) -> Result<Uuid, ApiError> {
  match acting_principal(headers)? {
    Principal::Account(id) => Ok(id),
    Principal::Everyone => Err(ApiError::Forbidden(
      "this operation requires an acting account".into(),
    )),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_header_is_everyone() {
    let headers = HeaderMap::new();
    assert_eq!(acting_principal(&headers).unwrap(), Principal::Everyone);
    assert!(require_account(&headers).is_err());
  }

  #[test]
  fn valid_header_is_account() {
    let id = Uuid::new_v4();
    let mut headers = HeaderMap::new();
    headers.insert(ACCOUNT_HEADER, id.to_string().parse().unwrap());

    assert_eq!(
      acting_principal(&headers).unwrap(),
      Principal::Account(id)
    );
    assert_eq!(require_account(&headers).unwrap(), id);
  }

  #[test]
  fn garbage_header_is_bad_request() {
    let mut headers = HeaderMap::new();
    headers.insert(ACCOUNT_HEADER, "not-a-uuid".parse().unwrap());

    assert!(matches!(
      acting_principal(&headers),
      Err(ApiError::BadRequest(_))
    ));
  }
}
