//! JSON REST layer for the Guild membership store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`guild_core::store::GuildStore`]. TLS and config loading live in the
//! server binary; handlers here only know the store.

pub mod error;
pub mod principal;
pub mod routes;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use guild_core::store::GuildStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use routes::{accounts, invitations, organizations, requests};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Local TLS material for the dev server. Both files must exist on disk or
/// startup fails.
#[derive(Debug, Deserialize, Clone)]
pub struct TlsConfig {
  pub key_path:  PathBuf,
  pub cert_path: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub tls:        Option<TlsConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(store: Arc<S>) -> Router<()>
where
  S: GuildStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Accounts
    .route("/accounts", post(accounts::create::<S>))
    .route("/accounts/{id}", get(accounts::get_one::<S>))
    .route("/accounts/{id}/login", post(accounts::login::<S>))
    .route("/accounts/{id}/profile", get(accounts::get_profile::<S>))
    // Organizations
    .route(
      "/accounts/{id}/organizations",
      get(organizations::list::<S>).post(organizations::create::<S>),
    )
    .route(
      "/organizations/{id}/activities",
      post(organizations::add_activity::<S>),
    )
    // Invitations
    .route(
      "/accounts/{id}/invitations",
      get(invitations::list::<S>).post(invitations::create::<S>),
    )
    .route("/invitations/{id}/revoke", post(invitations::revoke::<S>))
    .route("/invitations/{id}/archive", post(invitations::archive::<S>))
    .route(
      "/invitations/{id}/requests",
      get(invitations::list_requests::<S>)
        .post(invitations::submit_request::<S>),
    )
    // Join requests
    .route("/accounts/{id}/requests", get(requests::list_mine::<S>))
    .route("/requests/{id}/approve", post(requests::approve::<S>))
    .route("/requests/{id}/reject", post(requests::reject::<S>))
    .route("/requests/{id}/archive", post(requests::archive::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_config_deserialises_with_tls() {
    let cfg: ServerConfig = toml_from_str(
      r#"
        host = "myapp.local"
        port = 8443
        store_path = "guild.db"

        [tls]
        key_path = "./localhost+3-key.pem"
        cert_path = "./localhost+3.pem"
      "#,
    );
    assert_eq!(cfg.host, "myapp.local");
    let tls = cfg.tls.expect("tls section");
    assert_eq!(tls.key_path, PathBuf::from("./localhost+3-key.pem"));
    assert_eq!(tls.cert_path, PathBuf::from("./localhost+3.pem"));
  }

  #[test]
  fn server_config_tls_is_optional() {
    let cfg: ServerConfig = toml_from_str(
      r#"
        host = "127.0.0.1"
        port = 8080
        store_path = "guild.db"
      "#,
    );
    assert!(cfg.tls.is_none());
  }

  fn toml_from_str(s: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(s, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }
}
