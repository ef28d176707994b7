//! HTTP surface for the CHURCHOS access core.
//!
//! Exposes an axum [`Router`] backed by an [`AccessGuard`] over any
//! [`IdentityProvider`] and [`PrincipalStore`]. Every protected handler takes
//! a [`CurrentPrincipal`](extract::CurrentPrincipal) or an
//! [`Authorized`](extract::Authorized) extractor; there is no other path to
//! the store.

pub mod error;
pub mod extract;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::HeaderValue,
  routing::{get, put},
};
use churchos_auth::{AccessGuard, IdentityConfig};
use churchos_core::{identity::IdentityProvider, store::PrincipalStore};
use serde::Deserialize;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

use handlers::{auth, health, seal, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CHURCHOS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Origins allowed by CORS. Empty disables cross-origin access.
  #[serde(default)]
  pub allowed_origins: Vec<String>,
  pub identity:        IdentityConfig,
}

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("churchos.db") }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<P, S> {
  pub guard:  Arc<AccessGuard<P, S>>,
  pub config: Arc<ServerConfig>,
}

impl<P, S> Clone for AppState<P, S> {
  fn clone(&self) -> Self {
    Self {
      guard:  Arc::clone(&self.guard),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

fn cors_layer(origins: &[String]) -> CorsLayer {
  let allowed: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|o| match HeaderValue::from_str(o) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
        None
      }
    })
    .collect();

  if allowed.is_empty() {
    return CorsLayer::new();
  }
  CorsLayer::new()
    .allow_origin(AllowOrigin::list(allowed))
    .allow_methods(Any)
    .allow_headers(Any)
}

/// Build the application [`Router`].
pub fn router<P, S>(state: AppState<P, S>) -> Router
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
{
  let cors = cors_layer(&state.config.allowed_origins);

  Router::new()
    .route("/health",               get(health::health))
    .route("/api",                  get(health::api_info))
    .route("/api/auth/me",          get(auth::me::<P, S>))
    .route("/api/auth/permissions", get(auth::permissions::<P, S>))
    .route("/api/users",            get(users::list::<P, S>))
    .route("/api/users/{id}",       get(users::get_one::<P, S>))
    .route("/api/users/{id}/role",  put(users::assign_role::<P, S>))
    .route("/api/seal-status",      get(seal::seal_status))
    .layer(TraceLayer::new_for_http())
    .layer(cors)
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
