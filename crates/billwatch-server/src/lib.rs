//! Server wiring for billwatch: runtime configuration and the top-level
//! router that mounts the JSON API.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use billwatch_api::{SiteRoutes, api_router};
use billwatch_core::store::SubscriptionStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BILLWATCH_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/billwatch/billwatch.db") }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `BILLWATCH_*` env vars.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("BILLWATCH"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API under `/api`, a liveness probe at `/health`, and request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: SubscriptionStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", api_router(store, Arc::new(SiteRoutes)))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use billwatch_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn oneshot(method: &str, uri: &str) -> StatusCode {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    router(Arc::new(store)).oneshot(req).await.unwrap().status()
  }

  #[tokio::test]
  async fn health_is_ok() {
    assert_eq!(oneshot("GET", "/health").await, StatusCode::OK);
  }

  #[tokio::test]
  async fn api_is_nested() {
    let user = "4f1c2a9e-8d1b-4a57-9c1e-2b7d7f0e6a11";
    assert_eq!(oneshot("POST", &format!("/api/users/{user}")).await, StatusCode::CREATED);
    // Not mounted at the root.
    assert_eq!(oneshot("POST", &format!("/users/{user}")).await, StatusCode::NOT_FOUND);
  }

  #[test]
  fn missing_file_uses_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/billwatch.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.address(), format!("{}:8080", cfg.host));
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = std::env::temp_dir().join(format!("billwatch-cfg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, "port = 9000\nstore_path = \"/var/lib/billwatch.db\"\n").unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/billwatch.db"));
    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/db.sqlite")), PathBuf::from(home).join("db.sqlite"));
    assert_eq!(expand_tilde(Path::new("/abs/db.sqlite")), PathBuf::from("/abs/db.sqlite"));
  }
}
