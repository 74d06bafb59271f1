//! JSON REST API for billwatch.
//!
//! Exposes an axum [`Router`] backed by any
//! [`billwatch_core::store::SubscriptionStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility; user ids arrive already
//! authenticated from the identity system.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", billwatch_api::api_router(store.clone(), Arc::new(SiteRoutes)))
//! ```

pub mod error;
pub mod notifications;
pub mod reference;
pub mod routes;
pub mod subscriptions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use billwatch_core::{reference::PrettyUrl, store::SubscriptionStore};

pub use error::ApiError;
pub use routes::SiteRoutes;

/// Shared handler state: the store and the link resolver used to render
/// `site_url` on subscriptions.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub urls:  Arc<dyn PrettyUrl + Send + Sync>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), urls: Arc::clone(&self.urls) }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, urls: Arc<dyn PrettyUrl + Send + Sync>) -> Router<()>
where
  S: SubscriptionStore + 'static,
{
  Router::new()
    // Users & profiles
    .route(
      "/users/{user_id}",
      post(users::register::<S>).delete(users::remove::<S>),
    )
    .route(
      "/users/{user_id}/profile",
      get(users::get_profile::<S>).patch(users::update_profile::<S>),
    )
    // Subscriptions
    .route(
      "/users/{user_id}/subscriptions",
      get(subscriptions::list::<S>).post(subscriptions::create::<S>),
    )
    .route("/subscriptions/{id}", get(subscriptions::get_one::<S>))
    .route("/subscriptions/{id}/activate", post(subscriptions::activate::<S>))
    .route("/subscriptions/{id}/deactivate", post(subscriptions::deactivate::<S>))
    // Reference data
    .route("/bills", post(reference::put_bill::<S>))
    .route("/people", post(reference::put_person::<S>))
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<S>).post(notifications::create::<S>),
    )
    .route("/notifications/{id}", get(notifications::get_one::<S>))
    .with_state(ApiState { store, urls })
}
