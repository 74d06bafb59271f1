//! Handlers for subscription endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/{user_id}/subscriptions` | Optional `?active=true` |
//! | `POST` | `/users/{user_id}/subscriptions` | Body: `{"kind":"bill","bill_id":"..."}` etc. |
//! | `GET`  | `/subscriptions/{id}` | 404 if not found |
//! | `POST` | `/subscriptions/{id}/activate` | |
//! | `POST` | `/subscriptions/{id}/deactivate` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use billwatch_core::{
  reference::{PrettyUrl, UserId},
  store::SubscriptionStore,
  subscription::{Subscription, SubscriptionKind, SubscriptionSpec},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// A subscription together with its presentation fields.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
  #[serde(flatten)]
  pub subscription: Subscription,
  pub kind:         SubscriptionKind,
  pub pretty:       String,
  pub site_url:     String,
}

impl SubscriptionView {
  pub fn new(subscription: Subscription, urls: &dyn PrettyUrl) -> Self {
    Self {
      kind: subscription.kind(),
      pretty: subscription.pretty(),
      site_url: subscription.site_url(urls),
      subscription,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub active: bool,
}

/// `GET /users/{user_id}/subscriptions[?active=true]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<UserId>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubscriptionView>>, ApiError>
where
  S: SubscriptionStore,
{
  let subscriptions = state
    .store
    .list_subscriptions(user_id, params.active)
    .await
    .map_err(ApiError::store)?;
  let views = subscriptions
    .into_iter()
    .map(|s| SubscriptionView::new(s, state.urls.as_ref()))
    .collect();
  Ok(Json(views))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users/{user_id}/subscriptions`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<UserId>,
  Json(spec): Json<SubscriptionSpec>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore,
{
  let kind = spec.kind();
  let subscription = state.store.subscribe(user_id, spec).await.map_err(ApiError::store)?;
  tracing::info!(%user_id, %kind, id = %subscription.subscription_id, "subscription created");
  Ok((
    StatusCode::CREATED,
    Json(SubscriptionView::new(subscription, state.urls.as_ref())),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subscriptions/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionView>, ApiError>
where
  S: SubscriptionStore,
{
  let subscription = state
    .store
    .get_subscription(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subscription {id}")))?;
  Ok(Json(SubscriptionView::new(subscription, state.urls.as_ref())))
}

// ─── Toggle ───────────────────────────────────────────────────────────────────

async fn set_active<S>(
  state: ApiState<S>,
  id: Uuid,
  active: bool,
) -> Result<Json<SubscriptionView>, ApiError>
where
  S: SubscriptionStore,
{
  let subscription = state.store.set_active(id, active).await.map_err(ApiError::store)?;
  Ok(Json(SubscriptionView::new(subscription, state.urls.as_ref())))
}

/// `POST /subscriptions/{id}/activate`
pub async fn activate<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionView>, ApiError>
where
  S: SubscriptionStore,
{
  set_active(state, id, true).await
}

/// `POST /subscriptions/{id}/deactivate`
pub async fn deactivate<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionView>, ApiError>
where
  S: SubscriptionStore,
{
  set_active(state, id, false).await
}
