//! Handlers for `/notifications` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/notifications` | Records a sent digest; the id is assigned here |
//! | `GET`  | `/notifications?email=<addr>` | Most recent first |
//! | `GET`  | `/notifications/{id}` | 400 for a malformed id, 404 if unknown |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use billwatch_core::{
  notification::{NewNotification, Notification, NotificationId},
  store::SubscriptionStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

/// `POST /notifications`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(input): Json<NewNotification>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore,
{
  let notification = state
    .store
    .record_notification(input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(notification)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub email: String,
}

/// `GET /notifications?email=<addr>`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: SubscriptionStore,
{
  let notifications = state
    .store
    .list_notifications(&params.email)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(notifications))
}

/// `GET /notifications/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(raw): Path<String>,
) -> Result<Json<Notification>, ApiError>
where
  S: SubscriptionStore,
{
  let id = NotificationId::parse(&raw)?;
  state
    .store
    .get_notification(id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("notification {raw}")))
}
