//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users/{user_id}` | Registers the user with a default profile; 409 if known |
//! | `DELETE` | `/users/{user_id}` | Removes profile and subscriptions |
//! | `GET`    | `/users/{user_id}/profile` | 404 if not found |
//! | `PATCH`  | `/users/{user_id}/profile` | Body: any subset of the profile fields |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use billwatch_core::{
  profile::{Profile, ProfileUpdate},
  reference::UserId,
  store::SubscriptionStore,
};

use crate::{ApiState, error::ApiError};

/// `POST /users/{user_id}`
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore,
{
  let profile = state.store.register_user(user_id).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `DELETE /users/{user_id}`
pub async fn remove<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<UserId>,
) -> Result<StatusCode, ApiError>
where
  S: SubscriptionStore,
{
  state.store.delete_user(user_id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/{user_id}/profile`
pub async fn get_profile<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<UserId>,
) -> Result<Json<Profile>, ApiError>
where
  S: SubscriptionStore,
{
  state
    .store
    .get_profile(user_id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("profile for user {user_id}")))
}

/// `PATCH /users/{user_id}/profile`, body: `{"subscription_frequency":"daily"}`
pub async fn update_profile<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<UserId>,
  Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError>
where
  S: SubscriptionStore,
{
  let profile = state
    .store
    .update_profile(user_id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(profile))
}
