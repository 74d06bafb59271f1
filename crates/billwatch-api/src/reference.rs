//! Handlers that mirror legislative reference data into the store.
//!
//! Ids contain `/`, so entities travel in the body rather than the path.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/bills`  | Body: a bill reference; insert or refresh |
//! | `POST` | `/people` | Body: a person reference; insert or refresh |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use billwatch_core::{
  reference::{BillRef, PersonRef},
  store::SubscriptionStore,
};

use crate::{ApiState, error::ApiError};

/// `POST /bills`
pub async fn put_bill<S>(
  State(state): State<ApiState<S>>,
  Json(bill): Json<BillRef>,
) -> Result<StatusCode, ApiError>
where
  S: SubscriptionStore,
{
  state.store.put_bill(bill).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /people`
pub async fn put_person<S>(
  State(state): State<ApiState<S>>,
  Json(person): Json<PersonRef>,
) -> Result<StatusCode, ApiError>
where
  S: SubscriptionStore,
{
  state.store.put_person(person).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
