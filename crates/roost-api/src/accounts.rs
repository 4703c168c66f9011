//! Handlers for account listings and hiding.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/accounts` | Visible accounts with counts, hidden, and liked |
//! | `GET`    | `/accounts/requested` | Unknown handles someone looked for |
//! | `POST`   | `/hide/{handle}` | Hide an account everywhere but its profile |
//! | `DELETE` | `/hide/{handle}` | |
//! | `GET`    | `/hidden-tweets` | Ids of hidden tweets |
//! | `POST`   | `/hide-tweet/{id}` | Hide a tweet and retweets of it |
//! | `DELETE` | `/hide-tweet/{id}` | |

use axum::{
  Json,
  extract::{Path, State},
};
use roost_core::{
  stats::AccountCount,
  store::{ArchiveStore, RequestedAccount},
};
use serde::Serialize;

use crate::{
  AppState,
  error::ApiError,
  view::{Toggle, ViewContext},
  viewer::Viewer,
};

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
  pub all:       Vec<AccountCount>,
  pub hidden:    Vec<String>,
  pub favorites: Vec<String>,
}

/// `GET /accounts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
) -> Result<Json<AccountsResponse>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let all = state
    .store
    .account_counts(false)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let hidden = state
    .store
    .hidden_accounts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let ctx = ViewContext::load(&state, &viewer).await?;
  Ok(Json(AccountsResponse { all, hidden, favorites: ctx.favorite_accounts() }))
}

/// `GET /accounts/requested`
pub async fn requested<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<RequestedAccount>>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let requested = state
    .store
    .requested_accounts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(requested))
}

// ─── Hidden accounts ─────────────────────────────────────────────────────────

/// `POST /hide/{handle}`
pub async fn hide<S>(
  State(state): State<AppState<S>>,
  Path(handle): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let changed = state
    .store
    .hide_account(&handle)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::info!(account = %handle, changed, "hid account");
  Ok(Json(Toggle::new(changed)))
}

/// `DELETE /hide/{handle}`
pub async fn unhide<S>(
  State(state): State<AppState<S>>,
  Path(handle): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let changed = state
    .store
    .unhide_account(&handle)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Toggle::new(changed)))
}

// ─── Hidden tweets ───────────────────────────────────────────────────────────

/// `GET /hidden-tweets`
pub async fn hidden_tweets<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let ids = state
    .store
    .hidden_tweets()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ids))
}

/// `POST /hide-tweet/{id}`
pub async fn hide_tweet<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let changed = state
    .store
    .hide_tweet(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Toggle::new(changed)))
}

/// `DELETE /hide-tweet/{id}`
pub async fn unhide_tweet<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let changed = state
    .store
    .unhide_tweet(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Toggle::new(changed)))
}
