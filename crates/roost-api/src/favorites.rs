//! Handlers for the viewer's likes ("favorites").
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/favorites` | Liked tweets, including retweets of them; `?page=N` |
//! | `GET`    | `/favorite_accounts_tweets` | Tweets from liked accounts; `?page=N` |
//! | `GET`    | `/favorite/{id}` | `{"isFavorite": bool}` |
//! | `POST`   | `/favorite/{id}` | Like a tweet; a retweet likes its original |
//! | `DELETE` | `/favorite/{id}` | Unlike a tweet |
//! | `POST`   | `/favorite_account/{handle}` | Like an account |
//! | `DELETE` | `/favorite_account/{handle}` | Unlike an account |
//!
//! Favorites ignore hidden accounts: liking outranks hiding.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use roost_core::store::{ArchiveStore, TweetQuery};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  view::{PageParams, Toggle, TweetPage, ViewContext, load_page},
  viewer::Viewer,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
  #[serde(flatten)]
  pub page:              TweetPage,
  pub favorite_accounts: Vec<String>,
}

async fn favorites_page<S>(
  state: &AppState<S>,
  viewer: &Viewer,
  query: TweetQuery,
  page: usize,
) -> Result<FavoritesResponse, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let query = TweetQuery { include_hidden_accounts: true, ..query };
  let records = load_page(&*state.store, query, page, state.settings.tweets_per_page).await?;
  let ctx = ViewContext::load(state, viewer).await?;
  Ok(FavoritesResponse {
    page:              records.map(|r| ctx.enrich(&r)).into(),
    favorite_accounts: ctx.favorite_accounts(),
  })
}

/// `GET /favorites[?page=N]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<PageParams>,
) -> Result<Json<FavoritesResponse>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let query = TweetQuery { liked_by: Some(viewer.0.clone()), ..Default::default() };
  Ok(Json(favorites_page(&state, &viewer, query, params.page()).await?))
}

/// `GET /favorite_accounts_tweets[?page=N]`
pub async fn account_tweets<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<PageParams>,
) -> Result<Json<FavoritesResponse>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let query = TweetQuery {
    from_liked_accounts_of: Some(viewer.0.clone()),
    ..Default::default()
  };
  Ok(Json(favorites_page(&state, &viewer, query, params.page()).await?))
}

// ─── Tweet likes ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatus {
  pub is_favorite: bool,
}

/// The id a like on `id` is recorded under: the displayed original when `id`
/// is a stored retweet, otherwise `id` itself.
async fn liked_id<S>(state: &AppState<S>, id: &str) -> Result<String, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let record = state
    .store
    .get_tweet(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(record.map_or_else(|| id.to_owned(), |r| r.content().id.clone()))
}

/// `GET /favorite/{id}`
pub async fn status<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<String>,
) -> Result<Json<FavoriteStatus>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let target = liked_id(&state, &id).await?;
  let likes = state
    .store
    .like_state(viewer.as_str())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(FavoriteStatus { is_favorite: likes.likes_tweet(&target) }))
}

/// `POST /favorite/{id}`. Liking a retweet likes its original.
pub async fn like<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let target = liked_id(&state, &id).await?;
  let changed = state
    .store
    .like_tweet(viewer.as_str(), &target)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Toggle::new(changed)))
}

/// `DELETE /favorite/{id}`
///
/// Removes the like on the original and any like recorded under the
/// retweet's own id.
pub async fn unlike<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let target = liked_id(&state, &id).await?;
  let mut changed = state
    .store
    .unlike_tweet(viewer.as_str(), &target)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if target != id {
    changed |= state
      .store
      .unlike_tweet(viewer.as_str(), &id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
  }
  Ok(Json(Toggle::new(changed)))
}

// ─── Account likes ───────────────────────────────────────────────────────────

/// `POST /favorite_account/{handle}`
pub async fn like_account<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(handle): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let changed = state
    .store
    .like_account(viewer.as_str(), &handle)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Toggle::new(changed)))
}

/// `DELETE /favorite_account/{handle}`
pub async fn unlike_account<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(handle): Path<String>,
) -> Result<Json<Toggle>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let changed = state
    .store
    .unlike_account(viewer.as_str(), &handle)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Toggle::new(changed)))
}
