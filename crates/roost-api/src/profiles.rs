//! Handlers for `/profile/{handle}` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profile/{handle}` | Tweets plus account statistics; `?page=N` |
//! | `GET`  | `/profile/{handle}/media` | Photo and video gallery; `?page=N` |
//! | `GET`  | `/profile/{handle}/videos` | Video gallery; `?page=N` |
//! | `POST` | `/profile/{handle}/like_all` | Like every tweet; `?media_only=true` |
//!
//! Unknown handles answer 404 and are remembered as requested accounts.
//! Hidden accounts stay reachable here.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use roost_core::{
  gallery::gallery,
  media::{MediaKind, normalize_media},
  page::paginate,
  stats::{AccountCount, top_mentions, top_retweeted},
  store::{ArchiveStore, TweetQuery},
  tweet::TweetRecord,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  view::{GalleryPage, PageParams, TweetPage, ViewContext},
  viewer::Viewer,
};

/// How many entries the top-account lists keep.
const TOP_ACCOUNTS: usize = 10;

/// Every record of `handle`, or 404 after noting the request.
async fn profile_records<S>(state: &AppState<S>, handle: &str) -> Result<Vec<TweetRecord>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let query = TweetQuery {
    include_hidden_accounts: true,
    ..TweetQuery::account(handle)
  };
  let records = state
    .store
    .list_tweets(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if records.is_empty() {
    let requested = state
      .store
      .record_requested_account(handle)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    tracing::info!(account = handle, requests = requested.requests, "requested unknown account");
    return Err(ApiError::NotFound(format!("account {handle} is not in the archive")));
  }
  Ok(records)
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
  pub account:                String,
  pub hidden:                 bool,
  pub is_account_liked:       bool,
  #[serde(flatten)]
  pub page:                   TweetPage,
  /// Number of displayable media items across all of the account's tweets.
  pub media_count:            usize,
  pub top_retweeted_accounts: Vec<AccountCount>,
  pub top_mentioned_accounts: Vec<AccountCount>,
}

/// `GET /profile/{handle}[?page=N]`
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(handle): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<ProfileResponse>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let records = profile_records(&state, &handle).await?;
  let hidden = state
    .store
    .is_account_hidden(&handle)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let ctx = ViewContext::load(&state, &viewer).await?;

  let media_count = records.iter().map(|r| normalize_media(r.content()).len()).sum();
  let mut top_retweeted_accounts = top_retweeted(&records);
  top_retweeted_accounts.truncate(TOP_ACCOUNTS);
  let mut top_mentioned_accounts = top_mentions(&records);
  top_mentioned_accounts.truncate(TOP_ACCOUNTS);

  let page = paginate(records, params.page(), state.settings.tweets_per_page);
  Ok(Json(ProfileResponse {
    is_account_liked: ctx.likes.likes_account(&handle),
    page: page.map(|r| ctx.enrich(&r)).into(),
    account: handle,
    hidden,
    media_count,
    top_retweeted_accounts,
    top_mentioned_accounts,
  }))
}

// ─── Galleries ───────────────────────────────────────────────────────────────

async fn profile_gallery<S>(
  state: &AppState<S>,
  viewer: &Viewer,
  handle: &str,
  page: usize,
  kind: Option<MediaKind>,
) -> Result<GalleryPage, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let records: Vec<TweetRecord> = profile_records(state, handle)
    .await?
    .into_iter()
    .filter(|r| r.content().has_media())
    .collect();
  let ctx = ViewContext::load(state, viewer).await?;

  let items = gallery(&ctx.enrich_all(&records), kind);
  let per_page = match kind {
    Some(MediaKind::Video) => state.settings.videos_per_page,
    _ => state.settings.media_per_page,
  };
  Ok(paginate(items, page, per_page).into())
}

/// `GET /profile/{handle}/media[?page=N]`
pub async fn media<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(handle): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<GalleryPage>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let page = profile_gallery(&state, &viewer, &handle, params.page(), None).await?;
  Ok(Json(page))
}

/// `GET /profile/{handle}/videos[?page=N]`
pub async fn videos<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(handle): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<GalleryPage>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let page =
    profile_gallery(&state, &viewer, &handle, params.page(), Some(MediaKind::Video)).await?;
  Ok(Json(page))
}

// ─── Like all ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LikeAllParams {
  #[serde(default)]
  pub media_only: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeAllResponse {
  /// Likes that did not exist before.
  pub liked: usize,
  /// Tweets considered.
  pub total: usize,
}

/// `POST /profile/{handle}/like_all[?media_only=true]`
///
/// Likes the displayed tweet of every record, so retweets like their
/// original.
pub async fn like_all<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(handle): Path<String>,
  Query(params): Query<LikeAllParams>,
) -> Result<Json<LikeAllResponse>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let records = profile_records(&state, &handle).await?;

  let mut ids: Vec<String> = records
    .iter()
    .map(TweetRecord::content)
    .filter(|t| !params.media_only || t.has_media())
    .map(|t| t.id.clone())
    .collect();
  ids.sort();
  ids.dedup();

  let liked = state
    .store
    .like_tweets(viewer.as_str(), &ids)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(account = %handle, viewer = viewer.as_str(), liked, "liked all tweets of account");
  Ok(Json(LikeAllResponse { liked, total: ids.len() }))
}
