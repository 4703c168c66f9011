//! Handlers for the archive-wide media endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/media` | Tweets with photos or videos; `?page=N` |
//! | `GET`  | `/videos` | Tweets with videos; `?page=N` |
//! | `GET`  | `/all_media` | Flat gallery; `?page=N[&type=photo\|video]` |

use axum::{
  Json,
  extract::{Query, State},
};
use roost_core::{
  gallery::gallery,
  media::MediaKind,
  page::paginate,
  store::{ArchiveStore, TweetQuery},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  view::{GalleryPage, PageParams, TweetPage, ViewContext, load_page},
  viewer::Viewer,
};

/// `GET /media[?page=N]`
pub async fn media<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<PageParams>,
) -> Result<Json<TweetPage>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let query = TweetQuery { with_media: true, ..Default::default() };
  let records = load_page(&*state.store, query, params.page(), state.settings.media_per_page).await?;
  let ctx = ViewContext::load(&state, &viewer).await?;
  Ok(Json(records.map(|r| ctx.enrich(&r)).into()))
}

/// `GET /videos[?page=N]`
pub async fn videos<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<PageParams>,
) -> Result<Json<TweetPage>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let query = TweetQuery { with_video: true, ..Default::default() };
  let records =
    load_page(&*state.store, query, params.page(), state.settings.videos_per_page).await?;
  let ctx = ViewContext::load(&state, &viewer).await?;
  Ok(Json(records.map(|r| ctx.enrich(&r)).into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryParams {
  pub page: Option<usize>,
  #[serde(rename = "type")]
  pub kind: Option<MediaKind>,
}

/// `GET /all_media[?page=N][&type=photo|video]`
pub async fn all_media<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<GalleryParams>,
) -> Result<Json<GalleryPage>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let query = TweetQuery {
    with_media: true,
    with_video: params.kind == Some(MediaKind::Video),
    ..Default::default()
  };
  let records = state
    .store
    .list_tweets(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let ctx = ViewContext::load(&state, &viewer).await?;

  let items = gallery(&ctx.enrich_all(&records), params.kind);
  let page = PageParams { page: params.page }.page();
  Ok(Json(paginate(items, page, state.settings.media_per_page).into()))
}
