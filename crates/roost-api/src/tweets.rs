//! Handlers for `/tweets` and `/search`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tweets` | Feed, newest first; `?page=N` |
//! | `POST` | `/tweets` | Body: one record or an array of records |
//! | `GET`  | `/tweets/{id}` | Tweet, quoted tweet, related tweets; ETag aware |
//! | `GET`  | `/search` | `?q=text&page=N`; blank `q` yields an empty page |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use roost_core::{
  enrich::EnrichedTweet,
  page::Page,
  store::{ArchiveStore, TweetQuery},
  tweet::TweetRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  AppState,
  error::ApiError,
  etag::{compute_etag, not_modified},
  view::{PageParams, TweetPage, ViewContext, load_page},
  viewer::{VIEWER_HEADER, Viewer},
};

/// How many other tweets of the same account accompany a tweet.
const RELATED_TWEETS: usize = 5;

// ─── Feed ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
  #[serde(flatten)]
  pub page:              TweetPage,
  /// Visible accounts, most prolific first.
  pub all_accounts:      Vec<String>,
  pub favorite_accounts: Vec<String>,
}

/// `GET /tweets[?page=N]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<PageParams>,
) -> Result<Json<FeedResponse>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let records = load_page(
    &*state.store,
    TweetQuery::default(),
    params.page(),
    state.settings.tweets_per_page,
  )
  .await?;

  let accounts = state
    .store
    .account_counts(false)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let ctx = ViewContext::load(&state, &viewer).await?;
  Ok(Json(FeedResponse {
    page:              records.map(|r| ctx.enrich(&r)).into(),
    all_accounts:      accounts.into_iter().map(|c| c.account).collect(),
    favorite_accounts: ctx.favorite_accounts(),
  }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestSummary {
  pub created: usize,
  pub updated: usize,
}

/// `POST /tweets`, body: a record, or an array of records
///
/// All records are validated before any is stored.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let values = match body {
    Value::Array(items) => items,
    single => vec![single],
  };
  let records = values
    .into_iter()
    .enumerate()
    .map(|(i, v)| {
      TweetRecord::from_json(v).map_err(|e| ApiError::BadRequest(format!("record {i}: {e}")))
    })
    .collect::<Result<Vec<_>, _>>()?;

  let mut summary = IngestSummary { created: 0, updated: 0 };
  for record in records {
    let inserted = state
      .store
      .put_tweet(record)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    if inserted {
      summary.created += 1;
    } else {
      summary.updated += 1;
    }
  }

  tracing::info!(created = summary.created, updated = summary.updated, "stored tweet records");
  Ok((StatusCode::CREATED, Json(summary)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetDetail {
  pub tweet:        EnrichedTweet,
  /// The quoted tweet, when the quote links to a stored tweet.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub quoted_tweet: Option<EnrichedTweet>,
  pub related:      Vec<EnrichedTweet>,
}

/// `GET /tweets/{id}`. 404 if not found; 304 when `If-None-Match` matches
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let record = state
    .store
    .get_tweet(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("tweet {id} not found")))?;

  let ctx = ViewContext::load(&state, &viewer).await?;
  let tweet = ctx.enrich(&record);

  let quoted_tweet = match tweet.quoted_tweet_id.as_deref() {
    Some(quoted_id) => state
      .store
      .get_tweet(quoted_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .map(|r| ctx.enrich(&r)),
    None => None,
  };

  let mut related_query = TweetQuery::account(record.compte());
  related_query.limit = Some(RELATED_TWEETS + 1);
  let related: Vec<TweetRecord> = state
    .store
    .list_tweets(&related_query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .into_iter()
    .filter(|r| r.id() != record.id())
    .take(RELATED_TWEETS)
    .collect();

  let detail = TweetDetail {
    tweet,
    quoted_tweet,
    related: ctx.enrich_all(&related),
  };

  let etag = compute_etag(&detail)?;
  if not_modified(&headers, &etag) {
    return Ok(
      (
        StatusCode::NOT_MODIFIED,
        [(header::ETAG, etag), (header::VARY, VIEWER_HEADER.to_owned())],
      )
        .into_response(),
    );
  }
  Ok(
    (
      [(header::ETAG, etag), (header::VARY, VIEWER_HEADER.to_owned())],
      Json(detail),
    )
      .into_response(),
  )
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub q:    String,
  pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
  pub query: String,
  #[serde(flatten)]
  pub page:  TweetPage,
}

/// `GET /search?q=text[&page=N]`: matches text, hashtags, and handles
pub async fn search<S>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError>
where
  S: ArchiveStore + Clone + 'static,
{
  let q = params.q.trim();
  if q.is_empty() {
    return Ok(Json(SearchResponse {
      query: String::new(),
      page:  Page::<EnrichedTweet>::empty().into(),
    }));
  }

  let query = TweetQuery { text: Some(q.to_owned()), ..Default::default() };
  let page = PageParams { page: params.page }.page();
  let records = load_page(&*state.store, query, page, state.settings.tweets_per_page).await?;

  let ctx = ViewContext::load(&state, &viewer).await?;
  Ok(Json(SearchResponse {
    query: q.to_owned(),
    page:  records.map(|r| ctx.enrich(&r)).into(),
  }))
}
