//! Per-request enrichment context and the response shapes shared by several
//! handlers.

use roost_core::{
  enrich::{EnrichedTweet, Enricher, LikeState, StatusIds},
  gallery::GalleryItem,
  page::{Page, offset},
  store::{ArchiveStore, TweetQuery},
  text::HtmlFormatter,
  tweet::TweetRecord,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, viewer::Viewer};

// ─── Query params ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub page: Option<usize>,
}

impl PageParams {
  pub fn page(&self) -> usize { self.page.unwrap_or(1).max(1) }
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// A page of enriched tweets.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetPage {
  pub tweets:       Vec<EnrichedTweet>,
  pub current_page: usize,
  pub total_pages:  usize,
  pub total:        usize,
}

impl From<Page<EnrichedTweet>> for TweetPage {
  fn from(page: Page<EnrichedTweet>) -> Self {
    Self {
      tweets:       page.items,
      current_page: page.current_page,
      total_pages:  page.total_pages,
      total:        page.total,
    }
  }
}

/// A page of gallery items.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPage {
  pub media:        Vec<GalleryItem>,
  pub current_page: usize,
  pub total_pages:  usize,
  pub total:        usize,
}

impl From<Page<GalleryItem>> for GalleryPage {
  fn from(page: Page<GalleryItem>) -> Self {
    Self {
      media:        page.items,
      current_page: page.current_page,
      total_pages:  page.total_pages,
      total:        page.total,
    }
  }
}

/// Result of an idempotent add/remove: `changed` is false when the state
/// already matched.
#[derive(Debug, Serialize)]
pub struct Toggle {
  pub success: bool,
  pub changed: bool,
}

impl Toggle {
  pub fn new(changed: bool) -> Self { Self { success: true, changed } }
}

// ─── Enrichment ──────────────────────────────────────────────────────────────

/// Everything needed to enrich records for one viewer.
pub struct ViewContext {
  pub likes: LikeState,
  formatter: HtmlFormatter,
}

impl ViewContext {
  pub async fn load<S>(state: &AppState<S>, viewer: &Viewer) -> Result<Self, ApiError>
  where
    S: ArchiveStore + Clone + 'static,
  {
    let likes = state
      .store
      .like_state(viewer.as_str())
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    Ok(Self {
      likes,
      formatter: HtmlFormatter::new(state.settings.profile_base.clone()),
    })
  }

  fn enricher(&self) -> Enricher<'_> {
    Enricher::new(&self.likes)
      .with_formatter(&self.formatter)
      .with_quote_resolver(&StatusIds)
  }

  pub fn enrich(&self, record: &TweetRecord) -> EnrichedTweet { self.enricher().enrich(record) }

  pub fn enrich_all(&self, records: &[TweetRecord]) -> Vec<EnrichedTweet> {
    self.enricher().enrich_all(records)
  }

  /// Liked accounts, sorted.
  pub fn favorite_accounts(&self) -> Vec<String> {
    let mut accounts: Vec<String> = self.likes.accounts.iter().cloned().collect();
    accounts.sort();
    accounts
  }
}

// ─── Store helpers ───────────────────────────────────────────────────────────

/// Fetch one page of `query` from the store, with totals.
pub async fn load_page<S>(
  store: &S,
  query: TweetQuery,
  page: usize,
  per_page: usize,
) -> Result<Page<TweetRecord>, ApiError>
where
  S: ArchiveStore,
{
  let total = store
    .count_tweets(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let query = query.page(offset(page, per_page), per_page);
  let records = store
    .list_tweets(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Page::from_parts(records, page, per_page, total))
}
