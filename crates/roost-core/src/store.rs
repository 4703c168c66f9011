//! The `ArchiveStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roost-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{enrich::LikeState, stats::AccountCount, tweet::TweetRecord};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ArchiveStore::list_tweets`] and
/// [`ArchiveStore::count_tweets`]. Results are ordered newest first, undated
/// records last.
#[derive(Debug, Clone, Default)]
pub struct TweetQuery {
  /// Only records posted (or retweeted) by this handle.
  pub account:                 Option<String>,
  /// Case-insensitive substring over text, hashtags, and handle.
  pub text:                    Option<String>,
  /// Only records showing at least one photo or video.
  pub with_media:              bool,
  pub with_video:              bool,
  pub include_hidden_accounts: bool,
  pub include_hidden_tweets:   bool,
  /// Only tweets this viewer liked.
  pub liked_by:                Option<String>,
  /// Only tweets from accounts this viewer liked.
  pub from_liked_accounts_of:  Option<String>,
  pub limit:                   Option<usize>,
  pub offset:                  Option<usize>,
}

impl TweetQuery {
  pub fn account(handle: impl Into<String>) -> Self {
    Self { account: Some(handle.into()), ..Self::default() }
  }

  pub fn page(mut self, offset: usize, limit: usize) -> Self {
    self.offset = Some(offset);
    self.limit = Some(limit);
    self
  }
}

/// A handle someone asked for that the archive does not hold yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedAccount {
  pub account:            String,
  pub first_requested_at: DateTime<Utc>,
  pub requests:           u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Roost archive backend.
///
/// Likes are per viewer; hidden accounts and hidden tweets are global.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ArchiveStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tweets ────────────────────────────────────────────────────────────

  /// Insert or replace a record by id. Returns `true` if it was new.
  fn put_tweet(
    &self,
    record: TweetRecord,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_tweet<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<TweetRecord>, Self::Error>> + Send + 'a;

  fn list_tweets<'a>(
    &'a self,
    query: &'a TweetQuery,
  ) -> impl Future<Output = Result<Vec<TweetRecord>, Self::Error>> + Send + 'a;

  /// Number of records matching `query`, ignoring its limit and offset.
  fn count_tweets<'a>(
    &'a self,
    query: &'a TweetQuery,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Record counts per account, most prolific first.
  fn account_counts(
    &self,
    include_hidden: bool,
  ) -> impl Future<Output = Result<Vec<AccountCount>, Self::Error>> + Send + '_;

  // ── Likes ─────────────────────────────────────────────────────────────

  /// Returns `true` if the like is new.
  fn like_tweet<'a>(
    &'a self,
    viewer: &'a str,
    tweet_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Like many tweets at once. Returns how many likes were new.
  fn like_tweets<'a>(
    &'a self,
    viewer: &'a str,
    tweet_ids: &'a [String],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Returns `true` if a like was removed.
  fn unlike_tweet<'a>(
    &'a self,
    viewer: &'a str,
    tweet_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn like_account<'a>(
    &'a self,
    viewer: &'a str,
    account: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn unlike_account<'a>(
    &'a self,
    viewer: &'a str,
    account: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Everything `viewer` has liked, ready for enrichment.
  fn like_state<'a>(
    &'a self,
    viewer: &'a str,
  ) -> impl Future<Output = Result<LikeState, Self::Error>> + Send + 'a;

  // ── Hidden accounts and tweets ────────────────────────────────────────

  /// Returns `true` if the account was not hidden before.
  fn hide_account<'a>(
    &'a self,
    account: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn unhide_account<'a>(
    &'a self,
    account: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn is_account_hidden<'a>(
    &'a self,
    account: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn hidden_accounts(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  fn hide_tweet<'a>(
    &'a self,
    tweet_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn unhide_tweet<'a>(
    &'a self,
    tweet_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn hidden_tweets(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Requested accounts ────────────────────────────────────────────────

  /// Note that someone looked for `account` and found nothing.
  fn record_requested_account<'a>(
    &'a self,
    account: &'a str,
  ) -> impl Future<Output = Result<RequestedAccount, Self::Error>> + Send + 'a;

  fn requested_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<RequestedAccount>, Self::Error>> + Send + '_;
}
