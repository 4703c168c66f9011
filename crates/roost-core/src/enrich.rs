//! The enrichment pipeline: a stored record plus the viewer's likes in, the
//! display-ready tweet out.
//!
//! Enrichment is pure. It never touches storage; callers load the
//! [`LikeState`] once per request and enrich every record against it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
  media::{MediaItem, normalize_media},
  text::{StatusLink, TextFormatter},
  tweet::{Post, Tweet, TweetRecord},
};

/// Keys this module derives. Stale copies persisted inside a record's extra
/// fields are dropped so they never shadow the fresh values.
const DERIVED_KEYS: &[&str] = &[
  "allMedia",
  "isLiked",
  "isAccountLiked",
  "isRetweet",
  "retweetedBy",
  "quotedTweetId",
  "formattedQuote",
  "quotedTweet",
  "isFavorite",
  "isFavoriteAccount",
];

// ─── Likes ───────────────────────────────────────────────────────────────────

/// What one viewer has liked: individual tweets and whole accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeState {
  pub tweet_ids: HashSet<String>,
  pub accounts:  HashSet<String>,
}

impl LikeState {
  pub fn new<T, A>(tweet_ids: T, accounts: A) -> Self
  where
    T: IntoIterator,
    T::Item: Into<String>,
    A: IntoIterator,
    A::Item: Into<String>,
  {
    Self {
      tweet_ids: tweet_ids.into_iter().map(Into::into).collect(),
      accounts:  accounts.into_iter().map(Into::into).collect(),
    }
  }

  pub fn likes_tweet(&self, id: &str) -> bool { self.tweet_ids.contains(id) }

  pub fn likes_account(&self, handle: &str) -> bool { self.accounts.contains(handle) }
}

// ─── Quote resolution ────────────────────────────────────────────────────────

/// Maps a quoted status link to the id recorded as `quotedTweetId`.
pub trait QuoteResolver {
  fn resolve(&self, link: &StatusLink<'_>) -> String;
}

/// Records the numeric status id as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusIds;

impl QuoteResolver for StatusIds {
  fn resolve(&self, link: &StatusLink<'_>) -> String { link.status_id.to_owned() }
}

// ─── EnrichedTweet ───────────────────────────────────────────────────────────

/// A tweet ready for display. For a retweet the content is the original's
/// and `retweeted_by` names the retweeter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTweet {
  #[serde(flatten)]
  pub tweet:            Tweet,
  pub all_media:        Vec<MediaItem>,
  pub is_liked:         bool,
  pub is_account_liked: bool,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub is_retweet:       bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub retweeted_by:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quoted_tweet_id:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub formatted_quote:  Option<String>,
}

// ─── Enricher ────────────────────────────────────────────────────────────────

/// Enrichment context for one viewer. Cheap to build; borrow-only.
#[derive(Clone, Copy)]
pub struct Enricher<'a> {
  likes:     &'a LikeState,
  formatter: Option<&'a dyn TextFormatter>,
  resolver:  Option<&'a dyn QuoteResolver>,
}

impl<'a> Enricher<'a> {
  pub fn new(likes: &'a LikeState) -> Self {
    Self { likes, formatter: None, resolver: None }
  }

  pub fn with_formatter(mut self, formatter: &'a dyn TextFormatter) -> Self {
    self.formatter = Some(formatter);
    self
  }

  pub fn with_quote_resolver(mut self, resolver: &'a dyn QuoteResolver) -> Self {
    self.resolver = Some(resolver);
    self
  }

  pub fn enrich(&self, record: &TweetRecord) -> EnrichedTweet {
    self.enrich_post(&Post::from(record.clone()))
  }

  pub fn enrich_post(&self, post: &Post) -> EnrichedTweet {
    let mut enriched = self.enrich_content(post.content());
    if let Some(by) = post.retweeted_by() {
      enriched.is_retweet = true;
      enriched.retweeted_by = Some(by.to_owned());
    }
    enriched
  }

  pub fn enrich_all<'r>(
    &self,
    records: impl IntoIterator<Item = &'r TweetRecord>,
  ) -> Vec<EnrichedTweet> {
    records.into_iter().map(|r| self.enrich(r)).collect()
  }

  fn enrich_content(&self, tweet: &Tweet) -> EnrichedTweet {
    let (quoted_tweet_id, formatted_quote) = self.resolve_quote(tweet.quote.as_deref());

    let mut tweet = tweet.clone();
    tweet.extra.retain(|k, _| !DERIVED_KEYS.contains(&k.as_str()));

    EnrichedTweet {
      all_media: normalize_media(&tweet),
      is_liked: self.likes.likes_tweet(&tweet.id),
      is_account_liked: self.likes.likes_account(&tweet.compte),
      is_retweet: false,
      retweeted_by: None,
      quoted_tweet_id,
      formatted_quote,
      tweet,
    }
  }

  /// A quote that is a status link resolves to an id (when a resolver is
  /// set); any other non-empty quote is formatted (when a formatter is set).
  fn resolve_quote(&self, quote: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(quote) = quote.filter(|q| !q.trim().is_empty()) else {
      return (None, None);
    };
    match StatusLink::parse(quote) {
      Some(link) => (self.resolver.map(|r| r.resolve(&link)), None),
      None => (None, self.formatter.map(|f| f.format(quote))),
    }
  }
}

/// One-shot form of [`Enricher::enrich`].
pub fn enrich(
  record: &TweetRecord,
  likes: &LikeState,
  formatter: Option<&dyn TextFormatter>,
  resolver: Option<&dyn QuoteResolver>,
) -> EnrichedTweet {
  let mut enricher = Enricher::new(likes);
  if let Some(formatter) = formatter {
    enricher = enricher.with_formatter(formatter);
  }
  if let Some(resolver) = resolver {
    enricher = enricher.with_quote_resolver(resolver);
  }
  enricher.enrich(record)
}
