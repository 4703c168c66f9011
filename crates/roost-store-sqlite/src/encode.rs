//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings, so text order
//! equals chronological order. Records are stored whole as JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use roost_core::{stats::AccountCount, store::RequestedAccount, tweet::TweetRecord};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

fn decode_count(column: &'static str, value: i64) -> Result<u64> {
  u64::try_from(value).map_err(|_| Error::InvalidCount { column, value })
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// `%text%` with LIKE wildcards in `text` escaped by `\`.
pub fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Tweet rows ──────────────────────────────────────────────────────────────

/// Column values for one `tweets` row.
pub struct TweetRow {
  pub tweet_id:    String,
  pub compte:      String,
  pub content_id:  String,
  pub posted_at:   Option<String>,
  pub texte:       String,
  pub hashtags:    String,
  pub has_media:   bool,
  pub has_video:   bool,
  pub record_json: String,
}

impl TweetRow {
  /// Project a record into searchable columns. Text and hashtags cover both
  /// the wrapper and the original it shows.
  pub fn from_record(record: &TweetRecord) -> Result<Self> {
    let content = record.content();

    let mut texte: Vec<&str> = record.tweet.texte.as_deref().into_iter().collect();
    if let Some(inner) = content.texte.as_deref() {
      if !texte.contains(&inner) {
        texte.push(inner);
      }
    }

    let mut hashtags = record.tweet.hashtag_text();
    if record.is_retweet() {
      let inner = content.hashtag_text();
      if !inner.is_empty() {
        if !hashtags.is_empty() {
          hashtags.push(' ');
        }
        hashtags.push_str(&inner);
      }
    }

    Ok(Self {
      tweet_id: record.tweet.id.clone(),
      compte: record.tweet.compte.clone(),
      content_id: content.id.clone(),
      posted_at: record.display_date().map(encode_dt),
      texte: texte.join("\n"),
      hashtags,
      has_media: content.has_media(),
      has_video: content.has_video(),
      record_json: serde_json::to_string(record)?,
    })
  }
}

pub fn decode_record(json: &str) -> Result<TweetRecord> { Ok(serde_json::from_str(json)?) }

// ─── Raw row types ───────────────────────────────────────────────────────────

pub struct RawAccountCount {
  pub account: String,
  pub count:   i64,
}

impl RawAccountCount {
  pub fn into_account_count(self) -> Result<AccountCount> {
    Ok(AccountCount {
      count:   decode_count("count", self.count)?,
      account: self.account,
    })
  }
}

pub struct RawRequestedAccount {
  pub account:            String,
  pub first_requested_at: String,
  pub requests:           i64,
}

impl RawRequestedAccount {
  pub fn into_requested(self) -> Result<RequestedAccount> {
    Ok(RequestedAccount {
      first_requested_at: decode_dt(&self.first_requested_at)?,
      requests:           decode_count("requests", self.requests)?,
      account:            self.account,
    })
  }
}
