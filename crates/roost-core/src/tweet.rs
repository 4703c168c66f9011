//! Tweet records, the raw stored unit of the archive.
//!
//! Records arrive from scrapers and database dumps with an inconsistent shape:
//! lists may be missing, individual attachments may be malformed, dates come in
//! several encodings. Decoding here is deliberately lenient at the field level
//! so that one bad attachment never costs the whole record. Fields this crate
//! does not model are kept in `extra` and round-trip untouched.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── Attachments ─────────────────────────────────────────────────────────────

/// An entry of the `media` list. Only entries typed `photo` are shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
  /// Remote URL or archive-local path.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lien:  Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind:  Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl MediaAttachment {
  pub fn is_photo(&self) -> bool { self.kind.as_deref() == Some("photo") }
}

/// Source metadata of a video rendition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaObject {
  /// Permalink of the clip; its last path segment identifies the clip.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expanded_url: Option<String>,
  #[serde(flatten)]
  pub extra:        Map<String, Value>,
}

/// One entry of the `video` list. Several renditions of the same clip, at
/// different resolutions, usually appear side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRendition {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lien:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub media_object: Option<MediaObject>,
  #[serde(flatten)]
  pub extra:        Map<String, Value>,
}

/// A hashtag, stored either as a bare string or as an entity object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hashtag {
  Text(String),
  Entity(HashtagEntity),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagEntity {
  pub text:  String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Hashtag {
  pub fn text(&self) -> &str {
    match self {
      Self::Text(t) => t,
      Self::Entity(e) => &e.text,
    }
  }
}

// ─── Tweet ───────────────────────────────────────────────────────────────────

/// The content of a single post, without any retweet wrapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
  pub id:       String,
  /// Handle of the posting account.
  #[serde(default)]
  pub compte:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub texte:    Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_date",
    skip_serializing_if = "Option::is_none"
  )]
  pub date:     Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub media:    Vec<MediaAttachment>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub video:    Vec<VideoRendition>,
  /// Either a status URL of a quoted tweet or free text.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quote:    Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_list",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub hashtags: Vec<Hashtag>,
  /// Permalink of the post on its origin platform.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lien:     Option<String>,
  #[serde(flatten)]
  pub extra:    Map<String, Value>,
}

impl Tweet {
  pub fn has_media(&self) -> bool {
    !self.media.is_empty() || !self.video.is_empty()
  }

  pub fn has_video(&self) -> bool { !self.video.is_empty() }

  /// Hashtag texts joined by spaces, for substring search.
  pub fn hashtag_text(&self) -> String {
    self
      .hashtags
      .iter()
      .map(Hashtag::text)
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Fallback author for nested statuses that only carry the platform's
  /// `user.screen_name` object.
  fn screen_name(&self) -> Option<&str> {
    self
      .extra
      .get("user")
      .and_then(|u| u.get("screen_name"))
      .and_then(Value::as_str)
  }
}

// ─── TweetRecord ─────────────────────────────────────────────────────────────

/// A stored record exactly as the archive holds it. A retweet is a wrapper
/// whose `compte` is the retweeter and whose `retweeted_status` carries the
/// original post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
  #[serde(flatten)]
  pub tweet:            Tweet,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub retweeted_status: Option<Box<TweetRecord>>,
}

impl TweetRecord {
  /// Decode and validate a record supplied by a client or an import.
  pub fn from_json(value: Value) -> Result<Self> {
    let record: Self = serde_json::from_value(value)?;
    if record.tweet.id.trim().is_empty() {
      return Err(Error::EmptyId);
    }
    if record.tweet.compte.trim().is_empty() {
      return Err(Error::MissingAccount(record.tweet.id));
    }
    Ok(record)
  }

  pub fn id(&self) -> &str { &self.tweet.id }

  pub fn compte(&self) -> &str { &self.tweet.compte }

  pub fn is_retweet(&self) -> bool { self.retweeted_status.is_some() }

  /// The content a reader actually sees: the innermost original for
  /// retweets, the record itself otherwise.
  pub fn content(&self) -> &Tweet {
    let mut current = self;
    while let Some(inner) = current.retweeted_status.as_deref() {
      current = inner;
    }
    &current.tweet
  }

  /// The wrapper's own date, falling back to the original's.
  pub fn display_date(&self) -> Option<DateTime<Utc>> {
    self.tweet.date.or_else(|| self.content().date)
  }
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A record resolved into what it shows. Retweets point at exactly one
/// original; nesting deeper than that cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Post {
  Original(Tweet),
  Retweet {
    /// The original post, with no retweet wrapping of its own.
    of: Tweet,
    /// Handle of the account that retweeted.
    by: String,
  },
}

impl Post {
  pub fn content(&self) -> &Tweet {
    match self {
      Self::Original(t) => t,
      Self::Retweet { of, .. } => of,
    }
  }

  pub fn retweeted_by(&self) -> Option<&str> {
    match self {
      Self::Original(_) => None,
      Self::Retweet { by, .. } => Some(by),
    }
  }
}

impl From<TweetRecord> for Post {
  fn from(record: TweetRecord) -> Self {
    let TweetRecord { tweet, retweeted_status } = record;
    match retweeted_status {
      None => Self::Original(tweet),
      Some(inner) => Self::Retweet {
        of: innermost(*inner),
        by: tweet.compte,
      },
    }
  }
}

fn innermost(mut record: TweetRecord) -> Tweet {
  while let Some(next) = record.retweeted_status.take() {
    record = *next;
  }
  let mut tweet = record.tweet;
  if tweet.compte.is_empty() {
    if let Some(name) = tweet.screen_name().map(str::to_owned) {
      tweet.compte = name;
    }
  }
  tweet
}

// ─── Lenient decoding ────────────────────────────────────────────────────────

/// Decode a list element by element, dropping entries that do not fit `T`.
/// A missing, null, or non-array value yields an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let raw = Option::<Value>::deserialize(deserializer)?;
  let items = match raw {
    Some(Value::Array(items)) => items,
    _ => return Ok(Vec::new()),
  };
  Ok(
    items
      .into_iter()
      .filter_map(|v| serde_json::from_value(v).ok())
      .collect(),
  )
}

fn lenient_date<'de, D>(
  deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(deserializer)?;
  Ok(raw.as_ref().and_then(parse_date))
}

/// Interpret the date encodings found in archive dumps: RFC 3339 strings,
/// naive `YYYY-MM-DD[ HH:MM:SS]` strings (taken as UTC), epoch milliseconds,
/// and extended-JSON `{"$date": ...}` wrappers.
///
/// Dates outside years 0000 to 9999 are treated as unparseable; they have no
/// four-digit year and would not sort by their text form.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
  decode_date(value).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn decode_date(value: &Value) -> Option<DateTime<Utc>> {
  match value {
    Value::String(s) => parse_date_str(s),
    Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
    Value::Object(o) => o
      .get("$date")
      .or_else(|| o.get("$numberLong"))
      .and_then(|inner| match inner {
        Value::String(s) => s
          .parse::<i64>()
          .ok()
          .and_then(DateTime::from_timestamp_millis)
          .or_else(|| parse_date_str(s)),
        other => decode_date(other),
      }),
    _ => None,
  }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
      return Some(dt.and_utc());
    }
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, TimeZone};
  use serde_json::json;

  use super::*;

  #[test]
  fn missing_lists_default_to_empty() {
    let record = TweetRecord::from_json(json!({ "id": "1", "compte": "alice" })).unwrap();
    assert!(record.tweet.media.is_empty());
    assert!(record.tweet.video.is_empty());
    assert!(record.tweet.hashtags.is_empty());
    assert!(record.tweet.texte.is_none());
    assert!(record.tweet.date.is_none());
  }

  #[test]
  fn malformed_attachments_are_dropped_individually() {
    let record = TweetRecord::from_json(json!({
      "id": "1",
      "compte": "alice",
      "media": [
        "not-an-object",
        { "lien": "/images/a.jpg", "type": "photo" },
        42
      ],
      "video": { "oops": true }
    }))
    .unwrap();
    assert_eq!(record.tweet.media.len(), 1);
    assert_eq!(record.tweet.media[0].lien.as_deref(), Some("/images/a.jpg"));
    assert!(record.tweet.video.is_empty());
  }

  #[test]
  fn unknown_fields_round_trip() {
    let value = json!({
      "id": "1",
      "compte": "alice",
      "retweet_count": 7,
      "media": [{ "lien": "/a.jpg", "type": "photo", "width": 640 }]
    });
    let record = TweetRecord::from_json(value).unwrap();
    assert_eq!(record.tweet.extra.get("retweet_count"), Some(&json!(7)));

    let back = serde_json::to_value(&record).unwrap();
    assert_eq!(back["retweet_count"], json!(7));
    assert_eq!(back["media"][0]["width"], json!(640));
    assert!(back.get("retweeted_status").is_none());
  }

  #[test]
  fn rejects_records_without_id_or_account() {
    assert!(matches!(
      TweetRecord::from_json(json!({ "id": " ", "compte": "a" })),
      Err(Error::EmptyId)
    ));
    assert!(matches!(
      TweetRecord::from_json(json!({ "id": "9" })),
      Err(Error::MissingAccount(id)) if id == "9"
    ));
    assert!(matches!(
      TweetRecord::from_json(json!({ "compte": "a" })),
      Err(Error::Serialization(_))
    ));
  }

  #[test]
  fn hashtags_accept_strings_and_entities() {
    let record = TweetRecord::from_json(json!({
      "id": "1",
      "compte": "a",
      "hashtags": ["rust", { "text": "Serde", "indices": [0, 6] }]
    }))
    .unwrap();
    assert_eq!(record.tweet.hashtag_text(), "rust Serde");
  }

  #[test]
  fn dates_in_several_encodings() {
    let expected = Utc.with_ymd_and_hms(2023, 5, 17, 8, 30, 0).unwrap();
    assert_eq!(parse_date(&json!("2023-05-17T08:30:00Z")), Some(expected));
    assert_eq!(parse_date(&json!("2023-05-17T10:30:00+02:00")), Some(expected));
    assert_eq!(parse_date(&json!("2023-05-17 08:30:00")), Some(expected));
    assert_eq!(parse_date(&json!(expected.timestamp_millis())), Some(expected));
    assert_eq!(
      parse_date(&json!({ "$date": "2023-05-17T08:30:00Z" })),
      Some(expected)
    );
    assert_eq!(
      parse_date(&json!({ "$date": { "$numberLong": expected.timestamp_millis().to_string() } })),
      Some(expected)
    );
    assert_eq!(parse_date(&json!("2023-05-17")).map(|d| d.day()), Some(17));
    assert_eq!(parse_date(&json!("last tuesday")), None);
    assert_eq!(parse_date(&json!(true)), None);
  }

  #[test]
  fn dates_beyond_four_digit_years_are_dropped() {
    let far_future = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_date(&json!(far_future.timestamp_millis())), None);
    assert_eq!(parse_date(&json!({ "$date": far_future.timestamp_millis() })), None);

    let far_past = Utc.with_ymd_and_hms(-1, 12, 31, 0, 0, 0).unwrap();
    assert_eq!(parse_date(&json!(far_past.timestamp_millis())), None);

    let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(parse_date(&json!(last.timestamp_millis())), Some(last));

    let record = TweetRecord::from_json(json!({
      "id": "1",
      "compte": "a",
      "date": far_future.timestamp_millis()
    }))
    .unwrap();
    assert!(record.tweet.date.is_none());
  }

  #[test]
  fn unparseable_date_is_absent_not_an_error() {
    let record =
      TweetRecord::from_json(json!({ "id": "1", "compte": "a", "date": "soon" })).unwrap();
    assert!(record.tweet.date.is_none());
  }

  #[test]
  fn retweet_resolves_to_original_with_retweeter() {
    let record = TweetRecord::from_json(json!({
      "id": "w1",
      "compte": "alice",
      "texte": "RT @bob: hello",
      "retweeted_status": { "id": "t1", "compte": "bob", "texte": "hello" }
    }))
    .unwrap();
    assert!(record.is_retweet());
    assert_eq!(record.content().id, "t1");

    match Post::from(record) {
      Post::Retweet { of, by } => {
        assert_eq!(of.id, "t1");
        assert_eq!(of.compte, "bob");
        assert_eq!(by, "alice");
      }
      other => panic!("expected a retweet, got {other:?}"),
    }
  }

  #[test]
  fn nested_retweets_collapse_to_innermost_original() {
    let record = TweetRecord::from_json(json!({
      "id": "w2",
      "compte": "carol",
      "retweeted_status": {
        "id": "w1",
        "compte": "alice",
        "retweeted_status": { "id": "t1", "compte": "bob" }
      }
    }))
    .unwrap();
    let post = Post::from(record);
    assert_eq!(post.content().id, "t1");
    assert_eq!(post.retweeted_by(), Some("carol"));
  }

  #[test]
  fn nested_author_falls_back_to_screen_name() {
    let record = TweetRecord::from_json(json!({
      "id": "w1",
      "compte": "alice",
      "retweeted_status": { "id": "t1", "user": { "screen_name": "bob" } }
    }))
    .unwrap();
    assert_eq!(Post::from(record).content().compte, "bob");
  }

  #[test]
  fn display_date_prefers_wrapper() {
    let record = TweetRecord::from_json(json!({
      "id": "w1",
      "compte": "alice",
      "retweeted_status": { "id": "t1", "compte": "bob", "date": "2020-01-01T00:00:00Z" }
    }))
    .unwrap();
    assert_eq!(record.display_date().map(|d| d.year()), Some(2020));
  }
}
