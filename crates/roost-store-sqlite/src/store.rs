//! [`SqliteStore`]: the SQLite implementation of [`ArchiveStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use roost_core::{
  enrich::LikeState,
  stats::AccountCount,
  store::{ArchiveStore, RequestedAccount, TweetQuery},
  tweet::TweetRecord,
};

use crate::{
  Result,
  encode::{
    RawAccountCount, RawRequestedAccount, TweetRow, decode_record, encode_dt, like_pattern,
  },
  schema::SCHEMA,
};

const HIDDEN_ACCOUNT_FILTER: &str = "t.compte NOT IN (SELECT account FROM hidden_accounts)";
const HIDDEN_TWEET_FILTER: &str = "t.tweet_id NOT IN (SELECT tweet_id FROM hidden_tweets)
   AND t.content_id NOT IN (SELECT tweet_id FROM hidden_tweets)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roost archive backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row mutation and report whether it changed anything.
  async fn execute_changed(&self, sql: &'static str, params: Vec<Value>) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params))?))
      .await?;
    Ok(changed > 0)
  }

  async fn list_column(&self, sql: &'static str) -> Result<Vec<String>> {
    let values = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(values)
  }
}

/// WHERE clause and positional parameters for a [`TweetQuery`].
fn tweet_filter(query: &TweetQuery) -> (String, Vec<Value>) {
  let mut conds: Vec<&'static str> = vec![];
  let mut params: Vec<Value> = vec![];

  if let Some(account) = &query.account {
    conds.push("t.compte = ?");
    params.push(Value::Text(account.clone()));
  }
  if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
    conds.push(
      "(t.texte LIKE ? ESCAPE '\\' OR t.hashtags LIKE ? ESCAPE '\\' OR t.compte LIKE ? ESCAPE '\\')",
    );
    let pattern = like_pattern(text);
    params.extend(std::iter::repeat_n(Value::Text(pattern), 3));
  }
  if query.with_media {
    conds.push("(t.has_media = 1 OR t.has_video = 1)");
  }
  if query.with_video {
    conds.push("t.has_video = 1");
  }
  if !query.include_hidden_accounts {
    conds.push(HIDDEN_ACCOUNT_FILTER);
  }
  if !query.include_hidden_tweets {
    conds.push(HIDDEN_TWEET_FILTER);
  }
  if let Some(viewer) = &query.liked_by {
    conds.push(
      "(t.tweet_id IN (SELECT tweet_id FROM tweet_likes WHERE viewer = ?)
        OR t.content_id IN (SELECT tweet_id FROM tweet_likes WHERE viewer = ?))",
    );
    params.extend(std::iter::repeat_n(Value::Text(viewer.clone()), 2));
  }
  if let Some(viewer) = &query.from_liked_accounts_of {
    conds.push("t.compte IN (SELECT account FROM account_likes WHERE viewer = ?)");
    params.push(Value::Text(viewer.clone()));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (where_clause, params)
}

// ─── ArchiveStore impl ───────────────────────────────────────────────────────

impl ArchiveStore for SqliteStore {
  type Error = crate::Error;

  // ── Tweets ────────────────────────────────────────────────────────────────

  async fn put_tweet(&self, record: TweetRecord) -> Result<bool> {
    let row = TweetRow::from_record(&record)?;
    let stored_at = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let existed = conn
          .query_row(
            "SELECT 1 FROM tweets WHERE tweet_id = ?1",
            rusqlite::params![row.tweet_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();

        conn.execute(
          "INSERT INTO tweets (
             tweet_id, compte, content_id, posted_at, texte, hashtags,
             has_media, has_video, record_json, stored_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
           ON CONFLICT(tweet_id) DO UPDATE SET
             compte      = excluded.compte,
             content_id  = excluded.content_id,
             posted_at   = excluded.posted_at,
             texte       = excluded.texte,
             hashtags    = excluded.hashtags,
             has_media   = excluded.has_media,
             has_video   = excluded.has_video,
             record_json = excluded.record_json,
             stored_at   = excluded.stored_at",
          rusqlite::params![
            row.tweet_id,
            row.compte,
            row.content_id,
            row.posted_at,
            row.texte,
            row.hashtags,
            row.has_media,
            row.has_video,
            row.record_json,
            stored_at,
          ],
        )?;
        Ok(!existed)
      })
      .await?;
    Ok(inserted)
  }

  async fn get_tweet(&self, id: &str) -> Result<Option<TweetRecord>> {
    let id = id.to_owned();
    let json: Option<String> = self
      .conn
      .call(move |conn| {
        let json = conn
          .query_row(
            "SELECT record_json FROM tweets WHERE tweet_id = ?1",
            rusqlite::params![id],
            |r| r.get(0),
          )
          .optional()?;
        Ok(json)
      })
      .await?;
    json.as_deref().map(decode_record).transpose()
  }

  async fn list_tweets(&self, query: &TweetQuery) -> Result<Vec<TweetRecord>> {
    let (where_clause, mut params) = tweet_filter(query);
    params.push(Value::Integer(query.limit.map_or(-1, |l| l as i64)));
    params.push(Value::Integer(query.offset.unwrap_or(0) as i64));

    let sql = format!(
      "SELECT t.record_json
       FROM tweets t
       {where_clause}
       ORDER BY t.posted_at IS NULL, t.posted_at DESC, t.tweet_id DESC
       LIMIT ? OFFSET ?"
    );

    let rows: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.iter().map(|json| decode_record(json)).collect()
  }

  async fn count_tweets(&self, query: &TweetQuery) -> Result<usize> {
    let (where_clause, params) = tweet_filter(query);
    let sql = format!("SELECT COUNT(*) FROM tweets t {where_clause}");

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), |r| r.get(0))?)
      })
      .await?;
    Ok(count.max(0) as usize)
  }

  async fn account_counts(&self, include_hidden: bool) -> Result<Vec<AccountCount>> {
    let where_clause = if include_hidden {
      String::new()
    } else {
      format!("WHERE {HIDDEN_ACCOUNT_FILTER}")
    };
    let sql = format!(
      "SELECT t.compte, COUNT(*) AS n
       FROM tweets t
       {where_clause}
       GROUP BY t.compte
       ORDER BY n DESC, t.compte"
    );

    let raws: Vec<RawAccountCount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAccountCount {
              account: row.get(0)?,
              count:   row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccountCount::into_account_count).collect()
  }

  // ── Likes ─────────────────────────────────────────────────────────────────

  async fn like_tweet(&self, viewer: &str, tweet_id: &str) -> Result<bool> {
    self
      .execute_changed(
        "INSERT OR IGNORE INTO tweet_likes (like_id, viewer, tweet_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          Value::Text(Uuid::new_v4().to_string()),
          Value::Text(viewer.to_owned()),
          Value::Text(tweet_id.to_owned()),
          Value::Text(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  async fn like_tweets(&self, viewer: &str, tweet_ids: &[String]) -> Result<usize> {
    let viewer = viewer.to_owned();
    let ids = tweet_ids.to_vec();
    let at = encode_dt(Utc::now());

    let added = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut added = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO tweet_likes (like_id, viewer, tweet_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for id in &ids {
            added += stmt.execute(rusqlite::params![
              Uuid::new_v4().to_string(),
              viewer,
              id,
              at
            ])?;
          }
        }
        tx.commit()?;
        Ok(added)
      })
      .await?;
    Ok(added)
  }

  async fn unlike_tweet(&self, viewer: &str, tweet_id: &str) -> Result<bool> {
    self
      .execute_changed(
        "DELETE FROM tweet_likes WHERE viewer = ?1 AND tweet_id = ?2",
        vec![Value::Text(viewer.to_owned()), Value::Text(tweet_id.to_owned())],
      )
      .await
  }

  async fn like_account(&self, viewer: &str, account: &str) -> Result<bool> {
    self
      .execute_changed(
        "INSERT OR IGNORE INTO account_likes (like_id, viewer, account, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          Value::Text(Uuid::new_v4().to_string()),
          Value::Text(viewer.to_owned()),
          Value::Text(account.to_owned()),
          Value::Text(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  async fn unlike_account(&self, viewer: &str, account: &str) -> Result<bool> {
    self
      .execute_changed(
        "DELETE FROM account_likes WHERE viewer = ?1 AND account = ?2",
        vec![Value::Text(viewer.to_owned()), Value::Text(account.to_owned())],
      )
      .await
  }

  async fn like_state(&self, viewer: &str) -> Result<LikeState> {
    let viewer = viewer.to_owned();
    let (tweet_ids, accounts) = self
      .conn
      .call(move |conn| {
        let tweet_ids = conn
          .prepare("SELECT tweet_id FROM tweet_likes WHERE viewer = ?1")?
          .query_map(rusqlite::params![viewer], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        let accounts = conn
          .prepare("SELECT account FROM account_likes WHERE viewer = ?1")?
          .query_map(rusqlite::params![viewer], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok((tweet_ids, accounts))
      })
      .await?;
    Ok(LikeState::new(tweet_ids, accounts))
  }

  // ── Hidden accounts and tweets ────────────────────────────────────────────

  async fn hide_account(&self, account: &str) -> Result<bool> {
    self
      .execute_changed(
        "INSERT OR IGNORE INTO hidden_accounts (account, hidden_at) VALUES (?1, ?2)",
        vec![Value::Text(account.to_owned()), Value::Text(encode_dt(Utc::now()))],
      )
      .await
  }

  async fn unhide_account(&self, account: &str) -> Result<bool> {
    self
      .execute_changed(
        "DELETE FROM hidden_accounts WHERE account = ?1",
        vec![Value::Text(account.to_owned())],
      )
      .await
  }

  async fn is_account_hidden(&self, account: &str) -> Result<bool> {
    let account = account.to_owned();
    let hidden = self
      .conn
      .call(move |conn| {
        let hidden = conn
          .query_row(
            "SELECT 1 FROM hidden_accounts WHERE account = ?1",
            rusqlite::params![account],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        Ok(hidden)
      })
      .await?;
    Ok(hidden)
  }

  async fn hidden_accounts(&self) -> Result<Vec<String>> {
    self
      .list_column("SELECT account FROM hidden_accounts ORDER BY account")
      .await
  }

  async fn hide_tweet(&self, tweet_id: &str) -> Result<bool> {
    self
      .execute_changed(
        "INSERT OR IGNORE INTO hidden_tweets (tweet_id, hidden_at) VALUES (?1, ?2)",
        vec![Value::Text(tweet_id.to_owned()), Value::Text(encode_dt(Utc::now()))],
      )
      .await
  }

  async fn unhide_tweet(&self, tweet_id: &str) -> Result<bool> {
    self
      .execute_changed(
        "DELETE FROM hidden_tweets WHERE tweet_id = ?1",
        vec![Value::Text(tweet_id.to_owned())],
      )
      .await
  }

  async fn hidden_tweets(&self) -> Result<Vec<String>> {
    self
      .list_column("SELECT tweet_id FROM hidden_tweets ORDER BY hidden_at DESC, tweet_id")
      .await
  }

  // ── Requested accounts ────────────────────────────────────────────────────

  async fn record_requested_account(&self, account: &str) -> Result<RequestedAccount> {
    let account = account.to_owned();
    let at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO requested_accounts (account, first_requested_at, requests)
           VALUES (?1, ?2, 1)
           ON CONFLICT(account) DO UPDATE SET requests = requests + 1",
          rusqlite::params![account, at],
        )?;
        let raw = conn.query_row(
          "SELECT account, first_requested_at, requests
           FROM requested_accounts WHERE account = ?1",
          rusqlite::params![account],
          |row| {
            Ok(RawRequestedAccount {
              account:            row.get(0)?,
              first_requested_at: row.get(1)?,
              requests:           row.get(2)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_requested()
  }

  async fn requested_accounts(&self) -> Result<Vec<RequestedAccount>> {
    let raws: Vec<RawRequestedAccount> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT account, first_requested_at, requests
           FROM requested_accounts
           ORDER BY requests DESC, account",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRequestedAccount {
              account:            row.get(0)?,
              first_requested_at: row.get(1)?,
              requests:           row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequestedAccount::into_requested).collect()
  }
}
