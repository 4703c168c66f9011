//! SQL schema for the Roost SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per stored record. The full record lives in record_json; the
-- other columns are projections of it for filtering and ordering.
CREATE TABLE IF NOT EXISTS tweets (
    tweet_id    TEXT PRIMARY KEY,
    compte      TEXT NOT NULL,             -- posting (or retweeting) account
    content_id  TEXT NOT NULL,             -- id of the displayed original
    posted_at   TEXT,                      -- fixed-width RFC 3339 UTC or NULL
    texte       TEXT NOT NULL DEFAULT '',
    hashtags    TEXT NOT NULL DEFAULT '',  -- space-joined hashtag texts
    has_media   INTEGER NOT NULL DEFAULT 0,
    has_video   INTEGER NOT NULL DEFAULT 0,
    record_json TEXT NOT NULL,
    stored_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tweets_compte    ON tweets(compte);
CREATE INDEX IF NOT EXISTS tweets_posted_at ON tweets(posted_at);
CREATE INDEX IF NOT EXISTS tweets_content   ON tweets(content_id);

-- Likes reference ids that need not be stored themselves: liking a
-- retweet records the original's id.
CREATE TABLE IF NOT EXISTS tweet_likes (
    like_id    TEXT PRIMARY KEY,
    viewer     TEXT NOT NULL,
    tweet_id   TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (viewer, tweet_id)
);

CREATE TABLE IF NOT EXISTS account_likes (
    like_id    TEXT PRIMARY KEY,
    viewer     TEXT NOT NULL,
    account    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (viewer, account)
);

CREATE TABLE IF NOT EXISTS hidden_accounts (
    account   TEXT PRIMARY KEY,
    hidden_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hidden_tweets (
    tweet_id  TEXT PRIMARY KEY,
    hidden_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS requested_accounts (
    account            TEXT PRIMARY KEY,
    first_requested_at TEXT NOT NULL,
    requests           INTEGER NOT NULL DEFAULT 1
);

PRAGMA user_version = 1;
";
