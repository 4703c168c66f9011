//! HTTP server for Roost.
//!
//! Mounts the JSON API from [`roost_api`] under `/api`, adds a liveness
//! probe, and wraps everything in request tracing.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use roost_api::ApiSettings;
use roost_core::store::ArchiveStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROOST_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  #[serde(default = "default_viewer")]
  pub default_viewer:  String,
  #[serde(default = "default_profile_base")]
  pub profile_base:    String,
  #[serde(default = "default_tweets_per_page")]
  pub tweets_per_page: usize,
  #[serde(default = "default_media_per_page")]
  pub media_per_page:  usize,
  #[serde(default = "default_videos_per_page")]
  pub videos_per_page: usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/roost/archive.db") }
fn default_viewer() -> String { ApiSettings::default().default_viewer }
fn default_profile_base() -> String { ApiSettings::default().profile_base }
fn default_tweets_per_page() -> usize { ApiSettings::default().tweets_per_page }
fn default_media_per_page() -> usize { ApiSettings::default().media_per_page }
fn default_videos_per_page() -> usize { ApiSettings::default().videos_per_page }

impl ServerConfig {
  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      default_viewer:  self.default_viewer.clone(),
      profile_base:    self.profile_base.clone(),
      tweets_per_page: self.tweets_per_page.max(1),
      media_per_page:  self.media_per_page.max(1),
      videos_per_page: self.videos_per_page.max(1),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(store: Arc<S>, settings: ApiSettings) -> Router
where
  S: ArchiveStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/healthz", get(healthz))
    .nest("/api", roost_api::api_router(store, settings))
    .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
  };
  use roost_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  struct Harness {
    store: Arc<SqliteStore>,
    app:   Router,
  }

  async fn harness() -> Harness {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let settings = ApiSettings { tweets_per_page: 2, ..ApiSettings::default() };
    let app = router(store.clone(), settings);
    Harness { store, app }
  }

  impl Harness {
    async fn request(
      &self,
      method: &str,
      uri: &str,
      headers: Vec<(&str, &str)>,
      body: Option<Value>,
    ) -> Response {
      let mut builder = Request::builder().method(method).uri(uri);
      for (k, v) in headers {
        builder = builder.header(k, v);
      }
      let body = match body {
        Some(json) => {
          builder = builder.header(header::CONTENT_TYPE, "application/json");
          Body::from(json.to_string())
        }
        None => Body::empty(),
      };
      self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
      let resp = self.request("GET", uri, vec![], None).await;
      (resp.status(), json_body(resp).await)
    }

    async fn send(&self, method: &str, uri: &str) -> (StatusCode, Value) {
      let resp = self.request(method, uri, vec![], None).await;
      (resp.status(), json_body(resp).await)
    }

    async fn seed(&self) {
      let records = json!([
        { "id": "1", "compte": "alice", "texte": "hello @bob", "date": "2023-01-01T00:00:00Z" },
        {
          "id": "2",
          "compte": "alice",
          "texte": "sunset pics",
          "date": "2023-01-02T00:00:00Z",
          "media": [{ "lien": "/p.jpg", "type": "photo" }],
          "quote": "https://twitter.com/bob/status/3"
        },
        {
          "id": "3",
          "compte": "bob",
          "texte": "a clip",
          "date": "2023-01-03T00:00:00Z",
          "video": [
            { "lien": "/v/400x400/a.mp4", "media_object": { "expanded_url": "https://x.com/bob/status/3/video/1" } },
            { "lien": "/v/1280x720/a.mp4", "media_object": { "expanded_url": "https://x.com/bob/status/3/video/1" } }
          ]
        },
        {
          "id": "4",
          "compte": "alice",
          "texte": "RT @bob: a clip",
          "date": "2023-01-04T00:00:00Z",
          "retweeted_status": {
            "id": "3",
            "compte": "bob",
            "texte": "a clip",
            "video": [
              { "lien": "/v/1280x720/a.mp4", "media_object": { "expanded_url": "https://x.com/bob/status/3/video/1" } }
            ]
          }
        }
      ]);
      let resp = self.request("POST", "/api/tweets", vec![], Some(records)).await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
      return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
  }

  fn ids(tweets: &Value) -> Vec<&str> {
    tweets
      .as_array()
      .unwrap()
      .iter()
      .map(|t| t["id"].as_str().unwrap())
      .collect()
  }

  // ── Health and config ────────────────────────────────────────────────────

  #[tokio::test]
  async fn healthz_is_ok() {
    let h = harness().await;
    let resp = h.request("GET", "/healthz", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[test]
  fn config_defaults_fill_missing_fields() {
    let cfg: ServerConfig = serde_json::from_value(json!({ "port": 8080 })).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.host, "127.0.0.1");
    let settings = cfg.api_settings();
    assert_eq!(settings.tweets_per_page, 10);
    assert_eq!(settings.media_per_page, 14);
    assert_eq!(settings.videos_per_page, 14);
    assert_eq!(settings.profile_base, "/profile/");
  }

  // ── Ingest ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ingest_reports_created_and_updated() {
    let h = harness().await;
    h.seed().await;

    let resp = h
      .request("POST", "/api/tweets", vec![], Some(json!({ "id": "1", "compte": "alice", "texte": "edited" })))
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_body(resp).await, json!({ "created": 0, "updated": 1 }));
  }

  #[tokio::test]
  async fn ingest_rejects_invalid_records_atomically() {
    let h = harness().await;
    let resp = h
      .request(
        "POST",
        "/api/tweets",
        vec![],
        Some(json!([{ "id": "ok", "compte": "a" }, { "id": "", "compte": "a" }])),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("record 1"));
    assert!(h.store.get_tweet("ok").await.unwrap().is_none());
  }

  // ── Feed ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn feed_is_paginated_and_enriched() {
    let h = harness().await;
    h.seed().await;

    let (status, body) = h.get("/api/tweets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(4));
    assert_eq!(body["totalPages"], json!(2));
    assert_eq!(body["currentPage"], json!(1));
    assert_eq!(ids(&body["tweets"]), ["3", "3"]);

    let retweet = &body["tweets"][0];
    assert_eq!(retweet["isRetweet"], json!(true));
    assert_eq!(retweet["retweetedBy"], json!("alice"));
    assert_eq!(retweet["compte"], json!("bob"));

    let clip = &body["tweets"][1];
    assert_eq!(clip["allMedia"].as_array().unwrap().len(), 1);
    assert_eq!(clip["allMedia"][0]["lien"], json!("/v/1280x720/a.mp4"));
    assert_eq!(clip["allMedia"][0]["resolution"], json!(921_600));

    assert_eq!(body["allAccounts"], json!(["alice", "bob"]));
    assert_eq!(body["favoriteAccounts"], json!([]));

    let (_, page2) = h.get("/api/tweets?page=2").await;
    assert_eq!(ids(&page2["tweets"]), ["2", "1"]);
  }

  #[tokio::test]
  async fn hidden_accounts_leave_the_feed_but_keep_their_profile() {
    let h = harness().await;
    h.seed().await;

    let (status, body) = h.send("POST", "/api/hide/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "changed": true }));

    let (_, feed) = h.get("/api/tweets").await;
    assert_eq!(feed["total"], json!(1));
    assert_eq!(feed["allAccounts"], json!(["bob"]));

    let (status, profile) = h.get("/api/profile/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["hidden"], json!(true));

    let (_, accounts) = h.get("/api/accounts").await;
    assert_eq!(accounts["hidden"], json!(["alice"]));

    let (_, body) = h.send("DELETE", "/api/hide/alice").await;
    assert_eq!(body["changed"], json!(true));
    let (_, feed) = h.get("/api/tweets").await;
    assert_eq!(feed["total"], json!(4));
  }

  #[tokio::test]
  async fn hidden_tweets_leave_the_feed() {
    let h = harness().await;
    h.seed().await;

    h.send("POST", "/api/hide-tweet/3").await;
    let (_, hidden) = h.get("/api/hidden-tweets").await;
    assert_eq!(hidden, json!(["3"]));

    let (_, feed) = h.get("/api/tweets").await;
    assert_eq!(feed["total"], json!(2));

    h.send("DELETE", "/api/hide-tweet/3").await;
    let (_, feed) = h.get("/api/tweets").await;
    assert_eq!(feed["total"], json!(4));
  }

  // ── Tweet detail ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tweet_detail_embeds_quote_and_related() {
    let h = harness().await;
    h.seed().await;

    let (status, body) = h.get("/api/tweets/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tweet"]["quotedTweetId"], json!("3"));
    assert!(body["tweet"].get("formattedQuote").is_none());
    assert_eq!(body["quotedTweet"]["id"], json!("3"));
    assert_eq!(ids(&body["related"]), ["3", "1"]);
  }

  #[tokio::test]
  async fn tweet_detail_honours_if_none_match() {
    let h = harness().await;
    h.seed().await;

    let resp = h.request("GET", "/api/tweets/1", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp.headers()[header::ETAG].to_str().unwrap().to_owned();

    let resp = h
      .request("GET", "/api/tweets/1", vec![("if-none-match", etag.as_str())], None)
      .await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(resp.headers()[header::ETAG], etag.as_str());
    assert_eq!(resp.headers()[header::VARY], "x-viewer");

    h.send("POST", "/api/favorite/1").await;
    let resp = h
      .request("GET", "/api/tweets/1", vec![("if-none-match", etag.as_str())], None)
      .await;
    assert_eq!(resp.status(), StatusCode::OK, "liking changes the representation");
  }

  #[tokio::test]
  async fn missing_tweet_is_404() {
    let h = harness().await;
    let (status, body) = h.get("/api/tweets/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
  }

  // ── Search ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn search_matches_text_and_handles() {
    let h = harness().await;
    h.seed().await;

    let (_, body) = h.get("/api/search?q=sunset").await;
    assert_eq!(body["query"], json!("sunset"));
    assert_eq!(ids(&body["tweets"]), ["2"]);

    let (_, body) = h.get("/api/search?q=bob").await;
    assert_eq!(body["total"], json!(3));
  }

  #[tokio::test]
  async fn blank_search_is_empty() {
    let h = harness().await;
    h.seed().await;

    let (status, body) = h.get("/api/search?q=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(0));
    assert_eq!(body["tweets"], json!([]));
  }

  // ── Profiles ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn profile_has_stats() {
    let h = harness().await;
    h.seed().await;

    let (status, body) = h.get("/api/profile/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"], json!("alice"));
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["mediaCount"], json!(2));
    assert_eq!(body["topRetweetedAccounts"], json!([{ "account": "bob", "count": 1 }]));
    assert_eq!(body["topMentionedAccounts"], json!([{ "account": "bob", "count": 2 }]));
  }

  #[tokio::test]
  async fn unknown_profile_is_recorded() {
    let h = harness().await;

    let (status, _) = h.get("/api/profile/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    h.get("/api/profile/ghost").await;

    let (_, requested) = h.get("/api/accounts/requested").await;
    assert_eq!(requested[0]["account"], json!("ghost"));
    assert_eq!(requested[0]["requests"], json!(2));
  }

  #[tokio::test]
  async fn profile_galleries() {
    let h = harness().await;
    h.seed().await;

    let (_, media) = h.get("/api/profile/alice/media").await;
    assert_eq!(media["total"], json!(2));
    assert_eq!(media["media"][0]["type"], json!("video"));
    assert_eq!(media["media"][0]["tweetId"], json!("3"));
    assert_eq!(media["media"][1]["type"], json!("photo"));

    let (_, videos) = h.get("/api/profile/alice/videos").await;
    assert_eq!(videos["total"], json!(1));
  }

  #[tokio::test]
  async fn like_all_likes_displayed_tweets() {
    let h = harness().await;
    h.seed().await;

    let (_, body) = h.send("POST", "/api/profile/alice/like_all?media_only=true").await;
    assert_eq!(body, json!({ "liked": 2, "total": 2 }));

    let (_, status) = h.get("/api/favorite/3").await;
    assert_eq!(status, json!({ "isFavorite": true }));
    let (_, status) = h.get("/api/favorite/1").await;
    assert_eq!(status, json!({ "isFavorite": false }));
  }

  // ── Media ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn media_listings() {
    let h = harness().await;
    h.seed().await;

    let (_, media) = h.get("/api/media").await;
    assert_eq!(media["total"], json!(3));

    let (_, videos) = h.get("/api/videos").await;
    assert_eq!(videos["total"], json!(2));

    let (_, all) = h.get("/api/all_media").await;
    assert_eq!(all["total"], json!(3));

    let (_, photos) = h.get("/api/all_media?type=photo").await;
    assert_eq!(photos["total"], json!(1));
    assert_eq!(photos["media"][0]["lien"], json!("/p.jpg"));
  }

  // ── Favorites ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn favorites_are_per_viewer() {
    let h = harness().await;
    h.seed().await;

    let resp = h.request("POST", "/api/favorite/3", vec![("x-viewer", "carol")], None).await;
    assert_eq!(json_body(resp).await, json!({ "success": true, "changed": true }));

    let resp = h.request("GET", "/api/favorites", vec![("x-viewer", "carol")], None).await;
    let body = json_body(resp).await;
    assert_eq!(body["total"], json!(2), "the tweet and its retweet");
    assert!(body["tweets"].as_array().unwrap().iter().all(|t| t["isLiked"] == json!(true)));

    let (_, mine) = h.get("/api/favorites").await;
    assert_eq!(mine["total"], json!(0));

    let resp = h.request("DELETE", "/api/favorite/3", vec![("x-viewer", "carol")], None).await;
    assert_eq!(json_body(resp).await["changed"], json!(true));
  }

  #[tokio::test]
  async fn liking_a_retweet_likes_its_original() {
    let h = harness().await;
    h.seed().await;

    let (_, body) = h.send("POST", "/api/favorite/4").await;
    assert_eq!(body["changed"], json!(true));

    let (_, status) = h.get("/api/favorite/4").await;
    assert_eq!(status, json!({ "isFavorite": true }));
    let (_, status) = h.get("/api/favorite/3").await;
    assert_eq!(status, json!({ "isFavorite": true }));

    let (_, favorites) = h.get("/api/favorites").await;
    assert_eq!(favorites["total"], json!(2));
    let tweets = favorites["tweets"].as_array().unwrap();
    assert!(tweets.iter().all(|t| t["isLiked"] == json!(true)));
    assert!(tweets.iter().any(|t| t["retweetedBy"] == json!("alice")));

    let (_, body) = h.send("POST", "/api/favorite/3").await;
    assert_eq!(body["changed"], json!(false), "already liked through the retweet");

    let (_, body) = h.send("DELETE", "/api/favorite/4").await;
    assert_eq!(body["changed"], json!(true));
    let (_, favorites) = h.get("/api/favorites").await;
    assert_eq!(favorites["total"], json!(0));
  }

  #[tokio::test]
  async fn favorite_accounts_flow() {
    let h = harness().await;
    h.seed().await;

    let (_, body) = h.send("POST", "/api/favorite_account/bob").await;
    assert_eq!(body["changed"], json!(true));

    let (_, tweets) = h.get("/api/favorite_accounts_tweets").await;
    assert_eq!(tweets["total"], json!(1));
    assert_eq!(tweets["favoriteAccounts"], json!(["bob"]));
    assert_eq!(tweets["tweets"][0]["isAccountLiked"], json!(true));

    let (_, accounts) = h.get("/api/accounts").await;
    assert_eq!(accounts["favorites"], json!(["bob"]));

    let (_, body) = h.send("DELETE", "/api/favorite_account/bob").await;
    assert_eq!(body["changed"], json!(true));
  }

  #[tokio::test]
  async fn blank_viewer_header_is_rejected() {
    let h = harness().await;
    let resp = h.request("GET", "/api/favorites", vec![("x-viewer", " ")], None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
