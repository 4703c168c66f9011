//! JSON REST API for Roost.
//!
//! Exposes an axum [`Router`] backed by any [`roost_core::store::ArchiveStore`].
//! Every tweet leaves through the enrichment pipeline, enriched for the
//! requesting [`viewer::Viewer`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roost_api::api_router(store.clone(), settings))
//! ```

pub mod accounts;
pub mod error;
pub mod etag;
pub mod favorites;
pub mod media;
pub mod profiles;
pub mod tweets;
pub mod view;
pub mod viewer;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roost_core::store::ArchiveStore;

pub use error::ApiError;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Presentation settings shared by all handlers.
#[derive(Debug, Clone)]
pub struct ApiSettings {
  /// Viewer assumed when a request names none.
  pub default_viewer:  String,
  /// Prefix of profile links in formatted text, e.g. `/profile/`.
  pub profile_base:    String,
  pub tweets_per_page: usize,
  pub media_per_page:  usize,
  pub videos_per_page: usize,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      default_viewer:  "default".to_owned(),
      profile_base:    "/profile/".to_owned(),
      tweets_per_page: 10,
      media_per_page:  14,
      videos_per_page: 14,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ArchiveStore> {
  pub store:    Arc<S>,
  pub settings: Arc<ApiSettings>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: ApiSettings) -> Router<()>
where
  S: ArchiveStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let state = AppState { store, settings: Arc::new(settings) };

  Router::new()
    // Tweets
    .route("/tweets", get(tweets::list::<S>).post(tweets::create::<S>))
    .route("/tweets/{id}", get(tweets::get_one::<S>))
    .route("/search", get(tweets::search::<S>))
    // Profiles
    .route("/profile/{handle}", get(profiles::profile::<S>))
    .route("/profile/{handle}/media", get(profiles::media::<S>))
    .route("/profile/{handle}/videos", get(profiles::videos::<S>))
    .route("/profile/{handle}/like_all", post(profiles::like_all::<S>))
    // Media
    .route("/media", get(media::media::<S>))
    .route("/videos", get(media::videos::<S>))
    .route("/all_media", get(media::all_media::<S>))
    // Favorites
    .route("/favorites", get(favorites::list::<S>))
    .route("/favorite_accounts_tweets", get(favorites::account_tweets::<S>))
    .route(
      "/favorite/{id}",
      get(favorites::status::<S>)
        .post(favorites::like::<S>)
        .delete(favorites::unlike::<S>),
    )
    .route(
      "/favorite_account/{handle}",
      post(favorites::like_account::<S>).delete(favorites::unlike_account::<S>),
    )
    // Accounts
    .route("/accounts", get(accounts::list::<S>))
    .route("/accounts/requested", get(accounts::requested::<S>))
    .route("/hide/{handle}", post(accounts::hide::<S>).delete(accounts::unhide::<S>))
    .route("/hidden-tweets", get(accounts::hidden_tweets::<S>))
    .route(
      "/hide-tweet/{id}",
      post(accounts::hide_tweet::<S>).delete(accounts::unhide_tweet::<S>),
    )
    .with_state(state)
}
