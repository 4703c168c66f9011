//! Flattened media galleries.

use serde::{Deserialize, Serialize};

use crate::{
  enrich::EnrichedTweet,
  media::{MediaItem, MediaKind},
};

/// A media item together with the tweet it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
  pub tweet_id: String,
  pub compte:   String,
  #[serde(flatten)]
  pub media:    MediaItem,
}

/// Every normalised media item of `tweets`, in tweet order, optionally
/// restricted to one kind.
pub fn gallery(tweets: &[EnrichedTweet], kind: Option<MediaKind>) -> Vec<GalleryItem> {
  tweets
    .iter()
    .flat_map(|t| {
      t.all_media
        .iter()
        .filter(move |m| kind.is_none_or(|k| m.kind == k))
        .map(move |m| GalleryItem {
          tweet_id: t.tweet.id.clone(),
          compte:   t.tweet.compte.clone(),
          media:    m.clone(),
        })
    })
    .collect()
}
