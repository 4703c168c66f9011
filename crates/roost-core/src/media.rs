//! Media normalisation.
//!
//! A tweet's `media` and `video` lists are folded into one display list:
//! photos first in their stored order, then one video per distinct clip. The
//! scraped `video` list typically holds every rendition of a clip; only the
//! largest survives.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tweet::{MediaAttachment, MediaObject, Tweet, VideoRendition};

static RESOLUTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"/(\d+)x(\d+)/").expect("resolution pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
  Photo,
  Video,
}

/// One displayable media item. Carries the source entry's fields through
/// unchanged, plus the pixel area for videos where the URL encodes one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
  #[serde(rename = "type")]
  pub kind:         MediaKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lien:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub media_object: Option<MediaObject>,
  /// Width × height, parsed from a `/WxH/` URL segment.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resolution:   Option<u64>,
  #[serde(flatten)]
  pub extra:        Map<String, Value>,
}

impl MediaItem {
  fn photo(attachment: &MediaAttachment) -> Self {
    Self {
      kind:         MediaKind::Photo,
      lien:         attachment.lien.clone(),
      media_object: None,
      resolution:   None,
      extra:        attachment.extra.clone(),
    }
  }

  fn video(rendition: &VideoRendition, resolution: Option<u64>) -> Self {
    Self {
      kind: MediaKind::Video,
      lien: rendition.lien.clone(),
      media_object: rendition.media_object.clone(),
      resolution,
      extra: rendition.extra.clone(),
    }
  }

  pub fn is_video(&self) -> bool { self.kind == MediaKind::Video }
}

/// Pixel area encoded in a rendition URL, e.g. `/1280x720/` → 921600.
/// Absent or overflowing dimensions leave the rendition unranked.
pub fn parse_resolution(lien: &str) -> Option<u64> {
  let caps = RESOLUTION.captures(lien)?;
  let width: u64 = caps[1].parse().ok()?;
  let height: u64 = caps[2].parse().ok()?;
  width.checked_mul(height)
}

/// The clip a rendition belongs to: the last `/`-separated segment of its
/// expanded URL. Renditions without one cannot be grouped.
pub fn clip_key(rendition: &VideoRendition) -> Option<&str> {
  let url = rendition.media_object.as_ref()?.expanded_url.as_deref()?;
  Some(url.rsplit_once('/').map_or(url, |(_, tail)| tail))
}

/// Keep the highest-resolution rendition of each clip, in order of each
/// clip's first appearance. A rendition replaces the current pick only when
/// strictly larger, so ties and unranked renditions keep the first seen.
pub fn dedup_videos(renditions: &[VideoRendition]) -> Vec<MediaItem> {
  let mut slots: HashMap<&str, usize> = HashMap::new();
  let mut best: Vec<(&VideoRendition, Option<u64>)> = Vec::new();

  for rendition in renditions {
    let Some(key) = clip_key(rendition) else {
      continue;
    };
    let resolution = rendition.lien.as_deref().and_then(parse_resolution);
    match slots.get(key) {
      Some(&slot) => {
        if resolution > best[slot].1 {
          best[slot] = (rendition, resolution);
        }
      }
      None => {
        slots.insert(key, best.len());
        best.push((rendition, resolution));
      }
    }
  }

  best
    .into_iter()
    .map(|(rendition, resolution)| MediaItem::video(rendition, resolution))
    .collect()
}

/// Photos (entries typed `photo`) followed by deduplicated videos.
pub fn normalize_media(tweet: &Tweet) -> Vec<MediaItem> {
  tweet
    .media
    .iter()
    .filter(|m| m.is_photo())
    .map(MediaItem::photo)
    .chain(dedup_videos(&tweet.video))
    .collect()
}
