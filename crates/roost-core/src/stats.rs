//! Account statistics derived from a set of records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  text::mentions,
  tweet::{Post, TweetRecord},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCount {
  pub account: String,
  pub count:   u64,
}

/// Count handles and rank them: most frequent first, ties by handle.
pub fn rank_accounts<I, S>(handles: I) -> Vec<AccountCount>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut counts: HashMap<String, u64> = HashMap::new();
  for handle in handles {
    let handle = handle.as_ref();
    if handle.is_empty() {
      continue;
    }
    *counts.entry(handle.to_owned()).or_default() += 1;
  }

  let mut ranked: Vec<_> = counts
    .into_iter()
    .map(|(account, count)| AccountCount { account, count })
    .collect();
  ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.account.cmp(&b.account)));
  ranked
}

/// Handles mentioned in the records' own text. A retweet wrapper's text is
/// the retweeter's, so `RT @origin:` prefixes count too.
pub fn top_mentions<'a>(records: impl IntoIterator<Item = &'a TweetRecord>) -> Vec<AccountCount> {
  rank_accounts(
    records
      .into_iter()
      .filter_map(|r| r.tweet.texte.as_deref())
      .flat_map(mentions),
  )
}

/// Authors of the originals the records retweet.
pub fn top_retweeted<'a>(records: impl IntoIterator<Item = &'a TweetRecord>) -> Vec<AccountCount> {
  rank_accounts(
    records
      .into_iter()
      .filter(|r| r.is_retweet())
      .map(|r| match Post::from(r.clone()) {
        Post::Retweet { of, .. } => of.compte,
        Post::Original(t) => t.compte,
      }),
  )
}
