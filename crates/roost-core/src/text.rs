//! Tweet text handling: mention extraction, status-link parsing, and the
//! HTML formatter used for display.

use std::sync::LazyLock;

use regex::Regex;

static MENTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention pattern is valid"));

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?P<url>https?://[^\s]+)|@(?P<handle>\w+)").expect("token pattern is valid")
});

static STATUS_LINK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^https?://(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/(\w+)/status(?:es)?/(\d+)(?:[/?#]\S*)?$",
  )
  .expect("status link pattern is valid")
});

// ─── Mentions ────────────────────────────────────────────────────────────────

/// Handles mentioned as `@handle`, in order of appearance, repeats included.
pub fn mentions(text: &str) -> impl Iterator<Item = &str> {
  MENTION
    .captures_iter(text)
    .filter_map(|c| c.get(1))
    .map(|m| m.as_str())
}

// ─── Status links ────────────────────────────────────────────────────────────

/// A link to a single status on the origin platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLink<'a> {
  pub handle:    &'a str,
  pub status_id: &'a str,
}

impl<'a> StatusLink<'a> {
  /// Parse a value consisting of exactly one status URL, surrounding
  /// whitespace aside. Free text containing a URL does not qualify.
  pub fn parse(value: &'a str) -> Option<Self> {
    let caps = STATUS_LINK.captures(value.trim())?;
    Some(Self {
      handle:    caps.get(1)?.as_str(),
      status_id: caps.get(2)?.as_str(),
    })
  }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

/// Turns raw tweet text into its display form.
pub trait TextFormatter {
  fn format(&self, text: &str) -> String;
}

impl<F> TextFormatter for F
where
  F: Fn(&str) -> String,
{
  fn format(&self, text: &str) -> String { self(text) }
}

/// Escapes text as HTML, links `@handle` to the handle's profile page and
/// bare URLs to themselves in a new tab.
#[derive(Debug, Clone)]
pub struct HtmlFormatter {
  profile_base: String,
}

impl HtmlFormatter {
  pub fn new(profile_base: impl Into<String>) -> Self {
    Self { profile_base: profile_base.into() }
  }
}

impl Default for HtmlFormatter {
  fn default() -> Self { Self::new("/profile/") }
}

impl TextFormatter for HtmlFormatter {
  fn format(&self, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in TOKEN.captures_iter(text) {
      let Some(whole) = caps.get(0) else { continue };
      push_escaped(&mut out, &text[last..whole.start()]);

      if let Some(url) = caps.name("url") {
        let href = escape(url.as_str());
        out.push_str(&format!(r#"<a href="{href}" target="_blank">{href}</a>"#));
      } else if let Some(handle) = caps.name("handle") {
        let handle = handle.as_str();
        out.push_str(&format!(
          r#"<a href="{}{handle}">@{handle}</a>"#,
          escape(&self.profile_base)
        ));
      }
      last = whole.end();
    }

    push_escaped(&mut out, &text[last..]);
    out
  }
}

fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  push_escaped(&mut out, s);
  out
}

fn push_escaped(out: &mut String, s: &str) {
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mentions_in_order_with_repeats() {
    let found: Vec<_> = mentions("@bob hi @carol, and @bob again").collect();
    assert_eq!(found, ["bob", "carol", "bob"]);
    assert_eq!(mentions("no handles here").count(), 0);
  }

  #[test]
  fn parses_status_links() {
    let link = StatusLink::parse("https://twitter.com/carol/status/123456").unwrap();
    assert_eq!(link.handle, "carol");
    assert_eq!(link.status_id, "123456");

    let link = StatusLink::parse("  https://x.com/dave_9/status/42?s=20  ").unwrap();
    assert_eq!(link.status_id, "42");

    assert!(StatusLink::parse("just text @dave see http://x.com").is_none());
    assert!(StatusLink::parse("https://example.com/carol/status/1").is_none());
    assert!(StatusLink::parse("see https://twitter.com/carol/status/1").is_none());
  }

  #[test]
  fn links_mentions_and_urls() {
    let html = HtmlFormatter::default().format("just text @dave see http://x.com");
    assert_eq!(
      html,
      r#"just text <a href="/profile/dave">@dave</a> see <a href="http://x.com" target="_blank">http://x.com</a>"#
    );
  }

  #[test]
  fn mentions_inside_urls_stay_in_the_url() {
    let html = HtmlFormatter::default().format("https://host.example/@alice/posts");
    assert_eq!(
      html,
      r#"<a href="https://host.example/@alice/posts" target="_blank">https://host.example/@alice/posts</a>"#
    );
  }

  #[test]
  fn escapes_markup() {
    let html = HtmlFormatter::new("/u/").format("<b>bold</b> & @eve");
    assert_eq!(html, r#"&lt;b&gt;bold&lt;/b&gt; &amp; <a href="/u/eve">@eve</a>"#);
  }

  #[test]
  fn closures_are_formatters() {
    let upper = |s: &str| s.to_uppercase();
    assert_eq!(upper.format("abc"), "ABC");
  }
}
