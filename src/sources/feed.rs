//! Syndication feed source.
//!
//! Reads RSS 2.0, RSS 1.0 (RDF) and Atom documents. Entries without a
//! usable title or link are skipped; the rest are kept in feed order up to
//! the requested cap. Aggregator links of the form `...?url=<real-link>`
//! are unwrapped to the real article link.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{Fetch, get_bytes};
use crate::error::FetchError;
use crate::models::Item;
use crate::utils::{resolve_link, truncate_for_log, unwrap_redirect};

/// Fetches and parses a feed URL.
#[derive(Debug, Clone)]
pub struct FeedSource {
    client: Client,
    timeout: Duration,
}

impl FeedSource {
    /// `timeout` bounds each request made through `client`.
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Fetch for FeedSource {
    #[instrument(level = "info", skip(self), fields(kind = "feed"))]
    async fn fetch(&self, locator: &str, max_items: usize) -> Result<Vec<Item>, FetchError> {
        let feed_url = Url::parse(locator)
            .map_err(|e| FetchError::Network(format!("invalid feed URL {locator}: {e}")))?;

        // Raw bytes: the parser reads the document's own encoding declaration.
        let body = get_bytes(&self.client, feed_url.as_str(), self.timeout).await?;
        debug!(bytes = body.len(), "Downloaded feed");

        let items = parse_feed(&body, &feed_url, max_items).inspect_err(|e| {
            let preview = String::from_utf8_lossy(&body);
            warn!(error = %e, body_preview = %truncate_for_log(&preview, 200), "Feed did not parse");
        })?;
        info!(count = items.len(), "Parsed feed items");
        Ok(items)
    }
}

/// Parse a feed document into at most `max_items` items.
///
/// # Arguments
///
/// * `body` - The undecoded document; its XML declaration picks the encoding
/// * `feed_url` - Base that relative entry links resolve against
/// * `max_items` - Cap applied after incomplete entries are dropped
///
/// # Returns
///
/// Items in feed order, possibly none, or [`FetchError::Parse`] when the
/// document is not a readable feed.
pub fn parse_feed(body: &[u8], feed_url: &Url, max_items: usize) -> Result<Vec<Item>, FetchError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let total = feed.entries.len();

    let items: Vec<Item> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.map(|t| t.content)?;
            let href = pick_link(&entry.links)?;
            let absolute = resolve_link(feed_url, &href)?;
            Item::new(&title, &unwrap_redirect(&absolute))
        })
        .take(max_items)
        .collect();

    if items.len() < total.min(max_items) {
        debug!(total, kept = items.len(), "Skipped feed entries without title or link");
    }
    Ok(items)
}

/// Prefer the entry's alternate (article) link, falling back to the first.
fn pick_link(links: &[feed_rs::model::Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::test_server::{Reply, serve};

    fn base() -> Url {
        Url::parse("https://news.example.com/rss/tax.xml").unwrap()
    }

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Tax desk</title>
    <link>https://news.example.com/</link>
    <description>Tax news</description>
    <item>
      <title>GST council trims rates on &amp; around essentials</title>
      <link>https://news.example.com/gst-council</link>
    </item>
    <item>
      <title><![CDATA[Income tax portal   adds new form]]></title>
      <link>/itr-form</link>
    </item>
    <item>
      <title>Entry missing its link</title>
    </item>
    <item>
      <link>https://news.example.com/untitled</link>
    </item>
    <item>
      <title>CBDT issues circular</title>
      <link>https://www.google.com/url?rct=j&amp;url=https%3A%2F%2Fincometax.example.gov%2Fcircular-7&amp;ct=ga</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>IPO watch</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2026-10-18T10:00:00Z</updated>
  <entry>
    <title>Alpha Ltd IPO opens</title>
    <id>urn:uuid:1</id>
    <updated>2026-10-18T10:00:00Z</updated>
    <link rel="self" href="https://ipo.example.com/api/alpha"/>
    <link rel="alternate" href="https://ipo.example.com/alpha"/>
  </entry>
  <entry>
    <title>Beta Ltd IPO allotment</title>
    <id>urn:uuid:2</id>
    <updated>2026-10-18T09:00:00Z</updated>
    <link href="https://ipo.example.com/beta"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_skips_incomplete_entries() {
        let items = parse_feed(RSS.as_bytes(), &base(), 10).unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title()).collect();
        assert_eq!(
            titles,
            vec![
                "GST council trims rates on & around essentials",
                "Income tax portal adds new form",
                "CBDT issues circular",
            ]
        );
    }

    #[test]
    fn test_parse_rss_resolves_and_unwraps_links() {
        let items = parse_feed(RSS.as_bytes(), &base(), 10).unwrap();
        assert_eq!(items[1].link(), "https://news.example.com/itr-form");
        assert_eq!(items[2].link(), "https://incometax.example.gov/circular-7");
    }

    #[test]
    fn test_parse_truncates_in_feed_order() {
        let items = parse_feed(RSS.as_bytes(), &base(), 2).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link(), "https://news.example.com/gst-council");
    }

    #[test]
    fn test_parse_atom_prefers_alternate_link() {
        let items = parse_feed(ATOM.as_bytes(), &base(), 5).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title(), "Alpha Ltd IPO opens");
        assert_eq!(items[0].link(), "https://ipo.example.com/alpha");
        assert_eq!(items[1].link(), "https://ipo.example.com/beta");
    }

    #[test]
    fn test_only_entry_missing_link_is_empty_success() {
        let xml = r#"<rss version="2.0"><channel><title>t</title>
            <item><title>No link here</title></item>
        </channel></rss>"#;
        let items = parse_feed(xml.as_bytes(), &base(), 5).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_empty_channel_is_empty_success() {
        let xml = r#"<rss version="2.0"><channel><title>quiet</title></channel></rss>"#;
        assert!(parse_feed(xml.as_bytes(), &base(), 5).unwrap().is_empty());
    }

    #[test]
    fn test_html_page_is_parse_error() {
        let html = "<html><body><p>Not a feed</p></body></html>";
        let err = parse_feed(html.as_bytes(), &base(), 5).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_feed(b"definitely not xml", &base(), 5).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    /// RSS body encoded as ISO-8859-1; `0xE9` is "é".
    fn latin1_feed() -> Vec<u8> {
        let mut body = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
            <rss version=\"2.0\"><channel><title>Desk</title>\n\
            <item><title>Caf"
            .to_vec();
        body.push(0xE9);
        body.extend_from_slice(
            b" tax</title><link>https://news.example.com/cafe</link></item>\n\
            </channel></rss>",
        );
        body
    }

    #[test]
    fn test_parse_honors_declared_latin1_encoding() {
        let items = parse_feed(&latin1_feed(), &base(), 5).unwrap();
        assert_eq!(items[0].title(), "Café tax");
    }

    #[tokio::test]
    async fn test_fetch_latin1_feed_keeps_accents() {
        let client = crate::sources::http_client("news_relay-test").unwrap();
        let source = FeedSource::new(client, Duration::from_secs(5));

        for content_type in ["application/rss+xml; charset=ISO-8859-1", "application/rss+xml"] {
            let base = serve(Reply::ok(content_type, latin1_feed())).await;
            let items = source.fetch(&format!("{base}/rss"), 5).await.unwrap();
            assert_eq!(items.len(), 1, "{content_type}");
            assert_eq!(items[0].title(), "Café tax", "{content_type}");
        }
    }
}
