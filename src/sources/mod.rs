//! Headline sources.
//!
//! Every source answers the same question: given a locator and an item cap,
//! which `(title, link)` pairs does it currently publish? Two kinds exist:
//!
//! | Kind | Module | Method |
//! |------|--------|--------|
//! | Feed | [`feed`] | RSS 2.0 / RSS 1.0 / Atom parsing |
//! | Scrape | [`scrape`] | CSS selector over an HTML page |
//!
//! Sources hold no state between calls. A source that is reachable but
//! publishes nothing returns `Ok(vec![])`; only transport and parse
//! problems are errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::error::FetchError;
use crate::models::{Item, SourceKind};

pub mod feed;
pub mod scrape;

pub use feed::FeedSource;
pub use scrape::ScrapeSource;

/// The single capability every source provides.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, locator: &str, max_items: usize) -> Result<Vec<Item>, FetchError>;
}

/// A source selected from its [`SourceKind`] at construction time.
#[derive(Debug, Clone)]
pub enum Source {
    Feed(FeedSource),
    Scrape(ScrapeSource),
}

impl Source {
    pub fn from_kind(client: &Client, kind: &SourceKind, timeout: Duration) -> Self {
        match kind {
            SourceKind::Feed => Source::Feed(FeedSource::new(client.clone(), timeout)),
            SourceKind::Scrape(rule) => {
                Source::Scrape(ScrapeSource::new(client.clone(), rule.clone(), timeout))
            }
        }
    }
}

#[async_trait]
impl Fetch for Source {
    async fn fetch(&self, locator: &str, max_items: usize) -> Result<Vec<Item>, FetchError> {
        match self {
            Source::Feed(s) => s.fetch(locator, max_items).await,
            Source::Scrape(s) => s.fetch(locator, max_items).await,
        }
    }
}

/// Build the HTTP client shared by every source.
pub fn http_client(user_agent: &str) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(FetchError::from)
}

async fn get(client: &Client, url: &str, timeout: Duration) -> Result<Response, FetchError> {
    Ok(client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?)
}

/// GET `url` and return its body decoded as text, treating non-2xx
/// statuses as failures.
///
/// Decoding follows the `charset` of the `Content-Type` header and falls
/// back to UTF-8. A charset declared only inside the document (an HTML
/// `<meta charset>`) is not consulted.
pub(crate) async fn get_text(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    Ok(get(client, url, timeout).await?.text().await?)
}

/// GET `url` and return its body untouched.
///
/// Feeds go through here so the parser can honor the document's own
/// `<?xml encoding=...?>` declaration.
pub(crate) async fn get_bytes(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    Ok(get(client, url, timeout).await?.bytes().await?.to_vec())
}

#[cfg(test)]
pub(crate) mod test_server;
