//! HTML page source driven by a [`ScrapeRule`].
//!
//! The rule's selector picks one element per headline. The headline text is
//! the element's collapsed text; the link is the element's own `href` or
//! that of its first descendant anchor, joined onto the rule's base URL.
//!
//! A selector that matches nothing is an empty success: the page was
//! reachable and simply had no headlines in the expected place.
//!
//! Pages are decoded using the `charset` of the response's `Content-Type`
//! header, defaulting to UTF-8. An encoding declared only in a
//! `<meta charset>` tag is ignored, so such pages must be served with a
//! matching header to keep non-ASCII headlines intact.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use super::{Fetch, get_text};
use crate::error::FetchError;
use crate::models::{Item, ScrapeRule};
use crate::utils::{resolve_link, unwrap_redirect};

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Downloads a page and applies its [`ScrapeRule`].
#[derive(Debug, Clone)]
pub struct ScrapeSource {
    client: Client,
    rule: ScrapeRule,
    timeout: Duration,
}

impl ScrapeSource {
    /// The rule is checked on every fetch, not here, so a bad rule surfaces
    /// as that source's [`FetchError::Extraction`] instead of a panic.
    pub fn new(client: Client, rule: ScrapeRule, timeout: Duration) -> Self {
        Self {
            client,
            rule,
            timeout,
        }
    }
}

#[async_trait]
impl Fetch for ScrapeSource {
    #[instrument(level = "info", skip(self), fields(kind = "scrape", selector = %self.rule.selector))]
    async fn fetch(&self, locator: &str, max_items: usize) -> Result<Vec<Item>, FetchError> {
        // A bad rule fails before any request is made.
        let compiled = compile_rule(&self.rule)?;
        let html = get_text(&self.client, locator, self.timeout).await?;
        debug!(bytes = html.len(), "Downloaded page");

        let items = extract_items(&html, &compiled, max_items);
        info!(count = items.len(), "Extracted page items");
        Ok(items)
    }
}

/// A rule whose selector and base URL are known to be valid.
#[derive(Debug)]
pub struct CompiledRule {
    selector: Selector,
    base: Url,
}

/// Validate a rule's selector and base URL.
///
/// # Arguments
///
/// * `rule` - The selector text and base URL as configured
///
/// # Returns
///
/// A [`CompiledRule`] ready for [`extract_items`], or
/// [`FetchError::Extraction`] naming whichever half is malformed.
///
/// # Examples
///
/// ```ignore
/// let rule = ScrapeRule {
///     selector: "h2.title a".to_string(),
///     base_url: "https://courts.example.com".to_string(),
/// };
/// let compiled = compile_rule(&rule)?;
/// ```
pub fn compile_rule(rule: &ScrapeRule) -> Result<CompiledRule, FetchError> {
    let selector = Selector::parse(&rule.selector)
        .map_err(|e| FetchError::Extraction(format!("invalid selector {:?}: {e}", rule.selector)))?;
    let base = Url::parse(&rule.base_url)
        .map_err(|e| FetchError::Extraction(format!("invalid base URL {}: {e}", rule.base_url)))?;
    Ok(CompiledRule { selector, base })
}

/// Apply a compiled rule to an HTML document.
///
/// Matches without a usable title or link are skipped; the first
/// `max_items` of the rest are returned in document order. No match at
/// all yields an empty vector.
///
/// # Examples
///
/// ```ignore
/// let items = extract_items(&html, &compiled, 5);
/// for item in &items {
///     println!("{} {}", item.title(), item.link());
/// }
/// ```
pub fn extract_items(html: &str, rule: &CompiledRule, max_items: usize) -> Vec<Item> {
    let document = Html::parse_document(html);
    document
        .select(&rule.selector)
        .filter_map(|element| {
            let href = element_href(element)?;
            let title = element.text().collect::<Vec<_>>().join(" ");
            let absolute = resolve_link(&rule.base, href)?;
            Item::new(&title, &unwrap_redirect(&absolute))
        })
        .take(max_items)
        .collect()
}

fn element_href(element: ElementRef<'_>) -> Option<&str> {
    element
        .value()
        .attr("href")
        .or_else(|| {
            element
                .select(&ANCHOR)
                .next()
                .and_then(|a| a.value().attr("href"))
        })
        .filter(|href| !href.trim().is_empty())
}
