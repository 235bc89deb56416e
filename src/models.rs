//! Data models shared by sources, the aggregator and the output stage.
//!
//! - [`Item`]: one normalized (title, link) pair produced by a source
//! - [`SourceSpec`]: configuration describing one source to query for a topic
//! - [`Section`]: the per-source outcome inside a [`Report`]
//! - [`Report`]: every section for one topic, in declaration order
//! - [`Chunk`]: a bounded slice of rendered report text

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::collapse_whitespace;

/// A normalized headline.
///
/// Items can only be built through [`Item::new`], which guarantees a
/// non-empty trimmed title and an absolute http(s) link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    title: String,
    link: String,
}

impl Item {
    /// Build an item, returning `None` when the title is blank or the link
    /// is not an absolute http(s) URL.
    pub fn new(title: &str, link: &str) -> Option<Self> {
        let title = collapse_whitespace(title);
        if title.is_empty() {
            return None;
        }
        let parsed = Url::parse(link.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        Some(Self {
            title,
            link: parsed.to_string(),
        })
    }

    /// Headline text with runs of whitespace collapsed to single spaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use news_relay::Item;
    ///
    /// let item = Item::new("  GST   council\nmeets ", "https://news.example.com/gst").unwrap();
    /// assert_eq!(item.title(), "GST council meets");
    /// ```
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Absolute article URL.
    pub fn link(&self) -> &str {
        &self.link
    }
}

/// How a source obtains its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceKind {
    /// An RSS/Atom document at the locator URL.
    Feed,
    /// An HTML page at the locator URL, read with a site-specific rule.
    Scrape(ScrapeRule),
}

/// Site-specific extraction rule for scraped pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRule {
    /// CSS selector for the elements carrying each headline.
    pub selector: String,
    /// Base URL that relative hrefs are joined onto.
    pub base_url: String,
}

/// One source to query for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Display label, unique within a topic.
    pub name: String,
    #[serde(flatten)]
    pub kind: SourceKind,
    /// Feed URL, page URL or query string.
    pub locator: String,
    /// Upper bound on items kept from this source.
    pub max_items: usize,
}

impl SourceSpec {
    /// A feed source read from `locator`.
    ///
    /// # Arguments
    ///
    /// * `name` - Section label shown in the report
    /// * `locator` - Absolute URL of the RSS or Atom document
    /// * `max_items` - Most items kept from this source
    pub fn feed(name: impl Into<String>, locator: impl Into<String>, max_items: usize) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Feed,
            locator: locator.into(),
            max_items,
        }
    }

    /// A page scraped with `rule`; see [`SourceSpec::feed`] for the other arguments.
    pub fn scrape(
        name: impl Into<String>,
        locator: impl Into<String>,
        rule: ScrapeRule,
        max_items: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Scrape(rule),
            locator: locator.into(),
            max_items,
        }
    }
}

/// Result of querying one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Outcome {
    Ok(Vec<Item>),
    Failed(String),
}

/// A labeled per-source block of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: String,
    pub outcome: Outcome,
}

impl Section {
    /// A successful section. An empty `items` is still a success.
    ///
    /// # Examples
    ///
    /// ```
    /// use news_relay::Section;
    ///
    /// let section = Section::ok("GST News", Vec::new());
    /// assert!(!section.is_failed());
    /// ```
    pub fn ok(label: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            label: label.into(),
            outcome: Outcome::Ok(items),
        }
    }

    /// A section whose source could not be read; `reason` is shown verbatim.
    pub fn failed(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            outcome: Outcome::Failed(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Everything fetched for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub topic: String,
    /// Ordered exactly like the specs that produced them.
    pub sections: Vec<Section>,
    pub fetched_at: DateTime<Utc>,
}

impl Report {
    pub fn failed_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_failed()).count()
    }

    pub fn item_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| match &s.outcome {
                Outcome::Ok(items) => items.len(),
                Outcome::Failed(_) => 0,
            })
            .sum()
    }
}

/// A bounded slice of rendered text, numbered from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    /// Length in characters, the unit chunk limits are expressed in.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
