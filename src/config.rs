//! Runtime settings and the topic table.
//!
//! Settings come from an optional YAML file layered over built-in defaults.
//! Every field is optional in the file; topics declared there replace the
//! built-in topic of the same name and add to the rest.
//!
//! ```yaml
//! max_length: 4000
//! timeout_secs: 10
//! default_max_items: 5
//! topics:
//!   tax:
//!     - name: Google News
//!       kind: feed
//!       locator: https://news.google.com/rss/search?q=GST
//!     - name: Court Desk
//!       kind: scrape
//!       locator: https://courts.example.com/latest
//!       selector: "h2.title a"
//!       base_url: https://courts.example.com
//!       max_items: 3
//! ```

use std::collections::{BTreeMap, HashSet};
use std::num::NonZeroUsize;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::ConfigError;
use crate::models::{ScrapeRule, SourceKind, SourceSpec};
use crate::sources::scrape::compile_rule;

pub const DEFAULT_MAX_LENGTH: usize = 4096;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_ITEMS: usize = 5;
pub const DEFAULT_USER_AGENT: &str = concat!("news_relay/", env!("CARGO_PKG_VERSION"));

const NEWS_SEARCH: &str = "https://news.google.com/rss/search";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Chunk ceiling of the delivery channel, in characters.
    pub max_length: NonZeroUsize,
    /// Per-request timeout applied to every source call.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub default_max_items: usize,
    /// Topic name (lowercase) to its ordered sources.
    pub topics: BTreeMap<String, Vec<SourceSpec>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_length: NonZeroUsize::new(DEFAULT_MAX_LENGTH).unwrap_or(NonZeroUsize::MIN),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_max_items: DEFAULT_MAX_ITEMS,
            topics: builtin_topics(DEFAULT_MAX_ITEMS),
        }
    }
}

/// The on-disk shape; everything optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    max_length: Option<NonZeroUsize>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    default_max_items: Option<usize>,
    #[serde(default)]
    topics: BTreeMap<String, Vec<SpecEntry>>,
}

#[derive(Debug, Deserialize)]
struct SpecEntry {
    name: String,
    #[serde(flatten)]
    kind: SourceKind,
    locator: String,
    max_items: Option<usize>,
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No settings file given; using defaults");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_yaml(&text)?;
        info!(topics = settings.topics.len(), "Loaded settings file");
        Ok(settings)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = if text.trim().is_empty() {
            SettingsFile::default()
        } else {
            serde_yaml::from_str(text)?
        };
        let mut settings = Self::default();

        if let Some(n) = file.max_length {
            settings.max_length = n;
        }
        if let Some(secs) = file.timeout_secs {
            if secs == 0 {
                return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
            }
            settings.timeout_secs = secs;
        }
        if let Some(ua) = file.user_agent {
            settings.user_agent = ua;
        }
        if let Some(n) = file.default_max_items {
            settings.default_max_items = n;
            settings.topics = builtin_topics(n);
        }

        for (topic, entries) in file.topics {
            let key = topic.trim().to_lowercase();
            let specs = entries
                .into_iter()
                .map(|e| SourceSpec {
                    name: e.name,
                    kind: e.kind,
                    locator: e.locator,
                    max_items: e.max_items.unwrap_or(settings.default_max_items),
                })
                .collect::<Vec<_>>();
            validate_topic(&key, &specs)?;
            settings.topics.insert(key, specs);
        }
        Ok(settings)
    }

    /// Ordered sources for `topic`.
    ///
    /// Lookup ignores case and surrounding whitespace. Anything not in the
    /// table becomes a single news search for the topic text.
    pub fn specs_for(&self, topic: &str) -> Vec<SourceSpec> {
        let key = topic.trim().to_lowercase();
        match self.topics.get(&key) {
            Some(specs) => specs.clone(),
            None => vec![SourceSpec::feed(
                "Google News",
                news_search_url(topic.trim()),
                self.default_max_items,
            )],
        }
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }
}

fn validate_topic(topic: &str, specs: &[SourceSpec]) -> Result<(), ConfigError> {
    if topic.is_empty() {
        return Err(ConfigError::Invalid("empty topic name".into()));
    }
    let mut seen = HashSet::new();
    for spec in specs {
        if spec.name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("topic {topic}: source with empty name")));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "topic {topic}: duplicate source name {:?}",
                spec.name
            )));
        }
        if spec.locator.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "topic {topic}: source {:?} has no locator",
                spec.name
            )));
        }
        if let SourceKind::Scrape(rule) = &spec.kind {
            compile_rule(rule).map_err(|e| {
                ConfigError::Invalid(format!("topic {topic}: source {:?}: {e}", spec.name))
            })?;
        }
    }
    Ok(())
}

/// Google News RSS search URL for free text.
pub fn news_search_url(query: &str) -> String {
    format!(
        "{NEWS_SEARCH}?q={}&hl=en-IN&gl=IN&ceid=IN:en",
        urlencoding::encode(query)
    )
}

fn builtin_topics(max_items: usize) -> BTreeMap<String, Vec<SourceSpec>> {
    let mut topics = BTreeMap::new();
    topics.insert(
        "tax".to_string(),
        vec![
            SourceSpec::feed("GST News", news_search_url("GST India"), max_items),
            SourceSpec::feed("Income Tax News", news_search_url("income tax CBDT"), max_items),
        ],
    );
    topics.insert(
        "caselaws".to_string(),
        vec![
            SourceSpec::feed(
                "Tax Judgments",
                news_search_url("tax judgment High Court OR Supreme Court OR ITAT"),
                max_items,
            ),
            SourceSpec::scrape(
                "LiveLaw Top Stories",
                "https://www.livelaw.in/top-stories",
                ScrapeRule {
                    selector: "h2 a[href]".to_string(),
                    base_url: "https://www.livelaw.in".to_string(),
                },
                max_items,
            ),
        ],
    );
    topics.insert(
        "ipo".to_string(),
        vec![
            SourceSpec::feed("IPO News", news_search_url("IPO India"), max_items),
            SourceSpec::feed("Upcoming IPOs", news_search_url("upcoming IPO GMP"), max_items),
        ],
    );
    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_builtin_commands() {
        let settings = Settings::default();
        let names: Vec<&str> = settings.topic_names().collect();
        assert_eq!(names, vec!["caselaws", "ipo", "tax"]);
        assert_eq!(settings.max_length.get(), 4096);
        assert_eq!(settings.timeout_secs, 10);
        for specs in settings.topics.values() {
            validate_topic("builtin", specs).unwrap();
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let settings = Settings::default();
        let specs = settings.specs_for("  TAX ");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "GST News");
    }

    #[test]
    fn test_free_form_topic_becomes_news_search() {
        let settings = Settings::default();
        let specs = settings.specs_for("transfer pricing");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].kind, SourceKind::Feed);
        assert_eq!(specs[0].max_items, DEFAULT_MAX_ITEMS);
        assert!(specs[0].locator.contains("q=transfer%20pricing"));
    }

    #[test]
    fn test_yaml_overrides_and_defaults_max_items() {
        let yaml = r#"
max_length: 4000
timeout_secs: 5
topics:
  Tax:
    - name: Only Feed
      kind: feed
      locator: https://feeds.example.com/tax.xml
  gst:
    - name: Portal
      kind: scrape
      locator: https://gst.example.gov/news
      selector: "ul.news li a"
      base_url: https://gst.example.gov
      max_items: 2
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.max_length.get(), 4000);
        assert_eq!(settings.timeout_secs, 5);

        let tax = settings.specs_for("tax");
        assert_eq!(tax.len(), 1);
        assert_eq!(tax[0].name, "Only Feed");
        assert_eq!(tax[0].max_items, DEFAULT_MAX_ITEMS);

        let gst = settings.specs_for("gst");
        assert_eq!(gst[0].max_items, 2);
        assert!(matches!(gst[0].kind, SourceKind::Scrape(_)));

        assert!(settings.topics.contains_key("ipo"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let yaml = r#"
topics:
  tax:
    - { name: A, kind: feed, locator: "https://a.example.com/rss" }
    - { name: A, kind: feed, locator: "https://b.example.com/rss" }
"#;
        let err = Settings::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_selector_rejected_at_load() {
        let yaml = r#"
topics:
  tax:
    - name: Broken
      kind: scrape
      locator: https://a.example.com
      selector: "div[["
      base_url: https://a.example.com
"#;
        let err = Settings::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_scrape_without_rule_fields_is_yaml_error() {
        let yaml = r#"
topics:
  tax:
    - { name: Page, kind: scrape, locator: "https://a.example.com" }
"#;
        assert!(matches!(
            Settings::from_yaml(yaml).unwrap_err(),
            ConfigError::Yaml(_)
        ));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_yaml("\n").unwrap();
        assert_eq!(settings.max_length.get(), DEFAULT_MAX_LENGTH);
        assert_eq!(settings.topics.len(), 3);
    }

    #[test]
    fn test_zero_max_length_rejected() {
        assert!(Settings::from_yaml("max_length: 0").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/news_relay.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
