//! # News Relay
//!
//! Fetches headlines for a topic from several independent sources (RSS/Atom
//! feeds and scraped HTML pages), isolates per-source failures, renders
//! everything into one labeled text report and splits it into chunks that
//! fit a chat channel's message size limit.
//!
//! ## Pipeline
//!
//! 1. **Resolve**: a topic maps to an ordered list of [`SourceSpec`]s
//! 2. **Fetch**: every source runs concurrently; each yields items or a failure
//! 3. **Assemble**: one [`Section`] per source, in declaration order
//! 4. **Render**: the [`Report`] becomes a single text body
//! 5. **Chunk**: the body is split into bounded [`Chunk`]s for delivery
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use news_relay::{Aggregator, Settings, outputs};
//!
//! let settings = Settings::default();
//! let max_length = settings.max_length;
//! let aggregator = Aggregator::new(settings)?;
//! let report = aggregator.report_for("tax").await;
//! for chunk in outputs::split(&outputs::render(&report), max_length) {
//!     println!("{}", chunk.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod sources;
pub mod utils;

pub use aggregator::{Aggregator, Job, gather};
pub use config::Settings;
pub use error::{ConfigError, FetchError};
pub use models::{Chunk, Item, Outcome, Report, ScrapeRule, Section, SourceKind, SourceSpec};
pub use sources::{Fetch, Source};
