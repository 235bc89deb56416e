//! Topic aggregation.
//!
//! [`Aggregator::fetch_report`] runs every source of a topic concurrently,
//! one spawned task per spec, and joins the task handles in declaration
//! order. Each handle is the write-once slot for its spec, so the report's
//! sections always follow declaration order no matter which fetch finishes
//! first. A failing or panicking source becomes a failed section; it never
//! cancels its siblings and never escapes as an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Settings;
use crate::error::FetchError;
use crate::models::{Report, Section, SourceSpec};
use crate::sources::{Fetch, Source, http_client};

/// One unit of work: a spec paired with the source that serves it.
pub struct Job {
    pub spec: SourceSpec,
    pub source: Arc<dyn Fetch>,
}

/// Owns the HTTP client and the topic table for the life of the process.
pub struct Aggregator {
    client: Client,
    settings: Settings,
}

impl Aggregator {
    /// Build the shared HTTP client from `settings`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Network`] when the client cannot be constructed, for
    /// example when the TLS backend fails to initialize.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let aggregator = Aggregator::new(Settings::load(None)?)?;
    /// let report = aggregator.report_for("tax").await;
    /// ```
    pub fn new(settings: Settings) -> Result<Self, FetchError> {
        let client = http_client(&settings.user_agent)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sources configured for `topic`, or a news search for free-form text.
    pub fn resolve(&self, topic: &str) -> Vec<SourceSpec> {
        self.settings.specs_for(topic)
    }

    /// Resolve `topic` and fetch its report.
    pub async fn report_for(&self, topic: &str) -> Report {
        let specs = self.resolve(topic);
        self.fetch_report(topic, &specs).await
    }

    /// Query every spec and assemble one section per spec, in order.
    #[instrument(level = "info", skip(self, specs), fields(sources = specs.len()))]
    pub async fn fetch_report(&self, topic: &str, specs: &[SourceSpec]) -> Report {
        let timeout = Duration::from_secs(self.settings.timeout_secs);
        let jobs = specs
            .iter()
            .map(|spec| Job {
                spec: spec.clone(),
                source: Arc::new(Source::from_kind(&self.client, &spec.kind, timeout)),
            })
            .collect();
        gather(topic, jobs).await
    }
}

/// Run `jobs` concurrently and collect their sections in job order.
pub async fn gather(topic: &str, jobs: Vec<Job>) -> Report {
    let started = Instant::now();

    let slots: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let label = job.spec.name.clone();
            let handle = tokio::spawn(async move {
                let Job { spec, source } = job;
                let t0 = Instant::now();
                let result = source.fetch(&spec.locator, spec.max_items).await;
                debug!(source = %spec.name, elapsed_ms = t0.elapsed().as_millis() as u64, "Source finished");
                result
            });
            (label, handle)
        })
        .collect();

    let (labels, handles): (Vec<String>, Vec<_>) = slots.into_iter().unzip();
    let results = join_all(handles).await;

    let sections: Vec<Section> = labels
        .into_iter()
        .zip(results)
        .map(|(label, joined)| match joined {
            Ok(Ok(items)) => {
                info!(source = %label, count = items.len(), "Fetched source");
                Section::ok(label, items)
            }
            Ok(Err(e)) => {
                warn!(source = %label, error = %e, "Source failed");
                Section::failed(label, e.to_string())
            }
            Err(join_err) => {
                error!(source = %label, error = %join_err, "Fetch task aborted");
                Section::failed(label, format!("fetch task aborted: {join_err}"))
            }
        })
        .collect();

    let report = Report {
        topic: topic.to_string(),
        sections,
        fetched_at: Utc::now(),
    };
    info!(
        topic,
        sections = report.sections.len(),
        items = report.item_count(),
        failed = report.failed_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Report assembled"
    );
    report
}
