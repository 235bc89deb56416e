//! `news_relay` binary: fetch one topic and write its chunks to stdout.
//!
//! Chunks are written in index order, each followed by a newline, the ASCII
//! record separator (`0x1e`) and another newline. Splitting stdout on
//! `"\n\x1e\n"` gives back each chunk's text byte for byte, so a delivery
//! process can forward them one message at a time. Logs go to stderr.

use std::error::Error;
use std::io::{self, Write};

use clap::Parser;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_relay::{Aggregator, Chunk, Settings, outputs};

mod cli;

use cli::Cli;

const CHUNK_SEPARATOR: &str = "\u{1e}";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref()).inspect_err(|e| {
        error!(error = %e, "Could not load settings");
    })?;
    if let Some(max_length) = args.max_length {
        settings.max_length = max_length;
    }

    if args.list_topics {
        let mut out = io::stdout().lock();
        for name in settings.topic_names() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let Some(topic) = args.topic.as_deref() else {
        return Err("a topic is required".into());
    };

    let aggregator = Aggregator::new(settings).inspect_err(|e| {
        error!(error = %e, "Could not build HTTP client");
    })?;
    run(&aggregator, topic, args.json).await
}

#[instrument(level = "info", skip(aggregator))]
async fn run(aggregator: &Aggregator, topic: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let started = std::time::Instant::now();
    let report = aggregator.report_for(topic).await;

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        let text = outputs::render(&report);
        let chunks = outputs::split(&text, aggregator.settings().max_length);
        info!(
            chars = text.chars().count(),
            chunks = chunks.len(),
            max_length = aggregator.settings().max_length.get(),
            "Rendered report"
        );
        write_chunks(&mut out, &chunks)?;
    }
    out.flush()?;

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        failed = report.failed_count(),
        "Done"
    );
    Ok(())
}

fn write_chunks<W: Write>(out: &mut W, chunks: &[Chunk]) -> io::Result<()> {
    for chunk in chunks {
        debug!(index = chunk.index, chars = chunk.len(), "Delivering chunk");
        write!(out, "{}", chunk.text)?;
        write!(out, "\n{CHUNK_SEPARATOR}\n")?;
    }
    Ok(())
}
