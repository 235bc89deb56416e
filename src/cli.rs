//! Command-line interface definitions for News Relay.
//!
//! Every option can also come from an environment variable.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

/// Fetch a topic report and print it as delivery-sized chunks.
///
/// # Examples
///
/// ```sh
/// # Built-in topic, default 4096-character chunks
/// news_relay tax
///
/// # Free-form topic with a custom settings file and Telegram-sized chunks
/// news_relay "transfer pricing" -c topics.yaml -l 4000
///
/// # Whole report as JSON
/// news_relay ipo --json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topic command (tax, caselaws, ipo, ...) or free-form search text
    #[arg(required_unless_present = "list_topics")]
    pub topic: Option<String>,

    /// Path to a YAML settings file
    #[arg(short, long, env = "NEWS_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum characters per chunk; overrides the settings file
    #[arg(short = 'l', long, env = "NEWS_RELAY_MAX_LENGTH")]
    pub max_length: Option<NonZeroUsize>,

    /// Print the report as JSON instead of text chunks
    #[arg(long)]
    pub json: bool,

    /// List configured topics and exit
    #[arg(long)]
    pub list_topics: bool,
}
