//! Plain-text rendering of a [`Report`].
//!
//! Layout, with blocks joined by [`SECTION_DELIMITER`]:
//!
//! ```text
//! 📢 tax updates
//!
//! ---
//!
//! 📰 GST News:
//! Council trims rates
//! https://example.com/gst
//!
//! Portal adds new form
//! https://example.com/form
//!
//! ---
//!
//! 📌 Income Tax News:
//! ❌ Failed to fetch Income Tax News: network error: timeout
//! ```
//!
//! The output has no trailing newline and depends only on the report's
//! topic and sections.

use itertools::Itertools;

use crate::models::{Item, Outcome, Report, Section};

/// Placed between the header and each section.
pub const SECTION_DELIMITER: &str = "\n\n---\n\n";

/// Shown under a source that answered with zero items.
pub const NO_ITEMS: &str = "No items found.";

/// Render `report` as plain text: a header, then one block per section in
/// report order.
///
/// # Examples
///
/// ```ignore
/// let text = render(&aggregator.report_for("tax").await);
/// assert!(text.starts_with("📢 tax updates"));
/// ```
pub fn render(report: &Report) -> String {
    std::iter::once(header(&report.topic))
        .chain(report.sections.iter().map(render_section))
        .join(SECTION_DELIMITER)
}

/// The topic is printed exactly as requested.
fn header(topic: &str) -> String {
    format!("📢 {topic} updates")
}

fn render_section(section: &Section) -> String {
    match &section.outcome {
        Outcome::Ok(items) if items.is_empty() => format!("📰 {}:\n{NO_ITEMS}", section.label),
        Outcome::Ok(items) => format!(
            "📰 {}:\n{}",
            section.label,
            items.iter().map(render_item).join("\n\n")
        ),
        Outcome::Failed(reason) => format!(
            "📌 {label}:\n❌ Failed to fetch {label}: {reason}",
            label = section.label
        ),
    }
}

fn render_item(item: &Item) -> String {
    format!("{}\n{}", item.title(), item.link())
}
