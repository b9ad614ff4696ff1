pub mod extract;
pub mod headings;
pub mod tables;
pub mod tree;

use chrono::{DateTime, SecondsFormat, Utc};
use scraper::Html;
use tracing::debug;
use url::Url;

use crate::model::{Document, Metadata};
use tree::PageNode;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Record per-cell background colors on every materialized row.
    pub capture_colors: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { capture_colors: true }
    }
}

/// Raw HTML → Document, stamped with the current time.
pub fn extract(html: &str, source: &str, opts: &ExtractOptions) -> Document {
    extract_at(html, source, Utc::now(), opts)
}

/// Same as [`extract`] with a caller-supplied timestamp. Never fails: sections
/// that can't be found come back empty.
pub fn extract_at(
    html: &str,
    source: &str,
    fetched_at: DateTime<Utc>,
    opts: &ExtractOptions,
) -> Document {
    let page = Html::parse_document(html);
    let root = page.root_element();
    let body_text = root
        .descendants_named(&["body"])
        .first()
        .unwrap_or(&root)
        .text_content();
    let base = Url::parse(source).ok();

    let active_hashes = extract::active::extract(root, &body_text, opts.capture_colors);
    let longest_chain = extract::chain::extract(root, opts.capture_colors);
    let summary = extract::summary::extract(root, opts.capture_colors);
    let assets = extract::assets::extract(root, base.as_ref());
    let difficulty = extract::difficulty::derive(&body_text, &summary);

    debug!(
        active = active_hashes.len(),
        chain = longest_chain.entries.len(),
        summary = summary.len(),
        assets = assets.len(),
        difficulty = difficulty.is_some(),
        "extracted {}",
        source
    );

    Document {
        metadata: Metadata {
            fetched_at: fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: source.to_string(),
        },
        active_hashes,
        longest_chain,
        summary,
        assets,
        difficulty,
    }
}
