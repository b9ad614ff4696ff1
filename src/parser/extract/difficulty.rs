use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::TableData;

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*Difficulty\s*[:\-]?\s*").unwrap());

/// Best-effort difficulty string.
///
/// A Summary row keyed `difficulty`/`diff…` wins over anything found in the
/// page text. The text scan prefers a line naming difficulty, then a line that
/// looks like a bit/hash-rate figure. The result loses any leading
/// "Difficulty:" label; an empty result is `None`.
pub fn derive(page_text: &str, summary: &TableData) -> Option<String> {
    let from_text = scan_lines(page_text);
    let from_summary = summary_value(summary);
    if from_summary.is_some() {
        debug!("difficulty taken from summary table");
    }
    from_summary.or(from_text).and_then(|raw| normalize(&raw))
}

fn scan_lines(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let labelled = lines
        .iter()
        .find(|l| l.to_lowercase().contains("difficulty"));
    let found = labelled.or_else(|| {
        lines.iter().find(|l| {
            let l = l.to_lowercase();
            l.contains("bit") && (l.contains("sha") || l.contains("ghash") || l.contains("s/block"))
        })
    });
    found.map(|l| l.to_string())
}

fn summary_value(summary: &TableData) -> Option<String> {
    summary
        .rows()
        .iter()
        .filter(|r| r.cells.len() >= 2)
        .find(|r| {
            let key = r.cells[0].to_lowercase();
            key.contains("difficulty") || key.starts_with("diff")
        })
        .map(|r| r.cells[1].clone())
}

pub fn normalize(raw: &str) -> Option<String> {
    let stripped = LABEL_RE.replace(raw, "");
    let value = stripped.trim();
    (!value.is_empty()).then(|| value.to_string())
}
