pub mod active;
pub mod assets;
pub mod chain;
pub mod difficulty;
pub mod summary;

use std::sync::LazyLock;

use regex::Regex;

use super::tree::PageNode;

/// A 64-digit hex token standing on its own.
pub static HASH_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[0-9a-f]{64}\b").unwrap());

/// 64 hex digits anywhere, even inside a longer run.
pub static HASH_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[0-9a-f]{64}").unwrap());

/// Walk the element siblings after `heading` until a `<table>` shows up.
///
/// `visit` sees every sibling on the way, the table included.
pub(crate) fn walk_to_table<N: PageNode>(heading: N, mut visit: impl FnMut(N)) -> Option<N> {
    let mut node = heading.next_element_sibling();
    while let Some(el) = node {
        visit(el);
        if el.is("table") {
            return Some(el);
        }
        node = el.next_element_sibling();
    }
    None
}

pub(crate) fn next_table<N: PageNode>(heading: N) -> Option<N> {
    walk_to_table(heading, |_| {})
}
