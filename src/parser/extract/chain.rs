use tracing::debug;

use super::{walk_to_table, HASH_RUN_RE};
use crate::model::{Chain, TableData};
use crate::parser::headings::find_heading;
use crate::parser::tables::materialize;
use crate::parser::tree::PageNode;

const HEADING: &str = "Longest Chain";

/// Root hash and entry table following the "Longest Chain" heading.
///
/// The root is the first 64-hex run in any sibling visited on the way to the
/// table (the table's own text counts last). Later runs never replace it.
pub fn extract<N: PageNode>(root: N, capture_colors: bool) -> Chain {
    let Some(heading) = find_heading(root, HEADING) else {
        debug!("no '{}' heading", HEADING);
        return Chain::default();
    };

    let mut root_hash: Option<String> = None;
    let table = walk_to_table(heading, |el| {
        if root_hash.is_none() {
            root_hash = HASH_RUN_RE
                .find(&el.text_content())
                .map(|m| m.as_str().to_string());
        }
    });

    let entries = table
        .map(|t| materialize(t, capture_colors))
        .unwrap_or_default();

    Chain { root_hash, entries }
}
