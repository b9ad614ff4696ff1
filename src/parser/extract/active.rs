use tracing::debug;

use super::{next_table, HASH_TOKEN_RE};
use crate::model::{Row, TableData};
use crate::parser::headings::find_heading;
use crate::parser::tables::materialize;
use crate::parser::tree::PageNode;

const HEADING: &str = "Active Hashes";

/// Table after the "Active Hashes" heading, or every standalone 64-hex token
/// in the body when the page has no such heading.
pub fn extract<N: PageNode>(root: N, body_text: &str, capture_colors: bool) -> TableData {
    let Some(heading) = find_heading(root, HEADING) else {
        debug!("no '{}' heading, scanning body text for hashes", HEADING);
        return scan_hashes(body_text);
    };

    match next_table(heading) {
        Some(table) => {
            let mut data = materialize(table, capture_colors);
            for row in data.rows_mut() {
                row.hash = row.cells.iter().find(|c| is_hash(c)).cloned();
            }
            data
        }
        None => {
            debug!("'{}' heading has no following table", HEADING);
            TableData::default()
        }
    }
}

fn scan_hashes(text: &str) -> TableData {
    let rows = HASH_TOKEN_RE
        .find_iter(text)
        .map(|m| Row {
            cells: vec![m.as_str().to_string()],
            cell_colors: None,
            hash: Some(m.as_str().to_string()),
        })
        .collect();
    TableData::Rows(rows)
}

fn is_hash(cell: &str) -> bool {
    cell.len() == 64 && cell.bytes().all(|b| b.is_ascii_hexdigit())
}
