use tracing::debug;

use super::next_table;
use crate::model::TableData;
use crate::parser::headings::find_heading;
use crate::parser::tables::materialize;
use crate::parser::tree::PageNode;

const HEADING: &str = "Summary";

pub fn extract<N: PageNode>(root: N, capture_colors: bool) -> TableData {
    let table = find_heading(root, HEADING).and_then(next_table);
    match table {
        Some(t) => materialize(t, capture_colors),
        None => {
            debug!("no table under a '{}' heading", HEADING);
            TableData::default()
        }
    }
}
