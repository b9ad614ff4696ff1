use std::sync::LazyLock;

use regex::Regex;

use super::tree::PageNode;
use crate::model::{Row, TableData};

static BACKGROUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)background(?:-color)?\s*:\s*([^;]+)").unwrap());

/// Convert a `<table>` into rows of trimmed cell text.
///
/// Rows with no `th`/`td` are dropped. If the table has any `th` anywhere, the
/// header texts are returned alongside the rows (which still include the
/// header row itself); otherwise the bare rows come back.
pub fn materialize<N: PageNode>(table: N, capture_colors: bool) -> TableData {
    let headers: Vec<String> = table
        .descendants_named(&["th"])
        .iter()
        .map(|th| th.text_content().trim().to_string())
        .collect();

    let rows: Vec<Row> = table
        .descendants_named(&["tr"])
        .into_iter()
        .filter_map(|tr| row_from(tr, capture_colors))
        .collect();

    if headers.is_empty() {
        TableData::Rows(rows)
    } else {
        TableData::Table { headers, rows }
    }
}

fn row_from<N: PageNode>(tr: N, capture_colors: bool) -> Option<Row> {
    let cells = tr.descendants_named(&["th", "td"]);
    if cells.is_empty() {
        return None;
    }
    let cell_colors = capture_colors.then(|| cells.iter().map(|c| cell_color(*c)).collect());
    Some(Row {
        cells: cells
            .iter()
            .map(|c| c.text_content().trim().to_string())
            .collect(),
        cell_colors,
        hash: None,
    })
}

/// `bgcolor` first, then a `background`/`background-color` declaration in
/// the inline style.
pub fn cell_color<N: PageNode>(cell: N) -> Option<String> {
    if let Some(color) = cell.attr("bgcolor").map(str::trim).filter(|c| !c.is_empty()) {
        return Some(color.to_string());
    }
    let style = cell.attr("style")?;
    BACKGROUND_RE
        .captures(style)
        .map(|caps| caps[1].trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_table(html: &str, capture_colors: bool) -> TableData {
        let page = Html::parse_document(html);
        let table = page.root_element().descendants_named(&["table"])[0];
        materialize(table, capture_colors)
    }

    #[test]
    fn spacer_row_dropped() {
        let data = first_table(
            "<table><tr><td>1</td><td>2</td><td>3</td></tr><tr></tr></table>",
            false,
        );
        assert!(matches!(&data, TableData::Rows(rows) if rows.len() == 1));
        assert_eq!(data.rows()[0].cells, vec!["1", "2", "3"]);
    }

    #[test]
    fn header_cells_split_out() {
        let data = first_table(
            "<table><tr><th> Height </th><th>Hash</th></tr><tr><td>1</td><td>ab</td></tr></table>",
            false,
        );
        assert_eq!(data.headers(), Some(&["Height".to_string(), "Hash".to_string()][..]));
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows()[1].cells, vec!["1", "ab"]);
    }

    #[test]
    fn scattered_header_cells_tolerated() {
        let data = first_table(
            "<table><tr><td>a</td></tr><tr><th>Key</th><td>v</td></tr></table>",
            false,
        );
        assert_eq!(data.headers().map(|h| h.to_vec()), Some(vec!["Key".to_string()]));
        assert_eq!(data.rows()[1].cells, vec!["Key", "v"]);
    }

    #[test]
    fn cells_are_trimmed_and_ragged() {
        let data = first_table(
            "<table><tr><td>\n  x \n</td></tr><tr><td>y</td><td>z</td></tr></table>",
            false,
        );
        assert_eq!(data.rows()[0].cells, vec!["x"]);
        assert_eq!(data.rows()[1].cells.len(), 2);
    }

    #[test]
    fn colors_follow_precedence() {
        let data = first_table(
            r##"<table><tr>
                <td bgcolor="#ff0000" style="background: blue">a</td>
                <td style="color: red; Background-Color : #00ff00 ; border: 0">b</td>
                <td>c</td>
            </tr></table>"##,
            true,
        );
        let colors = data.rows()[0].cell_colors.clone().unwrap();
        assert_eq!(
            colors,
            vec![Some("#ff0000".to_string()), Some("#00ff00".to_string()), None]
        );
    }

    #[test]
    fn colors_skipped_when_not_requested() {
        let data = first_table("<table><tr><td bgcolor=red>a</td></tr></table>", false);
        assert!(data.rows()[0].cell_colors.is_none());
    }
}
