use serde::{Deserialize, Serialize};

/// Everything extracted from one fetch of the status page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: Metadata,
    #[serde(default)]
    pub active_hashes: TableData,
    #[serde(default)]
    pub longest_chain: Chain,
    #[serde(default)]
    pub summary: TableData,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub fetched_at: String,
    pub source: String,
}

/// A table's rows, either bare or with the header cell texts pulled out.
///
/// Serialized untagged: `Rows` is a JSON array, `Table` an object with
/// `headers` and `rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableData {
    Rows(Vec<Row>),
    Table { headers: Vec<String>, rows: Vec<Row> },
}

impl Default for TableData {
    fn default() -> Self {
        TableData::Rows(Vec::new())
    }
}

impl TableData {
    pub fn rows(&self) -> &[Row] {
        match self {
            TableData::Rows(rows) => rows,
            TableData::Table { rows, .. } => rows,
        }
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        match self {
            TableData::Rows(rows) => rows,
            TableData::Table { rows, .. } => rows,
        }
    }

    pub fn headers(&self) -> Option<&[String]> {
        match self {
            TableData::Rows(_) => None,
            TableData::Table { headers, .. } => Some(headers),
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_colors: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Row {
    /// Cell at `idx`, or `""` when the row is shorter.
    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    #[serde(default)]
    pub root_hash: Option<String>,
    #[serde(default)]
    pub entries: TableData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_rows_serialize_as_array() {
        let data = TableData::Rows(vec![Row {
            cells: vec!["a".into(), "b".into()],
            ..Default::default()
        }]);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!([{ "cells": ["a", "b"] }]));
    }

    #[test]
    fn table_serializes_with_headers() {
        let data = TableData::Table {
            headers: vec!["Hash".into()],
            rows: vec![],
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({ "headers": ["Hash"], "rows": [] }));
    }

    #[test]
    fn difficulty_omitted_when_absent() {
        let doc = Document {
            metadata: Metadata {
                fetched_at: "2024-01-01T00:00:00.000Z".into(),
                source: "http://hash.h10a.de/".into(),
            },
            active_hashes: TableData::default(),
            longest_chain: Chain::default(),
            summary: TableData::default(),
            assets: vec![],
            difficulty: None,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("difficulty").is_none());
        assert_eq!(json["longest_chain"]["root_hash"], serde_json::Value::Null);
    }

    #[test]
    fn accepts_provider_json_without_cells() {
        // Shape produced by the server-side scraper: fallback hash records, no colors.
        let raw = r#"{
            "metadata": {"fetched_at": "2024-01-01T00:00:00Z", "source": "http://hash.h10a.de/"},
            "active_hashes": [{"hash": "abc"}],
            "longest_chain": {"root_hash": null, "entries": []},
            "summary": {"headers": ["Key", "Value"], "rows": [{"cells": ["Key", "Value"]}]},
            "assets": []
        }"#;
        let doc: Document = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.active_hashes.rows()[0].hash.as_deref(), Some("abc"));
        assert!(doc.active_hashes.rows()[0].cells.is_empty());
        assert_eq!(doc.summary.headers().map(|h| h.len()), Some(2));
        assert_eq!(doc.summary.rows()[0].cell(5), "");
    }
}
