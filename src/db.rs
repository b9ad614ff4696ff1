use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::model::Document;

const PREFERRED_PROXY_KEY: &str = "preferred_proxy";

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            id           INTEGER PRIMARY KEY,
            source       TEXT NOT NULL,
            fetched_at   TEXT NOT NULL,
            via_proxy    TEXT,
            active_count INTEGER NOT NULL,
            chain_count  INTEGER NOT NULL,
            asset_count  INTEGER NOT NULL,
            root_hash    TEXT,
            difficulty   TEXT,
            document     TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_snapshots_fetched ON snapshots(fetched_at);

        CREATE TABLE IF NOT EXISTS preferences (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

// ── Snapshots ──

pub fn save_snapshot(conn: &Connection, doc: &Document, via_proxy: Option<&str>) -> Result<i64> {
    let json = serde_json::to_string(doc)?;
    conn.execute(
        "INSERT INTO snapshots
            (source, fetched_at, via_proxy, active_count, chain_count, asset_count, root_hash, difficulty, document)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            doc.metadata.source,
            doc.metadata.fetched_at,
            via_proxy,
            doc.active_hashes.len() as i64,
            doc.longest_chain.entries.len() as i64,
            doc.assets.len() as i64,
            doc.longest_chain.root_hash,
            doc.difficulty,
            json,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn latest_snapshot(conn: &Connection) -> Result<Option<Document>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT document FROM snapshots ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    json.map(|j| serde_json::from_str(&j).context("Stored snapshot is not a valid document"))
        .transpose()
}

pub struct SnapshotRow {
    pub id: i64,
    pub source: String,
    pub fetched_at: String,
    pub via_proxy: Option<String>,
    pub active_count: i64,
    pub chain_count: i64,
    pub asset_count: i64,
    pub root_hash: Option<String>,
    pub difficulty: Option<String>,
}

pub fn list_snapshots(conn: &Connection, limit: usize) -> Result<Vec<SnapshotRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, source, fetched_at, via_proxy, active_count, chain_count, asset_count, root_hash, difficulty
         FROM snapshots ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(SnapshotRow {
                id: row.get(0)?,
                source: row.get(1)?,
                fetched_at: row.get(2)?,
                via_proxy: row.get(3)?,
                active_count: row.get(4)?,
                chain_count: row.get(5)?,
                asset_count: row.get(6)?,
                root_hash: row.get(7)?,
                difficulty: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Proxy preference ──

pub fn preferred_proxy(conn: &Connection) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            [PREFERRED_PROXY_KEY],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Remember the proxy that worked; `None` (a direct fetch worked) forgets it.
pub fn set_preferred_proxy(conn: &Connection, proxy: Option<&str>) -> Result<()> {
    match proxy {
        Some(p) => conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![PREFERRED_PROXY_KEY, p],
        )?,
        None => conn.execute(
            "DELETE FROM preferences WHERE key = ?1",
            [PREFERRED_PROXY_KEY],
        )?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Asset, Chain, Metadata, Row, TableData};

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn doc(fetched_at: &str) -> Document {
        Document {
            metadata: Metadata {
                fetched_at: fetched_at.to_string(),
                source: "http://hash.h10a.de/".to_string(),
            },
            active_hashes: TableData::Rows(vec![Row {
                cells: vec!["alice".into()],
                ..Default::default()
            }]),
            longest_chain: Chain {
                root_hash: Some("ab".repeat(32)),
                entries: TableData::default(),
            },
            summary: TableData::default(),
            assets: vec![Asset {
                name: "Rules".into(),
                url: "http://hash.h10a.de/rules.pdf".into(),
            }],
            difficulty: Some("12".into()),
        }
    }

    #[test]
    fn latest_snapshot_round_trip() {
        let conn = memory();
        assert!(latest_snapshot(&conn).unwrap().is_none());

        save_snapshot(&conn, &doc("2024-01-01T00:00:00.000Z"), None).unwrap();
        let id = save_snapshot(&conn, &doc("2024-01-02T00:00:00.000Z"), Some("http://p/?u=")).unwrap();
        assert_eq!(id, 2);

        let latest = latest_snapshot(&conn).unwrap().unwrap();
        assert_eq!(latest, doc("2024-01-02T00:00:00.000Z"));

        let history = list_snapshots(&conn, 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].via_proxy.as_deref(), Some("http://p/?u="));
        assert_eq!(history[0].active_count, 1);
        assert_eq!(history[0].asset_count, 1);
        assert_eq!(history[1].difficulty.as_deref(), Some("12"));
        assert_eq!(list_snapshots(&conn, 1).unwrap().len(), 1);
    }

    #[test]
    fn proxy_preference_set_and_cleared() {
        let conn = memory();
        assert!(preferred_proxy(&conn).unwrap().is_none());
        set_preferred_proxy(&conn, Some("http://a/?u=")).unwrap();
        set_preferred_proxy(&conn, Some("http://b/?u=")).unwrap();
        assert_eq!(preferred_proxy(&conn).unwrap().as_deref(), Some("http://b/?u="));
        set_preferred_proxy(&conn, None).unwrap();
        assert!(preferred_proxy(&conn).unwrap().is_none());
    }

    #[test]
    fn connect_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("h10a.sqlite");
        let conn = connect(&path).unwrap();
        init_schema(&conn).unwrap();
        assert!(path.exists());
    }
}
