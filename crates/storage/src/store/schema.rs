#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::Connection;
use std::collections::BTreeSet;

pub(super) const REQUIRED_TABLES: [&str; 3] = ["adlist", "group", "adlist_by_group"];

// Subset of Pi-hole's gravity schema that reconciliation reads and writes.
// Group 0 is the built-in default group and is never a sync target.
const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS "group" (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          enabled BOOLEAN NOT NULL DEFAULT 1,
          name TEXT UNIQUE NOT NULL,
          description TEXT
        );

        INSERT OR IGNORE INTO "group" (id, enabled, name, description)
        VALUES (0, 1, 'Default', 'The default group');

        CREATE TABLE IF NOT EXISTS adlist (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          address TEXT UNIQUE NOT NULL,
          enabled BOOLEAN NOT NULL DEFAULT 1,
          comment TEXT
        );

        CREATE TABLE IF NOT EXISTS adlist_by_group (
          adlist_id INTEGER NOT NULL REFERENCES adlist (id),
          group_id INTEGER NOT NULL REFERENCES "group" (id),
          PRIMARY KEY (adlist_id, group_id)
        );
"#;

pub(super) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SQL)?;
    Ok(())
}

pub(super) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    let missing = REQUIRED_TABLES
        .iter()
        .filter(|table| !tables.contains(**table))
        .map(|table| table.to_string())
        .collect::<Vec<_>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::SchemaMismatch { missing })
    }
}
