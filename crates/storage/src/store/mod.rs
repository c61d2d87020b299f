#![forbid(unsafe_code)]

mod error;
mod reconcile;
mod schema;
mod types;

pub use error::StoreError;
pub use types::*;

use gs_core::{CandidateEntry, GroupCatalog};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A gravity database opened for reconciliation.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens an existing database. Fails if the file is absent or lacks the adlist
    /// tables; nothing is created.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if !db_path.is_file() {
            return Err(StoreError::MissingDatabase(db_path));
        }

        let conn = connect(&db_path)?;
        schema::preflight_gate(&conn)?;

        Ok(Self { conn, db_path })
    }

    /// Opens `db_path`, creating the file and any missing adlist tables.
    pub fn create(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = connect(&db_path)?;
        schema::install_schema(&conn)?;
        schema::preflight_gate(&conn)?;

        Ok(Self { conn, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Brings the managed adlists in line with `candidates` in a single transaction.
    ///
    /// Any failing statement rolls the whole run back before the error is returned.
    pub fn reconcile(
        &mut self,
        candidates: &[CandidateEntry],
        catalog: &GroupCatalog,
        mode: ApplyMode,
    ) -> Result<ReconcileReport, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        match reconcile::reconcile_tx(&tx, candidates, catalog) {
            Ok(report) => {
                match mode {
                    ApplyMode::Commit => tx.commit()?,
                    ApplyMode::DryRun => {
                        log::info!("Dry run, rolling back");
                        tx.rollback()?;
                    }
                }
                Ok(report)
            }
            Err(err) => {
                log::warn!("Reconcile failed, rolling back: {err}");
                if let Err(rollback_err) = tx.rollback() {
                    log::error!("Rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    pub fn add_adlist(
        &mut self,
        address: &str,
        enabled: bool,
        comment: Option<&str>,
    ) -> Result<i64, StoreError> {
        if address.trim().is_empty() {
            return Err(StoreError::InvalidInput("address must not be empty"));
        }
        self.conn.execute(
            "INSERT INTO adlist (address, enabled, comment) VALUES (?1, ?2, ?3)",
            params![address, enabled, comment],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn add_membership(&mut self, adlist_id: i64, group_id: i64) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO adlist_by_group (adlist_id, group_id) VALUES (?1, ?2)",
            params![adlist_id, group_id],
        )?;
        Ok(inserted > 0)
    }

    pub fn list_adlists(&self) -> Result<Vec<AdlistRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, address, enabled, comment FROM adlist ORDER BY id ASC")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(AdlistRow {
                id: row.get(0)?,
                address: row.get(1)?,
                enabled: row.get(2)?,
                comment: row.get(3)?,
            });
        }
        Ok(out)
    }

    pub fn adlist(&self, address: &str) -> Result<Option<AdlistRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, address, enabled, comment FROM adlist WHERE address = ?1",
                params![address],
                |row| {
                    Ok(AdlistRow {
                        id: row.get(0)?,
                        address: row.get(1)?,
                        enabled: row.get(2)?,
                        comment: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_groups(&self) -> Result<Vec<GroupRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, enabled, name, description FROM \"group\" ORDER BY id ASC")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(GroupRow {
                id: row.get(0)?,
                enabled: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
            });
        }
        Ok(out)
    }

    /// Names of the groups the adlist at `address` belongs to, sorted.
    pub fn group_names_for(&self, address: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT g.name \
             FROM adlist_by_group m \
             JOIN adlist a ON a.id = m.adlist_id \
             JOIN \"group\" g ON g.id = m.group_id \
             WHERE a.address = ?1 \
             ORDER BY g.name ASC",
        )?;
        let mut rows = stmt.query(params![address])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(row.get::<_, String>(0)?);
        }
        Ok(out)
    }

    pub fn membership_count_for(&self, address: &str) -> Result<usize, StoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM adlist_by_group m \
             JOIN adlist a ON a.id = m.adlist_id \
             WHERE a.address = ?1",
            params![address],
            |row| row.get::<_, i64>(0),
        )?;
        usize::try_from(count).map_err(|_| StoreError::InvalidInput("negative membership count"))
    }
}

fn connect(db_path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}
