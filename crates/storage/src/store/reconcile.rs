#![forbid(unsafe_code)]

use super::{ReconcileReport, StoreError};
use gs_core::{CandidateEntry, GroupCatalog};
use rusqlite::{Transaction, params};
use std::collections::BTreeMap;

// Every query below selects managed records with `comment LIKE '[%'`; a NULL comment
// never matches, so hand-added rows stay out of every set difference.

pub(super) fn reconcile_tx(
    tx: &Transaction<'_>,
    candidates: &[CandidateEntry],
    catalog: &GroupCatalog,
) -> Result<ReconcileReport, StoreError> {
    drop_scratch_tables_tx(tx)?;
    snapshot_memberships_tx(tx)?;

    let staged = stage_candidates_tx(tx, candidates)?;
    log::debug!("staged {staged} candidate(s)");

    let inserted = insert_missing_tx(tx)?;
    let disabled = disable_extraneous_tx(tx)?;
    let memberships = remap_groups_tx(tx, catalog)?;
    let membership_edits = membership_edits_tx(tx)?;

    drop_scratch_tables_tx(tx)?;

    Ok(ReconcileReport {
        staged,
        inserted,
        disabled,
        memberships,
        membership_edits,
    })
}

fn drop_scratch_tables_tx(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        "DROP TABLE IF EXISTS temp.staged_adlist;
         DROP TABLE IF EXISTS temp.membership_before;",
    )?;
    Ok(())
}

fn snapshot_memberships_tx(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        "CREATE TEMPORARY TABLE membership_before AS
         SELECT m.adlist_id AS adlist_id, m.group_id AS group_id
         FROM adlist_by_group m
         JOIN adlist a ON a.id = m.adlist_id
         WHERE a.comment LIKE '[%';",
    )?;
    Ok(())
}

fn stage_candidates_tx(
    tx: &Transaction<'_>,
    candidates: &[CandidateEntry],
) -> Result<usize, StoreError> {
    tx.execute_batch(
        "CREATE TEMPORARY TABLE staged_adlist (
           address TEXT,
           enabled BOOLEAN,
           comment TEXT
         );",
    )?;

    let mut stmt =
        tx.prepare("INSERT INTO temp.staged_adlist (address, enabled, comment) VALUES (?1, ?2, ?3)")?;
    let mut staged = 0usize;
    for entry in candidates {
        let comment = entry.tag().into_string();
        staged += stmt.execute(params![entry.source_url, true, comment])?;
    }
    Ok(staged)
}

fn insert_missing_tx(tx: &Transaction<'_>) -> Result<usize, StoreError> {
    let inserted = tx.execute(
        "WITH missing AS (
           SELECT address, enabled, comment FROM temp.staged_adlist
           EXCEPT
           SELECT address, enabled, comment FROM adlist WHERE enabled AND comment LIKE '[%'
         )
         INSERT OR IGNORE INTO adlist (address, enabled, comment)
         SELECT address, enabled, comment FROM missing",
        [],
    )?;
    Ok(inserted)
}

fn disable_extraneous_tx(tx: &Transaction<'_>) -> Result<usize, StoreError> {
    let disabled = tx.execute(
        "WITH extraneous AS (
           SELECT address, enabled, comment FROM adlist WHERE enabled AND comment LIKE '[%'
           EXCEPT
           SELECT address, enabled, comment FROM temp.staged_adlist
         )
         UPDATE adlist
         SET enabled = 0
         WHERE enabled
           AND comment LIKE '[%'
           AND address IN (SELECT address FROM extraneous)",
        [],
    )?;
    Ok(disabled)
}

fn remap_groups_tx(tx: &Transaction<'_>, catalog: &GroupCatalog) -> Result<usize, StoreError> {
    tx.execute(
        "DELETE FROM adlist_by_group
         WHERE adlist_id IN (SELECT id FROM adlist WHERE comment LIKE '[%')",
        [],
    )?;

    let group_ids = ensure_groups_tx(tx, catalog)?;

    let mut records = Vec::new();
    {
        let mut stmt =
            tx.prepare("SELECT id, comment FROM adlist WHERE enabled AND comment LIKE '[%' ORDER BY id")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            records.push((row.get::<_, i64>(0)?, row.get::<_, String>(1)?));
        }
    }

    let mut insert = tx.prepare(
        "INSERT OR IGNORE INTO adlist_by_group (adlist_id, group_id) VALUES (?1, ?2)",
    )?;
    let mut mapped = 0usize;
    for (adlist_id, comment) in &records {
        let Some(group) = catalog.classify(comment) else {
            log::debug!("adlist {adlist_id} matches no group: {comment}");
            continue;
        };
        let Some(group_id) = group_ids.get(group.name.as_str()) else {
            return Err(StoreError::InvalidInput("catalog group missing after insert"));
        };
        mapped += insert.execute(params![adlist_id, group_id])?;
    }
    Ok(mapped)
}

fn ensure_groups_tx<'c>(
    tx: &Transaction<'_>,
    catalog: &'c GroupCatalog,
) -> Result<BTreeMap<&'c str, i64>, StoreError> {
    let mut insert = tx.prepare(
        "INSERT OR IGNORE INTO \"group\" (enabled, name, description) VALUES (?1, ?2, ?3)",
    )?;
    let mut lookup = tx.prepare("SELECT id FROM \"group\" WHERE name = ?1")?;

    let mut ids = BTreeMap::new();
    for group in catalog.groups() {
        if insert.execute(params![true, group.name, group.description])? > 0 {
            log::info!("Created group '{}'", group.name);
        }
        let id = lookup.query_row(params![group.name], |row| row.get::<_, i64>(0))?;
        ids.insert(group.name.as_str(), id);
    }
    Ok(ids)
}

fn membership_edits_tx(tx: &Transaction<'_>) -> Result<usize, StoreError> {
    let edits = tx.query_row(
        "WITH membership_after AS (
           SELECT m.adlist_id AS adlist_id, m.group_id AS group_id
           FROM adlist_by_group m
           JOIN adlist a ON a.id = m.adlist_id
           WHERE a.comment LIKE '[%'
         ),
         added AS (
           SELECT adlist_id, group_id FROM membership_after
           EXCEPT
           SELECT adlist_id, group_id FROM temp.membership_before
         ),
         removed AS (
           SELECT adlist_id, group_id FROM temp.membership_before
           EXCEPT
           SELECT adlist_id, group_id FROM membership_after
         )
         SELECT (SELECT COUNT(*) FROM added) + (SELECT COUNT(*) FROM removed)",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    usize::try_from(edits).map_err(|_| StoreError::InvalidInput("negative membership count"))
}
