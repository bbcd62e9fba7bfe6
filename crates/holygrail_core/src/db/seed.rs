//! Default realm seeding and store reset.
//!
//! # Invariants
//! - A store with zero realms gets exactly one: the default realm at
//!   position 0.
//! - Reset wipes every record and re-seeds in one transaction.

use super::DbResult;
use crate::clock::now_epoch_ms;
use crate::model::realm::DEFAULT_REALM_DESCRIPTION;
use log::{info, warn};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Inserts the default realm when the store has no realm at all.
///
/// Returns `true` when a realm was inserted.
pub fn ensure_default_realm(conn: &Connection) -> DbResult<bool> {
    let realm_count: i64 = conn.query_row("SELECT COUNT(*) FROM realms;", [], |row| row.get(0))?;
    if realm_count > 0 {
        return Ok(false);
    }

    insert_default_realm(conn)?;
    info!("event=realm_seed module=db status=ok position=0");
    Ok(true)
}

/// Destroys every realm, quest, mission and tag, then re-seeds the default
/// realm.
pub fn reset_db(conn: &Connection) -> DbResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute_batch(
        "DELETE FROM mission_tags;
         UPDATE missions SET previous_mission_uuid = NULL;
         DELETE FROM missions;
         DELETE FROM quests;
         DELETE FROM realms;",
    )?;
    insert_default_realm(&tx)?;
    tx.commit()?;

    warn!("event=db_reset module=db status=ok");
    Ok(())
}

fn insert_default_realm(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "INSERT INTO realms (uuid, description, is_default, is_hidden, created_at, position)
         VALUES (?1, ?2, 1, 0, ?3, 0);",
        params![
            Uuid::new_v4().to_string(),
            DEFAULT_REALM_DESCRIPTION,
            now_epoch_ms()
        ],
    )?;
    Ok(())
}
