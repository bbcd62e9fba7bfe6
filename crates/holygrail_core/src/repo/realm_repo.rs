//! Realm repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing is ordered by `position ASC`.
//! - `create_realm` and `update_realm` never write `is_default` or
//!   `position`; those have dedicated single writers.
//! - Position rewrites go through a two-phase update so the
//!   `UNIQUE(position)` constraint never observes a transient duplicate.

use crate::model::realm::{Realm, RealmId};
use crate::model::realm_order::RealmOrder;
use crate::model::EntityKind;
use crate::repo::sqlite_store::{bool_to_int, parse_flag, parse_uuid, SqliteStore};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const REALM_SELECT_SQL: &str = "SELECT
    rowid AS seq,
    uuid,
    description,
    is_default,
    is_hidden,
    created_at,
    position
FROM realms";

/// Filter options for listing realms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealmListQuery {
    pub include_hidden: bool,
    /// Exact description match.
    pub description: Option<String>,
}

impl RealmListQuery {
    pub fn all() -> Self {
        Self {
            include_hidden: true,
            description: None,
        }
    }
}

pub trait RealmRepository {
    /// Inserts a non-default realm at `realm.position`.
    fn create_realm(&self, realm: &Realm) -> RepoResult<RealmId>;
    fn get_realm(&self, id: RealmId) -> RepoResult<Option<Realm>>;
    fn list_realms(&self, query: &RealmListQuery) -> RepoResult<Vec<Realm>>;
    /// Persists description and hidden flag.
    fn update_realm(&self, realm: &Realm) -> RepoResult<()>;
    /// Rewrites every realm position from `order`.
    fn write_realm_order(&self, order: &RealmOrder) -> RepoResult<()>;
    /// Moves the default flag to `id`, clearing the previous holder.
    fn set_default_realm(&self, id: RealmId) -> RepoResult<()>;
    /// Deletes `id` and renumbers the survivors from `remaining`.
    fn delete_realm(&self, id: RealmId, remaining: &RealmOrder) -> RepoResult<()>;
}

impl RealmRepository for SqliteStore<'_> {
    fn create_realm(&self, realm: &Realm) -> RepoResult<RealmId> {
        self.conn.execute(
            "INSERT INTO realms (uuid, description, is_default, is_hidden, created_at, position)
             VALUES (?1, ?2, 0, ?3, ?4, ?5);",
            params![
                realm.uuid.to_string(),
                realm.description.as_str(),
                bool_to_int(realm.is_hidden),
                realm.created_at,
                i64::from(realm.position),
            ],
        )?;
        Ok(realm.uuid)
    }

    fn get_realm(&self, id: RealmId) -> RepoResult<Option<Realm>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REALM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_realm_row(row)?));
        }
        Ok(None)
    }

    fn list_realms(&self, query: &RealmListQuery) -> RepoResult<Vec<Realm>> {
        let mut sql = format!("{REALM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_hidden {
            sql.push_str(" AND is_hidden = 0");
        }
        if let Some(description) = query.description.as_ref() {
            sql.push_str(" AND description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        sql.push_str(" ORDER BY position ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut realms = Vec::new();
        while let Some(row) = rows.next()? {
            realms.push(parse_realm_row(row)?);
        }
        Ok(realms)
    }

    fn update_realm(&self, realm: &Realm) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE realms
             SET description = ?2,
                 is_hidden = ?3
             WHERE uuid = ?1;",
            params![
                realm.uuid.to_string(),
                realm.description.as_str(),
                bool_to_int(realm.is_hidden),
            ],
        )?;
        if changed == 0 {
            return Err(not_found(realm.uuid));
        }
        Ok(())
    }

    fn write_realm_order(&self, order: &RealmOrder) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        apply_order(&tx, order)?;
        tx.commit()?;
        Ok(())
    }

    fn set_default_realm(&self, id: RealmId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("UPDATE realms SET is_default = 0 WHERE is_default = 1;", [])?;
        let changed = tx.execute(
            "UPDATE realms SET is_default = 1 WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_realm(&self, id: RealmId, remaining: &RealmOrder) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM realms WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        apply_order(&tx, remaining)?;
        tx.commit()?;
        Ok(())
    }
}

fn apply_order(conn: &Connection, order: &RealmOrder) -> RepoResult<()> {
    let realm_count: i64 = conn.query_row("SELECT COUNT(*) FROM realms;", [], |row| row.get(0))?;
    if realm_count != order.len() as i64 {
        return Err(RepoError::InvalidData(format!(
            "realm order covers {} realms, store holds {realm_count}",
            order.len()
        )));
    }

    // Park every position in the negative range first.
    conn.execute("UPDATE realms SET position = -1 - position;", [])?;
    for (id, position) in order.positions() {
        let changed = conn.execute(
            "UPDATE realms SET position = ?2 WHERE uuid = ?1;",
            params![id.to_string(), i64::from(position)],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
    }
    Ok(())
}

fn parse_realm_row(row: &Row<'_>) -> RepoResult<Realm> {
    let uuid_text: String = row.get("uuid")?;
    let position: i64 = row.get("position")?;
    let position = u32::try_from(position).map_err(|_| {
        RepoError::InvalidData(format!("invalid position `{position}` in realms.position"))
    })?;

    Ok(Realm {
        uuid: parse_uuid(&uuid_text, "realms.uuid")?,
        seq: row.get("seq")?,
        description: row.get("description")?,
        is_default: parse_flag(row.get("is_default")?, "realms.is_default")?,
        is_hidden: parse_flag(row.get("is_hidden")?, "realms.is_hidden")?,
        created_at: row.get("created_at")?,
        position,
    })
}

fn not_found(id: RealmId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Realm,
        id,
    }
}
