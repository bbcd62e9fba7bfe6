//! Mission repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist missions and answer the filter shapes views need (by owner,
//!   completion, tickler, description and blocker).
//!
//! # Invariants
//! - Default listing order is creation order (`rowid ASC`).
//! - Description substring matching is case-sensitive (`instr`, not `LIKE`).

use crate::model::mission::{Mission, MissionId};
use crate::model::quest::QuestId;
use crate::model::realm::RealmId;
use crate::model::EntityKind;
use crate::repo::sqlite_store::{bool_to_int, parse_flag, parse_optional_uuid, parse_uuid, SqliteStore};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const MISSION_SELECT_SQL: &str = "SELECT
    rowid AS seq,
    uuid,
    description,
    created_at,
    tickler,
    due,
    completed,
    completed_at,
    realm_uuid,
    quest_uuid,
    previous_mission_uuid
FROM missions";

/// Sort order for mission listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissionOrder {
    /// Oldest first.
    #[default]
    Creation,
    /// Most recently completed first.
    CompletedAtDesc,
}

/// Filter options for listing missions. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionListQuery {
    pub realm: Option<RealmId>,
    pub quest: Option<QuestId>,
    pub previous_mission: Option<MissionId>,
    pub completed: Option<bool>,
    /// Keep only missions whose tickler is unset or strictly before this instant.
    pub ripe_at: Option<i64>,
    /// Exact description match.
    pub description: Option<String>,
    /// Case-sensitive substring match on description.
    pub description_contains: Option<String>,
    pub order: MissionOrder,
    pub limit: Option<u32>,
}

pub trait MissionRepository {
    fn create_mission(&self, mission: &Mission) -> RepoResult<MissionId>;
    fn get_mission(&self, id: MissionId) -> RepoResult<Option<Mission>>;
    fn list_missions(&self, query: &MissionListQuery) -> RepoResult<Vec<Mission>>;
    fn update_mission(&self, mission: &Mission) -> RepoResult<()>;
    fn delete_mission(&self, id: MissionId) -> RepoResult<()>;
}

impl MissionRepository for SqliteStore<'_> {
    fn create_mission(&self, mission: &Mission) -> RepoResult<MissionId> {
        self.conn.execute(
            "INSERT INTO missions (
                uuid,
                description,
                created_at,
                tickler,
                due,
                completed,
                completed_at,
                realm_uuid,
                quest_uuid,
                previous_mission_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                mission.uuid.to_string(),
                mission.description.as_str(),
                mission.created_at,
                mission.tickler,
                mission.due,
                bool_to_int(mission.completed),
                mission.completed_at,
                mission.realm.to_string(),
                mission.quest.map(|id| id.to_string()),
                mission.previous_mission.map(|id| id.to_string()),
            ],
        )?;
        Ok(mission.uuid)
    }

    fn get_mission(&self, id: MissionId) -> RepoResult<Option<Mission>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MISSION_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_mission_row(row)?));
        }
        Ok(None)
    }

    fn list_missions(&self, query: &MissionListQuery) -> RepoResult<Vec<Mission>> {
        let mut sql = format!("{MISSION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(realm) = query.realm {
            sql.push_str(" AND realm_uuid = ?");
            bind_values.push(Value::Text(realm.to_string()));
        }
        if let Some(quest) = query.quest {
            sql.push_str(" AND quest_uuid = ?");
            bind_values.push(Value::Text(quest.to_string()));
        }
        if let Some(previous) = query.previous_mission {
            sql.push_str(" AND previous_mission_uuid = ?");
            bind_values.push(Value::Text(previous.to_string()));
        }
        if let Some(completed) = query.completed {
            sql.push_str(" AND completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        if let Some(now) = query.ripe_at {
            sql.push_str(" AND (tickler IS NULL OR tickler < ?)");
            bind_values.push(Value::Integer(now));
        }
        if let Some(description) = query.description.as_ref() {
            sql.push_str(" AND description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        if let Some(needle) = query.description_contains.as_ref() {
            sql.push_str(" AND instr(description, ?) > 0");
            bind_values.push(Value::Text(needle.clone()));
        }

        match query.order {
            MissionOrder::Creation => sql.push_str(" ORDER BY rowid ASC"),
            MissionOrder::CompletedAtDesc => {
                sql.push_str(" ORDER BY completed_at DESC, rowid DESC")
            }
        }
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut missions = Vec::new();
        while let Some(row) = rows.next()? {
            missions.push(parse_mission_row(row)?);
        }
        Ok(missions)
    }

    fn update_mission(&self, mission: &Mission) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE missions
             SET
                description = ?2,
                tickler = ?3,
                due = ?4,
                completed = ?5,
                completed_at = ?6,
                realm_uuid = ?7,
                quest_uuid = ?8,
                previous_mission_uuid = ?9
             WHERE uuid = ?1;",
            params![
                mission.uuid.to_string(),
                mission.description.as_str(),
                mission.tickler,
                mission.due,
                bool_to_int(mission.completed),
                mission.completed_at,
                mission.realm.to_string(),
                mission.quest.map(|id| id.to_string()),
                mission.previous_mission.map(|id| id.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(not_found(mission.uuid));
        }
        Ok(())
    }

    fn delete_mission(&self, id: MissionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM missions WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn parse_mission_row(row: &Row<'_>) -> RepoResult<Mission> {
    let uuid_text: String = row.get("uuid")?;
    let realm_text: String = row.get("realm_uuid")?;
    let mission = Mission {
        uuid: parse_uuid(&uuid_text, "missions.uuid")?,
        seq: row.get("seq")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        tickler: row.get("tickler")?,
        due: row.get("due")?,
        completed: parse_flag(row.get("completed")?, "missions.completed")?,
        completed_at: row.get("completed_at")?,
        realm: parse_uuid(&realm_text, "missions.realm_uuid")?,
        quest: parse_optional_uuid(row.get("quest_uuid")?, "missions.quest_uuid")?,
        previous_mission: parse_optional_uuid(
            row.get("previous_mission_uuid")?,
            "missions.previous_mission_uuid",
        )?,
    };

    if mission.completed != mission.completed_at.is_some() {
        return Err(RepoError::InvalidData(format!(
            "mission {} has completed={} but completed_at={:?}",
            mission.uuid, mission.completed, mission.completed_at
        )));
    }
    Ok(mission)
}

fn not_found(id: MissionId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Mission,
        id,
    }
}
