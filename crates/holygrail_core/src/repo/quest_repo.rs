//! Quest repository contract and SQLite implementation.

use crate::model::quest::{Quest, QuestId};
use crate::model::EntityKind;
use crate::repo::sqlite_store::{bool_to_int, parse_flag, parse_optional_uuid, parse_uuid, SqliteStore};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const QUEST_SELECT_SQL: &str = "SELECT
    rowid AS seq,
    uuid,
    description,
    created_at,
    completed,
    completed_at,
    tickler,
    due,
    is_hidden,
    default_realm_uuid
FROM quests";

/// Filter options for listing quests. Results are in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestListQuery {
    pub include_hidden: bool,
    /// Keep only quests whose tickler is unset or strictly before this instant.
    pub ripe_at: Option<i64>,
    /// Exact description match.
    pub description: Option<String>,
}

pub trait QuestRepository {
    fn create_quest(&self, quest: &Quest) -> RepoResult<QuestId>;
    fn get_quest(&self, id: QuestId) -> RepoResult<Option<Quest>>;
    fn list_quests(&self, query: &QuestListQuery) -> RepoResult<Vec<Quest>>;
    fn update_quest(&self, quest: &Quest) -> RepoResult<()>;
    fn delete_quest(&self, id: QuestId) -> RepoResult<()>;
}

impl QuestRepository for SqliteStore<'_> {
    fn create_quest(&self, quest: &Quest) -> RepoResult<QuestId> {
        self.conn.execute(
            "INSERT INTO quests (
                uuid,
                description,
                created_at,
                completed,
                completed_at,
                tickler,
                due,
                is_hidden,
                default_realm_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                quest.uuid.to_string(),
                quest.description.as_str(),
                quest.created_at,
                bool_to_int(quest.completed),
                quest.completed_at,
                quest.tickler,
                quest.due,
                bool_to_int(quest.is_hidden),
                quest.default_realm.map(|id| id.to_string()),
            ],
        )?;
        Ok(quest.uuid)
    }

    fn get_quest(&self, id: QuestId) -> RepoResult<Option<Quest>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUEST_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_quest_row(row)?));
        }
        Ok(None)
    }

    fn list_quests(&self, query: &QuestListQuery) -> RepoResult<Vec<Quest>> {
        let mut sql = format!("{QUEST_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_hidden {
            sql.push_str(" AND is_hidden = 0");
        }
        if let Some(now) = query.ripe_at {
            sql.push_str(" AND (tickler IS NULL OR tickler < ?)");
            bind_values.push(Value::Integer(now));
        }
        if let Some(description) = query.description.as_ref() {
            sql.push_str(" AND description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut quests = Vec::new();
        while let Some(row) = rows.next()? {
            quests.push(parse_quest_row(row)?);
        }
        Ok(quests)
    }

    fn update_quest(&self, quest: &Quest) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE quests
             SET
                description = ?2,
                completed = ?3,
                completed_at = ?4,
                tickler = ?5,
                due = ?6,
                is_hidden = ?7,
                default_realm_uuid = ?8
             WHERE uuid = ?1;",
            params![
                quest.uuid.to_string(),
                quest.description.as_str(),
                bool_to_int(quest.completed),
                quest.completed_at,
                quest.tickler,
                quest.due,
                bool_to_int(quest.is_hidden),
                quest.default_realm.map(|id| id.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(not_found(quest.uuid));
        }
        Ok(())
    }

    fn delete_quest(&self, id: QuestId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM quests WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn parse_quest_row(row: &Row<'_>) -> RepoResult<Quest> {
    let uuid_text: String = row.get("uuid")?;
    let quest = Quest {
        uuid: parse_uuid(&uuid_text, "quests.uuid")?,
        seq: row.get("seq")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        completed: parse_flag(row.get("completed")?, "quests.completed")?,
        completed_at: row.get("completed_at")?,
        tickler: row.get("tickler")?,
        due: row.get("due")?,
        is_hidden: parse_flag(row.get("is_hidden")?, "quests.is_hidden")?,
        default_realm: parse_optional_uuid(
            row.get("default_realm_uuid")?,
            "quests.default_realm_uuid",
        )?,
    };

    if quest.completed != quest.completed_at.is_some() {
        return Err(RepoError::InvalidData(format!(
            "quest {} has completed={} but completed_at={:?}",
            quest.uuid, quest.completed, quest.completed_at
        )));
    }
    Ok(quest)
}

fn not_found(id: QuestId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Quest,
        id,
    }
}
