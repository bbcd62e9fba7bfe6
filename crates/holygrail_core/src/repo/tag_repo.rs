//! Mission tag association repository.
//!
//! # Invariants
//! - A `(mission, tag)` pair is stored at most once; re-adding is a no-op.
//! - Tags are returned in the order they were attached.

use crate::model::mission::MissionId;
use crate::repo::sqlite_store::{parse_uuid, SqliteStore};
use crate::repo::RepoResult;
use rusqlite::params;

pub trait TagRepository {
    /// Attaches `tag`; returns `false` when the pair already existed.
    fn add_tag(&self, mission: MissionId, tag: &str) -> RepoResult<bool>;
    /// Detaches `tag`; returns `false` when the pair did not exist.
    fn remove_tag(&self, mission: MissionId, tag: &str) -> RepoResult<bool>;
    fn tags_for(&self, mission: MissionId) -> RepoResult<Vec<String>>;
    /// Ids of missions carrying `tag`, in mission creation order.
    fn missions_with_tag(&self, tag: &str) -> RepoResult<Vec<MissionId>>;
    fn clear_tags(&self, mission: MissionId) -> RepoResult<()>;
}

impl TagRepository for SqliteStore<'_> {
    fn add_tag(&self, mission: MissionId, tag: &str) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO mission_tags (mission_uuid, tag) VALUES (?1, ?2);",
            params![mission.to_string(), tag],
        )?;
        Ok(inserted == 1)
    }

    fn remove_tag(&self, mission: MissionId, tag: &str) -> RepoResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM mission_tags WHERE mission_uuid = ?1 AND tag = ?2;",
            params![mission.to_string(), tag],
        )?;
        Ok(deleted > 0)
    }

    fn tags_for(&self, mission: MissionId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag
             FROM mission_tags
             WHERE mission_uuid = ?1
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([mission.to_string()])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get(0)?);
        }
        Ok(tags)
    }

    fn missions_with_tag(&self, tag: &str) -> RepoResult<Vec<MissionId>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.uuid
             FROM mission_tags mt
             INNER JOIN missions m ON m.uuid = mt.mission_uuid
             WHERE mt.tag = ?1
             ORDER BY m.rowid ASC;",
        )?;
        let mut rows = stmt.query([tag])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "mission_tags.mission_uuid")?);
        }
        Ok(ids)
    }

    fn clear_tags(&self, mission: MissionId) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM mission_tags WHERE mission_uuid = ?1;",
            [mission.to_string()],
        )?;
        Ok(())
    }
}
