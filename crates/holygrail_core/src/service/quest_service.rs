//! Quest use-case service.
//!
//! # Invariants
//! - `completed_at` follows `completed` on every toggle.
//! - Removing a quest detaches its missions; it never deletes them.

use crate::clock::Clock;
use crate::model::quest::{Quest, QuestId};
use crate::model::realm::RealmId;
use crate::model::LookupKey;
use crate::repo::{EntityStore, MissionListQuery, QuestListQuery};
use crate::service::error::{normalize_description, GrailError, GrailResult};
use log::info;
use std::sync::Arc;

/// Request model for creating a quest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewQuest {
    pub description: String,
    pub default_realm: Option<RealmId>,
    pub tickler: Option<i64>,
    pub due: Option<i64>,
    pub hidden: bool,
}

impl NewQuest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

pub struct QuestService<S: EntityStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: EntityStore> QuestService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn add_quest(&self, request: NewQuest) -> GrailResult<Quest> {
        let description = normalize_description(request.description)?;
        if let Some(realm_id) = request.default_realm {
            self.ensure_realm_exists(realm_id)?;
        }

        let mut quest = Quest::new(description, self.clock.now_ms());
        quest.default_realm = request.default_realm;
        quest.tickler = request.tickler;
        quest.due = request.due;
        quest.is_hidden = request.hidden;

        let id = self.store.create_quest(&quest)?;
        self.get_quest(id)
    }

    pub fn get_quest(&self, id: QuestId) -> GrailResult<Quest> {
        self.store
            .get_quest(id)?
            .ok_or(GrailError::QuestNotFound(LookupKey::Id(id)))
    }

    /// Returns every quest whose description equals `description`.
    pub fn get_quest_by_desc(&self, description: &str) -> GrailResult<Vec<Quest>> {
        let quests = self.store.list_quests(&QuestListQuery {
            include_hidden: true,
            ripe_at: None,
            description: Some(description.to_string()),
        })?;
        if quests.is_empty() {
            return Err(GrailError::QuestNotFound(LookupKey::Description(
                description.to_string(),
            )));
        }
        Ok(quests)
    }

    pub fn rename_quest(
        &self,
        id: QuestId,
        description: impl Into<String>,
    ) -> GrailResult<Quest> {
        let description = normalize_description(description)?;
        self.modify(id, |quest| quest.description = description)
    }

    /// Sets or clears the tickler.
    pub fn tickle(&self, id: QuestId, tickler: Option<i64>) -> GrailResult<Quest> {
        self.modify(id, |quest| quest.tickler = tickler)
    }

    /// Sets or clears the due date inherited by member missions.
    pub fn due_for(&self, id: QuestId, due: Option<i64>) -> GrailResult<Quest> {
        self.modify(id, |quest| quest.due = due)
    }

    pub fn set_completed(&self, id: QuestId, completed: bool) -> GrailResult<Quest> {
        let now = self.clock.now_ms();
        self.modify(id, |quest| quest.set_completed(completed, now))
    }

    /// Flips completion. Member missions disappear from active views but
    /// keep their own completion state.
    pub fn toggle(&self, id: QuestId) -> GrailResult<Quest> {
        let quest = self.get_quest(id)?;
        self.set_completed(id, !quest.completed)
    }

    pub fn set_hidden(&self, id: QuestId, hidden: bool) -> GrailResult<Quest> {
        self.modify(id, |quest| quest.is_hidden = hidden)
    }

    pub fn toggle_hide(&self, id: QuestId) -> GrailResult<Quest> {
        let quest = self.get_quest(id)?;
        self.set_hidden(id, !quest.is_hidden)
    }

    /// Sets the realm new missions of this quest land in by default.
    pub fn set_default_realm(&self, id: QuestId, realm: Option<RealmId>) -> GrailResult<Quest> {
        if let Some(realm_id) = realm {
            self.ensure_realm_exists(realm_id)?;
        }
        self.modify(id, |quest| quest.default_realm = realm)
    }

    /// Deletes the quest after detaching all of its missions.
    pub fn remove_quest(&self, id: QuestId) -> GrailResult<()> {
        self.get_quest(id)?;
        let members = self.store.list_missions(&MissionListQuery {
            quest: Some(id),
            ..MissionListQuery::default()
        })?;
        for mut mission in members.iter().cloned() {
            mission.quest = None;
            self.store.update_mission(&mission)?;
        }
        self.store.delete_quest(id)?;
        info!(
            "event=quest_remove module=service status=ok detached={}",
            members.len()
        );
        Ok(())
    }

    fn modify<F>(&self, id: QuestId, change: F) -> GrailResult<Quest>
    where
        F: FnOnce(&mut Quest),
    {
        let mut quest = self.get_quest(id)?;
        change(&mut quest);
        self.store.update_quest(&quest)?;
        Ok(quest)
    }

    fn ensure_realm_exists(&self, id: RealmId) -> GrailResult<()> {
        self.store
            .get_realm(id)?
            .map(|_| ())
            .ok_or(GrailError::RealmNotFound(LookupKey::Id(id)))
    }
}
