//! Mission use-case service.
//!
//! # Responsibility
//! - Create missions and resolve their owning realm.
//! - Apply mutators (rename, tickle, due, completion, realm/quest moves).
//! - Maintain blocked-by links and tags.
//!
//! # Invariants
//! - A mission always belongs to an existing realm.
//! - Removing a mission never deletes the missions waiting on it.

use crate::clock::Clock;
use crate::model::mission::{Mission, MissionId};
use crate::model::quest::QuestId;
use crate::model::realm::RealmId;
use crate::model::LookupKey;
use crate::repo::{EntityStore, MissionListQuery, RealmListQuery, RepoError};
use crate::rules::due::effective_due;
use crate::rules::wait_chain::check_wait_for;
use crate::service::error::{normalize_description, GrailError, GrailResult};
use log::{info, warn};
use std::sync::Arc;

/// Request model for creating a mission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMission {
    pub description: String,
    pub tickler: Option<i64>,
    pub due: Option<i64>,
    pub quest: Option<QuestId>,
    /// Explicit owner. Falls back to the quest's default realm, then the
    /// global default realm.
    pub realm: Option<RealmId>,
    pub wait_for: Option<MissionId>,
    /// Reject when an open mission with the same description exists.
    pub unique: bool,
}

impl NewMission {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

pub struct MissionService<S: EntityStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: EntityStore> MissionService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn add_mission(&self, request: NewMission) -> GrailResult<Mission> {
        let description = normalize_description(request.description)?;

        if request.unique {
            let open = self.store.list_missions(&MissionListQuery {
                completed: Some(false),
                description: Some(description.clone()),
                limit: Some(1),
                ..MissionListQuery::default()
            })?;
            if !open.is_empty() {
                info!("event=mission_add module=service status=error error_code=duplicate");
                return Err(GrailError::DuplicateMission(description));
            }
        }

        let quest_default_realm = match request.quest {
            Some(quest_id) => {
                self.store
                    .get_quest(quest_id)?
                    .ok_or(GrailError::QuestNotFound(LookupKey::Id(quest_id)))?
                    .default_realm
            }
            None => None,
        };
        let realm = match request.realm.or(quest_default_realm) {
            Some(realm_id) => {
                self.ensure_realm_exists(realm_id)?;
                realm_id
            }
            None => self.default_realm_id()?,
        };

        let mut mission = Mission::new(description, realm, self.clock.now_ms());
        mission.tickler = request.tickler;
        mission.due = request.due;
        mission.quest = request.quest;

        if let Some(blocker_id) = request.wait_for {
            let blocker = self.get_mission(blocker_id)?;
            check_wait_for(&mission, &blocker)?;
            mission.previous_mission = Some(blocker_id);
        }

        let id = self.store.create_mission(&mission)?;
        info!(
            "event=mission_add module=service status=ok quest={} waiting={}",
            mission.quest.is_some(),
            mission.previous_mission.is_some()
        );
        self.get_mission(id)
    }

    pub fn get_mission(&self, id: MissionId) -> GrailResult<Mission> {
        self.store
            .get_mission(id)?
            .ok_or(GrailError::MissionNotFound(LookupKey::Id(id)))
    }

    /// Returns every mission whose description equals `description`.
    pub fn get_mission_by_desc(&self, description: &str) -> GrailResult<Vec<Mission>> {
        let missions = self.store.list_missions(&MissionListQuery {
            description: Some(description.to_string()),
            ..MissionListQuery::default()
        })?;
        if missions.is_empty() {
            return Err(GrailError::MissionNotFound(LookupKey::Description(
                description.to_string(),
            )));
        }
        Ok(missions)
    }

    pub fn rename_mission(
        &self,
        id: MissionId,
        description: impl Into<String>,
    ) -> GrailResult<Mission> {
        let description = normalize_description(description)?;
        self.modify(id, |mission| mission.description = description)
    }

    pub fn tickle(&self, id: MissionId, tickler: Option<i64>) -> GrailResult<Mission> {
        self.modify(id, |mission| mission.tickler = tickler)
    }

    pub fn due_for(&self, id: MissionId, due: Option<i64>) -> GrailResult<Mission> {
        self.modify(id, |mission| mission.due = due)
    }

    pub fn set_completed(&self, id: MissionId, completed: bool) -> GrailResult<Mission> {
        let now = self.clock.now_ms();
        self.modify(id, |mission| mission.set_completed(completed, now))
    }

    pub fn toggle(&self, id: MissionId) -> GrailResult<Mission> {
        let mission = self.get_mission(id)?;
        self.set_completed(id, !mission.completed)
    }

    pub fn change_realm(&self, id: MissionId, realm: RealmId) -> GrailResult<Mission> {
        self.ensure_realm_exists(realm)?;
        self.modify(id, |mission| mission.realm = realm)
    }

    pub fn change_quest(&self, id: MissionId, quest: Option<QuestId>) -> GrailResult<Mission> {
        if let Some(quest_id) = quest {
            if self.store.get_quest(quest_id)?.is_none() {
                return Err(GrailError::QuestNotFound(LookupKey::Id(quest_id)));
            }
        }
        self.modify(id, |mission| mission.quest = quest)
    }

    /// Blocks `id` until `blocker` is completed.
    pub fn wait_for(&self, id: MissionId, blocker: MissionId) -> GrailResult<Mission> {
        let mut mission = self.get_mission(id)?;
        let blocking = self.get_mission(blocker)?;
        if let Err(err) = check_wait_for(&mission, &blocking) {
            warn!("event=wait_for_rejected module=service status=error error={err}");
            return Err(err.into());
        }
        mission.previous_mission = Some(blocker);
        self.store.update_mission(&mission)?;
        Ok(mission)
    }

    pub fn stop_waiting(&self, id: MissionId) -> GrailResult<Mission> {
        self.modify(id, |mission| mission.previous_mission = None)
    }

    /// Deletes the mission, its tags, and every blocked-by link pointing at it.
    pub fn remove_mission(&self, id: MissionId) -> GrailResult<()> {
        self.get_mission(id)?;
        let dependents = self.store.list_missions(&MissionListQuery {
            previous_mission: Some(id),
            ..MissionListQuery::default()
        })?;
        for mut dependent in dependents.iter().cloned() {
            dependent.previous_mission = None;
            self.store.update_mission(&dependent)?;
        }
        self.store.clear_tags(id)?;
        self.store.delete_mission(id)?;
        info!(
            "event=mission_remove module=service status=ok unblocked={}",
            dependents.len()
        );
        Ok(())
    }

    /// Attaches a trimmed tag. Re-adding an existing tag is a no-op.
    pub fn add_tag(&self, id: MissionId, tag: &str) -> GrailResult<()> {
        let tag = normalize_description(tag)?;
        self.get_mission(id)?;
        self.store.add_tag(id, &tag)?;
        Ok(())
    }

    pub fn remove_tag(&self, id: MissionId, tag: &str) -> GrailResult<()> {
        let tag = tag.trim();
        self.get_mission(id)?;
        if !self.store.remove_tag(id, tag)? {
            return Err(GrailError::TagNotFound {
                mission: id,
                tag: tag.to_string(),
            });
        }
        Ok(())
    }

    /// Own due date capped by the quest's due date.
    pub fn effective_due(&self, id: MissionId) -> GrailResult<Option<i64>> {
        let mission = self.get_mission(id)?;
        let quest = match mission.quest {
            Some(quest_id) => self.store.get_quest(quest_id)?,
            None => None,
        };
        Ok(effective_due(&mission, quest.as_ref()))
    }

    fn modify<F>(&self, id: MissionId, change: F) -> GrailResult<Mission>
    where
        F: FnOnce(&mut Mission),
    {
        let mut mission = self.get_mission(id)?;
        change(&mut mission);
        self.store.update_mission(&mission)?;
        Ok(mission)
    }

    fn ensure_realm_exists(&self, id: RealmId) -> GrailResult<()> {
        self.store
            .get_realm(id)?
            .map(|_| ())
            .ok_or(GrailError::RealmNotFound(LookupKey::Id(id)))
    }

    fn default_realm_id(&self) -> GrailResult<RealmId> {
        self.store
            .list_realms(&RealmListQuery::all())?
            .into_iter()
            .find(|realm| realm.is_default)
            .map(|realm| realm.uuid)
            .ok_or_else(|| {
                GrailError::Repo(RepoError::InvalidData("no default realm".to_string()))
            })
    }
}
