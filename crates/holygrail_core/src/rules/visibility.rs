//! Mission visibility over one consistent snapshot.
//!
//! # Responsibility
//! - Hold all realms, quests and missions read for one view computation.
//! - Decide whether a mission is visible and whether it is active.
//!
//! # Invariants
//! - `is_visible` does not look at the mission's own tickler or completion;
//!   `is_active` adds those checks on top.
//! - A dangling reference (record absent from the snapshot) is treated as
//!   unset, except a missing realm which makes the mission invisible.

use crate::model::mission::{Mission, MissionId};
use crate::model::quest::{Quest, QuestId};
use crate::model::realm::{Realm, RealmId};
use crate::rules::due::effective_due;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Snapshot {
    now: i64,
    realms: HashMap<RealmId, Realm>,
    quests: HashMap<QuestId, Quest>,
    missions: HashMap<MissionId, Mission>,
}

impl Snapshot {
    pub fn new(
        now: i64,
        realms: impl IntoIterator<Item = Realm>,
        quests: impl IntoIterator<Item = Quest>,
        missions: impl IntoIterator<Item = Mission>,
    ) -> Self {
        Self {
            now,
            realms: realms.into_iter().map(|realm| (realm.uuid, realm)).collect(),
            quests: quests.into_iter().map(|quest| (quest.uuid, quest)).collect(),
            missions: missions
                .into_iter()
                .map(|mission| (mission.uuid, mission))
                .collect(),
        }
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn realm(&self, id: RealmId) -> Option<&Realm> {
        self.realms.get(&id)
    }

    pub fn quest(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(&id)
    }

    pub fn mission(&self, id: MissionId) -> Option<&Mission> {
        self.missions.get(&id)
    }

    /// All missions in creation order.
    pub fn missions(&self) -> Vec<&Mission> {
        let mut missions: Vec<&Mission> = self.missions.values().collect();
        missions.sort_by_key(|mission| mission.seq);
        missions
    }

    /// Whether `mission` is eligible to be shown, ignoring its own tickler
    /// and completion.
    pub fn is_visible(&self, mission: &Mission) -> bool {
        let realm_shown = self
            .realm(mission.realm)
            .is_some_and(|realm| !realm.is_hidden);
        realm_shown && self.is_unobstructed(mission)
    }

    /// Predecessor done (or none) and quest live (or none). Does not look at
    /// the realm.
    pub fn is_unobstructed(&self, mission: &Mission) -> bool {
        let unblocked = mission
            .previous_mission
            .and_then(|id| self.mission(id))
            .map_or(true, |previous| previous.completed);

        let quest_live = mission
            .quest
            .and_then(|id| self.quest(id))
            .map_or(true, |quest| quest.is_live(self.now));

        unblocked && quest_live
    }

    /// Open, past its tickler, and visible.
    pub fn is_active(&self, mission: &Mission) -> bool {
        !mission.completed && mission.is_ripe(self.now) && self.is_visible(mission)
    }

    pub fn effective_due(&self, mission: &Mission) -> Option<i64> {
        effective_due(mission, mission.quest.and_then(|id| self.quest(id)))
    }
}
