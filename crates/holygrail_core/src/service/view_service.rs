//! View composer: read-only listings over one snapshot per call.
//!
//! # Responsibility
//! - Build the active/all listings for realms, quests and missions.
//! - Group missions by realm (main view) and by urgency (triage view).
//!
//! # Invariants
//! - A mission appears at most once in a triage result.
//! - Empty buckets and empty realm groups are omitted.
//! - Realm groups follow realm position order; missions inside a group
//!   follow creation order.

use crate::clock::{Clock, DAY_MS};
use crate::model::mission::{Mission, MissionId};
use crate::model::quest::{Quest, QuestId};
use crate::model::realm::{Realm, RealmId};
use crate::model::LookupKey;
use crate::repo::{
    EntityStore, MissionListQuery, MissionOrder, QuestListQuery, RealmListQuery,
};
use crate::rules::visibility::Snapshot;
use crate::service::error::{GrailError, GrailResult};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Default size of the recently-completed list.
pub const DEFAULT_LAST_COMPLETED: u32 = 5;

/// One realm paired with its listed missions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealmView {
    pub realm: Realm,
    pub missions: Vec<Mission>,
}

/// Urgency bucket of the triage view, from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriageBucket {
    Today,
    InThreeDays,
    ThisWeek,
}

impl TriageBucket {
    pub const ALL: [TriageBucket; 3] = [Self::Today, Self::InThreeDays, Self::ThisWeek];

    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "For today",
            Self::InThreeDays => "For in 3 days",
            Self::ThisWeek => "For this week",
        }
    }

    /// Exclusive upper bound on effective due, as an offset from now.
    pub fn horizon_ms(self) -> i64 {
        match self {
            Self::Today => DAY_MS,
            Self::InThreeDays => 4 * DAY_MS,
            Self::ThisWeek => 8 * DAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TriageRow {
    Bucket {
        bucket: TriageBucket,
        missions: Vec<Mission>,
    },
    Realm(RealmView),
}

pub struct ViewService<S: EntityStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: EntityStore> ViewService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Realms in position order; hidden ones only with `all`.
    pub fn list_realms(&self, all: bool) -> GrailResult<Vec<Realm>> {
        Ok(self.store.list_realms(&RealmListQuery {
            include_hidden: all,
            description: None,
        })?)
    }

    pub fn list_quests(&self, all: bool) -> GrailResult<Vec<Quest>> {
        let query = if all {
            QuestListQuery {
                include_hidden: true,
                ..QuestListQuery::default()
            }
        } else {
            QuestListQuery {
                include_hidden: false,
                ripe_at: Some(self.clock.now_ms()),
                description: None,
            }
        };
        Ok(self.store.list_quests(&query)?)
    }

    /// Active missions in creation order, or every mission with `all`.
    pub fn list_missions(&self, all: bool) -> GrailResult<Vec<Mission>> {
        if all {
            return Ok(self.store.list_missions(&MissionListQuery::default())?);
        }
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .missions()
            .into_iter()
            .filter(|mission| snapshot.is_active(mission))
            .cloned()
            .collect())
    }

    /// Missions owned by `realm`. The active variant does not consult the
    /// realm's own hidden flag.
    pub fn realm_missions(&self, realm: RealmId, all: bool) -> GrailResult<Vec<Mission>> {
        if self.store.get_realm(realm)?.is_none() {
            return Err(GrailError::RealmNotFound(LookupKey::Id(realm)));
        }
        if all {
            return Ok(self.store.list_missions(&MissionListQuery {
                realm: Some(realm),
                ..MissionListQuery::default()
            })?);
        }
        let snapshot = self.snapshot()?;
        let now = snapshot.now();
        Ok(snapshot
            .missions()
            .into_iter()
            .filter(|mission| mission.realm == realm)
            .filter(|mission| {
                !mission.completed && mission.is_ripe(now) && snapshot.is_unobstructed(mission)
            })
            .cloned()
            .collect())
    }

    pub fn quest_missions(&self, quest: QuestId, all: bool) -> GrailResult<Vec<Mission>> {
        if self.store.get_quest(quest)?.is_none() {
            return Err(GrailError::QuestNotFound(LookupKey::Id(quest)));
        }
        if all {
            return Ok(self.store.list_missions(&MissionListQuery {
                quest: Some(quest),
                ..MissionListQuery::default()
            })?);
        }
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .missions()
            .into_iter()
            .filter(|mission| mission.quest == Some(quest) && snapshot.is_active(mission))
            .cloned()
            .collect())
    }

    /// Completed missions, most recently completed first.
    pub fn last_completed_missions(&self, limit: u32) -> GrailResult<Vec<Mission>> {
        Ok(self.store.list_missions(&MissionListQuery {
            completed: Some(true),
            order: MissionOrder::CompletedAtDesc,
            limit: Some(limit),
            ..MissionListQuery::default()
        })?)
    }

    /// Visible realms in position order with their active missions.
    pub fn main_view(&self) -> GrailResult<Vec<RealmView>> {
        let snapshot = self.snapshot()?;
        let realms = self.list_realms(false)?;
        let view = group_by_realm(&snapshot, &realms, &HashSet::new());
        debug!(
            "event=main_view module=service status=ok realms={}",
            view.len()
        );
        Ok(view)
    }

    /// Urgency buckets followed by the realm groups of everything left.
    pub fn triage_view(&self) -> GrailResult<Vec<TriageRow>> {
        let snapshot = self.snapshot()?;
        let now = snapshot.now();

        let mut candidates: Vec<(i64, &Mission)> = snapshot
            .missions()
            .into_iter()
            .filter(|mission| snapshot.is_active(mission))
            .filter_map(|mission| {
                snapshot
                    .effective_due(mission)
                    .filter(|due| *due < now + TriageBucket::ThisWeek.horizon_ms())
                    .map(|due| (due, mission))
            })
            .collect();
        // Stable sort keeps creation order among equal due dates.
        candidates.sort_by_key(|(due, _)| *due);

        let mut placed: HashSet<MissionId> = HashSet::new();
        let mut rows = Vec::new();
        for bucket in TriageBucket::ALL {
            let limit = now + bucket.horizon_ms();
            let members: Vec<Mission> = candidates
                .iter()
                .filter(|(due, mission)| *due < limit && !placed.contains(&mission.uuid))
                .map(|(_, mission)| (*mission).clone())
                .collect();
            if members.is_empty() {
                continue;
            }
            placed.extend(members.iter().map(|mission| mission.uuid));
            rows.push(TriageRow::Bucket {
                bucket,
                missions: members,
            });
        }

        let realms = self.list_realms(false)?;
        rows.extend(
            group_by_realm(&snapshot, &realms, &placed)
                .into_iter()
                .map(TriageRow::Realm),
        );
        debug!(
            "event=triage_view module=service status=ok rows={} placed={}",
            rows.len(),
            placed.len()
        );
        Ok(rows)
    }

    /// Missions whose description contains `text` (case-sensitive).
    pub fn search(&self, text: &str) -> GrailResult<Vec<Mission>> {
        Ok(self.store.list_missions(&MissionListQuery {
            description_contains: Some(text.to_string()),
            ..MissionListQuery::default()
        })?)
    }

    pub fn tags_for(&self, mission: MissionId) -> GrailResult<Vec<String>> {
        if self.store.get_mission(mission)?.is_none() {
            return Err(GrailError::MissionNotFound(LookupKey::Id(mission)));
        }
        Ok(self.store.tags_for(mission)?)
    }

    pub fn missions_with_tag(&self, tag: &str) -> GrailResult<Vec<Mission>> {
        let mut missions = Vec::new();
        for id in self.store.missions_with_tag(tag.trim())? {
            if let Some(mission) = self.store.get_mission(id)? {
                missions.push(mission);
            }
        }
        Ok(missions)
    }

    fn snapshot(&self) -> GrailResult<Snapshot> {
        let realms = self.store.list_realms(&RealmListQuery::all())?;
        let quests = self.store.list_quests(&QuestListQuery {
            include_hidden: true,
            ..QuestListQuery::default()
        })?;
        let missions = self.store.list_missions(&MissionListQuery::default())?;
        Ok(Snapshot::new(self.clock.now_ms(), realms, quests, missions))
    }
}

fn group_by_realm(
    snapshot: &Snapshot,
    realms: &[Realm],
    exclude: &HashSet<MissionId>,
) -> Vec<RealmView> {
    let active: Vec<&Mission> = snapshot
        .missions()
        .into_iter()
        .filter(|mission| snapshot.is_active(mission) && !exclude.contains(&mission.uuid))
        .collect();

    realms
        .iter()
        .filter_map(|realm| {
            let missions: Vec<Mission> = active
                .iter()
                .filter(|mission| mission.realm == realm.uuid)
                .map(|mission| (*mission).clone())
                .collect();
            (!missions.is_empty()).then(|| RealmView {
                realm: realm.clone(),
                missions,
            })
        })
        .collect()
}
