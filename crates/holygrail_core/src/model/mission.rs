//! Mission domain model.
//!
//! # Responsibility
//! - Define the atomic actionable record.
//! - Own completion bookkeeping so `completed_at` never drifts from `completed`.
//!
//! # Invariants
//! - `realm` always references an existing realm.
//! - `previous_mission` never references the mission itself.

use crate::model::quest::QuestId;
use crate::model::realm::RealmId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable mission identifier.
pub type MissionId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub uuid: MissionId,
    /// Store insertion sequence; `0` until persisted. Drives creation order.
    pub seq: i64,
    pub description: String,
    pub created_at: i64,
    /// Mission stays out of active views until this instant.
    pub tickler: Option<i64>,
    /// Own due date. See [`crate::rules::due::effective_due`] for the value
    /// views actually use.
    pub due: Option<i64>,
    pub completed: bool,
    /// Set iff `completed`.
    pub completed_at: Option<i64>,
    pub realm: RealmId,
    pub quest: Option<QuestId>,
    /// Mission this one is blocked on.
    pub previous_mission: Option<MissionId>,
}

impl Mission {
    /// Creates an unsaved, open mission in `realm`.
    pub fn new(description: impl Into<String>, realm: RealmId, created_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            seq: 0,
            description: description.into(),
            created_at,
            tickler: None,
            due: None,
            completed: false,
            completed_at: None,
            realm,
            quest: None,
            previous_mission: None,
        }
    }

    /// Sets completion state, stamping `completed_at` on the false -> true edge.
    pub fn set_completed(&mut self, completed: bool, now: i64) {
        if completed == self.completed {
            return;
        }
        self.completed = completed;
        self.completed_at = completed.then_some(now);
    }

    /// Returns whether the tickler is unset or already in the past.
    pub fn is_ripe(&self, now: i64) -> bool {
        self.tickler.map_or(true, |tickler| tickler < now)
    }
}

#[cfg(test)]
mod tests {
    use super::Mission;
    use uuid::Uuid;

    #[test]
    fn toggling_twice_restores_open_state() {
        let mut mission = Mission::new("buy milk", Uuid::new_v4(), 0);
        mission.set_completed(!mission.completed, 10);
        assert_eq!(mission.completed_at, Some(10));
        mission.set_completed(!mission.completed, 20);
        assert!(!mission.completed);
        assert_eq!(mission.completed_at, None);
    }

    #[test]
    fn ripe_only_after_tickler() {
        let mut mission = Mission::new("call bank", Uuid::new_v4(), 0);
        assert!(mission.is_ripe(0));
        mission.tickler = Some(500);
        assert!(!mission.is_ripe(500));
        assert!(mission.is_ripe(501));
    }
}
