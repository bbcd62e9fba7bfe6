//! Quest domain model.
//!
//! A quest groups the missions of a multi-step goal. Completing or hiding a
//! quest hides its missions from active views without touching them.

use crate::model::realm::RealmId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable quest identifier.
pub type QuestId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub uuid: QuestId,
    /// Store insertion sequence; `0` until persisted.
    pub seq: i64,
    pub description: String,
    pub created_at: i64,
    pub completed: bool,
    /// Set iff `completed`.
    pub completed_at: Option<i64>,
    /// Quest and its missions stay out of active views until this instant.
    pub tickler: Option<i64>,
    /// Ceiling for the effective due date of member missions.
    pub due: Option<i64>,
    pub is_hidden: bool,
    /// Realm given to new missions of this quest when none is specified.
    pub default_realm: Option<RealmId>,
}

impl Quest {
    /// Creates an unsaved, open quest.
    pub fn new(description: impl Into<String>, created_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            seq: 0,
            description: description.into(),
            created_at,
            completed: false,
            completed_at: None,
            tickler: None,
            due: None,
            is_hidden: false,
            default_realm: None,
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

    /// Returns whether member missions may be shown at `now`.
    pub fn is_live(&self, now: i64) -> bool {
        !self.is_hidden && !self.completed && self.is_ripe(now)
    }
}

#[cfg(test)]
mod tests {
    use super::Quest;

    #[test]
    fn completion_stamps_and_clears_completed_at() {
        let mut quest = Quest::new("move out", 10);
        quest.set_completed(true, 50);
        assert_eq!(quest.completed_at, Some(50));

        quest.set_completed(true, 90);
        assert_eq!(quest.completed_at, Some(50));

        quest.set_completed(false, 100);
        assert!(!quest.completed);
        assert_eq!(quest.completed_at, None);
    }

    #[test]
    fn tickler_in_future_makes_quest_not_live() {
        let mut quest = Quest::new("later", 0);
        quest.tickler = Some(1_000);
        assert!(!quest.is_live(999));
        assert!(!quest.is_live(1_000));
        assert!(quest.is_live(1_001));
    }
}
