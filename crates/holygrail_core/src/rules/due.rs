//! Effective due date resolution.

use crate::model::mission::Mission;
use crate::model::quest::Quest;

/// Returns the due date views should use for `mission`.
///
/// `quest` must be the mission's own quest (or `None` when it has none).
/// The quest due date acts as a ceiling: it wins unless the mission's own
/// due date is strictly earlier.
pub fn effective_due(mission: &Mission, quest: Option<&Quest>) -> Option<i64> {
    let Some(quest_due) = quest.and_then(|quest| quest.due) else {
        return mission.due;
    };

    match mission.due {
        Some(own_due) if own_due < quest_due => Some(own_due),
        _ => Some(quest_due),
    }
}
