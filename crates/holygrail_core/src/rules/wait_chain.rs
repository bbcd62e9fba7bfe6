//! Blocked-by ("wait for") link validation.
//!
//! Only self-waits and direct two-mission cycles are rejected; longer
//! chains such as A -> B -> C -> A are accepted.

use crate::model::mission::{Mission, MissionId};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitForError {
    /// A mission cannot wait for itself.
    SelfWait(MissionId),
    /// `blocker` is already waiting for `mission`.
    MutualWait {
        mission: MissionId,
        blocker: MissionId,
    },
}

impl Display for WaitForError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfWait(_) => write!(f, "can't wait for self"),
            Self::MutualWait { .. } => {
                write!(f, "can't wait for a mission that is waiting for me")
            }
        }
    }
}

impl Error for WaitForError {}

/// Checks that `mission` may be blocked by `blocker`.
pub fn check_wait_for(mission: &Mission, blocker: &Mission) -> Result<(), WaitForError> {
    if blocker.uuid == mission.uuid {
        return Err(WaitForError::SelfWait(mission.uuid));
    }
    if blocker.previous_mission == Some(mission.uuid) {
        return Err(WaitForError::MutualWait {
            mission: mission.uuid,
            blocker: blocker.uuid,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_wait_for, WaitForError};
    use crate::model::mission::Mission;
    use uuid::Uuid;

    fn mission(description: &str) -> Mission {
        Mission::new(description, Uuid::new_v4(), 0)
    }

    #[test]
    fn self_wait_is_rejected() {
        let a = mission("a");
        assert_eq!(check_wait_for(&a, &a), Err(WaitForError::SelfWait(a.uuid)));
    }

    #[test]
    fn direct_cycle_is_rejected() {
        let a = mission("a");
        let mut b = mission("b");
        b.previous_mission = Some(a.uuid);
        assert!(matches!(
            check_wait_for(&a, &b),
            Err(WaitForError::MutualWait { mission, blocker }) if mission == a.uuid && blocker == b.uuid
        ));
    }

    #[test]
    fn three_hop_cycle_is_accepted() {
        let mut a = mission("a");
        let mut b = mission("b");
        let c = mission("c");
        a.previous_mission = Some(b.uuid);
        b.previous_mission = Some(c.uuid);
        assert_eq!(check_wait_for(&c, &a), Ok(()));
        a.previous_mission = None;
        assert_eq!(check_wait_for(&a, &b), Ok(()));
    }
}
