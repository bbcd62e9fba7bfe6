//! Domain records for realms, quests and missions.
//!
//! # Responsibility
//! - Define the canonical records shared by repositories, rules and views.
//! - Keep state transitions that carry invariants (completion) on the record.
//!
//! # Invariants
//! - Every record is identified by a stable `Uuid`.
//! - `completed_at` is set iff `completed` is true.
//! - Timestamps are Unix epoch milliseconds.

pub mod mission;
pub mod quest;
pub mod realm;
pub mod realm_order;

use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Record kind, used by not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Realm,
    Quest,
    Mission,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Realm => write!(f, "realm"),
            Self::Quest => write!(f, "quest"),
            Self::Mission => write!(f, "mission"),
        }
    }
}

/// Key a lookup was performed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(Uuid),
    Description(String),
}

impl Display for LookupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Description(description) => write!(f, "`{description}`"),
        }
    }
}

impl From<Uuid> for LookupKey {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}
