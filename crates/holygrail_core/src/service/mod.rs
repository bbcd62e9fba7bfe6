//! Use-case services over the entity store.
//!
//! # Responsibility
//! - Turn repository calls into the operations callers use.
//! - Map storage failures onto the `GrailError` taxonomy.
//!
//! # Invariants
//! - Every service reads "now" from the injected clock, never the wall clock.

pub mod error;
pub mod mission_service;
pub mod quest_service;
pub mod realm_service;
pub mod view_service;

pub use error::{GrailError, GrailResult};
pub use mission_service::{MissionService, NewMission};
pub use quest_service::{NewQuest, QuestService};
pub use realm_service::RealmService;
pub use view_service::{RealmView, TriageBucket, TriageRow, ViewService, DEFAULT_LAST_COMPLETED};
