//! Core domain logic for Holygrail, a personal mission tracker.
//! This crate is the single source of truth for business invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod grail;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rules;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock, DAY_MS};
pub use config::{ConfigError, ConfigSource, DatabaseConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use grail::Grail;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::mission::{Mission, MissionId};
pub use model::quest::{Quest, QuestId};
pub use model::realm::{Realm, RealmId, DEFAULT_REALM_DESCRIPTION};
pub use model::realm_order::RealmOrder;
pub use model::{EntityKind, LookupKey};
pub use repo::{EntityStore, RepoError, RepoResult, SqliteStore};
pub use rules::due::effective_due;
pub use rules::visibility::Snapshot;
pub use rules::wait_chain::{check_wait_for, WaitForError};
pub use service::{
    GrailError, GrailResult, MissionService, NewMission, NewQuest, QuestService, RealmService,
    RealmView, TriageBucket, TriageRow, ViewService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
