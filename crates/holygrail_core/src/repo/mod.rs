//! Entity store: repository contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define per-kind create/get/filter/update/delete contracts.
//! - Isolate SQLite query details from rules and services.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Realm positions and the default flag each have exactly one writer:
//!   `write_realm_order` and `set_default_realm`.

pub mod mission_repo;
pub mod quest_repo;
pub mod realm_repo;
pub mod sqlite_store;
pub mod tag_repo;

use crate::db::DbError;
use crate::model::EntityKind;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use mission_repo::{MissionListQuery, MissionOrder, MissionRepository};
pub use quest_repo::{QuestListQuery, QuestRepository};
pub use realm_repo::{RealmListQuery, RealmRepository};
pub use sqlite_store::SqliteStore;
pub use tag_repo::TagRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { kind: EntityKind, id: Uuid },
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Everything the services need from storage.
pub trait EntityStore: RealmRepository + QuestRepository + MissionRepository + TagRepository {}

impl<T> EntityStore for T where
    T: RealmRepository + QuestRepository + MissionRepository + TagRepository
{
}
