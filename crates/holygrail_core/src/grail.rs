//! Facade bundling one connection with every service.

use crate::clock::{Clock, SystemClock};
use crate::repo::{RepoResult, SqliteStore};
use crate::service::{MissionService, QuestService, RealmService, ViewService};
use rusqlite::Connection;
use std::sync::Arc;

/// Entry point for callers holding an open database.
///
/// Services are cheap views over the same connection; build them on demand.
#[derive(Clone)]
pub struct Grail<'conn> {
    store: SqliteStore<'conn>,
    clock: Arc<dyn Clock>,
}

impl<'conn> Grail<'conn> {
    /// Uses the wall clock. Fails if `conn` was not opened through `open_db*`.
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_clock(conn, Arc::new(SystemClock))
    }

    pub fn with_clock(conn: &'conn Connection, clock: Arc<dyn Clock>) -> RepoResult<Self> {
        Ok(Self {
            store: SqliteStore::try_new(conn)?,
            clock,
        })
    }

    pub fn realms(&self) -> RealmService<SqliteStore<'conn>> {
        RealmService::new(self.store, Arc::clone(&self.clock))
    }

    pub fn quests(&self) -> QuestService<SqliteStore<'conn>> {
        QuestService::new(self.store, Arc::clone(&self.clock))
    }

    pub fn missions(&self) -> MissionService<SqliteStore<'conn>> {
        MissionService::new(self.store, Arc::clone(&self.clock))
    }

    pub fn views(&self) -> ViewService<SqliteStore<'conn>> {
        ViewService::new(self.store, Arc::clone(&self.clock))
    }

    /// Deletes every record and re-seeds the default realm.
    pub fn reset(&self) -> RepoResult<()> {
        self.store.reset()
    }
}
