//! Realm domain model.
//!
//! A realm is a named bucket of missions ("at home", "at work").
//!
//! # Invariants
//! - Exactly one realm carries `is_default = true`.
//! - Positions of all realms form `0..N-1`; they are assigned by the store
//!   from a [`RealmOrder`](crate::model::realm_order::RealmOrder), never edited
//!   on a single record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable realm identifier.
pub type RealmId = Uuid;

/// Description given to the realm seeded on first initialization.
pub const DEFAULT_REALM_DESCRIPTION: &str = "default realm";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    pub uuid: RealmId,
    /// Store insertion sequence; `0` until persisted.
    pub seq: i64,
    pub description: String,
    pub is_default: bool,
    pub is_hidden: bool,
    pub created_at: i64,
    pub position: u32,
}

impl Realm {
    /// Creates an unsaved, non-default realm at `position`.
    pub fn new(description: impl Into<String>, position: u32, created_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            seq: 0,
            description: description.into(),
            is_default: false,
            is_hidden: false,
            created_at,
            position,
        }
    }
}
