//! Ranked sequence of realms.
//!
//! # Responsibility
//! - Hold the user-chosen realm order as an explicit list of ids.
//! - Derive every realm position from list index, so positions are rebuilt
//!   as a whole after each mutation.
//!
//! # Invariants
//! - Each id appears at most once.
//! - `positions()` always yields `0..len-1`.

use crate::model::realm::{Realm, RealmId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealmOrder {
    ids: Vec<RealmId>,
}

impl RealmOrder {
    /// Builds the order from persisted realms, by stored position then
    /// creation sequence.
    pub fn from_realms(realms: &[Realm]) -> Self {
        let mut sorted: Vec<&Realm> = realms.iter().collect();
        sorted.sort_by_key(|realm| (realm.position, realm.seq));
        Self {
            ids: sorted.into_iter().map(|realm| realm.uuid).collect(),
        }
    }

    pub fn ids(&self) -> &[RealmId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn position_of(&self, id: RealmId) -> Option<u32> {
        self.ids
            .iter()
            .position(|current| *current == id)
            .map(|index| index as u32)
    }

    /// Appends `id` and returns its position. Existing ids are left in place.
    pub fn push(&mut self, id: RealmId) -> u32 {
        if let Some(position) = self.position_of(id) {
            return position;
        }
        self.ids.push(id);
        (self.ids.len() - 1) as u32
    }

    /// Moves `id` to `target`; a target past the end appends.
    ///
    /// Returns `false` when `id` is unknown or already sits at `target`.
    pub fn move_to(&mut self, id: RealmId, target: u32) -> bool {
        let Some(current) = self.position_of(id) else {
            return false;
        };
        if current == target {
            return false;
        }

        self.ids.remove(current as usize);
        let index = (target as usize).min(self.ids.len());
        self.ids.insert(index, id);
        true
    }

    /// Removes `id`, closing the gap. Returns `false` when `id` is unknown.
    pub fn remove(&mut self, id: RealmId) -> bool {
        match self.position_of(id) {
            Some(index) => {
                self.ids.remove(index as usize);
                true
            }
            None => false,
        }
    }

    /// Iterates `(id, position)` pairs in order.
    pub fn positions(&self) -> impl Iterator<Item = (RealmId, u32)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index as u32))
    }
}
