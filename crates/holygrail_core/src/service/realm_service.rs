//! Realm use-case service.
//!
//! # Responsibility
//! - Create, rename, hide and remove realms.
//! - Maintain the user-chosen realm order (position manager).
//! - Transfer the default flag through a single writer.
//!
//! # Invariants
//! - After every operation realm positions are exactly `0..N-1`.
//! - Exactly one realm is the default; it can't be removed.
//! - A realm owning any mission can't be removed.

use crate::clock::Clock;
use crate::model::realm::{Realm, RealmId};
use crate::model::realm_order::RealmOrder;
use crate::model::LookupKey;
use crate::repo::{EntityStore, MissionListQuery, RealmListQuery, RepoError};
use crate::service::error::{normalize_description, GrailError, GrailResult};
use log::{info, warn};
use std::sync::Arc;

pub struct RealmService<S: EntityStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: EntityStore> RealmService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Appends a realm after the last position.
    ///
    /// With `make_default`, the default flag moves to the new realm.
    pub fn add_realm(
        &self,
        description: impl Into<String>,
        hidden: bool,
        make_default: bool,
    ) -> GrailResult<Realm> {
        let description = normalize_description(description)?;
        let mut order = self.current_order()?;

        let mut realm = Realm::new(description, 0, self.clock.now_ms());
        realm.position = order.push(realm.uuid);
        realm.is_hidden = hidden;
        let id = self.store.create_realm(&realm)?;

        if make_default {
            self.store.set_default_realm(id)?;
        }
        info!(
            "event=realm_add module=service status=ok position={} default={}",
            realm.position, make_default
        );
        self.get_realm(id)
    }

    pub fn get_realm(&self, id: RealmId) -> GrailResult<Realm> {
        self.store
            .get_realm(id)?
            .ok_or(GrailError::RealmNotFound(LookupKey::Id(id)))
    }

    /// Returns every realm whose description equals `description`.
    pub fn get_realm_by_desc(&self, description: &str) -> GrailResult<Vec<Realm>> {
        let realms = self.store.list_realms(&RealmListQuery {
            include_hidden: true,
            description: Some(description.to_string()),
        })?;
        if realms.is_empty() {
            return Err(GrailError::RealmNotFound(LookupKey::Description(
                description.to_string(),
            )));
        }
        Ok(realms)
    }

    pub fn default_realm(&self) -> GrailResult<Realm> {
        let mut defaults: Vec<Realm> = self
            .store
            .list_realms(&RealmListQuery::all())?
            .into_iter()
            .filter(|realm| realm.is_default)
            .collect();
        match defaults.len() {
            1 => Ok(defaults.remove(0)),
            count => Err(GrailError::Repo(RepoError::InvalidData(format!(
                "expected exactly one default realm, found {count}"
            )))),
        }
    }

    pub fn rename_realm(
        &self,
        id: RealmId,
        description: impl Into<String>,
    ) -> GrailResult<Realm> {
        let mut realm = self.get_realm(id)?;
        realm.description = normalize_description(description)?;
        self.store.update_realm(&realm)?;
        Ok(realm)
    }

    pub fn set_hidden(&self, id: RealmId, hidden: bool) -> GrailResult<Realm> {
        let mut realm = self.get_realm(id)?;
        if realm.is_hidden != hidden {
            realm.is_hidden = hidden;
            self.store.update_realm(&realm)?;
        }
        Ok(realm)
    }

    pub fn toggle_hide(&self, id: RealmId) -> GrailResult<Realm> {
        let realm = self.get_realm(id)?;
        self.set_hidden(id, !realm.is_hidden)
    }

    /// Makes `id` the default realm, clearing the previous holder.
    pub fn set_default(&self, id: RealmId) -> GrailResult<Realm> {
        let realm = self.get_realm(id)?;
        if !realm.is_default {
            self.store.set_default_realm(id)?;
            info!("event=realm_set_default module=service status=ok");
        }
        self.get_realm(id)
    }

    /// Moves a realm to `target`, renumbering every realm.
    ///
    /// A target past the last position appends. Moving to the current
    /// position is a no-op.
    pub fn set_position(&self, id: RealmId, target: u32) -> GrailResult<Realm> {
        let realm = self.get_realm(id)?;
        if realm.position == target {
            return Ok(realm);
        }

        let mut order = self.current_order()?;
        if order.move_to(id, target) {
            self.store.write_realm_order(&order)?;
            info!(
                "event=realm_reposition module=service status=ok from={} to={} realms={}",
                realm.position,
                order.position_of(id).unwrap_or(realm.position),
                order.len()
            );
        }
        self.get_realm(id)
    }

    /// Deletes an empty, non-default realm and closes the position gap.
    pub fn remove_realm(&self, id: RealmId) -> GrailResult<()> {
        let realm = self.get_realm(id)?;
        if realm.is_default {
            warn!("event=realm_remove module=service status=error error_code=default_realm");
            return Err(GrailError::CannotRemoveDefaultRealm(id));
        }

        let owned = self.store.list_missions(&MissionListQuery {
            realm: Some(id),
            limit: Some(1),
            ..MissionListQuery::default()
        })?;
        if !owned.is_empty() {
            warn!("event=realm_remove module=service status=error error_code=realm_has_children");
            return Err(GrailError::RealmHasChildren(id));
        }

        let mut order = self.current_order()?;
        order.remove(id);
        self.store.delete_realm(id, &order)?;
        info!(
            "event=realm_remove module=service status=ok remaining={}",
            order.len()
        );
        Ok(())
    }

    fn current_order(&self) -> GrailResult<RealmOrder> {
        let realms = self.store.list_realms(&RealmListQuery::all())?;
        Ok(RealmOrder::from_realms(&realms))
    }
}
