// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence for groups and actors.
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::actor::{Actor, ActorId};
use crate::group::{Group, GroupId};
use crate::store::{ActorStore, GroupStore};

/// Groups and actors held by a `MemoryStore`.
#[derive(Clone, Debug, Default)]
pub struct InnerMemoryStore {
    groups: BTreeMap<GroupId, Group>,
    actors: BTreeMap<ActorId, Actor>,
    next_group_id: u64,
}

/// An in-memory record store for groups and actors.
///
/// `MemoryStore` supports usage in asynchronous and multi-threaded contexts by wrapping an
/// `InnerMemoryStore` with an `RwLock` and `Arc`. Clones share the same records.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<InnerMemoryStore>>,
}

impl MemoryStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a read-lock on the store.
    pub fn read_store(&self) -> RwLockReadGuard<'_, InnerMemoryStore> {
        self.inner
            .read()
            .expect("acquire shared read access on store")
    }

    /// Obtain a write-lock on the store.
    pub fn write_store(&self) -> RwLockWriteGuard<'_, InnerMemoryStore> {
        self.inner
            .write()
            .expect("acquire exclusive write access on store")
    }
}

fn contains_ignore_case(name: &str, pattern: &str) -> bool {
    name.to_lowercase().contains(&pattern.to_lowercase())
}

impl GroupStore for MemoryStore {
    type Error = Infallible;

    async fn group(&self, id: GroupId) -> Result<Option<Group>, Self::Error> {
        Ok(self.read_store().groups.get(&id).cloned())
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, Self::Error> {
        Ok(self
            .read_store()
            .groups
            .values()
            .find(|group| group.name == name)
            .cloned())
    }

    async fn find_group_by_pattern(&self, pattern: &str) -> Result<Option<Group>, Self::Error> {
        if pattern.is_empty() {
            return Ok(None);
        }

        Ok(self
            .read_store()
            .groups
            .values()
            .find(|group| contains_ignore_case(&group.name, pattern))
            .cloned())
    }

    async fn groups(&self, search: &str) -> Result<Vec<Group>, Self::Error> {
        Ok(self
            .read_store()
            .groups
            .values()
            .filter(|group| contains_ignore_case(&group.name, search))
            .cloned()
            .collect())
    }

    async fn create_group(&mut self, name: &str, grants: &[String]) -> Result<Group, Self::Error> {
        let mut store = self.write_store();

        // Ids are never reused, also not after a group with a manually chosen id was saved
        let next = store
            .groups
            .keys()
            .next_back()
            .map_or(store.next_group_id, |id| id.0.max(store.next_group_id))
            + 1;
        store.next_group_id = next;

        let group = Group::new(GroupId(next), name, grants);
        store.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn save_group(&mut self, group: Group) -> Result<Group, Self::Error> {
        self.write_store().groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete_group(&mut self, id: GroupId) -> Result<Option<Group>, Self::Error> {
        Ok(self.write_store().groups.remove(&id))
    }
}

impl ActorStore for MemoryStore {
    type Error = Infallible;

    async fn actor(&self, id: ActorId) -> Result<Option<Actor>, Self::Error> {
        Ok(self.read_store().actors.get(&id).cloned())
    }

    async fn save_actor(&mut self, actor: Actor) -> Result<Actor, Self::Error> {
        self.write_store().actors.insert(actor.id, actor.clone());
        Ok(actor)
    }

    async fn save_actor_overrides(
        &mut self,
        id: ActorId,
        overrides: &[String],
    ) -> Result<Option<Actor>, Self::Error> {
        let mut store = self.write_store();
        let Some(actor) = store.actors.get_mut(&id) else {
            return Ok(None);
        };
        actor.set_overrides(overrides);
        Ok(Some(actor.clone()))
    }
}
