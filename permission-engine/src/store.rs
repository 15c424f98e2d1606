// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the record store holding groups and actors.
//!
//! The engine never caches records, every resolution fetches them fresh through these
//! interfaces.
use std::fmt::{Debug, Display};

use crate::actor::{Actor, ActorId};
use crate::group::{Group, GroupId};

/// Interface for storing, deleting and querying groups.
///
/// Two variants of the trait are provided: one which is thread-safe (implementing `Sync`) and one
/// which is purely intended for single-threaded execution contexts.
#[trait_variant::make(GroupStore: Send)]
pub trait LocalGroupStore: Clone {
    type Error: Display + Debug;

    /// Get a group by its id.
    async fn group(&self, id: GroupId) -> Result<Option<Group>, Self::Error>;

    /// Get the group with exactly this name, compared case-sensitively.
    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, Self::Error>;

    /// Get the first group whose name contains the pattern, compared case-insensitively.
    ///
    /// When several groups match, the one with the lowest id is returned. An empty pattern
    /// matches no group.
    async fn find_group_by_pattern(&self, pattern: &str) -> Result<Option<Group>, Self::Error>;

    /// All groups whose name contains `search`, compared case-insensitively and ordered by id.
    ///
    /// An empty search returns all groups.
    async fn groups(&self, search: &str) -> Result<Vec<Group>, Self::Error>;

    /// Insert a new group and assign it an id.
    async fn create_group(&mut self, name: &str, grants: &[String]) -> Result<Group, Self::Error>;

    /// Insert or replace a group.
    async fn save_group(&mut self, group: Group) -> Result<Group, Self::Error>;

    /// Delete a group.
    ///
    /// Returns the deleted group or `None` when it was not found in the store.
    async fn delete_group(&mut self, id: GroupId) -> Result<Option<Group>, Self::Error>;
}

/// Interface for storing and querying actors.
///
/// Two variants of the trait are provided: one which is thread-safe (implementing `Sync`) and one
/// which is purely intended for single-threaded execution contexts.
#[trait_variant::make(ActorStore: Send)]
pub trait LocalActorStore: Clone {
    type Error: Display + Debug;

    /// Get an actor by its id.
    async fn actor(&self, id: ActorId) -> Result<Option<Actor>, Self::Error>;

    /// Insert or replace an actor.
    async fn save_actor(&mut self, actor: Actor) -> Result<Actor, Self::Error>;

    /// Replace the overrides of an actor.
    ///
    /// Returns the updated actor or `None` when it was not found in the store.
    async fn save_actor_overrides(
        &mut self,
        id: ActorId,
        overrides: &[String],
    ) -> Result<Option<Actor>, Self::Error>;
}
