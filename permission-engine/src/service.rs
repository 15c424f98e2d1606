// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store-backed permission operations, as called by a request gateway or administrative tooling.
//!
//! Records are fetched fresh from the store for every call. A gateway turns `Ok(false)` from the
//! `authorize` methods into a rejection, the service itself never fails for "not allowed".
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::actor::{Actor, ActorId};
use crate::catalog::NodeCatalog;
use crate::checker::PermissionChecker;
use crate::config::{ConfigError, EngineConfig, OverrideMode};
use crate::group::{Group, GroupId};
use crate::permission::{
    NodeName, ValidationError, is_signed, validate_override, validate_permission,
};
use crate::policy::{Operation, PolicyEvaluator, Resource};
use crate::resolver::{EffectivePermissionSet, resolve};
use crate::store::{ActorStore, GroupStore};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Actor does not exist in the record store.
    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    /// Group does not exist in the record store.
    #[error("group {0} not found")]
    GroupNotFound(GroupId),

    /// Submitted permissions or group attributes were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Error returned by the record store.
    #[error("record store failed: {0}")]
    Store(String),
}

fn store_error<E: Display>(err: E) -> ServiceError {
    ServiceError::Store(err.to_string())
}

/// Permission operations on top of a node catalog and a record store.
#[derive(Clone, Debug)]
pub struct PermissionService<S> {
    catalog: Arc<NodeCatalog>,
    store: S,
    checker: PermissionChecker,
    override_mode: OverrideMode,
}

impl<S> PermissionService<S>
where
    S: GroupStore + ActorStore,
{
    /// Creates a service with suffix matching and lenient override handling.
    pub fn new(catalog: Arc<NodeCatalog>, store: S) -> Self {
        Self::with_config(catalog, store, &EngineConfig::default())
    }

    /// Creates a service with the match and override modes of the configuration.
    pub fn with_config(catalog: Arc<NodeCatalog>, store: S, config: &EngineConfig) -> Self {
        Self {
            catalog,
            store,
            checker: PermissionChecker::new(config.match_mode),
            override_mode: config.override_mode,
        }
    }

    /// Loads the catalog the configuration points at and creates a service with it.
    pub fn from_config(config: &EngineConfig, store: S) -> Result<Self, ConfigError> {
        let catalog = Arc::new(config.load_catalog()?);
        Ok(Self::with_config(catalog, store, config))
    }

    pub fn catalog(&self) -> &Arc<NodeCatalog> {
        &self.catalog
    }

    pub fn checker(&self) -> PermissionChecker {
        self.checker
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All permission nodes and their actions.
    pub fn nodes(&self) -> &BTreeMap<String, Vec<String>> {
        self.catalog.all()
    }

    /// Grants of the first group whose name matches the profile.
    ///
    /// Returns an empty list if no group matches or the profile is empty.
    pub async fn group_permissions(&self, profile: &str) -> Result<Vec<String>, ServiceError> {
        if profile.is_empty() {
            return Ok(Vec::new());
        }

        let group = GroupStore::find_group_by_pattern(&self.store, profile)
            .await
            .map_err(store_error)?;

        Ok(group.map(|group| group.grants().to_vec()).unwrap_or_default())
    }

    /// Effective permissions of an already loaded actor.
    ///
    /// The group is looked up by the actor's profile name. A profile naming no group resolves
    /// to the actor's overrides only.
    pub async fn effective(&self, actor: &Actor) -> Result<EffectivePermissionSet, ServiceError> {
        let group = GroupStore::find_group_by_name(&self.store, &actor.profile)
            .await
            .map_err(store_error)?;

        if group.is_none() {
            debug!(actor = %actor.id, profile = %actor.profile, "profile names no group");
        }

        Ok(resolve(group.as_ref(), actor))
    }

    /// Effective permissions of an actor, signed overrides and unsigned group grants mixed.
    pub async fn effective_permissions(&self, id: ActorId) -> Result<Vec<String>, ServiceError> {
        let actor = self.load_actor(id).await?;
        Ok(self.effective(&actor).await?.values())
    }

    /// Returns `true` if the actor holds the permission.
    pub async fn has_permission(
        &self,
        id: ActorId,
        permission: &str,
    ) -> Result<bool, ServiceError> {
        let actor = self.load_actor(id).await?;
        let effective = self.effective(&actor).await?;
        Ok(self.checker.has(&effective, permission))
    }

    /// Replaces the personal overrides of an actor and returns the stored list.
    ///
    /// In lenient mode entries without `+` or `-` are dropped. In strict mode the whole list is
    /// rejected if any entry is unsigned, malformed or unknown to the catalog.
    pub async fn update_overrides(
        &mut self,
        id: ActorId,
        permissions: &[String],
    ) -> Result<Vec<String>, ServiceError> {
        let overrides: Vec<String> = match self.override_mode {
            OverrideMode::Lenient => {
                let (signed, dropped): (Vec<String>, Vec<String>) = permissions
                    .iter()
                    .cloned()
                    .partition(|permission| is_signed(permission));

                if !dropped.is_empty() {
                    debug!(actor = %id, ?dropped, "dropping unsigned overrides");
                }

                signed
            }
            OverrideMode::Strict => {
                for permission in permissions {
                    validate_override(permission, &self.catalog)?;
                }

                permissions.to_vec()
            }
        };

        let actor = ActorStore::save_actor_overrides(&mut self.store, id, &overrides)
            .await
            .map_err(store_error)?
            .ok_or(ServiceError::ActorNotFound(id))?;

        debug!(actor = %id, overrides = actor.overrides().len(), "replaced actor overrides");

        Ok(actor.overrides().to_vec())
    }

    /// Decides if an actor may perform an operation on the `user` records of other actors.
    ///
    /// The policy is the one of the acting actor's own node. The target actor needs to exist
    /// for operations on a single record.
    pub async fn authorize(
        &self,
        operation: Operation,
        actor_id: ActorId,
        target_id: Option<ActorId>,
    ) -> Result<bool, ServiceError> {
        let actor = self.load_actor(actor_id).await?;
        let target = match target_id {
            Some(id) if operation.requires_target() => Some(self.load_actor(id).await?),
            _ => None,
        };

        let effective = self.effective(&actor).await?;
        let policy = PolicyEvaluator::for_actor(&actor, self.checker);

        Ok(policy.authorize(
            operation,
            &actor,
            &effective,
            target.as_ref().map(|target| target as &dyn Resource),
        ))
    }

    /// Decides if an actor may perform an operation on a record of the given node.
    pub async fn authorize_resource(
        &self,
        operation: Operation,
        actor_id: ActorId,
        node: &NodeName,
        target: Option<&(dyn Resource + Sync)>,
    ) -> Result<bool, ServiceError> {
        let actor = self.load_actor(actor_id).await?;
        let effective = self.effective(&actor).await?;
        let policy = PolicyEvaluator::new(node.clone(), self.checker);

        Ok(policy.authorize(
            operation,
            &actor,
            &effective,
            target.map(|target| target as &dyn Resource),
        ))
    }

    pub async fn group(&self, id: GroupId) -> Result<Group, ServiceError> {
        GroupStore::group(&self.store, id)
            .await
            .map_err(store_error)?
            .ok_or(ServiceError::GroupNotFound(id))
    }

    /// Groups whose name contains the search term, ignoring case.
    pub async fn groups(&self, search: &str) -> Result<Vec<Group>, ServiceError> {
        GroupStore::groups(&self.store, search)
            .await
            .map_err(store_error)
    }

    /// Creates a group, signs on the grants are removed.
    pub async fn create_group(
        &mut self,
        name: &str,
        grants: &[String],
    ) -> Result<Group, ServiceError> {
        self.validate_group(name, grants)?;

        let group = GroupStore::create_group(&mut self.store, name, grants)
            .await
            .map_err(store_error)?;

        debug!(group = %group.id, name = %group.name, "created group");

        Ok(group)
    }

    /// Changes name and grants of a group, `None` keeps the current value.
    pub async fn update_group(
        &mut self,
        id: GroupId,
        name: Option<&str>,
        grants: Option<&[String]>,
    ) -> Result<Group, ServiceError> {
        let mut group = self.group(id).await?;

        let name = name.unwrap_or(group.name.as_str()).to_owned();
        let grants = grants.map_or_else(|| group.grants().to_vec(), <[String]>::to_vec);
        self.validate_group(&name, &grants)?;

        group.name = name;
        group.set_grants(&grants);

        GroupStore::save_group(&mut self.store, group)
            .await
            .map_err(store_error)
    }

    pub async fn delete_group(&mut self, id: GroupId) -> Result<Group, ServiceError> {
        GroupStore::delete_group(&mut self.store, id)
            .await
            .map_err(store_error)?
            .ok_or(ServiceError::GroupNotFound(id))
    }

    fn validate_group(&self, name: &str, grants: &[String]) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyGroupName);
        }

        if self.override_mode == OverrideMode::Strict {
            for grant in grants {
                validate_permission(grant, &self.catalog)?;
            }
        }

        Ok(())
    }

    async fn load_actor(&self, id: ActorId) -> Result<Actor, ServiceError> {
        ActorStore::actor(&self.store, id)
            .await
            .map_err(store_error)?
            .ok_or(ServiceError::ActorNotFound(id))
    }
}
