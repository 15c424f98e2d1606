// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides whether an actor may perform an action on a resource.
//!
//! Permissions are `node.action` strings listed in a [`NodeCatalog`]. Groups bundle unsigned
//! base grants, actors select a group through their profile and carry personal `+`/`-`
//! overrides on top. The [`resolver`] merges both into an [`EffectivePermissionSet`], the
//! [`PermissionChecker`] queries it and a [`PolicyEvaluator`] combines such queries with an admin
//! bypass and identity or ownership of the targeted record.
//!
//! ```
//! use permission_engine::{
//!     Actor, ActorId, Group, GroupId, NodeCatalog, PermissionChecker, PolicyEvaluator, resolve,
//! };
//!
//! let catalog = NodeCatalog::from_toml_str(r#"user = ["read", "update", "admin"]"#).unwrap();
//! let group = Group::new(GroupId(1), "Student", ["user.read"]);
//! let actor = Actor::new(ActorId(1), "Student").with_overrides(["-user.read"]);
//!
//! let effective = resolve(Some(&group), &actor);
//! let checker = PermissionChecker::default();
//! assert!(!checker.has(&effective, "user.read"));
//!
//! // Actors may always edit themselves
//! let policy = PolicyEvaluator::for_actor(&actor, checker);
//! assert!(policy.edit(&actor, &effective, &actor));
//! # assert!(catalog.contains("user", "admin"));
//! ```
mod actor;
mod catalog;
pub mod checker;
pub mod config;
mod group;
pub mod memory;
pub mod permission;
pub mod policy;
pub mod resolver;
pub mod service;
pub mod store;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use actor::{Actor, ActorId};
pub use catalog::{CatalogError, NodeCatalog};
pub use checker::{MatchMode, PermissionChecker};
pub use config::{ConfigError, EngineConfig, OverrideMode};
pub use group::{Group, GroupId};
pub use memory::MemoryStore;
pub use permission::{NodeName, PermissionString, PermissionStringError, Sign, ValidationError};
pub use policy::{Operation, PolicyEvaluator, Resource};
pub use resolver::{EffectivePermission, EffectivePermissionSet, resolve};
pub use service::{PermissionService, ServiceError};
pub use store::{ActorStore, GroupStore, LocalActorStore, LocalGroupStore};
