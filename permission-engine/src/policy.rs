// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization rules for protected operations on the records of a node.
//!
//! Every decision passes two gates. Actors holding `.admin` on the node they are keyed under
//! are authorized right away. Otherwise the operation's own permission on the policy's node is
//! checked, and operations on a single record also
//! pass when the actor is the record itself or its owner.
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::actor::{Actor, ActorId};
use crate::checker::PermissionChecker;
use crate::permission::NodeName;
use crate::resolver::EffectivePermissionSet;

/// Action which bypasses all other rules of a node.
pub const ADMIN_ACTION: &str = "admin";

/// Protected operation on the records of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    View,
    Edit,
    Delete,
    List,
}

impl Operation {
    /// Catalog action an actor needs to be granted for this operation.
    pub fn action(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::View => "read",
            Operation::Edit => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }

    /// Operations on a single record fall back to identity and ownership of the target.
    pub fn requires_target(&self) -> bool {
        matches!(self, Operation::View | Operation::Edit | Operation::Delete)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::View => "view",
            Operation::Edit => "edit",
            Operation::Delete => "delete",
            Operation::List => "list",
        };

        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Operation::Create),
            "view" => Ok(Operation::View),
            "edit" => Ok(Operation::Edit),
            "delete" => Ok(Operation::Delete),
            "list" => Ok(Operation::List),
            _ => Err(UnknownOperation(s.to_owned())),
        }
    }
}

/// Record an operation can be performed on.
pub trait Resource {
    /// Actor this record represents, if it is one.
    fn actor_id(&self) -> Option<ActorId>;

    /// Actor owning this record, `None` when there is no owner or it was not loaded.
    fn owner(&self) -> Option<ActorId>;
}

impl Resource for Actor {
    fn actor_id(&self) -> Option<ActorId> {
        Some(self.id)
    }

    fn owner(&self) -> Option<ActorId> {
        self.owner
    }
}

/// Authorization rules of one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyEvaluator {
    node: NodeName,
    checker: PermissionChecker,
}

impl PolicyEvaluator {
    pub fn new(node: NodeName, checker: PermissionChecker) -> Self {
        Self { node, checker }
    }

    /// Policy of the node the actor itself is keyed under.
    pub fn for_actor(actor: &Actor, checker: PermissionChecker) -> Self {
        Self::new(actor.node_name.clone(), checker)
    }

    pub fn node(&self) -> &NodeName {
        &self.node
    }

    /// Returns `true` if the actor holds `<node>.admin` for the node it is keyed under.
    ///
    /// Administrators of their own node bypass the rules of every policy, not only the one of
    /// that node.
    pub fn is_admin(&self, actor: &Actor, effective: &EffectivePermissionSet) -> bool {
        let admin = actor.node_name.permission(ADMIN_ACTION);
        self.checker.has(effective, &admin)
    }

    /// Decides if an actor with the given effective permissions may perform an operation.
    ///
    /// `target` is the record operated on. It is ignored for `create` and `list`, when missing
    /// for the other operations only the permission check applies.
    pub fn authorize(
        &self,
        operation: Operation,
        actor: &Actor,
        effective: &EffectivePermissionSet,
        target: Option<&dyn Resource>,
    ) -> bool {
        let verdict =
            self.is_admin(actor, effective) || self.evaluate(operation, actor, effective, target);

        trace!(
            %operation,
            node = %self.node,
            actor = %actor.id,
            verdict,
            "authorization decision"
        );

        verdict
    }

    fn evaluate(
        &self,
        operation: Operation,
        actor: &Actor,
        effective: &EffectivePermissionSet,
        target: Option<&dyn Resource>,
    ) -> bool {
        let permitted = self
            .checker
            .has(effective, &self.node.permission(operation.action()));

        if permitted || !operation.requires_target() {
            return permitted;
        }

        target.is_some_and(|target| {
            target.actor_id() == Some(actor.id) || target.owner() == Some(actor.id)
        })
    }

    pub fn create(&self, actor: &Actor, effective: &EffectivePermissionSet) -> bool {
        self.authorize(Operation::Create, actor, effective, None)
    }

    pub fn list(&self, actor: &Actor, effective: &EffectivePermissionSet) -> bool {
        self.authorize(Operation::List, actor, effective, None)
    }

    pub fn view(
        &self,
        actor: &Actor,
        effective: &EffectivePermissionSet,
        target: &dyn Resource,
    ) -> bool {
        self.authorize(Operation::View, actor, effective, Some(target))
    }

    pub fn edit(
        &self,
        actor: &Actor,
        effective: &EffectivePermissionSet,
        target: &dyn Resource,
    ) -> bool {
        self.authorize(Operation::Edit, actor, effective, Some(target))
    }

    pub fn delete(
        &self,
        actor: &Actor,
        effective: &EffectivePermissionSet,
        target: &dyn Resource,
    ) -> bool {
        self.authorize(Operation::Delete, actor, effective, Some(target))
    }
}
