// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::permission::{NodeName, ValidationError, is_signed};

/// Identifier of an actor record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Someone who performs actions, for example a registered user.
///
/// The profile selects the group supplying the actor's base grants, the overrides are personal
/// `+`/`-` permissions superseding them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActorRecord")]
pub struct Actor {
    pub id: ActorId,
    pub profile: String,
    overrides: Vec<String>,
    pub owner: Option<ActorId>,
    pub node_name: NodeName,
}

impl Actor {
    /// Creates an actor without overrides or owner, keyed under the `user` node.
    pub fn new(id: ActorId, profile: &str) -> Self {
        Self {
            id,
            profile: profile.to_owned(),
            overrides: Vec::new(),
            owner: None,
            node_name: NodeName::user(),
        }
    }

    pub fn with_overrides<I, P>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.set_overrides(overrides);
        self
    }

    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_node_name(mut self, node_name: NodeName) -> Self {
        self.node_name = node_name;
        self
    }

    /// Personal overrides, all of them start with `+` or `-`.
    pub fn overrides(&self) -> &[String] {
        &self.overrides
    }

    /// Replaces the overrides. Entries without a sign are left out.
    pub fn set_overrides<I, P>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.overrides = overrides
            .into_iter()
            .filter(|permission| is_signed(permission.as_ref()))
            .map(|permission| permission.as_ref().to_owned())
            .collect();
    }
}

/// Stored form of an actor, checked before it becomes an `Actor`.
#[derive(Debug, Deserialize)]
struct ActorRecord {
    id: ActorId,
    profile: String,
    #[serde(default)]
    overrides: Vec<String>,
    #[serde(default)]
    owner: Option<ActorId>,
    #[serde(default)]
    node_name: NodeName,
}

impl TryFrom<ActorRecord> for Actor {
    type Error = ValidationError;

    fn try_from(record: ActorRecord) -> Result<Self, Self::Error> {
        if let Some(unsigned) = record.overrides.iter().find(|permission| !is_signed(permission)) {
            return Err(ValidationError::Unsigned(unsigned.to_owned()));
        }

        Ok(Self {
            id: record.id,
            profile: record.profile,
            overrides: record.overrides,
            owner: record.owner,
            node_name: record.node_name,
        })
    }
}
