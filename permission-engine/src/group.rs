// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::permission::strip_sign;

/// Identifier of a group record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named bundle of base permissions shared by all actors whose profile matches the name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    grants: Vec<String>,
}

impl Group {
    /// Creates a group, signs on the given grants are removed.
    pub fn new<I, P>(id: GroupId, name: &str, grants: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut group = Self {
            id,
            name: name.to_owned(),
            grants: Vec::new(),
        };
        group.set_grants(grants);
        group
    }

    /// Unsigned `node.action` grants in the order they were given.
    pub fn grants(&self) -> &[String] {
        &self.grants
    }

    /// Replaces all grants, signs are removed.
    pub fn set_grants<I, P>(&mut self, grants: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.grants = grants
            .into_iter()
            .map(|grant| strip_sign(grant.as_ref()).to_owned())
            .collect();
    }
}
