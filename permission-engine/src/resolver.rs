// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merges the base grants of a group with the personal overrides of an actor.
use std::collections::HashMap;

use serde::{Serialize, Serializer};
use tracing::{trace, warn};

use crate::actor::Actor;
use crate::group::Group;
use crate::permission::{PermissionString, Sign, strip_sign};

/// Entry of an effective permission set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectivePermission {
    sign: Sign,
    text: String,
}

impl EffectivePermission {
    fn new(text: &str) -> Self {
        Self {
            sign: Sign::of(text),
            text: text.to_owned(),
        }
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// Stored text, including the sign of overrides.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Text without sign, the key this entry is merged under.
    pub fn bare_form(&self) -> &str {
        strip_sign(&self.text)
    }

    pub fn is_granted(&self) -> bool {
        self.sign.is_granted()
    }
}

/// Permissions of an actor after applying their overrides on top of their group's grants.
///
/// Entries are keyed by their bare `node.action` form. They keep the position at which their
/// key was first inserted: group grants in list order, followed by overrides for keys the group
/// did not grant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectivePermissionSet {
    entries: Vec<EffectivePermission>,
    index: HashMap<String, usize>,
}

impl EffectivePermissionSet {
    /// Inserts an entry, replacing any entry with the same bare form in place.
    fn insert(&mut self, permission: EffectivePermission) -> Option<EffectivePermission> {
        let position = self.index.get(permission.bare_form()).copied();
        match position {
            Some(position) => Some(std::mem::replace(&mut self.entries[position], permission)),
            None => {
                self.index
                    .insert(permission.bare_form().to_owned(), self.entries.len());
                self.entries.push(permission);
                None
            }
        }
    }

    /// Entry stored under the bare `node.action` key.
    pub fn get(&self, bare_form: &str) -> Option<&EffectivePermission> {
        self.index
            .get(bare_form)
            .map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectivePermission> {
        self.entries.iter()
    }

    /// Stored texts of all entries, signed overrides and unsigned group grants mixed.
    pub fn values(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.as_str().to_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for EffectivePermissionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.entries.iter().map(EffectivePermission::as_str))
    }
}

/// Computes the effective permission set of an actor.
///
/// A missing group results in a set built from the actor's overrides only. Overrides without a
/// sign are skipped. When an actor holds several overrides for the same key the last one wins.
pub fn resolve(group: Option<&Group>, actor: &Actor) -> EffectivePermissionSet {
    let mut effective = EffectivePermissionSet::default();

    if let Some(group) = group {
        for grant in group.grants() {
            // Grants are unsigned already, strip anyway in case a record was written by hand.
            effective.insert(EffectivePermission::new(strip_sign(grant)));
        }
    }

    for text in actor.overrides() {
        if !Sign::of(text).is_explicit() {
            continue;
        }

        if PermissionString::parse(text).is_err() {
            warn!(
                actor = %actor.id,
                permission = %text,
                "keeping malformed override as opaque entry"
            );
        }

        if let Some(replaced) = effective.insert(EffectivePermission::new(text)) {
            trace!(
                actor = %actor.id,
                replaced = replaced.as_str(),
                by = %text,
                "override supersedes permission"
            );
        }
    }

    effective
}
