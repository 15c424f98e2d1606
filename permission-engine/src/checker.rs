// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answers whether an effective permission set holds a permission.
use serde::{Deserialize, Serialize};

use crate::permission::strip_sign;
use crate::resolver::{EffectivePermission, EffectivePermissionSet};

/// How a queried permission is compared against the entries of an effective set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// An entry matches when its stored text ends with the query, ignoring case.
    ///
    /// `"user.admin"` matches the queries `"user.admin"` and `"admin"`, but also any query which
    /// happens to be a suffix of it like `"min"`.
    #[default]
    Suffix,

    /// An entry matches when its bare `node.action` form equals the query, ignoring case and a
    /// sign on the query.
    Exact,
}

/// Checks permissions against an effective permission set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PermissionChecker {
    mode: MatchMode,
}

impl PermissionChecker {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Returns `true` if the first matching entry is granted.
    ///
    /// Entries are visited in the order of the set. An explicit deny on the first match returns
    /// `false`, so does a permission no entry matches.
    pub fn has(&self, effective: &EffectivePermissionSet, permission: &str) -> bool {
        effective
            .iter()
            .find(|entry| self.matches(entry, permission))
            .is_some_and(EffectivePermission::is_granted)
    }

    fn matches(&self, entry: &EffectivePermission, permission: &str) -> bool {
        match self.mode {
            MatchMode::Suffix => entry
                .as_str()
                .to_lowercase()
                .ends_with(&permission.to_lowercase()),
            MatchMode::Exact => entry.bare_form().eq_ignore_ascii_case(strip_sign(permission)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::actor::{Actor, ActorId};
    use crate::group::{Group, GroupId};
    use crate::resolver::resolve;

    use super::{MatchMode, PermissionChecker};

    fn effective(grants: &[&str], overrides: &[&str]) -> crate::EffectivePermissionSet {
        let group = Group::new(GroupId(1), "Student", grants);
        let actor = Actor::new(ActorId(1), "Student").with_overrides(overrides);
        resolve(Some(&group), &actor)
    }

    #[test]
    fn deny_override_revokes_group_grant() {
        let checker = PermissionChecker::default();
        let set = effective(&["survey.read"], &["-survey.read"]);
        assert!(!checker.has(&set, "survey.read"));
    }

    #[test]
    fn grant_override_adds_permission() {
        let checker = PermissionChecker::default();
        let set = effective(&[], &["+user.create"]);
        assert!(checker.has(&set, "user.create"));
        assert!(!checker.has(&set, "user.delete"));
    }

    #[test]
    fn implicit_group_grant_counts() {
        let checker = PermissionChecker::default();
        let set = effective(&["survey.read"], &[]);
        assert!(checker.has(&set, "survey.read"));
    }

    #[rstest]
    #[case::exact_query("user.admin", true)]
    #[case::action_only("admin", true)]
    #[case::case_insensitive("USER.Admin", true)]
    #[case::partial_word("min", true)]
    #[case::signed_query("+user.admin", false)]
    #[case::other_node("survey.admin", false)]
    fn suffix_matching(#[case] query: &str, #[case] expected: bool) {
        let checker = PermissionChecker::new(MatchMode::Suffix);
        let set = effective(&["user.admin"], &[]);
        assert_eq!(checker.has(&set, query), expected);
    }

    #[rstest]
    #[case::exact_query("user.admin", true)]
    #[case::action_only("admin", false)]
    #[case::case_insensitive("USER.Admin", true)]
    #[case::partial_word("min", false)]
    #[case::signed_query("+user.admin", true)]
    #[case::other_node("survey.admin", false)]
    fn exact_matching(#[case] query: &str, #[case] expected: bool) {
        let checker = PermissionChecker::new(MatchMode::Exact);
        let set = effective(&["user.admin"], &[]);
        assert_eq!(checker.has(&set, query), expected);
    }

    #[test]
    fn first_suffix_match_decides() {
        let checker = PermissionChecker::new(MatchMode::Suffix);

        // Both entries end with "read", the first one in the set is denied
        let set = effective(&["news.read", "survey.read"], &["-news.read"]);
        assert!(!checker.has(&set, "read"));
        assert!(checker.has(&set, "survey.read"));

        let set = effective(&["survey.read", "news.read"], &["-news.read"]);
        assert!(checker.has(&set, "read"));
    }

    #[test]
    fn denied_stored_text_still_matches_suffix() {
        let checker = PermissionChecker::new(MatchMode::Suffix);
        let set = effective(&[], &["-survey.list"]);
        assert!(!checker.has(&set, "survey.list"));
        assert!(!checker.has(&set, "-survey.list"));
    }
}
