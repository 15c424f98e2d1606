// SPDX-License-Identifier: MIT OR Apache-2.0

//! Permission strings of the form `[+|-]node.action` and the names they are built from.
use std::fmt::{self, Display};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::catalog::NodeCatalog;

static PERMISSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Unwrap as we checked the regular expression for correctness
    Regex::new(r"^([+-]?)([a-z_]+)\.([a-z_]+)$").unwrap()
});

static NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Unwrap as we checked the regular expression for correctness
    Regex::new(r"^[a-z_]+$").unwrap()
});

/// Returns `true` if the given string is a valid node or action name.
///
/// Names consist of lowercase ASCII letters and underscores only.
pub fn validate_name(value: &str) -> bool {
    NAME_REGEX.is_match(value)
}

/// Error types for parsing permission strings and names.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PermissionStringError {
    /// Text does not follow the `[+|-]node.action` format.
    #[error("invalid permission format '{0}'")]
    InvalidFormat(String),

    /// Node or action name contains characters other than lowercase letters and underscores.
    #[error("invalid node or action name '{0}'")]
    InvalidName(String),
}

/// Errors which occur when permissions are checked before they get persisted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Actor overrides need to carry an explicit sign.
    #[error("permission '{0}' carries no '+' or '-' sign")]
    Unsigned(String),

    /// Permission string could not be parsed.
    #[error(transparent)]
    Format(#[from] PermissionStringError),

    /// Node or action are not part of the node catalog.
    #[error("permission '{0}' is not listed in the node catalog")]
    UnknownPermission(String),

    /// Groups are looked up by name, an empty one can never be matched.
    #[error("group name must not be empty")]
    EmptyGroupName,
}

/// Sign of a permission string.
///
/// Group grants are stored without a sign and count as granted. Actor overrides carry an
/// explicit `+` or `-` which supersedes the group grant for the same `node.action`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    /// Explicitly granted (`+`).
    Grant,

    /// Explicitly denied (`-`).
    Deny,

    /// No sign, granted implicitly by a group.
    Implicit,
}

impl Sign {
    /// Inspects the first character of a stored permission.
    pub fn of(text: &str) -> Self {
        if text.starts_with('+') {
            Sign::Grant
        } else if text.starts_with('-') {
            Sign::Deny
        } else {
            Sign::Implicit
        }
    }

    /// Prefix used in the textual form.
    pub fn prefix(&self) -> &'static str {
        match self {
            Sign::Grant => "+",
            Sign::Deny => "-",
            Sign::Implicit => "",
        }
    }

    /// Everything but an explicit deny counts as granted.
    pub fn is_granted(&self) -> bool {
        !matches!(self, Sign::Deny)
    }

    /// Returns `true` for `+` and `-`, the only signs allowed on actor overrides.
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Sign::Implicit)
    }
}

/// Removes a leading `+` or `-` from a stored permission, if there is one.
pub fn strip_sign(text: &str) -> &str {
    text.strip_prefix(['+', '-']).unwrap_or(text)
}

/// Returns `true` if the stored permission starts with `+` or `-`.
pub fn is_signed(text: &str) -> bool {
    Sign::of(text).is_explicit()
}

/// Parsed `[+|-]node.action` permission.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PermissionString {
    sign: Sign,
    node: String,
    action: String,
}

impl PermissionString {
    /// Parse and check the format of a permission string.
    ///
    /// This does not check if node and action exist, use `is_valid` against a catalog for that.
    pub fn parse(text: &str) -> Result<Self, PermissionStringError> {
        let captures = PERMISSION_REGEX
            .captures(text)
            .ok_or_else(|| PermissionStringError::InvalidFormat(text.to_owned()))?;

        Ok(Self {
            sign: Sign::of(&captures[1]),
            node: captures[2].to_owned(),
            action: captures[3].to_owned(),
        })
    }

    /// Creates an unsigned permission from its parts.
    pub fn new(node: &str, action: &str) -> Result<Self, PermissionStringError> {
        for name in [node, action] {
            if !validate_name(name) {
                return Err(PermissionStringError::InvalidName(name.to_owned()));
            }
        }

        Ok(Self {
            sign: Sign::Implicit,
            node: node.to_owned(),
            action: action.to_owned(),
        })
    }

    /// Returns the same permission with another sign.
    pub fn with_sign(mut self, sign: Sign) -> Self {
        self.sign = sign;
        self
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns `true` if node and action are both listed in the catalog.
    pub fn is_valid(&self, catalog: &NodeCatalog) -> bool {
        catalog.contains(&self.node, &self.action)
    }

    /// `node.action` without sign, used as merge key.
    pub fn bare_form(&self) -> String {
        format!("{}.{}", self.node, self.action)
    }

    /// Textual form including the sign, unsigned permissions render without prefix.
    pub fn signed_form(&self) -> String {
        format!("{}{}.{}", self.sign.prefix(), self.node, self.action)
    }
}

impl FromStr for PermissionString {
    type Err = PermissionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for PermissionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signed_form())
    }
}

impl Serialize for PermissionString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.signed_form())
    }
}

impl<'de> Deserialize<'de> for PermissionString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        PermissionString::parse(&text)
            .map_err(|err| serde::de::Error::custom(format!("invalid permission, {}", err)))
    }
}

/// Checks an actor override before it gets persisted.
///
/// Overrides need an explicit sign, a valid format and a node and action known to the catalog.
pub fn validate_override(
    text: &str,
    catalog: &NodeCatalog,
) -> Result<PermissionString, ValidationError> {
    if !is_signed(text) {
        return Err(ValidationError::Unsigned(text.to_owned()));
    }

    validate_permission(text, catalog)
}

/// Checks format and catalog membership of a permission string, with or without sign.
pub fn validate_permission(
    text: &str,
    catalog: &NodeCatalog,
) -> Result<PermissionString, ValidationError> {
    let permission = PermissionString::parse(text)?;
    if !permission.is_valid(catalog) {
        return Err(ValidationError::UnknownPermission(text.to_owned()));
    }

    Ok(permission)
}

/// Name of the node a resource or policy is keyed under, for example `user` or `survey`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName(String);

impl NodeName {
    /// Construct and validate a node name.
    pub fn new(name: &str) -> Result<Self, PermissionStringError> {
        if !validate_name(name) {
            return Err(PermissionStringError::InvalidName(name.to_owned()));
        }

        Ok(Self(name.to_owned()))
    }

    /// Node of actors themselves.
    pub fn user() -> Self {
        Self("user".to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `node.action` permission on this node.
    pub fn permission(&self, action: &str) -> String {
        format!("{}.{}", self.0, action)
    }
}

impl Default for NodeName {
    fn default() -> Self {
        Self::user()
    }
}

impl FromStr for NodeName {
    type Err = PermissionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NodeName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        NodeName::new(&name)
            .map_err(|err| serde::de::Error::custom(format!("invalid node name, {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::test_utils::catalog;
    use crate::NodeCatalog;

    use super::{
        NodeName, PermissionString, PermissionStringError, Sign, ValidationError, strip_sign,
        validate_override,
    };

    #[rstest]
    #[case("user.read")]
    #[case("+user.read")]
    #[case("-survey.update")]
    #[case("sos_message.list")]
    #[case("_._")]
    #[should_panic]
    #[case("user")]
    #[should_panic]
    #[case("User.read")]
    #[should_panic]
    #[case("user.read.all")]
    #[should_panic]
    #[case("*user.read")]
    #[should_panic]
    #[case("+-user.read")]
    #[should_panic]
    #[case("survey2.read")]
    #[should_panic]
    #[case(" user.read")]
    #[should_panic]
    #[case("")]
    fn parse_canonical_form(#[case] text: &str) {
        assert!(PermissionString::parse(text).is_ok());
    }

    #[rstest]
    #[case("user.read")]
    #[case("+user.read")]
    #[case("-group.admin")]
    fn signed_form_reproduces_input(#[case] text: &str) {
        let permission = PermissionString::parse(text).unwrap();
        assert_eq!(permission.signed_form(), text);
        assert_eq!(permission.to_string(), text);
    }

    #[test]
    fn parts_and_forms() {
        let permission: PermissionString = "-survey.update".parse().unwrap();
        assert_eq!(permission.sign(), Sign::Deny);
        assert_eq!(permission.node(), "survey");
        assert_eq!(permission.action(), "update");
        assert_eq!(permission.bare_form(), "survey.update");

        let granted = permission.with_sign(Sign::Grant);
        assert_eq!(granted.signed_form(), "+survey.update");
    }

    #[test]
    fn invalid_format_error() {
        assert_eq!(
            PermissionString::parse("survey:read"),
            Err(PermissionStringError::InvalidFormat("survey:read".into()))
        );
    }

    #[rstest]
    fn parseable_but_unknown(catalog: NodeCatalog) {
        let known = PermissionString::parse("+survey.read").unwrap();
        assert!(known.is_valid(&catalog));

        let unknown_action = PermissionString::parse("survey.fly").unwrap();
        assert!(!unknown_action.is_valid(&catalog));

        let unknown_node = PermissionString::parse("spaceship.read").unwrap();
        assert!(!unknown_node.is_valid(&catalog));
    }

    #[rstest]
    fn override_validation(catalog: NodeCatalog) {
        assert!(validate_override("+user.create", &catalog).is_ok());
        assert_eq!(
            validate_override("user.create", &catalog),
            Err(ValidationError::Unsigned("user.create".into()))
        );
        assert_eq!(
            validate_override("-user.fly", &catalog),
            Err(ValidationError::UnknownPermission("-user.fly".into()))
        );
        assert!(matches!(
            validate_override("+User", &catalog),
            Err(ValidationError::Format(_))
        ));
    }

    #[test]
    fn signs() {
        assert_eq!(Sign::of("+a.b"), Sign::Grant);
        assert_eq!(Sign::of("-a.b"), Sign::Deny);
        assert_eq!(Sign::of("a.b"), Sign::Implicit);
        assert_eq!(Sign::of(""), Sign::Implicit);
        assert!(Sign::Implicit.is_granted());
        assert!(Sign::Grant.is_granted());
        assert!(!Sign::Deny.is_granted());
        assert_eq!(strip_sign("+a.b"), "a.b");
        assert_eq!(strip_sign("a.b"), "a.b");
        // Only one sign gets removed
        assert_eq!(strip_sign("--a.b"), "-a.b");
    }

    #[test]
    fn node_names() {
        assert_eq!(NodeName::default().as_str(), "user");
        assert_eq!(NodeName::new("survey").unwrap().permission("read"), "survey.read");
        assert!(NodeName::new("Survey").is_err());
        assert!(NodeName::new("").is_err());
    }
}
