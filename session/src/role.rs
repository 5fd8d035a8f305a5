//! Authorization roles and primary-role resolution.
//!
//! DESIGN
//! ======
//! Role strings are validated where rows leave the role store. Anything outside
//! the closed set becomes [`Role::Unknown`] so it stays visible in the
//! [`RoleSet`] without ever winning primary-role resolution.

#[cfg(test)]
#[path = "role_test.rs"]
mod role_test;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An authorization capability grouping assigned to an identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    BranchAdmin,
    Teacher,
    Sales,
    Support,
    Student,
    /// A role string the site does not recognize.
    Unknown(String),
}

/// Fixed resolution order for [`RoleSet::primary`]. Earlier entries win.
pub const PRIORITY: [Role; 6] =
    [Role::Admin, Role::BranchAdmin, Role::Teacher, Role::Sales, Role::Support, Role::Student];

impl Role {
    /// Parse a role-store value. Never fails; unrecognized values map to `Unknown`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "admin" => Self::Admin,
            "branch_admin" => Self::BranchAdmin,
            "teacher" => Self::Teacher,
            "sales" => Self::Sales,
            "support" => Self::Support,
            "student" => Self::Student,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Wire name as stored in the role table.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::BranchAdmin => "branch_admin",
            Self::Teacher => "teacher",
            Self::Sales => "sales",
            Self::Support => "support",
            Self::Student => "student",
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable label for badges and headings.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Admin => "Administrator",
            Self::BranchAdmin => "Branch Admin",
            Self::Teacher => "Teacher",
            Self::Sales => "Sales",
            Self::Support => "Support",
            Self::Student => "Student",
            Self::Unknown(raw) => raw,
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the role table, as returned by the role store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRow {
    pub role: String,
}

/// All roles currently resolved for the active identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    roles: BTreeSet<Role>,
}

impl RoleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from role-store rows, validating each value.
    #[must_use]
    pub fn from_rows(rows: &[RoleRow]) -> Self {
        rows.iter().map(|row| Role::parse(&row.role)).collect()
    }

    #[must_use]
    pub fn contains(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    /// Roles that did not match the closed set.
    pub fn unknown(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter().filter(|role| !role.is_known())
    }

    /// First role in [`PRIORITY`] order that this set contains.
    ///
    /// Returns `None` for an empty set and for a set holding only unknown roles.
    #[must_use]
    pub fn primary(&self) -> Option<&Role> {
        PRIORITY.iter().find_map(|candidate| self.roles.get(candidate))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self { roles: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a RoleSet {
    type Item = &'a Role;
    type IntoIter = std::collections::btree_set::Iter<'a, Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.roles.iter()
    }
}
