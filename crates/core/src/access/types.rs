//! The persisted grant relation and the references it is keyed by.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// A named capability from the closed per-deployment set.
///
/// Access is discrete, not scalar: a grantee either holds an access type on
/// an object or does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    View,
    Modify,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Modify => "modify",
        }
    }
}

impl FromStr for AccessType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "view" => Ok(Self::View),
            "modify" => Ok(Self::Modify),
            other => Err(Error::InvalidAccessType(other.to_string())),
        }
    }
}

impl Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of entity a grant can protect.
///
/// Wire names match the API path segments ("queries", "dashboards", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Queries,
    Dashboards,
    Users,
    Groups,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queries => "queries",
            Self::Dashboards => "dashboards",
            Self::Users => "users",
            Self::Groups => "groups",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queries" => Ok(Self::Queries),
            "dashboards" => Ok(Self::Dashboards),
            "users" => Ok(Self::Users),
            "groups" => Ok(Self::Groups),
            other => Err(Error::UnknownObjectType(other.to_string())),
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of entity a grant can be held by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GranteeKind {
    Users,
    Groups,
}

impl GranteeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Groups => "groups",
        }
    }
}

impl FromStr for GranteeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "users" => Ok(Self::Users),
            "groups" => Ok(Self::Groups),
            other => Err(Error::UnknownGranteeType(other.to_string())),
        }
    }
}

impl Display for GranteeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Polymorphic reference to a protected object.
///
/// There is no foreign key behind this pair; the heterogeneous object tables
/// are only reachable through the [`Directory`](crate::directory::Directory).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub id: String,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Polymorphic reference to a grantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GranteeRef {
    pub kind: GranteeKind,
    pub id: String,
}

impl GranteeRef {
    pub fn new(kind: GranteeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::new(GranteeKind::Users, id)
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(GranteeKind::Groups, id)
    }
}

impl Display for GranteeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// A persisted (object, access_type, grantee) authorization record.
///
/// Immutable once created; changing access means revoke plus grant. The
/// tuple (object_type, object_id, access_type, grantee_type, grantee_id) is
/// unique in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub id: String,
    pub object_type: ObjectKind,
    pub object_id: String,
    pub access_type: AccessType,
    pub grantee_type: GranteeKind,
    pub grantee_id: String,
    /// The user who created the grant. Provenance only, never an
    /// authorization input.
    pub grantor_id: String,
    pub created_at: DateTime<Utc>,
}

impl AccessGrant {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_type, self.object_id.clone())
    }

    pub fn grantee_ref(&self) -> GranteeRef {
        GranteeRef::new(self.grantee_type, self.grantee_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_type_round_trips_through_wire_names() {
        assert_eq!("view".parse::<AccessType>().unwrap(), AccessType::View);
        assert_eq!("modify".parse::<AccessType>().unwrap(), AccessType::Modify);
        assert_eq!(AccessType::Modify.as_str(), "modify");
    }

    #[test]
    fn unknown_access_type_is_rejected() {
        match "execute".parse::<AccessType>() {
            Err(Error::InvalidAccessType(name)) => assert_eq!(name, "execute"),
            other => panic!("expected InvalidAccessType, got {other:?}"),
        }
    }

    #[test]
    fn object_kind_covers_all_path_segments() {
        for name in ["queries", "dashboards", "users", "groups"] {
            let kind: ObjectKind = name.parse().unwrap();
            assert_eq!(kind.as_str(), name);
        }
        assert!("alerts".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn grantee_kind_is_a_subset_of_object_kind() {
        assert!("queries".parse::<GranteeKind>().is_err());
        assert_eq!("groups".parse::<GranteeKind>().unwrap(), GranteeKind::Groups);
    }
}
