//! Entity resolution, supplied by the host application.
//!
//! Every object and grantee belongs to exactly one organization. The engine
//! never crosses that boundary: callers resolve both sides of a grant here,
//! scoped to the acting user's organization, before invoking any engine
//! operation. A miss is indistinguishable from a row that exists in another
//! organization.

use crate::access::{GranteeKind, GranteeRef, ObjectKind, ObjectRef};
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A protected object resolved within one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedObject {
    pub kind: ObjectKind,
    pub id: String,
    pub org_id: String,
    /// Owning user, when the object kind has one. Input to the caller-side
    /// owner-or-admin precondition, not to the engine.
    pub owner_id: Option<String>,
}

impl ProtectedObject {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.kind, self.id.clone())
    }
}

/// A grantee resolved within one organization, carrying enough to render
/// permission listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeSummary {
    pub kind: GranteeKind,
    pub id: String,
    pub name: String,
}

impl GranteeSummary {
    pub fn grantee_ref(&self) -> GranteeRef {
        GranteeRef::new(self.kind, self.id.clone())
    }
}

/// The acting user, as established by the host's authentication layer.
///
/// Group membership is consumed here, never computed by the engine: the
/// check operation fans out over `group_ids` explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub org_id: String,
    pub name: String,
    pub is_admin: bool,
    pub group_ids: Vec<String>,
}

/// Resolves type-name + id + organization to an entity.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve a protected object by id within an organization.
    async fn resolve_object(
        &self,
        kind: ObjectKind,
        id: &str,
        org_id: &str,
    ) -> Result<Option<ProtectedObject>>;

    /// Resolve a grantee (user or group) by id within an organization.
    async fn resolve_grantee(
        &self,
        kind: GranteeKind,
        id: &str,
        org_id: &str,
    ) -> Result<Option<GranteeSummary>>;

    /// Load the acting user's identity, including organization and group
    /// membership. Not organization-scoped: the identity is what defines
    /// the caller's organization in the first place.
    async fn load_identity(&self, user_id: &str) -> Result<Option<Identity>>;
}
