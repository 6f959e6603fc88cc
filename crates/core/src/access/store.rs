//! Storage contract for the grant relation.

use super::types::{AccessGrant, AccessType, GranteeRef, ObjectRef};
use crate::errors::Result;
use async_trait::async_trait;

/// Result of attempting to persist a grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written.
    Inserted,
    /// The storage uniqueness constraint rejected the write; an identical
    /// tuple already exists (possibly committed by a racing caller).
    Conflict,
}

/// Persistence for [`AccessGrant`] rows.
///
/// Implementations must enforce the tuple uniqueness invariant with a
/// storage-level constraint and report violations as
/// [`InsertOutcome::Conflict`] rather than an error, so the engine can treat
/// them as the idempotent success path.
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn insert_grant(&self, grant: &AccessGrant) -> Result<InsertOutcome>;

    async fn find_grant(
        &self,
        object: &ObjectRef,
        access_type: AccessType,
        grantee: &GranteeRef,
    ) -> Result<Option<AccessGrant>>;

    /// Delete every grant matching object + grantee, restricted to one
    /// access type when given. Returns the number of rows removed.
    async fn delete_grants(
        &self,
        object: &ObjectRef,
        grantee: &GranteeRef,
        access_type: Option<AccessType>,
    ) -> Result<u64>;

    /// All grants for an object, in creation order.
    async fn grants_for_object(&self, object: &ObjectRef) -> Result<Vec<AccessGrant>>;
}
