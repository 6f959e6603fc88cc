//! The permission engine: grant, revoke, check, list.

use super::store::{GrantStore, InsertOutcome};
use super::types::{AccessGrant, AccessType, GranteeRef};
use crate::directory::{GranteeSummary, Identity, ProtectedObject};
use crate::errors::{Error, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Maintains the grant relation and answers authorization questions
/// against it.
///
/// The engine holds no policy about who may call it; the owner-or-admin
/// precondition on mutations is the API layer's job and is assumed to have
/// been enforced already. Organization scoping likewise happens upstream:
/// both sides of every call arrive here already resolved through the
/// [`Directory`](crate::directory::Directory).
pub struct PermissionEngine {
    store: Arc<dyn GrantStore>,
}

impl PermissionEngine {
    pub fn new(store: Arc<dyn GrantStore>) -> Self {
        Self { store }
    }

    /// Grant `access_type` on `object` to `grantee`, recording `grantor`
    /// for provenance.
    ///
    /// Idempotent: if the tuple already exists the existing grant is
    /// returned unchanged. A uniqueness conflict from the store means a
    /// racing caller committed the same tuple first; the committed row wins
    /// and is returned as success.
    pub async fn grant(
        &self,
        object: &ProtectedObject,
        access_type: AccessType,
        grantee: &GranteeSummary,
        grantor: &Identity,
    ) -> Result<AccessGrant> {
        let object_ref = object.object_ref();
        let grantee_ref = grantee.grantee_ref();

        if let Some(existing) = self
            .store
            .find_grant(&object_ref, access_type, &grantee_ref)
            .await?
        {
            debug!(grant_id = %existing.id, "grant already exists");
            return Ok(existing);
        }

        let grant = AccessGrant {
            id: Uuid::new_v4().to_string(),
            object_type: object.kind,
            object_id: object.id.clone(),
            access_type,
            grantee_type: grantee.kind,
            grantee_id: grantee.id.clone(),
            grantor_id: grantor.user_id.clone(),
            created_at: Utc::now(),
        };

        match self.store.insert_grant(&grant).await? {
            InsertOutcome::Inserted => {
                debug!(grant_id = %grant.id, object = %object_ref, grantee = %grantee_ref, "grant created");
                Ok(grant)
            }
            InsertOutcome::Conflict => self
                .store
                .find_grant(&object_ref, access_type, &grantee_ref)
                .await?
                .ok_or_else(|| {
                    Error::StateError(format!(
                        "grant for {object_ref} / {grantee_ref} vanished after uniqueness conflict"
                    ))
                }),
        }
    }

    /// Remove grants matching object + grantee, all access types when
    /// `access_type` is `None`. Returns the number of rows removed; zero
    /// matches is success, and a second call after success returns 0.
    pub async fn revoke(
        &self,
        object: &ProtectedObject,
        grantee: &GranteeRef,
        access_type: Option<AccessType>,
    ) -> Result<u64> {
        let object_ref = object.object_ref();
        let deleted = self
            .store
            .delete_grants(&object_ref, grantee, access_type)
            .await?;
        debug!(object = %object_ref, grantee = %grantee, deleted, "grants revoked");
        Ok(deleted)
    }

    /// True iff a matching grant row is present for this exact grantee.
    ///
    /// No group expansion happens here: a caller checking a user's access
    /// via groups must call this once per group. Callers with large
    /// memberships may prefer one [`grants_for`](Self::grants_for) fetch
    /// over per-group round trips.
    pub async fn exists(
        &self,
        object: &ProtectedObject,
        access_type: AccessType,
        grantee: &GranteeRef,
    ) -> Result<bool> {
        let found = self
            .store
            .find_grant(&object.object_ref(), access_type, grantee)
            .await?;
        Ok(found.is_some())
    }

    /// All grants for an object in creation order, each resolvable to its
    /// grantee by the caller.
    pub async fn grants_for(&self, object: &ProtectedObject) -> Result<Vec<AccessGrant>> {
        self.store.grants_for_object(&object.object_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::store::mock::MockGrantStore;
    use crate::access::{GranteeKind, ObjectKind};
    use crate::testing::{identity, object, user_summary};
    use mockall::predicate::always;

    fn sample_grant(access_type: AccessType) -> AccessGrant {
        AccessGrant {
            id: "existing-grant".to_string(),
            object_type: ObjectKind::Queries,
            object_id: "q1".to_string(),
            access_type,
            grantee_type: GranteeKind::Users,
            grantee_id: "u2".to_string(),
            grantor_id: "u1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn grant_returns_existing_row_without_inserting() {
        let mut store = MockGrantStore::new();
        let existing = sample_grant(AccessType::Modify);
        let found = existing.clone();
        store
            .expect_find_grant()
            .times(1)
            .returning(move |_, _, _| Ok(Some(found.clone())));
        store.expect_insert_grant().times(0);

        let engine = PermissionEngine::new(Arc::new(store));
        let grant = engine
            .grant(
                &object(ObjectKind::Queries, "q1", "org1"),
                AccessType::Modify,
                &user_summary("u2"),
                &identity("u1", "org1"),
            )
            .await
            .unwrap();

        assert_eq!(grant.id, existing.id);
    }

    #[tokio::test]
    async fn grant_inserts_fresh_row() {
        let mut store = MockGrantStore::new();
        store.expect_find_grant().times(1).returning(|_, _, _| Ok(None));
        store
            .expect_insert_grant()
            .times(1)
            .returning(|_| Ok(InsertOutcome::Inserted));

        let engine = PermissionEngine::new(Arc::new(store));
        let grant = engine
            .grant(
                &object(ObjectKind::Queries, "q1", "org1"),
                AccessType::View,
                &user_summary("u2"),
                &identity("u1", "org1"),
            )
            .await
            .unwrap();

        assert_eq!(grant.object_id, "q1");
        assert_eq!(grant.grantee_id, "u2");
        assert_eq!(grant.grantor_id, "u1");
        assert_eq!(grant.access_type, AccessType::View);
    }

    #[tokio::test]
    async fn uniqueness_conflict_resolves_to_the_committed_row() {
        let mut store = MockGrantStore::new();
        let committed = sample_grant(AccessType::View);
        let refetched = committed.clone();
        let mut calls = 0;
        store.expect_find_grant().times(2).returning(move |_, _, _| {
            calls += 1;
            if calls == 1 {
                Ok(None)
            } else {
                Ok(Some(refetched.clone()))
            }
        });
        store
            .expect_insert_grant()
            .times(1)
            .returning(|_| Ok(InsertOutcome::Conflict));

        let engine = PermissionEngine::new(Arc::new(store));
        let grant = engine
            .grant(
                &object(ObjectKind::Queries, "q1", "org1"),
                AccessType::View,
                &user_summary("u2"),
                &identity("u1", "org1"),
            )
            .await
            .unwrap();

        assert_eq!(grant.id, committed.id);
    }

    #[tokio::test]
    async fn conflict_without_a_row_is_a_state_error() {
        let mut store = MockGrantStore::new();
        store.expect_find_grant().returning(|_, _, _| Ok(None));
        store
            .expect_insert_grant()
            .with(always())
            .returning(|_| Ok(InsertOutcome::Conflict));

        let engine = PermissionEngine::new(Arc::new(store));
        let err = engine
            .grant(
                &object(ObjectKind::Queries, "q1", "org1"),
                AccessType::View,
                &user_summary("u2"),
                &identity("u1", "org1"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StateError(_)));
    }

    #[tokio::test]
    async fn revoke_reports_deleted_count() {
        let mut store = MockGrantStore::new();
        store
            .expect_delete_grants()
            .times(1)
            .returning(|_, _, access| {
                assert_eq!(access, None);
                Ok(2)
            });

        let engine = PermissionEngine::new(Arc::new(store));
        let deleted = engine
            .revoke(
                &object(ObjectKind::Queries, "q1", "org1"),
                &GranteeRef::user("u2"),
                None,
            )
            .await
            .unwrap();

        assert_eq!(deleted, 2);
    }
}
