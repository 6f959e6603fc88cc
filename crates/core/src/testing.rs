//! In-memory fixtures for tests of this crate and its consumers.

use crate::access::{
    AccessGrant, AccessType, GrantStore, GranteeKind, GranteeRef, InsertOutcome, ObjectKind,
    ObjectRef,
};
use crate::directory::{Directory, GranteeSummary, Identity, ProtectedObject};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn identity(user_id: &str, org_id: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        org_id: org_id.to_string(),
        name: user_id.to_string(),
        is_admin: false,
        group_ids: Vec::new(),
    }
}

pub fn object(kind: ObjectKind, id: &str, org_id: &str) -> ProtectedObject {
    ProtectedObject {
        kind,
        id: id.to_string(),
        org_id: org_id.to_string(),
        owner_id: None,
    }
}

pub fn user_summary(id: &str) -> GranteeSummary {
    GranteeSummary {
        kind: GranteeKind::Users,
        id: id.to_string(),
        name: id.to_string(),
    }
}

pub fn group_summary(id: &str) -> GranteeSummary {
    GranteeSummary {
        kind: GranteeKind::Groups,
        id: id.to_string(),
        name: id.to_string(),
    }
}

/// Grant store over a `Vec`, enforcing the tuple uniqueness invariant the
/// way a database unique index would.
#[derive(Default)]
pub struct MemoryGrantStore {
    grants: Mutex<Vec<AccessGrant>>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_tuple(
    grant: &AccessGrant,
    object: &ObjectRef,
    access_type: AccessType,
    grantee: &GranteeRef,
) -> bool {
    grant.object_type == object.kind
        && grant.object_id == object.id
        && grant.access_type == access_type
        && grant.grantee_type == grantee.kind
        && grant.grantee_id == grantee.id
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    async fn insert_grant(&self, grant: &AccessGrant) -> Result<InsertOutcome> {
        let mut grants = self.grants.lock().unwrap();
        let duplicate = grants.iter().any(|g| {
            matches_tuple(
                g,
                &grant.object_ref(),
                grant.access_type,
                &grant.grantee_ref(),
            )
        });
        if duplicate {
            return Ok(InsertOutcome::Conflict);
        }
        grants.push(grant.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_grant(
        &self,
        object: &ObjectRef,
        access_type: AccessType,
        grantee: &GranteeRef,
    ) -> Result<Option<AccessGrant>> {
        let grants = self.grants.lock().unwrap();
        Ok(grants
            .iter()
            .find(|g| matches_tuple(g, object, access_type, grantee))
            .cloned())
    }

    async fn delete_grants(
        &self,
        object: &ObjectRef,
        grantee: &GranteeRef,
        access_type: Option<AccessType>,
    ) -> Result<u64> {
        let mut grants = self.grants.lock().unwrap();
        let before = grants.len();
        grants.retain(|g| {
            !(g.object_type == object.kind
                && g.object_id == object.id
                && g.grantee_type == grantee.kind
                && g.grantee_id == grantee.id
                && access_type.map_or(true, |a| g.access_type == a))
        });
        Ok((before - grants.len()) as u64)
    }

    async fn grants_for_object(&self, object: &ObjectRef) -> Result<Vec<AccessGrant>> {
        let grants = self.grants.lock().unwrap();
        Ok(grants
            .iter()
            .filter(|g| g.object_type == object.kind && g.object_id == object.id)
            .cloned()
            .collect())
    }
}

/// Directory over in-memory maps, keyed by (kind, id). Resolution misses
/// when the stored organization differs, matching the fail-closed contract.
#[derive(Default)]
pub struct MemoryDirectory {
    objects: Mutex<HashMap<(ObjectKind, String), ProtectedObject>>,
    grantees: Mutex<HashMap<(GranteeKind, String), (String, GranteeSummary)>>,
    identities: Mutex<HashMap<String, Identity>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&self, object: ProtectedObject) {
        self.objects
            .lock()
            .unwrap()
            .insert((object.kind, object.id.clone()), object);
    }

    pub fn add_grantee(&self, org_id: &str, summary: GranteeSummary) {
        self.grantees.lock().unwrap().insert(
            (summary.kind, summary.id.clone()),
            (org_id.to_string(), summary),
        );
    }

    pub fn add_identity(&self, identity: Identity) {
        self.identities
            .lock()
            .unwrap()
            .insert(identity.user_id.clone(), identity);
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn resolve_object(
        &self,
        kind: ObjectKind,
        id: &str,
        org_id: &str,
    ) -> Result<Option<ProtectedObject>> {
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .get(&(kind, id.to_string()))
            .filter(|o| o.org_id == org_id)
            .cloned())
    }

    async fn resolve_grantee(
        &self,
        kind: GranteeKind,
        id: &str,
        org_id: &str,
    ) -> Result<Option<GranteeSummary>> {
        let grantees = self.grantees.lock().unwrap();
        Ok(grantees
            .get(&(kind, id.to_string()))
            .filter(|(org, _)| org == org_id)
            .map(|(_, summary)| summary.clone()))
    }

    async fn load_identity(&self, user_id: &str) -> Result<Option<Identity>> {
        Ok(self.identities.lock().unwrap().get(user_id).cloned())
    }
}
