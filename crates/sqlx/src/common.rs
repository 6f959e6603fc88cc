//! Row types and conversions shared between database implementations.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use warden_core::{
    AccessGrant, AccessType, Error, GranteeKind, GranteeSummary, Identity, ObjectKind,
    ProtectedObject, Result,
};

// Helper functions for timestamp conversion
pub fn datetime_to_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn string_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::StateError(format!("Invalid timestamp format: {e}")))
}

#[derive(FromRow)]
pub struct GrantRow {
    pub id: String,
    pub object_type: String,
    pub object_id: String,
    pub access_type: String,
    pub grantee_type: String,
    pub grantee_id: String,
    pub grantor_id: String,
    pub created_at: String, // ISO8601 format
}

impl TryFrom<GrantRow> for AccessGrant {
    type Error = Error;

    fn try_from(row: GrantRow) -> Result<AccessGrant> {
        // Stored discriminators come from our own enums; a parse failure
        // here means a corrupt row, not caller input.
        let object_type = ObjectKind::from_str(&row.object_type)
            .map_err(|_| Error::StateError(format!("Corrupt object_type: {}", row.object_type)))?;
        let access_type = AccessType::from_str(&row.access_type)
            .map_err(|_| Error::StateError(format!("Corrupt access_type: {}", row.access_type)))?;
        let grantee_type = GranteeKind::from_str(&row.grantee_type).map_err(|_| {
            Error::StateError(format!("Corrupt grantee_type: {}", row.grantee_type))
        })?;

        Ok(AccessGrant {
            id: row.id,
            object_type,
            object_id: row.object_id,
            access_type,
            grantee_type,
            grantee_id: row.grantee_id,
            grantor_id: row.grantor_id,
            created_at: string_to_datetime(&row.created_at)?,
        })
    }
}

#[derive(FromRow)]
pub struct UserRow {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub is_admin: i32,       // SQLite uses INTEGER for boolean
    pub group_ids: String,   // JSON array of group ids
}

impl UserRow {
    pub fn into_identity(self) -> Result<Identity> {
        let group_ids: Vec<String> = serde_json::from_str(&self.group_ids)
            .map_err(|e| Error::StateError(format!("Invalid group_ids for {}: {e}", self.id)))?;
        Ok(Identity {
            user_id: self.id,
            org_id: self.org_id,
            name: self.name,
            is_admin: self.is_admin != 0,
            group_ids,
        })
    }
}

/// (id, name) projection used for grantees and for user/group objects.
#[derive(FromRow)]
pub struct NamedRow {
    pub id: String,
    pub name: String,
}

impl NamedRow {
    pub fn into_grantee(self, kind: GranteeKind) -> GranteeSummary {
        GranteeSummary {
            kind,
            id: self.id,
            name: self.name,
        }
    }
}

/// (id, owner) projection used for owned objects (queries, dashboards).
#[derive(FromRow)]
pub struct OwnedRow {
    pub id: String,
    pub user_id: String,
}

impl OwnedRow {
    pub fn into_object(self, kind: ObjectKind, org_id: &str) -> ProtectedObject {
        ProtectedObject {
            kind,
            id: self.id,
            org_id: org_id.to_string(),
            owner_id: Some(self.user_id),
        }
    }
}
