//! Audit events recorded by the API layer after successful mutations.
//!
//! The engine never emits these itself; the caller records one after a
//! grant/revoke commits.

use crate::access::{AccessType, GranteeKind, ObjectKind};
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    GrantPermission,
    RevokePermission,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrantPermission => "grant_permission",
            Self::RevokePermission => "revoke_permission",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub object_type: ObjectKind,
    pub object_id: String,
    /// Absent for a revoke across all access types.
    pub access_type: Option<AccessType>,
    pub grantee_type: GranteeKind,
    pub grantee_id: String,
    pub actor_id: String,
}

#[async_trait]
pub trait AuditRecorder: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

/// Recorder that emits structured tracing events.
pub struct TracingAuditRecorder;

#[async_trait]
impl AuditRecorder for TracingAuditRecorder {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        info!(
            action = event.action.as_str(),
            object_type = %event.object_type,
            object_id = %event.object_id,
            access_type = event.access_type.map(|a| a.as_str()),
            grantee_type = %event.grantee_type,
            grantee_id = %event.grantee_id,
            actor_id = %event.actor_id,
            "audit"
        );
        Ok(())
    }
}
