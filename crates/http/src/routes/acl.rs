//! ACL handlers: list, grant, revoke, and check permissions on an object.

use crate::error::{HttpError, Result};
use crate::identity::CurrentUser;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;
use warden_core::{
    AccessType, AuditAction, AuditEvent, Error, GranteeKind, GranteeRef, GranteeSummary, Identity,
    ObjectKind, ProtectedObject,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct GrantRequest {
    pub access_type: String,
    pub grantee_type: String,
    pub grantee_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RevokeRequest {
    /// Omit to revoke every access type for the grantee.
    #[serde(default)]
    pub access_type: Option<String>,
    pub grantee_type: String,
    pub grantee_id: String,
}

/// Grantee as rendered in responses
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GranteeOut {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

impl From<GranteeSummary> for GranteeOut {
    fn from(summary: GranteeSummary) -> Self {
        Self {
            kind: summary.kind.as_str().to_string(),
            id: summary.id,
            name: summary.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GrantResponse {
    pub id: String,
    pub access_type: String,
    pub grantee: GranteeOut,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RevokeResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CheckResponse {
    pub response: bool,
}

/// Resolve the target object within the acting user's organization.
async fn resolve_object(
    state: &AppState,
    user: &Identity,
    object_type: &str,
    object_id: &str,
) -> Result<ProtectedObject> {
    let kind = ObjectKind::from_str(object_type)?;
    state
        .directory
        .resolve_object(kind, object_id, &user.org_id)
        .await?
        .ok_or_else(|| {
            Error::ObjectNotFound {
                kind,
                id: object_id.to_string(),
            }
            .into()
        })
}

/// Resolve the grantee within the acting user's organization.
async fn resolve_grantee(
    state: &AppState,
    user: &Identity,
    grantee_type: &str,
    grantee_id: &str,
) -> Result<GranteeSummary> {
    let kind = GranteeKind::from_str(grantee_type)?;
    state
        .directory
        .resolve_grantee(kind, grantee_id, &user.org_id)
        .await?
        .ok_or_else(|| {
            Error::GranteeNotFound {
                kind,
                id: grantee_id.to_string(),
            }
            .into()
        })
}

/// Mutating ACL calls require the acting user to own the object or to be an
/// admin. Enforced here, before the engine is invoked.
fn require_admin_or_owner(user: &Identity, object: &ProtectedObject) -> Result<()> {
    if user.is_admin || object.owner_id.as_deref() == Some(user.user_id.as_str()) {
        return Ok(());
    }
    Err(HttpError::AuthorizationFailed(
        "Access denied: not the object owner or an admin".to_string(),
    ))
}

async fn record_audit(state: &AppState, event: AuditEvent) {
    // The mutation already committed; a failing recorder must not undo that.
    if let Err(e) = state.audit.record(event).await {
        warn!("Failed to record audit event: {e}");
    }
}

/// List permissions for an object as an access_type → grantees map
#[utoipa::path(
    get,
    path = "/api/{object_type}/{object_id}/acl",
    params(
        ("object_type" = String, Path, description = "Object kind (queries, dashboards, users, groups)"),
        ("object_id" = String, Path, description = "Object id"),
    ),
    responses(
        (status = 200, description = "Permissions grouped by access type"),
        (status = 404, description = "Object not visible to this caller"),
    ),
    tag = "acl"
)]
pub async fn list_acl(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((object_type, object_id)): Path<(String, String)>,
) -> Result<Json<BTreeMap<String, Vec<GranteeOut>>>> {
    let object = resolve_object(&state, &user, &object_type, &object_id).await?;
    let grants = state.engine.grants_for(&object).await?;

    // TODO: resolve grantees in one batched query instead of per grant
    let mut result: BTreeMap<String, Vec<GranteeOut>> = BTreeMap::new();
    for grant in grants {
        let summary = state
            .directory
            .resolve_grantee(grant.grantee_type, &grant.grantee_id, &user.org_id)
            .await?;
        // Grantees deleted since the grant was created are skipped rather
        // than failing the whole listing.
        if let Some(summary) = summary {
            result
                .entry(grant.access_type.as_str().to_string())
                .or_default()
                .push(summary.into());
        }
    }

    Ok(Json(result))
}

/// Grant a permission on an object
#[utoipa::path(
    post,
    path = "/api/{object_type}/{object_id}/acl",
    params(
        ("object_type" = String, Path, description = "Object kind"),
        ("object_id" = String, Path, description = "Object id"),
    ),
    request_body = GrantRequest,
    responses(
        (status = 200, description = "Created or pre-existing grant", body = GrantResponse),
        (status = 400, description = "Unknown access type"),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Object or grantee not visible to this caller"),
    ),
    tag = "acl"
)]
pub async fn grant_acl(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((object_type, object_id)): Path<(String, String)>,
    Json(req): Json<GrantRequest>,
) -> Result<Json<GrantResponse>> {
    let object = resolve_object(&state, &user, &object_type, &object_id).await?;
    require_admin_or_owner(&user, &object)?;

    let access_type = AccessType::from_str(&req.access_type)?;
    let grantee = resolve_grantee(&state, &user, &req.grantee_type, &req.grantee_id).await?;

    let grant = state
        .engine
        .grant(&object, access_type, &grantee, &user)
        .await?;

    record_audit(
        &state,
        AuditEvent {
            action: AuditAction::GrantPermission,
            object_type: object.kind,
            object_id: object.id.clone(),
            access_type: Some(access_type),
            grantee_type: grantee.kind,
            grantee_id: grantee.id.clone(),
            actor_id: user.user_id.clone(),
        },
    )
    .await;

    Ok(Json(GrantResponse {
        id: grant.id,
        access_type: grant.access_type.as_str().to_string(),
        grantee: grantee.into(),
    }))
}

/// Revoke permissions on an object
#[utoipa::path(
    delete,
    path = "/api/{object_type}/{object_id}/acl",
    params(
        ("object_type" = String, Path, description = "Object kind"),
        ("object_id" = String, Path, description = "Object id"),
    ),
    request_body = RevokeRequest,
    responses(
        (status = 200, description = "Number of grants removed; zero is not an error", body = RevokeResponse),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Object or grantee not visible to this caller"),
    ),
    tag = "acl"
)]
pub async fn revoke_acl(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((object_type, object_id)): Path<(String, String)>,
    Json(req): Json<RevokeRequest>,
) -> Result<Json<RevokeResponse>> {
    let object = resolve_object(&state, &user, &object_type, &object_id).await?;
    require_admin_or_owner(&user, &object)?;

    let access_type = req
        .access_type
        .as_deref()
        .map(AccessType::from_str)
        .transpose()?;
    let grantee = resolve_grantee(&state, &user, &req.grantee_type, &req.grantee_id).await?;

    let deleted = state
        .engine
        .revoke(&object, &grantee.grantee_ref(), access_type)
        .await?;

    record_audit(
        &state,
        AuditEvent {
            action: AuditAction::RevokePermission,
            object_type: object.kind,
            object_id: object.id.clone(),
            access_type,
            grantee_type: grantee.kind,
            grantee_id: grantee.id.clone(),
            actor_id: user.user_id.clone(),
        },
    )
    .await;

    Ok(Json(RevokeResponse { deleted }))
}

/// Check whether the acting user holds an access type on an object
#[utoipa::path(
    get,
    path = "/api/{object_type}/{object_id}/acl/{access_type}",
    params(
        ("object_type" = String, Path, description = "Object kind"),
        ("object_id" = String, Path, description = "Object id"),
        ("access_type" = String, Path, description = "Access type to check"),
    ),
    responses(
        (status = 200, description = "True/false, no partial states", body = CheckResponse),
        (status = 400, description = "Unknown access type"),
        (status = 404, description = "Object not visible to this caller"),
    ),
    tag = "acl"
)]
pub async fn check_acl(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((object_type, object_id, access_type)): Path<(String, String, String)>,
) -> Result<Json<CheckResponse>> {
    let object = resolve_object(&state, &user, &object_type, &object_id).await?;
    let access_type = AccessType::from_str(&access_type)?;

    // Direct access first, then one check per group. The engine never
    // expands membership itself.
    let mut has_access = state
        .engine
        .exists(&object, access_type, &GranteeRef::user(user.user_id.as_str()))
        .await?;
    if !has_access {
        for group_id in &user.group_ids {
            if state
                .engine
                .exists(&object, access_type, &GranteeRef::group(group_id.as_str()))
                .await?
            {
                has_access = true;
                break;
            }
        }
    }

    Ok(Json(CheckResponse {
        response: has_access,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::testing::{identity, object};

    #[test]
    fn owner_passes_precondition() {
        let user = identity("u1", "org1");
        let mut obj = object(ObjectKind::Queries, "q1", "org1");
        obj.owner_id = Some("u1".to_string());
        assert!(require_admin_or_owner(&user, &obj).is_ok());
    }

    #[test]
    fn admin_passes_precondition_on_foreign_object() {
        let mut user = identity("admin", "org1");
        user.is_admin = true;
        let mut obj = object(ObjectKind::Queries, "q1", "org1");
        obj.owner_id = Some("someone-else".to_string());
        assert!(require_admin_or_owner(&user, &obj).is_ok());
    }

    #[test]
    fn non_owner_is_rejected() {
        let user = identity("u2", "org1");
        let mut obj = object(ObjectKind::Queries, "q1", "org1");
        obj.owner_id = Some("u1".to_string());
        let err = require_admin_or_owner(&user, &obj).unwrap_err();
        assert!(matches!(err, HttpError::AuthorizationFailed(_)));
    }

    #[test]
    fn ownerless_object_requires_admin() {
        let user = identity("u1", "org1");
        let obj = object(ObjectKind::Groups, "g1", "org1");
        assert!(require_admin_or_owner(&user, &obj).is_err());
    }
}
