//! Warden core types and the permission engine.
//!
//! The engine maintains one persisted relation of access grants and answers
//! grant/revoke/check/list against it. Storage and entity resolution are
//! abstractions ([`GrantStore`], [`Directory`]) supplied by backend crates.

pub mod access;
pub mod audit;
pub mod directory;
pub mod errors;

#[cfg(any(test, feature = "tests"))]
pub mod testing;

pub use access::{
    AccessGrant, AccessType, GrantStore, GranteeKind, GranteeRef, InsertOutcome, ObjectKind,
    ObjectRef, PermissionEngine,
};
pub use audit::{AuditAction, AuditEvent, AuditRecorder, TracingAuditRecorder};
pub use directory::{Directory, GranteeSummary, Identity, ProtectedObject};
pub use errors::{Error, Result};
