pub mod engine;
pub mod store;
pub mod types;

pub use engine::PermissionEngine;
pub use store::{GrantStore, InsertOutcome};
pub use types::{AccessGrant, AccessType, GranteeKind, GranteeRef, ObjectKind, ObjectRef};
