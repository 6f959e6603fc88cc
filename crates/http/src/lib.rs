//! Warden HTTP module: the thin API layer over the permission engine.
//!
//! Handlers resolve the target object and grantee through the Directory,
//! enforce the owner-or-admin precondition, call the engine, and record an
//! audit event. The engine itself stays policy-free.

pub mod error;
pub mod identity;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{HttpError, Result};
pub use identity::{CurrentUser, HeaderIdentityProvider, IdentityProvider, USER_ID_HEADER};
pub use server::build_router;
pub use state::AppState;
