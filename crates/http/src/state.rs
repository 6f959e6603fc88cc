//! Application state management

use crate::identity::IdentityProvider;
use std::sync::Arc;
use warden_core::{AuditRecorder, Directory, GrantStore, PermissionEngine, TracingAuditRecorder};

/// Shared application state
///
/// Holds the engine plus its external collaborators: the Directory for
/// organization-scoped entity resolution, the audit recorder invoked after
/// successful mutations, and the identity provider.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PermissionEngine>,
    pub directory: Arc<dyn Directory>,
    pub audit: Arc<dyn AuditRecorder>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn GrantStore>,
        directory: Arc<dyn Directory>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            engine: Arc::new(PermissionEngine::new(store)),
            directory,
            audit: Arc::new(TracingAuditRecorder),
            identity,
        }
    }

    /// Replace the default tracing audit recorder
    pub fn with_audit(mut self, audit: Arc<dyn AuditRecorder>) -> Self {
        self.audit = audit;
        self
    }
}
