use crate::access::{GranteeKind, ObjectKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown access type: {0}")]
    InvalidAccessType(String),

    #[error("Unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("Unknown grantee type: {0}")]
    UnknownGranteeType(String),

    #[error("{kind} {id} not found")]
    ObjectNotFound { kind: ObjectKind, id: String },

    #[error("{kind} {id} not found")]
    GranteeNotFound { kind: GranteeKind, id: String },

    #[error("State backend error: {0}")]
    StateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
