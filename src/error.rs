use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of an [`AuthError`], used by callers to decide
/// how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    Mapping,
    Caller,
    Protocol,
    Remote,
    Idempotent,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthError {
    #[error("no usable policy engine server address")]
    NoServerAddress,

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("not enough layer")]
    NotEnoughLayer,

    #[error("convert layer {layer} to policy resource type failed: {reason}")]
    LayerConversion { layer: String, reason: String },

    #[error("unknown {vocabulary} code: {code}")]
    UnknownCode { vocabulary: String, code: String },

    #[error("resource type {0} is missing from the capability catalogue")]
    MissingCapability(String),

    #[error("resource type {0} lives in a business scope, but no business id was supplied")]
    MissingScope(String),

    #[error("resource id can't be empty, resource: {0}")]
    EmptyResourceId(String),

    #[error("expect {expected} result, policy engine returns {actual} result")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("result {index} does not match request: requested {requested}, returned {returned}")]
    ResultIdentityMismatch {
        index: usize,
        requested: String,
        returned: String,
    },

    #[error("malformed policy engine response: {0}")]
    MalformedResponse(String),

    #[error("policy engine request failed: {0}")]
    Transport(String),

    #[error("request id: {request_id}, error code: {code}, message: {message}")]
    Remote {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("Duplicated Item")]
    Duplicated,

    #[error("Not Found")]
    NotFound,
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::NoServerAddress | AuthError::Configuration(_) => ErrorKind::Configuration,
            AuthError::UnsupportedResourceType(_)
            | AuthError::UnsupportedAction(_)
            | AuthError::NotEnoughLayer
            | AuthError::LayerConversion { .. }
            | AuthError::UnknownCode { .. }
            | AuthError::MissingCapability(_) => ErrorKind::Mapping,
            AuthError::MissingScope(_) | AuthError::EmptyResourceId(_) => ErrorKind::Caller,
            AuthError::ResultCountMismatch { .. }
            | AuthError::ResultIdentityMismatch { .. }
            | AuthError::MalformedResponse(_) => ErrorKind::Protocol,
            AuthError::Transport(_) | AuthError::Remote { .. } => ErrorKind::Remote,
            AuthError::Duplicated | AuthError::NotFound => ErrorKind::Idempotent,
        }
    }

    /// Duplicate and not-found outcomes are success from the caller's side
    /// of register and deregister.
    pub fn is_idempotent(&self) -> bool {
        self.kind() == ErrorKind::Idempotent
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::MalformedResponse(err.to_string())
    }
}
