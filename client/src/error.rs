//! Client error types

use platform_api::{ValidationErrors, rpc::RpcFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the input; `issues` names every failing field.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("{code}: {message}")]
    Server { code: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn validation_issues(&self) -> Option<&ValidationErrors> {
        match self {
            ClientError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<RpcFailure> for ClientError {
    fn from(failure: RpcFailure) -> Self {
        let shape = failure.error;
        match shape.code.as_str() {
            "NOT_FOUND" => ClientError::NotFound(shape.message),
            "BAD_REQUEST" if !shape.data.issues.is_empty() => {
                ClientError::Validation(ValidationErrors {
                    issues: shape.data.issues,
                })
            }
            _ => ClientError::Server {
                code: shape.code,
                message: shape.message,
            },
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
