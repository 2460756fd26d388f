//! Employee record contract: the shared record type, procedure inputs, validation rules,
//! and the error taxonomy every surface reports.

use std::sync::Arc;

use thiserror::Error;

pub mod employee;
pub mod rpc;
pub mod validation;

pub use employee::{
    CreateEmployeeInput, Employee, EmployeeId, HealthStatus, SearchQuery, UpdateEmployeeInput,
};
pub use rpc::{Procedure, ProcedureKind};
pub use validation::{FieldIssue, IssueCode, ValidationErrors};

/// Shared result type for employee operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("employee {id} not found")]
    NotFound { id: i32 },
    #[error("invalid input: {0}")]
    InvalidInput(ValidationErrors),
    #[error("malformed input: {0}")]
    Parse(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::InvalidInput(_) => "BAD_REQUEST",
            ApiError::Parse(_) => "PARSE_ERROR",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::NotFound { .. } => 404,
            ApiError::InvalidInput(_) | ApiError::Parse(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

#[cfg(feature = "graphql")]
mod graphql {
    use async_graphql::{Error, ErrorExtensions};

    use super::ApiError;

    impl ErrorExtensions for ApiError {
        fn extend(&self) -> Error {
            let mut err = Error::new(self.to_string());
            err = err.extend_with(|_err, e| {
                e.set("code", self.code());
            });
            if let ApiError::InvalidInput(errors) = self {
                let fields = errors
                    .issues
                    .iter()
                    .map(|issue| issue.field.clone())
                    .collect::<Vec<_>>();
                err = err.extend_with(|_err, e| {
                    e.set("fields", fields);
                });
            }
            err
        }
    }

    /// Convert any error into a GraphQL error payload while hiding internals.
    pub fn internal_error(err: impl Into<anyhow::Error>) -> Error {
        ApiError::internal(err.into()).extend()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use async_graphql::Value;

        #[test]
        fn internal_errors_are_masked() {
            let err = internal_error(anyhow::anyhow!("boom"));
            assert_eq!(err.message, "internal server error");
            let code = err
                .extensions
                .as_ref()
                .and_then(|map| map.get("code"))
                .cloned();
            assert_eq!(code, Some(Value::from("INTERNAL_SERVER_ERROR")));
        }

        #[test]
        fn not_found_keeps_its_code() {
            let err = ApiError::NotFound { id: 4 }.extend();
            assert_eq!(err.message, "employee 4 not found");
            let code = err
                .extensions
                .as_ref()
                .and_then(|map| map.get("code"))
                .cloned();
            assert_eq!(code, Some(Value::from("NOT_FOUND")));
        }
    }
}

#[cfg(feature = "graphql")]
pub use graphql::internal_error;
