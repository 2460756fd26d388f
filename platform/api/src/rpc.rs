//! Procedure names and the JSON envelope used on the `/trpc` endpoint.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ApiError, validation::FieldIssue};

pub const RPC_PREFIX: &str = "/trpc";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Procedure {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
    Search,
}

impl Procedure {
    pub const ALL: [Procedure; 6] = [
        Procedure::GetAll,
        Procedure::GetById,
        Procedure::Create,
        Procedure::Update,
        Procedure::Delete,
        Procedure::Search,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Procedure::GetAll => "employee.getAll",
            Procedure::GetById => "employee.getById",
            Procedure::Create => "employee.create",
            Procedure::Update => "employee.update",
            Procedure::Delete => "employee.delete",
            Procedure::Search => "employee.search",
        }
    }

    pub fn kind(self) -> ProcedureKind {
        match self {
            Procedure::GetAll | Procedure::GetById | Procedure::Search => ProcedureKind::Query,
            Procedure::Create | Procedure::Update | Procedure::Delete => ProcedureKind::Mutation,
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProcedure(pub String);

impl fmt::Display for UnknownProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no procedure found on path \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownProcedure {}

impl FromStr for Procedure {
    type Err = UnknownProcedure;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Procedure::ALL
            .into_iter()
            .find(|procedure| procedure.path() == path)
            .ok_or_else(|| UnknownProcedure(path.to_string()))
    }
}

/// `{"result":{"data": ...}}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcSuccess<T> {
    pub result: RpcData<T>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcData<T> {
    pub data: T,
}

impl<T> RpcSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            result: RpcData { data },
        }
    }
}

/// `{"error":{"message": ..., "code": ..., "data": {...}}}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcFailure {
    pub error: RpcErrorShape,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcErrorShape {
    pub message: String,
    pub code: String,
    pub data: RpcErrorData,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcErrorData {
    pub http_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl RpcFailure {
    pub fn new(
        code: &str,
        http_status: u16,
        message: impl Into<String>,
        path: Option<&str>,
    ) -> Self {
        Self {
            error: RpcErrorShape {
                message: message.into(),
                code: code.to_string(),
                data: RpcErrorData {
                    http_status,
                    path: path.map(str::to_string),
                    issues: Vec::new(),
                },
            },
        }
    }

    pub fn from_api_error(err: &ApiError, path: Option<&str>) -> Self {
        let mut failure = Self::new(err.code(), err.http_status(), err.to_string(), path);
        if let ApiError::InvalidInput(errors) = err {
            failure.error.data.issues = errors.issues.clone();
        }
        failure
    }
}
