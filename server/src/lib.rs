//! Staffdesk server: employee procedures over HTTP RPC and GraphQL.

pub mod config;
pub mod graphql;
pub mod http;
pub mod rpc;
pub mod seed;
pub mod service;

pub use config::{AppConfig, Environment};
pub use http::{AppState, ServeConfig, build_router, serve, serve_on};
pub use service::EmployeeService;
