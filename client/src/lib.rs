//! Staffdesk terminal client: a typed RPC client plus the state and rendering of the
//! employee table UI.

pub mod app;
pub mod cache;
pub mod error;
pub mod form;
pub mod rpc;
pub mod ui;

pub use app::{App, Effect, Outcome};
pub use cache::{QueryCache, QueryKey};
pub use error::{ClientError, ClientResult};
pub use form::EmployeeForm;
pub use rpc::{DEFAULT_URL, RpcClient};
