//! Shared fixtures for the workspace integration tests.

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use platform_api::CreateEmployeeInput;
use platform_db::{DatabaseSettings, DbPool, connect};

/// A migrated in-memory SQLite database. One connection, since every SQLite memory
/// connection is its own database.
pub async fn sqlite_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::with_url("sqlite::memory:").max_connections(1);
    let pool = connect(&settings).await?;
    Migrator::up(&pool, None).await?;
    Ok(pool)
}

pub fn employee(first_name: &str, email: &str, department: &str) -> CreateEmployeeInput {
    CreateEmployeeInput {
        first_name: first_name.into(),
        last_name: "Tester".into(),
        email: email.into(),
        phone: None,
        department: department.into(),
        position: "Analyst".into(),
        salary: 50_000.0,
    }
}

pub fn ada() -> CreateEmployeeInput {
    CreateEmployeeInput {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@x.com".into(),
        phone: None,
        department: "Engineering".into(),
        position: "Analyst".into(),
        salary: 90_000.0,
    }
}
