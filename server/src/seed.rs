use std::collections::HashSet;

use platform_api::{ApiResult, CreateEmployeeInput};
use tracing::info;

use crate::service::EmployeeService;

fn demo(
    first_name: &str,
    last_name: &str,
    email: &str,
    department: &str,
    position: &str,
    salary: f64,
) -> CreateEmployeeInput {
    CreateEmployeeInput {
        first_name: first_name.into(),
        last_name: last_name.into(),
        email: email.into(),
        phone: None,
        department: department.into(),
        position: position.into(),
        salary,
    }
}

pub fn demo_employees() -> Vec<CreateEmployeeInput> {
    vec![
        demo("Ada", "Lovelace", "ada@staffdesk.dev", "Engineering", "Analyst", 90_000.0),
        demo(
            "Grace",
            "Hopper",
            "grace@staffdesk.dev",
            "Engineering",
            "Compiler Lead",
            125_000.0,
        ),
        demo(
            "Katherine",
            "Johnson",
            "katherine@staffdesk.dev",
            "Research",
            "Mathematician",
            110_000.0,
        ),
        demo("Alan", "Turing", "alan@staffdesk.dev", "Research", "Cryptanalyst", 105_000.0),
        demo(
            "Margaret",
            "Hamilton",
            "margaret@staffdesk.dev",
            "Operations",
            "Flight Software Director",
            130_000.0,
        ),
    ]
}

/// Inserts the demo employees whose emails are not taken yet. Returns how many were added.
pub async fn seed_demo(service: &EmployeeService) -> ApiResult<usize> {
    let existing = service
        .list()
        .await?
        .into_iter()
        .map(|row| row.email)
        .collect::<HashSet<_>>();
    let mut inserted = 0;
    for input in demo_employees() {
        if existing.contains(&input.email) {
            info!(email = %input.email, "seed row already present");
            continue;
        }
        service.create(input).await?;
        inserted += 1;
    }
    Ok(inserted)
}
