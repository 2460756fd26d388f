//! In-process store for tests and local experiments.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use platform_api::{CreateEmployeeInput, Employee, UpdateEmployeeInput};
use tokio::sync::RwLock;

use crate::{DbError, DbResult, store::EmployeeStore};

#[derive(Debug, Default)]
pub struct MemoryEmployeeStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Employee>,
    last_id: i32,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.rows
            .iter()
            .any(|row| row.email == email && Some(row.id) != except)
    }

    fn newest_first<'a>(&self, rows: impl Iterator<Item = &'a Employee>) -> Vec<Employee> {
        let mut rows = rows.cloned().collect::<Vec<_>>();
        rows.sort_by_key(|row| Reverse((row.created_at, row.id)));
        rows
    }
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(row: &Employee, query: &str) -> bool {
    [
        &row.first_name,
        &row.last_name,
        &row.email,
        &row.department,
        &row.position,
    ]
    .into_iter()
    .any(|field| field.contains(query))
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list(&self) -> DbResult<Vec<Employee>> {
        let state = self.state.read().await;
        Ok(state.newest_first(state.rows.iter()))
    }

    async fn find(&self, id: i32) -> DbResult<Option<Employee>> {
        let state = self.state.read().await;
        Ok(state.rows.iter().find(|row| row.id == id).cloned())
    }

    async fn insert(&self, input: &CreateEmployeeInput) -> DbResult<Employee> {
        let mut state = self.state.write().await;
        if state.email_taken(&input.email, None) {
            return Err(DbError::Duplicate("email"));
        }
        state.last_id += 1;
        let now = Utc::now();
        let row = Employee {
            id: state.last_id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            department: input.department.clone(),
            position: input.position.clone(),
            salary: input.salary,
            hire_date: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, changes: &UpdateEmployeeInput) -> DbResult<Option<Employee>> {
        let mut state = self.state.write().await;
        if let Some(email) = &changes.email {
            if state.email_taken(email, Some(changes.id)) {
                return Err(DbError::Duplicate("email"));
            }
        }
        let Some(row) = state.rows.iter_mut().find(|row| row.id == changes.id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            row.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            row.last_name = last_name.clone();
        }
        if let Some(email) = &changes.email {
            row.email = email.clone();
        }
        if let Some(phone) = &changes.phone {
            row.phone = Some(phone.clone());
        }
        if let Some(department) = &changes.department {
            row.department = department.clone();
        }
        if let Some(position) = &changes.position {
            row.position = position.clone();
        }
        if let Some(salary) = changes.salary {
            row.salary = salary;
        }
        if let Some(is_active) = changes.is_active {
            row.is_active = is_active;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> DbResult<Option<Employee>> {
        let mut state = self.state.write().await;
        let position = state.rows.iter().position(|row| row.id == id);
        Ok(position.map(|index| state.rows.remove(index)))
    }

    async fn search(&self, query: &str) -> DbResult<Vec<Employee>> {
        let state = self.state.read().await;
        Ok(state.newest_first(state.rows.iter().filter(|row| matches(row, query))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str, email: &str, department: &str) -> CreateEmployeeInput {
        CreateEmployeeInput {
            first_name: first.into(),
            last_name: "Tester".into(),
            email: email.into(),
            phone: None,
            department: department.into(),
            position: "Analyst".into(),
            salary: 50_000.0,
        }
    }

    #[tokio::test]
    async fn identifiers_are_never_reused() {
        let store = MemoryEmployeeStore::new();
        let first = store.insert(&input("A", "a@x.com", "Ops")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.insert(&input("B", "b@x.com", "Ops")).await.unwrap();
        assert!(second.id > first.id);
        assert!(second.is_active);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryEmployeeStore::new();
        for (name, email) in [("A", "a@x.com"), ("B", "b@x.com"), ("C", "c@x.com")] {
            store.insert(&input(name, email, "Ops")).await.unwrap();
        }
        let names = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.first_name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn update_touches_only_present_fields() {
        let store = MemoryEmployeeStore::new();
        let row = store.insert(&input("Ada", "ada@x.com", "Ops")).await.unwrap();
        let mut changes = UpdateEmployeeInput::new(row.id);
        changes.salary = Some(95_000.0);
        changes.is_active = Some(false);
        let updated = store.update(&changes).await.unwrap().unwrap();
        assert_eq!(updated.salary, 95_000.0);
        assert!(!updated.is_active);
        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.hire_date, row.hire_date);
        assert!(store.update(&UpdateEmployeeInput::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_is_a_case_sensitive_substring_match() {
        let store = MemoryEmployeeStore::new();
        store.insert(&input("Ada", "ada@x.com", "Engineering")).await.unwrap();
        store.insert(&input("Grace", "grace@x.com", "Research")).await.unwrap();
        store.insert(&input("Linus", "linus@x.com", "Engineering")).await.unwrap();

        let hits = store.search("gineer").await.unwrap();
        let names = hits.iter().map(|row| row.first_name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Linus", "Ada"]);
        assert!(store.search("engineering").await.unwrap().is_empty());
        assert!(store.search("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_store_failure() {
        let store = MemoryEmployeeStore::new();
        store.insert(&input("Ada", "ada@x.com", "Ops")).await.unwrap();
        let err = store.insert(&input("Ada", "ada@x.com", "Ops")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate("email")));
    }
}
