use std::sync::Arc;

use platform_api::{
    ApiError, ApiResult, CreateEmployeeInput, Employee, UpdateEmployeeInput,
};
use platform_db::{DbError, EmployeeStore};
use tracing::instrument;

/// The six employee operations. Every input is validated before it reaches the store.
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    #[instrument(name = "employee.getAll", skip_all)]
    pub async fn list(&self) -> ApiResult<Vec<Employee>> {
        self.store.list().await.map_err(store_error)
    }

    #[instrument(name = "employee.getById", skip(self))]
    pub async fn get_by_id(&self, id: i32) -> ApiResult<Employee> {
        self.store
            .find(id)
            .await
            .map_err(store_error)?
            .ok_or(ApiError::NotFound { id })
    }

    #[instrument(name = "employee.create", skip_all)]
    pub async fn create(&self, input: CreateEmployeeInput) -> ApiResult<Employee> {
        input.validate()?;
        let employee = self.store.insert(&input).await.map_err(store_error)?;
        tracing::info!(id = employee.id, "employee created");
        Ok(employee)
    }

    #[instrument(name = "employee.update", skip_all, fields(id = changes.id))]
    pub async fn update(&self, changes: UpdateEmployeeInput) -> ApiResult<Employee> {
        changes.validate()?;
        self.store
            .update(&changes)
            .await
            .map_err(store_error)?
            .ok_or(ApiError::NotFound { id: changes.id })
    }

    #[instrument(name = "employee.delete", skip(self))]
    pub async fn delete(&self, id: i32) -> ApiResult<Employee> {
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(store_error)?
            .ok_or(ApiError::NotFound { id })?;
        tracing::info!(id, "employee deleted");
        Ok(removed)
    }

    #[instrument(name = "employee.search", skip(self))]
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Employee>> {
        self.store.search(query).await.map_err(store_error)
    }
}

fn store_error(err: DbError) -> ApiError {
    tracing::error!(error = %err, "employee store failure");
    ApiError::internal(err.into())
}
