use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, InputObject, Object, Result, Schema,
    SimpleObject,
};
use chrono::{DateTime, Utc};
use platform_api::{ApiResult, CreateEmployeeInput, Employee, UpdateEmployeeInput};
use tracing::instrument;

use crate::service::EmployeeService;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(service: EmployeeService) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Employee")]
pub struct EmployeeNode {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeNode {
    fn from(value: Employee) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            department: value.department,
            position: value.position,
            salary: value.salary,
            hire_date: value.hire_date,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct NewEmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
}

impl From<NewEmployeeInput> for CreateEmployeeInput {
    fn from(value: NewEmployeeInput) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            department: value.department,
            position: value.position,
            salary: value.salary,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct EmployeePatchInput {
    pub id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub is_active: Option<bool>,
}

impl From<EmployeePatchInput> for UpdateEmployeeInput {
    fn from(value: EmployeePatchInput) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            department: value.department,
            position: value.position,
            salary: value.salary,
            is_active: value.is_active,
        }
    }
}

fn service<'a>(ctx: &'a Context<'_>) -> Result<&'a EmployeeService> {
    ctx.data::<EmployeeService>()
}

fn gql(result: ApiResult<Employee>) -> Result<EmployeeNode> {
    result.map(EmployeeNode::from).map_err(|err| err.extend())
}

fn nodes(result: ApiResult<Vec<Employee>>) -> Result<Vec<EmployeeNode>> {
    result
        .map(|rows| rows.into_iter().map(EmployeeNode::from).collect())
        .map_err(|err| err.extend())
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.employees", skip_all)]
    async fn employees(&self, ctx: &Context<'_>) -> Result<Vec<EmployeeNode>> {
        nodes(service(ctx)?.list().await)
    }

    #[instrument(name = "graphql.employee", skip(self, ctx))]
    async fn employee(&self, ctx: &Context<'_>, id: i32) -> Result<EmployeeNode> {
        gql(service(ctx)?.get_by_id(id).await)
    }

    #[instrument(name = "graphql.searchEmployees", skip(self, ctx))]
    async fn search_employees(
        &self,
        ctx: &Context<'_>,
        query: String,
    ) -> Result<Vec<EmployeeNode>> {
        nodes(service(ctx)?.search(&query).await)
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    #[instrument(name = "graphql.createEmployee", skip_all)]
    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        input: NewEmployeeInput,
    ) -> Result<EmployeeNode> {
        gql(service(ctx)?.create(input.into()).await)
    }

    #[instrument(name = "graphql.updateEmployee", skip_all)]
    async fn update_employee(
        &self,
        ctx: &Context<'_>,
        input: EmployeePatchInput,
    ) -> Result<EmployeeNode> {
        gql(service(ctx)?.update(input.into()).await)
    }

    #[instrument(name = "graphql.deleteEmployee", skip(self, ctx))]
    async fn delete_employee(&self, ctx: &Context<'_>, id: i32) -> Result<EmployeeNode> {
        gql(service(ctx)?.delete(id).await)
    }
}
