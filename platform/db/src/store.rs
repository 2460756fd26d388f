use async_trait::async_trait;
use chrono::Utc;
use entity::employee;
use platform_api::{CreateEmployeeInput, Employee, UpdateEmployeeInput};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, Condition, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Select, SqlErr,
};

use crate::{DbError, DbPool, DbResult};

/// Persistence boundary for employee rows. Implementations apply no business rules;
/// inputs arrive already validated.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Every row, newest first.
    async fn list(&self) -> DbResult<Vec<Employee>>;

    async fn find(&self, id: i32) -> DbResult<Option<Employee>>;

    /// Inserts a row; the store assigns id, hire date, and timestamps.
    async fn insert(&self, input: &CreateEmployeeInput) -> DbResult<Employee>;

    /// Writes only the fields present in `changes`. `None` when the row is gone.
    async fn update(&self, changes: &UpdateEmployeeInput) -> DbResult<Option<Employee>>;

    /// Removes the row and returns what it held. `None` when the row is gone.
    async fn delete(&self, id: i32) -> DbResult<Option<Employee>>;

    /// Rows whose first name, last name, email, department, or position contain `query`,
    /// newest first.
    async fn search(&self, query: &str) -> DbResult<Vec<Employee>>;
}

#[derive(Clone, Debug)]
pub struct SeaOrmEmployeeStore {
    db: DbPool,
}

impl SeaOrmEmployeeStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DbPool {
        &self.db
    }
}

fn newest_first(select: Select<employee::Entity>) -> Select<employee::Entity> {
    select
        .order_by_desc(employee::Column::CreatedAt)
        .order_by_desc(employee::Column::Id)
}

fn to_record(model: employee::Model) -> Employee {
    Employee {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        department: model.department,
        position: model.position,
        salary: model.salary,
        hire_date: model.hire_date.with_timezone(&Utc),
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn classify(err: DbErr) -> DbError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DbError::Duplicate("email"),
        _ => DbError::Query(err),
    }
}

/// Makes `%`, `_` and `\` match themselves inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[async_trait]
impl EmployeeStore for SeaOrmEmployeeStore {
    async fn list(&self) -> DbResult<Vec<Employee>> {
        let rows = newest_first(employee::Entity::find()).all(&self.db).await?;
        Ok(rows.into_iter().map(to_record).collect())
    }

    async fn find(&self, id: i32) -> DbResult<Option<Employee>> {
        let row = employee::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(to_record))
    }

    async fn insert(&self, input: &CreateEmployeeInput) -> DbResult<Employee> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let model = employee::ActiveModel {
            first_name: Set(input.first_name.clone()),
            last_name: Set(input.last_name.clone()),
            email: Set(input.email.clone()),
            phone: Set(input.phone.clone()),
            department: Set(input.department.clone()),
            position: Set(input.position.clone()),
            salary: Set(input.salary),
            hire_date: Set(now),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = employee::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(classify)?;
        let id = inserted.last_insert_id;
        employee::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(to_record)
            .ok_or_else(|| {
                DbError::Query(DbErr::RecordNotFound(format!(
                    "employee {id} missing after insert"
                )))
            })
    }

    async fn update(&self, changes: &UpdateEmployeeInput) -> DbResult<Option<Employee>> {
        let Some(existing) = employee::Entity::find_by_id(changes.id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active: employee::ActiveModel = existing.into();
        if let Some(first_name) = &changes.first_name {
            active.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            active.last_name = Set(last_name.clone());
        }
        if let Some(email) = &changes.email {
            active.email = Set(email.clone());
        }
        if let Some(phone) = &changes.phone {
            active.phone = Set(Some(phone.clone()));
        }
        if let Some(department) = &changes.department {
            active.department = Set(department.clone());
        }
        if let Some(position) = &changes.position {
            active.position = Set(position.clone());
        }
        if let Some(salary) = changes.salary {
            active.salary = Set(salary);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());
        match active.update(&self.db).await {
            Ok(model) => Ok(Some(to_record(model))),
            // the row vanished between the read and the write
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(classify(err)),
        }
    }

    async fn delete(&self, id: i32) -> DbResult<Option<Employee>> {
        let Some(existing) = employee::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let result = employee::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(to_record(existing)))
    }

    async fn search(&self, query: &str) -> DbResult<Vec<Employee>> {
        let pattern = format!("%{}%", escape_like(query));
        let condition = [
            employee::Column::FirstName,
            employee::Column::LastName,
            employee::Column::Email,
            employee::Column::Department,
            employee::Column::Position,
        ]
        .into_iter()
        .fold(Condition::any(), |condition, column| {
            condition.add(Expr::col(column).like(LikeExpr::new(pattern.clone()).escape('\\')))
        });
        let rows = newest_first(employee::Entity::find().filter(condition))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_record).collect())
    }
}
