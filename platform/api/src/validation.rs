//! Input schemas for the employee procedures.
//!
//! Raw JSON payloads go through the `parse_*` functions, which check shape and content
//! of every field and collect all issues before giving up. Typed inputs built in code
//! (GraphQL arguments, client forms) are checked with `validate`, which applies the
//! same per-field rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::employee::{CreateEmployeeInput, EmployeeId, SearchQuery, UpdateEmployeeInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    Empty,
    InvalidEmail,
    NotPositive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: IssueCode,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            code,
            message: message.into(),
        }
    }
}

/// Every rule a payload broke, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub issues: Vec<FieldIssue>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldIssue> {
        self.issues.iter().find(|issue| issue.field == field)
    }

    fn into_result(self) -> Result<(), Self> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect::<Vec<_>>();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

/// Reads typed fields out of a JSON object, recording an issue for each mismatch.
struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    fn new(payload: &'a Value) -> Self {
        let mut errors = ValidationErrors::default();
        let object = payload.as_object();
        if object.is_none() {
            errors.issues.push(FieldIssue::new(
                "",
                IssueCode::InvalidType,
                format!("expected object, received {}", kind_of(payload)),
            ));
        }
        Self { object, errors }
    }

    fn raw(&mut self, name: &str, presence: Presence) -> Option<&'a Value> {
        let object = self.object?;
        match object.get(name) {
            Some(Value::Null) | None => {
                if presence == Presence::Required {
                    self.errors
                        .issues
                        .push(FieldIssue::new(name, IssueCode::Required, "required"));
                }
                None
            }
            Some(value) => Some(value),
        }
    }

    fn mismatch(&mut self, name: &str, expected: &str, value: &Value) {
        self.errors.issues.push(FieldIssue::new(
            name,
            IssueCode::InvalidType,
            format!("expected {expected}, received {}", kind_of(value)),
        ));
    }

    fn string(&mut self, name: &str, presence: Presence) -> Option<String> {
        let value = self.raw(name, presence)?;
        match value.as_str() {
            Some(text) => Some(text.to_string()),
            None => {
                self.mismatch(name, "string", value);
                None
            }
        }
    }

    fn text(&mut self, name: &str, presence: Presence) -> Option<String> {
        let value = self.string(name, presence)?;
        check_text(name, &value, &mut self.errors);
        Some(value)
    }

    fn email(&mut self, name: &str, presence: Presence) -> Option<String> {
        let value = self.string(name, presence)?;
        check_email(name, &value, &mut self.errors);
        Some(value)
    }

    fn positive(&mut self, name: &str, presence: Presence) -> Option<f64> {
        let value = self.raw(name, presence)?;
        match value.as_f64() {
            Some(number) => {
                check_positive(name, number, &mut self.errors);
                Some(number)
            }
            None => {
                self.mismatch(name, "number", value);
                None
            }
        }
    }

    fn boolean(&mut self, name: &str, presence: Presence) -> Option<bool> {
        let value = self.raw(name, presence)?;
        match value.as_bool() {
            Some(flag) => Some(flag),
            None => {
                self.mismatch(name, "boolean", value);
                None
            }
        }
    }

    fn identifier(&mut self, name: &str) -> Option<i32> {
        let value = self.raw(name, Presence::Required)?;
        match value.as_i64().and_then(|id| i32::try_from(id).ok()) {
            Some(id) => Some(id),
            None => {
                self.mismatch(name, "integer identifier", value);
                None
            }
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        self.errors.into_result()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_text(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.is_empty() {
        errors
            .issues
            .push(FieldIssue::new(field, IssueCode::Empty, "must not be empty"));
    }
}

fn check_email(field: &str, value: &str, errors: &mut ValidationErrors) {
    if !is_valid_email(value) {
        errors.issues.push(FieldIssue::new(
            field,
            IssueCode::InvalidEmail,
            "invalid email address",
        ));
    }
}

fn check_positive(field: &str, value: f64, errors: &mut ValidationErrors) {
    if !(value.is_finite() && value > 0.0) {
        errors.issues.push(FieldIssue::new(
            field,
            IssueCode::NotPositive,
            "must be greater than 0",
        ));
    }
}

pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels = domain.split('.').collect::<Vec<_>>();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub fn parse_create(payload: &Value) -> Result<CreateEmployeeInput, ValidationErrors> {
    let mut fields = Fields::new(payload);
    let first_name = fields.text("firstName", Presence::Required);
    let last_name = fields.text("lastName", Presence::Required);
    let email = fields.email("email", Presence::Required);
    let phone = fields.string("phone", Presence::Optional);
    let department = fields.text("department", Presence::Required);
    let position = fields.text("position", Presence::Required);
    let salary = fields.positive("salary", Presence::Required);
    let errors = fields.errors.clone();
    fields.finish()?;

    let (
        Some(first_name),
        Some(last_name),
        Some(email),
        Some(department),
        Some(position),
        Some(salary),
    ) = (first_name, last_name, email, department, position, salary)
    else {
        return Err(errors);
    };
    Ok(CreateEmployeeInput {
        first_name,
        last_name,
        email,
        phone,
        department,
        position,
        salary,
    })
}

pub fn parse_update(payload: &Value) -> Result<UpdateEmployeeInput, ValidationErrors> {
    let mut fields = Fields::new(payload);
    let id = fields.identifier("id");
    let first_name = fields.text("firstName", Presence::Optional);
    let last_name = fields.text("lastName", Presence::Optional);
    let email = fields.email("email", Presence::Optional);
    let phone = fields.string("phone", Presence::Optional);
    let department = fields.text("department", Presence::Optional);
    let position = fields.text("position", Presence::Optional);
    let salary = fields.positive("salary", Presence::Optional);
    let is_active = fields.boolean("isActive", Presence::Optional);
    let errors = fields.errors.clone();
    fields.finish()?;

    let Some(id) = id else {
        return Err(errors);
    };
    Ok(UpdateEmployeeInput {
        id,
        first_name,
        last_name,
        email,
        phone,
        department,
        position,
        salary,
        is_active,
    })
}

pub fn parse_id(payload: &Value) -> Result<EmployeeId, ValidationErrors> {
    let mut fields = Fields::new(payload);
    let id = fields.identifier("id");
    let errors = fields.errors.clone();
    fields.finish()?;
    id.map(|id| EmployeeId { id }).ok_or(errors)
}

pub fn parse_search(payload: &Value) -> Result<SearchQuery, ValidationErrors> {
    let mut fields = Fields::new(payload);
    let query = fields.string("query", Presence::Required);
    let errors = fields.errors.clone();
    fields.finish()?;
    query.map(|query| SearchQuery { query }).ok_or(errors)
}

impl CreateEmployeeInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_text("firstName", &self.first_name, &mut errors);
        check_text("lastName", &self.last_name, &mut errors);
        check_email("email", &self.email, &mut errors);
        check_text("department", &self.department, &mut errors);
        check_text("position", &self.position, &mut errors);
        check_positive("salary", self.salary, &mut errors);
        errors.into_result()
    }
}

impl UpdateEmployeeInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let texts = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("department", &self.department),
            ("position", &self.position),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                check_text(field, value, &mut errors);
            }
        }
        if let Some(email) = &self.email {
            check_email("email", email, &mut errors);
        }
        if let Some(salary) = self.salary {
            check_positive("salary", salary, &mut errors);
        }
        errors.into_result()
    }
}
