//! The create/edit form shared by both flows.

use crossterm::event::{Event, KeyEvent};
use platform_api::{CreateEmployeeInput, Employee, FieldIssue, UpdateEmployeeInput};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::ClientError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Department,
    Position,
    Salary,
    Active,
}

impl Field {
    pub const TEXT: [Field; 7] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Department,
        Field::Position,
        Field::Salary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Department => "Department",
            Field::Position => "Position",
            Field::Salary => "Salary",
            Field::Active => "Active",
        }
    }

    /// Name used by the server when it reports an issue for this field.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Department => "department",
            Field::Position => "position",
            Field::Salary => "salary",
            Field::Active => "isActive",
        }
    }

    fn index(self) -> usize {
        Field::TEXT
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }
}

/// What submitting the form asks the server to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    Create(CreateEmployeeInput),
    Update(UpdateEmployeeInput),
}

#[derive(Debug, Clone)]
pub struct EmployeeForm {
    editing: Option<i32>,
    inputs: [Input; 7],
    is_active: bool,
    focus: usize,
    error: Option<String>,
    issues: Vec<FieldIssue>,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeForm {
    /// Empty form for a new employee.
    pub fn new() -> Self {
        Self {
            editing: None,
            inputs: Default::default(),
            is_active: true,
            focus: 0,
            error: None,
            issues: Vec::new(),
        }
    }

    /// Form prefilled from `employee`.
    pub fn edit(employee: &Employee) -> Self {
        let values = [
            employee.first_name.clone(),
            employee.last_name.clone(),
            employee.email.clone(),
            employee.phone.clone().unwrap_or_default(),
            employee.department.clone(),
            employee.position.clone(),
            employee.salary.to_string(),
        ];
        Self {
            editing: Some(employee.id),
            inputs: values.map(Input::new),
            is_active: employee.is_active,
            ..Self::new()
        }
    }

    pub fn editing_id(&self) -> Option<i32> {
        self.editing
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Fields in display order; the active flag only exists when editing.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Field::TEXT.to_vec();
        if self.is_editing() {
            fields.push(Field::Active);
        }
        fields
    }

    pub fn focused(&self) -> Field {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn input(&self, field: Field) -> Option<&Input> {
        match field {
            Field::Active => None,
            field => Some(&self.inputs[field.index()]),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        self.input(field).map(Input::value).unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn toggle_active(&mut self) {
        if self.is_editing() {
            self.is_active = !self.is_active;
        }
    }

    /// Feeds a key to the focused text field.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let field = self.focused();
        if field == Field::Active {
            return;
        }
        self.inputs[field.index()].handle_event(&Event::Key(key));
    }

    /// Salary text that does not parse counts as zero.
    pub fn salary(&self) -> f64 {
        self.value(Field::Salary).trim().parse::<f64>().unwrap_or(0.0)
    }

    fn text(&self, field: Field) -> String {
        self.value(field).to_string()
    }

    pub fn submission(&self) -> Submission {
        match self.editing {
            Some(id) => Submission::Update(UpdateEmployeeInput {
                id,
                first_name: Some(self.text(Field::FirstName)),
                last_name: Some(self.text(Field::LastName)),
                email: Some(self.text(Field::Email)),
                phone: Some(self.text(Field::Phone)),
                department: Some(self.text(Field::Department)),
                position: Some(self.text(Field::Position)),
                salary: Some(self.salary()),
                is_active: Some(self.is_active),
            }),
            None => {
                let phone = self.text(Field::Phone);
                Submission::Create(CreateEmployeeInput {
                    first_name: self.text(Field::FirstName),
                    last_name: self.text(Field::LastName),
                    email: self.text(Field::Email),
                    phone: (!phone.trim().is_empty()).then_some(phone),
                    department: self.text(Field::Department),
                    position: self.text(Field::Position),
                    salary: self.salary(),
                })
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn issue_for(&self, field: Field) -> Option<&FieldIssue> {
        self.issues
            .iter()
            .find(|issue| issue.field == field.wire_name())
    }

    pub fn set_error(&mut self, err: &ClientError) {
        self.issues = err
            .validation_issues()
            .map(|errors| errors.issues.clone())
            .unwrap_or_default();
        self.error = Some(err.to_string());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.issues.clear();
    }
}
