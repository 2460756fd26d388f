//! UI state machine. Key presses and request outcomes go in, effects to run come out;
//! nothing here touches the network or the terminal.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use platform_api::{CreateEmployeeInput, Employee, UpdateEmployeeInput};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    ClientResult,
    cache::{FetchTicket, QueryCache, QueryKey},
    form::{EmployeeForm, Field, Submission},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Editing,
    Saving,
    ConfirmDelete { id: i32, name: String },
}

/// Which idle widget receives keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    List,
    Search,
}

/// Work the event loop runs on the app's behalf.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Fetch(FetchTicket),
    Create(CreateEmployeeInput),
    Update(UpdateEmployeeInput),
    Delete(i32),
}

/// A finished effect, fed back into [`App::apply`].
#[derive(Debug)]
pub enum Outcome {
    Fetched {
        ticket: FetchTicket,
        result: ClientResult<Vec<Employee>>,
    },
    Saved(ClientResult<Employee>),
    Deleted(ClientResult<Employee>),
}

#[derive(Debug)]
pub struct App {
    pub mode: Mode,
    pub focus: Focus,
    pub search: Input,
    pub form: Option<EmployeeForm>,
    pub cache: QueryCache,
    pub selected: usize,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            focus: Focus::List,
            search: Input::default(),
            form: None,
            cache: QueryCache::new(),
            selected: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Effects to run once the loop starts.
    pub fn start(&mut self) -> Vec<Effect> {
        self.fetch_current()
    }

    pub fn current_key(&self) -> QueryKey {
        QueryKey::for_search(self.search.value())
    }

    /// Rows for the current view; `None` until its first fetch lands.
    pub fn rows(&self) -> Option<&[Employee]> {
        self.cache.get(&self.current_key())
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading(&self.current_key())
    }

    pub fn selected_employee(&self) -> Option<&Employee> {
        self.rows().and_then(|rows| rows.get(self.selected))
    }

    fn fetch_current(&mut self) -> Vec<Effect> {
        let key = self.current_key();
        self.cache
            .begin_fetch(&key)
            .map(Effect::Fetch)
            .into_iter()
            .collect()
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().map_or(0, <[Employee]>::len);
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }
        match self.mode.clone() {
            Mode::Idle => match self.focus {
                Focus::List => self.list_key(key),
                Focus::Search => self.search_key(key),
            },
            Mode::Editing => self.form_key(key),
            Mode::Saving => Vec::new(),
            Mode::ConfirmDelete { id, .. } => self.prompt_key(key, id),
        }
    }

    fn list_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('n') => self.open_form(EmployeeForm::new()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(employee) = self.selected_employee() {
                    let form = EmployeeForm::edit(employee);
                    self.open_form(form);
                }
            }
            KeyCode::Char('d') => {
                if let Some(employee) = self.selected_employee() {
                    self.mode = Mode::ConfirmDelete {
                        id: employee.id,
                        name: employee.full_name(),
                    };
                }
            }
            KeyCode::Char('r') => return self.refresh(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                self.selected += 1;
                self.clamp_selection();
            }
            _ => {}
        }
        Vec::new()
    }

    fn search_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.focus = Focus::List;
                Vec::new()
            }
            _ => {
                let before = self.search.value().to_string();
                self.search.handle_event(&Event::Key(key));
                if self.search.value() == before {
                    return Vec::new();
                }
                self.selected = 0;
                self.fetch_current()
            }
        }
    }

    fn open_form(&mut self, form: EmployeeForm) {
        self.form = Some(form);
        self.mode = Mode::Editing;
    }

    fn form_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(form) = self.form.as_mut() else {
            self.mode = Mode::Idle;
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => {
                self.form = None;
                self.mode = Mode::Idle;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Char(' ') if form.focused() == Field::Active => form.toggle_active(),
            KeyCode::Enter => {
                form.clear_error();
                let effect = match form.submission() {
                    Submission::Create(input) => Effect::Create(input),
                    Submission::Update(changes) => Effect::Update(changes),
                };
                self.mode = Mode::Saving;
                return vec![effect];
            }
            _ => form.handle_key(key),
        }
        Vec::new()
    }

    fn prompt_key(&mut self, key: KeyEvent, id: i32) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = Mode::Idle;
                self.status = Some("Deleting...".into());
                vec![Effect::Delete(id)]
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = Mode::Idle;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Folds a finished effect into the state.
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::Fetched { ticket, result } => {
                match result {
                    Ok(rows) => self.cache.complete(ticket, rows),
                    Err(err) => {
                        tracing::warn!(error = %err, key = ?ticket.key, "fetch failed");
                        self.cache.fail(&ticket);
                        self.status = Some(format!("Failed to load employees: {err}"));
                    }
                }
                self.clamp_selection();
                Vec::new()
            }
            Outcome::Saved(Ok(employee)) => {
                self.form = None;
                self.mode = Mode::Idle;
                self.status = Some(format!("Saved {}", employee.full_name()));
                self.after_mutation()
            }
            Outcome::Saved(Err(err)) => {
                tracing::warn!(error = %err, "save failed");
                self.mode = Mode::Editing;
                if let Some(form) = self.form.as_mut() {
                    form.set_error(&err);
                }
                Vec::new()
            }
            Outcome::Deleted(Ok(employee)) => {
                self.status = Some(format!("Deleted {}", employee.full_name()));
                self.after_mutation()
            }
            Outcome::Deleted(Err(err)) => {
                tracing::warn!(error = %err, "delete failed");
                self.status = Some(format!("Failed to delete: {err}"));
                Vec::new()
            }
        }
    }

    fn after_mutation(&mut self) -> Vec<Effect> {
        self.refresh()
    }

    fn refresh(&mut self) -> Vec<Effect> {
        let key = self.current_key();
        self.cache.invalidate_all(&key);
        self.fetch_current()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use platform_api::{FieldIssue, IssueCode, ValidationErrors};

    use super::*;
    use crate::ClientError;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    fn employee(id: i32, first_name: &str) -> Employee {
        let now = Utc::now();
        Employee {
            id,
            first_name: first_name.into(),
            last_name: "Tester".into(),
            email: format!("{id}@x.com"),
            phone: None,
            department: "Ops".into(),
            position: "Analyst".into(),
            salary: 10.0,
            hire_date: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn loaded(rows: Vec<Employee>) -> App {
        let mut app = App::new();
        let effects: [Effect; 1] = app.start().try_into().unwrap();
        let [Effect::Fetch(ticket)] = effects else {
            panic!("expected an initial fetch");
        };
        app.apply(Outcome::Fetched {
            ticket,
            result: Ok(rows),
        });
        app
    }

    #[test]
    fn starts_by_fetching_the_full_list() {
        let mut app = App::new();
        let effects = app.start();
        assert!(matches!(&effects[..], [Effect::Fetch(t)] if t.key == QueryKey::GetAll));
        assert!(app.rows().is_none());
        assert!(app.is_loading());
        assert!(app.start().is_empty());
    }

    #[test]
    fn create_flow_returns_to_idle_and_refetches() {
        let mut app = loaded(vec![]);
        app.handle_key(ch('n'));
        assert_eq!(app.mode, Mode::Editing);
        for c in "Ada".chars() {
            app.handle_key(ch(c));
        }
        let effects = app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Saving);
        let [Effect::Create(input)] = &effects[..] else {
            panic!("expected a create effect, got {effects:?}");
        };
        assert_eq!(input.first_name, "Ada");
        assert!(app.handle_key(ch('q')).is_empty());
        assert!(!app.should_quit);

        let effects = app.apply(Outcome::Saved(Ok(employee(1, "Ada"))));
        assert_eq!(app.mode, Mode::Idle);
        assert!(app.form.is_none());
        assert!(app.cache.is_stale(&QueryKey::GetAll));
        assert!(matches!(&effects[..], [Effect::Fetch(t)] if t.key == QueryKey::GetAll));
        assert_eq!(app.rows().unwrap().len(), 0);
    }

    #[test]
    fn failed_save_goes_back_to_editing_with_issues() {
        let mut app = loaded(vec![]);
        app.handle_key(ch('n'));
        app.handle_key(key(KeyCode::Enter));
        let err = ClientError::Validation(ValidationErrors {
            issues: vec![FieldIssue {
                field: "firstName".into(),
                code: IssueCode::Required,
                message: "required".into(),
            }],
        });
        let effects = app.apply(Outcome::Saved(Err(err)));
        assert!(effects.is_empty());
        assert_eq!(app.mode, Mode::Editing);
        let form = app.form.as_ref().unwrap();
        assert!(form.issue_for(Field::FirstName).is_some());
        assert!(!app.cache.is_stale(&QueryKey::GetAll));
    }

    #[test]
    fn edit_opens_the_selected_record() {
        let mut app = loaded(vec![employee(2, "Grace"), employee(1, "Ada")]);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(ch('e'));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.editing_id(), Some(1));
        assert_eq!(form.value(Field::FirstName), "Ada");

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Idle);
        assert!(app.form.is_none());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = loaded(vec![employee(1, "Ada")]);
        app.handle_key(ch('d'));
        assert!(matches!(app.mode, Mode::ConfirmDelete { id: 1, .. }));
        assert!(app.handle_key(ch('n')).is_empty());
        assert_eq!(app.mode, Mode::Idle);

        app.handle_key(ch('d'));
        let effects = app.handle_key(ch('y'));
        assert_eq!(effects, vec![Effect::Delete(1)]);
        assert_eq!(app.mode, Mode::Idle);

        let effects = app.apply(Outcome::Deleted(Ok(employee(1, "Ada"))));
        assert_eq!(effects.len(), 1);
        assert_eq!(app.status.as_deref(), Some("Deleted Ada Tester"));
    }

    #[test]
    fn typing_a_search_fetches_per_keystroke() {
        let mut app = loaded(vec![employee(1, "Ada")]);
        app.handle_key(ch('/'));
        assert_eq!(app.focus, Focus::Search);

        let effects = app.handle_key(ch('A'));
        assert!(
            matches!(&effects[..], [Effect::Fetch(t)] if t.key == QueryKey::Search("A".into()))
        );
        let effects = app.handle_key(ch('d'));
        assert!(
            matches!(&effects[..], [Effect::Fetch(t)] if t.key == QueryKey::Search("Ad".into()))
        );
        assert!(app.rows().is_none());

        let effects = app.handle_key(key(KeyCode::Backspace));
        assert!(effects.is_empty(), "Search(\"A\") is already in flight");
        let effects = app.handle_key(key(KeyCode::Backspace));
        assert!(effects.is_empty(), "the full list is cached");
        assert_eq!(app.rows().unwrap().len(), 1);
    }

    #[test]
    fn failed_fetch_keeps_the_previous_view() {
        let mut app = loaded(vec![employee(1, "Ada")]);
        let effects: [Effect; 1] = app.handle_key(ch('r')).try_into().unwrap();
        let [Effect::Fetch(ticket)] = effects else {
            panic!("expected a refetch");
        };
        app.apply(Outcome::Fetched {
            ticket,
            result: Err(ClientError::InvalidResponse("boom".into())),
        });
        assert_eq!(app.rows().unwrap().len(), 1);
        assert!(app.status.as_deref().unwrap().starts_with("Failed to load"));
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = loaded(vec![]);
        app.handle_key(ch('n'));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
