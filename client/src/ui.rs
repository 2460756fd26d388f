use ratatui::{prelude::*, widgets::*};

use crate::{
    app::{App, Focus, Mode},
    form::{EmployeeForm, Field},
};

const HELP_IDLE: &str = " / search  n new  e edit  d delete  r refresh  q quit ";
const HELP_SEARCH: &str = " type to filter  Enter/Esc back to list ";
const HELP_FORM: &str = " Tab/Shift-Tab move  Space toggle  Enter save  Esc cancel ";
const HELP_PROMPT: &str = " y confirm  n cancel ";

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_search(f, app, chunks[1]);
    draw_table(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    match &app.mode {
        Mode::Editing | Mode::Saving => {
            if let Some(form) = &app.form {
                draw_form(f, form, app.mode == Mode::Saving);
            }
        }
        Mode::ConfirmDelete { name, .. } => draw_prompt(f, name),
        Mode::Idle => {}
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let state = if app.is_loading() {
        Span::styled(" Loading... ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Ready ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    };
    let title = Paragraph::new(Line::from(vec![
        Span::raw(" Staffdesk "),
        Span::styled(" Employee Management ", Style::default().fg(Color::Yellow)),
        Span::raw(" | "),
        state,
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(title, area);
}

fn draw_search(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.mode == Mode::Idle && app.focus == Focus::Search;
    let border = if focused { Color::Yellow } else { Color::White };
    let width = area.width.saturating_sub(2) as usize;
    let scroll = app.search.visual_scroll(width);
    let input = Paragraph::new(app.search.value())
        .scroll((0, scroll as u16))
        .block(
            Block::default()
                .title(" Search employees ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    f.render_widget(input, area);
    if focused {
        let cursor = app.search.visual_cursor().saturating_sub(scroll) as u16;
        f.set_cursor_position((area.x + 1 + cursor, area.y + 1));
    }
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Employees ").borders(Borders::ALL);
    let Some(rows) = app.rows() else {
        let message = if app.is_loading() {
            "Loading..."
        } else {
            "Employees unavailable."
        };
        f.render_widget(Paragraph::new(message).block(block), area);
        return;
    };
    if rows.is_empty() {
        f.render_widget(Paragraph::new("No employees found.").block(block), area);
        return;
    }

    let header = Row::new(["Name", "Email", "Department", "Position", "Salary", "Status"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let body = rows.iter().map(|employee| {
        let status = if employee.is_active {
            Cell::from("Active").style(Style::default().fg(Color::Green))
        } else {
            Cell::from("Inactive").style(Style::default().fg(Color::Red))
        };
        let mut name = vec![Line::raw(employee.full_name())];
        if let Some(phone) = &employee.phone {
            name.push(Line::styled(phone.clone(), Style::default().fg(Color::DarkGray)));
        }
        let height = name.len() as u16;
        Row::new(vec![
            Cell::from(Text::from(name)),
            Cell::from(employee.email.clone()),
            Cell::from(employee.department.clone()),
            Cell::from(employee.position.clone()),
            Cell::from(format_salary(employee.salary)),
            status,
        ])
        .height(height)
    });
    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(25),
        Constraint::Percentage(15),
        Constraint::Percentage(15),
        Constraint::Percentage(13),
        Constraint::Percentage(12),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = match (&app.mode, app.focus) {
        (Mode::Idle, Focus::List) => HELP_IDLE,
        (Mode::Idle, Focus::Search) => HELP_SEARCH,
        (Mode::Editing | Mode::Saving, _) => HELP_FORM,
        (Mode::ConfirmDelete { .. }, _) => HELP_PROMPT,
    };
    let mut spans = vec![Span::styled(help, Style::default().fg(Color::DarkGray))];
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Cyan),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_form(f: &mut Frame, form: &EmployeeForm, saving: bool) {
    let fields = form.fields();
    let height = fields.len() as u16 + 6;
    let area = centered(f.area(), 60, height);
    f.render_widget(Clear, area);

    let title = if form.is_editing() {
        " Edit Employee "
    } else {
        " Add New Employee "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let focused = form.focused();
    let mut lines = Vec::with_capacity(fields.len() + 3);
    for field in &fields {
        let label_style = if *field == focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let value = match field {
            Field::Active => {
                let mark = if form.is_active() { "[x]" } else { "[ ]" };
                mark.to_string()
            }
            field => form.value(*field).to_string(),
        };
        let mut spans = vec![
            Span::styled(format!("{:>11}: ", field.label()), label_style),
            Span::raw(value),
        ];
        if let Some(issue) = form.issue_for(*field) {
            spans.push(Span::styled(
                format!("  {}", issue.message),
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::raw(""));
    if saving {
        lines.push(Line::styled("Saving...", Style::default().fg(Color::Yellow)));
    } else if let Some(error) = form.error() {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    } else {
        let action = if form.is_editing() { "Update" } else { "Create" };
        lines.push(Line::styled(
            format!("Enter: {action}   Esc: Cancel"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    if !saving {
        if let Some(input) = form.input(focused) {
            let row = fields.iter().position(|field| *field == focused).unwrap_or(0) as u16;
            let x = inner.x + 13 + input.visual_cursor() as u16;
            f.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y + row));
        }
    }
}

fn draw_prompt(f: &mut Frame, name: &str) {
    let area = centered(f.area(), 50, 5);
    f.render_widget(Clear, area);
    let prompt = Paragraph::new(vec![
        Line::raw(format!("Delete {name}?")),
        Line::styled("y: delete   n: keep", Style::default().fg(Color::DarkGray)),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(prompt, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// `$90,000` or `$1,234.50`.
pub fn format_salary(salary: f64) -> String {
    let cents = (salary * 100.0).round() as i64;
    let (whole, frac) = (cents.abs() / 100, cents.abs() % 100);
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if cents < 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{frac:02}")
    }
}
