use chrono::{NaiveDate, NaiveTime};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::notes::note::{date_key, parse_date_key, parse_time, time_key};
use crate::notes::Note;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Description,
    Time,
    Date,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Description => FormField::Time,
            FormField::Time => FormField::Date,
            FormField::Date => FormField::Description,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Description => FormField::Date,
            FormField::Time => FormField::Description,
            FormField::Date => FormField::Time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Add,
    Edit(i64),
}

/// What a valid form asks the store to do.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSubmission {
    pub description: String,
    pub time: Option<NaiveTime>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NoteFormState {
    pub mode: FormMode,
    pub description: String,
    pub time: String,
    pub date: String,
    pub active_field: FormField,
}

impl NoteFormState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            mode: FormMode::Add,
            description: String::new(),
            time: String::new(),
            date: date_key(date),
            active_field: FormField::Description,
        }
    }

    pub fn edit(note: &Note) -> Self {
        Self {
            mode: FormMode::Edit(note.id),
            description: note.description.clone(),
            time: note.time.map(time_key).unwrap_or_default(),
            date: date_key(note.date),
            active_field: FormField::Description,
        }
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.active_field = field;
        self
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date_key(&self.date)
    }

    /// `Some(None)` for a blank time, `None` for text that is not `HH:MM`.
    pub fn parsed_time(&self) -> Option<Option<NaiveTime>> {
        if self.time.trim().is_empty() {
            Some(None)
        } else {
            parse_time(&self.time).map(Some)
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Description => self.description.push(c),
            FormField::Time => self.time.push(c),
            FormField::Date => self.date.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Description => { self.description.pop(); }
            FormField::Time => { self.time.pop(); }
            FormField::Date => { self.date.pop(); }
        }
    }

    pub fn next_field(&mut self) {
        self.active_field = self.active_field.next();
    }

    pub fn prev_field(&mut self) {
        self.active_field = self.active_field.prev();
    }

    /// The first problem with the form, if any.
    pub fn error(&self) -> Option<&'static str> {
        if self.description.trim().is_empty() {
            Some("Description is empty")
        } else if self.parsed_time().is_none() {
            Some("Time must be HH:MM")
        } else if self.parsed_date().is_none() {
            Some("Date must be YYYY-MM-DD")
        } else {
            None
        }
    }

    pub fn submission(&self) -> Option<NoteSubmission> {
        if self.error().is_some() {
            return None;
        }
        Some(NoteSubmission {
            description: self.description.trim().to_string(),
            time: self.parsed_time()?,
            date: self.parsed_date()?,
        })
    }
}

pub struct NoteForm;

impl NoteForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &NoteFormState) {
        // Center the form popup
        let form_w = area.width.min(56).max(30);
        let form_h = area.height.min(9).max(7);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let title = match state.mode {
            FormMode::Add => " New Note ",
            FormMode::Edit(_) => " Edit Note ",
        };
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // description
            Constraint::Length(1), // time
            Constraint::Length(1), // date
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        render_field(frame, rows[0], "Note:", &state.description, state.active_field == FormField::Description);
        let time_placeholder = if state.time.is_empty() && state.active_field != FormField::Time {
            "--:--"
        } else {
            state.time.as_str()
        };
        render_field(frame, rows[1], "Time:", time_placeholder, state.active_field == FormField::Time);
        render_field(frame, rows[2], "Date:", &state.date, state.active_field == FormField::Date);

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[4]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let label_w = 6;
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(
            format!("{:<width$}", label, width = label_w),
            theme::current().dim,
        ),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
    }

    #[test]
    fn new_form_targets_date() {
        let form = NoteFormState::new(date());
        assert_eq!(form.mode, FormMode::Add);
        assert_eq!(form.date, "2025-02-14");
        assert_eq!(form.active_field, FormField::Description);
        assert_eq!(form.error(), Some("Description is empty"));
        assert!(form.submission().is_none());
    }

    #[test]
    fn field_cycle_wraps() {
        let mut form = NoteFormState::new(date());
        form.next_field();
        assert_eq!(form.active_field, FormField::Time);
        form.next_field();
        form.next_field();
        assert_eq!(form.active_field, FormField::Description);
        form.prev_field();
        assert_eq!(form.active_field, FormField::Date);
    }

    #[test]
    fn typing_goes_to_active_field() {
        let mut form = NoteFormState::new(date());
        for c in " buy milk ".chars() {
            form.input_char(c);
        }
        form.next_field();
        for c in "07:45".chars() {
            form.input_char(c);
        }
        form.backspace();
        form.input_char('0');

        let submission = form.submission().unwrap();
        assert_eq!(submission.description, "buy milk");
        assert_eq!(submission.time, NaiveTime::from_hms_opt(7, 40, 0));
        assert_eq!(submission.date, date());
    }

    #[test]
    fn invalid_time_and_date_block_submission() {
        let mut form = NoteFormState::new(date());
        form.description = "x".to_string();
        form.time = "25:99".to_string();
        assert_eq!(form.error(), Some("Time must be HH:MM"));

        form.time.clear();
        form.date = "14.02.2025".to_string();
        assert_eq!(form.error(), Some("Date must be YYYY-MM-DD"));
    }

    #[test]
    fn edit_prefills_from_note() {
        let note = Note {
            id: 3,
            date: date(),
            time: NaiveTime::from_hms_opt(21, 0, 0),
            description: "call mum".to_string(),
            order_index: 0,
        };
        let form = NoteFormState::edit(&note).with_field(FormField::Date);
        assert_eq!(form.mode, FormMode::Edit(3));
        assert_eq!(form.time, "21:00");
        assert_eq!(form.active_field, FormField::Date);
        assert_eq!(form.submission().unwrap().time, note.time);
    }
}
