use chrono::{Duration, Local, NaiveDate};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::widgets::ListState;

use crate::components::day_list::DayRow;
use crate::components::note_form::{FormField, FormMode, NoteFormState, NoteSubmission};
use crate::config::AppConfig;
use crate::notes::{Note, NoteUpdate, NotesStore};

/// Days loaded at once when the selection walks past the loaded range.
const RANGE_STEP_DAYS: i64 = 30;

/// Shift `date` by `days`, failing instead of panicking at the ends of the
/// calendar.
fn offset(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|d| date.checked_add_signed(d))
        .ok_or_else(|| eyre!("Date out of range: {} {:+} days", date, days))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
}

pub struct App {
    pub running: bool,
    pub input_mode: InputMode,
    pub show_help: bool,
    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub selected_note: Option<usize>,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub form_state: Option<NoteFormState>,
    pub status_message: Option<String>,
    pub list_state: ListState,
    days_before: i64,
    days_after: i64,
    store: NotesStore,
}

impl App {
    pub fn new(store: NotesStore, config: &AppConfig) -> Result<Self> {
        Self::with_today(store, config, Local::now().date_naive())
    }

    pub fn with_today(mut store: NotesStore, config: &AppConfig, today: NaiveDate) -> Result<Self> {
        let days_before = i64::from(config.days_before);
        let days_after = i64::from(config.days_after);
        let range_start = offset(today, -days_before)?;
        let range_end = offset(today, days_after)?;
        store.fetch_range(range_start, range_end)?;

        let mut app = Self {
            running: true,
            input_mode: InputMode::Normal,
            show_help: false,
            today,
            selected_date: today,
            selected_note: None,
            range_start,
            range_end,
            form_state: None,
            status_message: None,
            list_state: ListState::default(),
            days_before,
            days_after,
            store,
        };
        app.reset_note_selection();
        Ok(app)
    }

    pub fn day_rows(&self) -> Vec<DayRow<'_>> {
        self.range_start
            .iter_days()
            .take_while(|d| *d <= self.range_end)
            .map(|date| DayRow {
                date,
                notes: self.store.notes(date),
            })
            .collect()
    }

    pub fn selected_notes(&self) -> &[Note] {
        self.store.notes(self.selected_date)
    }

    pub fn current_note(&self) -> Option<&Note> {
        self.selected_note
            .and_then(|i| self.selected_notes().get(i))
    }

    // ── Navigation ──

    pub fn next_day(&mut self) {
        self.step_days(1);
    }

    pub fn prev_day(&mut self) {
        self.step_days(-1);
    }

    pub fn next_week(&mut self) {
        self.step_days(7);
    }

    pub fn prev_week(&mut self) {
        self.step_days(-7);
    }

    fn step_days(&mut self, days: i64) {
        match offset(self.selected_date, days) {
            Ok(date) => self.select_date(date),
            Err(e) => self.fail(e),
        }
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.select_date(self.today);
    }

    pub fn next_note(&mut self) {
        let count = self.selected_notes().len();
        if count == 0 {
            return;
        }
        self.selected_note = Some(match self.selected_note {
            Some(i) => (i + 1).min(count - 1),
            None => 0,
        });
    }

    pub fn prev_note(&mut self) {
        if let Some(i) = self.selected_note {
            self.selected_note = Some(i.saturating_sub(1));
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        if let Err(e) = self.load_around(date) {
            self.fail(e);
        }
        self.reset_note_selection();
    }

    /// Make sure `date` is inside the visible window. Dates just past either
    /// edge extend the window by a step and trim the far side; dates further
    /// away get a fresh window centered on them. Either way the window never
    /// spans more than `days_before + days_after + RANGE_STEP_DAYS` days.
    fn load_around(&mut self, date: NaiveDate) -> Result<()> {
        let near_start = offset(self.range_start, -RANGE_STEP_DAYS).unwrap_or(NaiveDate::MIN);
        let near_end = offset(self.range_end, RANGE_STEP_DAYS).unwrap_or(NaiveDate::MAX);
        let max_span = self.days_before + self.days_after + RANGE_STEP_DAYS;

        if date < near_start || date > near_end {
            let start = offset(date, -self.days_before)?;
            let end = offset(date, self.days_after)?;
            log::debug!("Recentering window on {}", date);
            self.store.fetch_range(start, end)?;
            self.range_start = start;
            self.range_end = end;
        } else if date < self.range_start {
            let start = offset(date, -RANGE_STEP_DAYS)?;
            self.store.fetch_range(start, offset(self.range_start, -1)?)?;
            self.range_start = start;
            self.range_end = self.range_end.min(offset(start, max_span)?);
        } else if date > self.range_end {
            let end = offset(date, RANGE_STEP_DAYS)?;
            self.store.fetch_range(offset(self.range_end, 1)?, end)?;
            self.range_end = end;
            self.range_start = self.range_start.max(offset(end, -max_span)?);
        }
        self.store.ensure_loaded(date)
    }

    fn reset_note_selection(&mut self) {
        self.selected_note = if self.selected_notes().is_empty() {
            None
        } else {
            Some(0)
        };
    }

    fn select_note_id(&mut self, id: i64) {
        self.selected_note = self.selected_notes().iter().position(|n| n.id == id);
        if self.selected_note.is_none() {
            self.reset_note_selection();
        }
    }

    /// Reload every day in the visible range from the database.
    pub fn refresh(&mut self) {
        let id = self.current_note().map(|n| n.id);
        match self.store.fetch_range(self.range_start, self.range_end) {
            Ok(()) => {
                match id {
                    Some(id) => self.select_note_id(id),
                    None => self.reset_note_selection(),
                }
                self.status_message = Some("Notes reloaded".to_string());
            }
            Err(e) => self.fail(e),
        }
    }

    // ── Note actions ──

    pub fn delete_selected_note(&mut self) {
        let Some(id) = self.current_note().map(|n| n.id) else {
            return;
        };
        match self.store.delete_note(id) {
            Ok(_) => {
                let count = self.selected_notes().len();
                self.selected_note = match self.selected_note {
                    _ if count == 0 => None,
                    Some(i) => Some(i.min(count - 1)),
                    None => None,
                };
                self.status_message = Some("Note deleted".to_string());
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn move_selected_up(&mut self) {
        self.reorder_selected(-1);
    }

    pub fn move_selected_down(&mut self) {
        self.reorder_selected(1);
    }

    fn reorder_selected(&mut self, offset: isize) {
        let Some(id) = self.current_note().map(|n| n.id) else {
            return;
        };
        match self.store.reorder_note(id, offset) {
            Ok(_) => self.select_note_id(id),
            Err(e) => self.fail(e),
        }
    }

    // ── Form ──

    pub fn open_add_form(&mut self) {
        self.form_state = Some(NoteFormState::new(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    pub fn open_edit_form(&mut self) {
        let Some(form) = self.current_note().map(NoteFormState::edit) else {
            return;
        };
        self.form_state = Some(form);
        self.input_mode = InputMode::Form;
    }

    /// Edit form with the date field focused; saving a new date moves the note.
    pub fn open_move_form(&mut self) {
        let Some(form) = self.current_note().map(NoteFormState::edit) else {
            return;
        };
        self.form_state = Some(form.with_field(FormField::Date));
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(ref mut form) = self.form_state {
            form.input_char(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.backspace();
        }
    }

    pub fn form_tab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.next_field();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.prev_field();
        }
    }

    pub fn submit_form(&mut self) {
        let Some(ref form) = self.form_state else {
            return;
        };
        let Some(submission) = form.submission() else {
            self.status_message = form.error().map(str::to_string);
            return;
        };
        let mode = form.mode;

        let result = match mode {
            FormMode::Add => self
                .store
                .add_note(submission.date, submission.time, &submission.description, 0)
                .map(|note| note.map(|n| n.id)),
            FormMode::Edit(id) => self.save_edit(id, &submission),
        };

        match result {
            Ok(id) => {
                self.close_form();
                self.select_date(submission.date);
                if let Some(id) = id {
                    self.select_note_id(id);
                }
                self.status_message = Some(match mode {
                    FormMode::Add => "Note added".to_string(),
                    FormMode::Edit(_) => "Note saved".to_string(),
                });
            }
            Err(e) => self.fail(e),
        }
    }

    fn save_edit(
        &mut self,
        id: i64,
        submission: &NoteSubmission,
    ) -> Result<Option<i64>> {
        let update = NoteUpdate {
            description: Some(submission.description.clone()),
            time: Some(submission.time),
            order_index: None,
        };
        if !self.store.update_note(id, update)? {
            return Err(eyre!("Note not found"));
        }

        let current_date = self.store.note(id).map(|n| n.date);
        if current_date != Some(submission.date) {
            self.store.ensure_loaded(submission.date)?;
            self.store.move_note_to_date(id, submission.date)?;
        }
        Ok(Some(id))
    }

    fn fail(&mut self, error: color_eyre::Report) {
        log::error!("{:?}", error);
        self.status_message = Some(format!("Error: {}", error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::NotesDb;
    use std::path::Path;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    fn app() -> App {
        let config = AppConfig {
            days_before: 3,
            days_after: 3,
            ..AppConfig::default()
        };
        let store = NotesStore::new(NotesDb::open_in_memory().unwrap());
        App::with_today(store, &config, today()).unwrap()
    }

    fn file_app(path: &Path) -> App {
        let config = AppConfig {
            days_before: 3,
            days_after: 3,
            ..AppConfig::default()
        };
        let store = NotesStore::new(NotesDb::open(path).unwrap());
        App::with_today(store, &config, today()).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form_input_char(c);
        }
    }

    fn add(app: &mut App, text: &str) {
        app.open_add_form();
        type_text(app, text);
        app.submit_form();
    }

    #[test]
    fn starts_on_today_with_loaded_window() {
        let app = app();
        assert_eq!(app.selected_date, today());
        assert_eq!(app.day_rows().len(), 7);
        assert_eq!(app.selected_note, None);
        assert!(app.current_note().is_none());
    }

    #[test]
    fn add_through_form_selects_new_note() {
        let mut app = app();
        add(&mut app, "buy milk");

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.form_state.is_none());
        let note = app.current_note().unwrap();
        assert_eq!(note.description, "buy milk");
        assert_eq!(note.date, today());
    }

    #[test]
    fn blank_description_keeps_form_open() {
        let mut app = app();
        add(&mut app, "   ");

        assert_eq!(app.input_mode, InputMode::Form);
        assert!(app.selected_notes().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Description is empty"));
    }

    #[test]
    fn edit_with_new_date_moves_note() {
        let mut app = app();
        add(&mut app, "dentist");
        let id = app.current_note().unwrap().id;

        app.open_move_form();
        let form = app.form_state.as_mut().unwrap();
        assert_eq!(form.active_field, FormField::Date);
        form.date = "2025-07-17".to_string();
        app.submit_form();

        let target = NaiveDate::from_ymd_opt(2025, 7, 17).unwrap();
        assert_eq!(app.selected_date, target);
        assert_eq!(app.current_note().unwrap().id, id);
        assert!(app.store.notes(today()).is_empty());
    }

    #[test]
    fn edit_updates_time() {
        let mut app = app();
        add(&mut app, "standup");

        app.open_edit_form();
        app.form_tab();
        type_text(&mut app, "09:15");
        app.submit_form();

        assert!(app.current_note().unwrap().has_alarm());
        assert_eq!(app.status_message.as_deref(), Some("Note saved"));
    }

    #[test]
    fn delete_clamps_selection() {
        let mut app = app();
        add(&mut app, "first");
        add(&mut app, "second");
        app.next_note();
        assert_eq!(app.selected_note, Some(1));

        app.delete_selected_note();
        assert_eq!(app.selected_note, Some(0));
        app.delete_selected_note();
        assert_eq!(app.selected_note, None);
        assert!(app.selected_notes().is_empty());
    }

    #[test]
    fn walking_past_the_window_extends_it() {
        let mut app = app();
        for _ in 0..4 {
            app.next_day();
        }
        assert_eq!(app.selected_date, today() + Duration::days(4));
        assert_eq!(app.range_end, today() + Duration::days(4 + RANGE_STEP_DAYS));

        app.select_date(today() - Duration::days(10));
        assert_eq!(app.range_start, today() - Duration::days(10 + RANGE_STEP_DAYS));
        assert!(app.day_rows().iter().all(|r| r.notes.is_empty()));
    }

    #[test]
    fn reorder_keeps_selection_on_moved_note() {
        let mut app = app();
        add(&mut app, "a");
        add(&mut app, "b");
        let top = app.current_note().unwrap().id;

        app.move_selected_down();
        assert_eq!(app.selected_note, Some(1));
        assert_eq!(app.current_note().unwrap().id, top);

        app.move_selected_up();
        assert_eq!(app.selected_note, Some(0));
    }

    #[test]
    fn window_past_the_calendar_end_is_an_error() {
        let config = AppConfig {
            days_after: u32::MAX,
            ..AppConfig::default()
        };
        let store = NotesStore::new(NotesDb::open_in_memory().unwrap());
        assert!(App::with_today(store, &config, today()).is_err());
    }

    #[test]
    fn far_jump_recenters_window() {
        let mut app = app();
        app.open_add_form();
        type_text(&mut app, "far away");
        app.form_state.as_mut().unwrap().date = "9999-12-20".to_string();
        app.submit_form();

        let target = NaiveDate::from_ymd_opt(9999, 12, 20).unwrap();
        assert_eq!(app.selected_date, target);
        assert_eq!(app.range_start, target - Duration::days(3));
        assert_eq!(app.range_end, target + Duration::days(3));
        assert_eq!(app.day_rows().len(), 7);
        assert_eq!(app.current_note().unwrap().description, "far away");

        app.select_date(today());
        assert_eq!(app.range_start, today() - Duration::days(3));
        assert_eq!(app.day_rows().len(), 7);
    }

    #[test]
    fn walking_keeps_window_bounded() {
        let mut app = app();
        for _ in 0..200 {
            app.next_day();
        }
        assert_eq!(app.selected_date, today() + Duration::days(200));
        assert!(app.day_rows().len() <= (3 + 3 + RANGE_STEP_DAYS + 1) as usize);
        assert!(app.range_start <= app.selected_date && app.selected_date <= app.range_end);
    }

    #[test]
    fn refresh_keeps_selected_note() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.db");
        let mut app = file_app(&path);
        add(&mut app, "a");
        add(&mut app, "b");
        app.next_note();
        assert_eq!(app.current_note().unwrap().description, "a");

        let other = NotesDb::open(&path).unwrap();
        other.insert(today(), None, "c", 0).unwrap();

        app.refresh();
        assert_eq!(app.selected_notes().len(), 3);
        assert_eq!(app.selected_note, Some(2));
        assert_eq!(app.current_note().unwrap().description, "a");
    }

    #[test]
    fn editing_a_vanished_note_reports_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.db");
        let mut app = file_app(&path);
        add(&mut app, "gone soon");
        let id = app.current_note().unwrap().id;

        app.open_edit_form();
        type_text(&mut app, "!");
        NotesDb::open(&path).unwrap().delete(id).unwrap();
        app.submit_form();

        assert_eq!(app.status_message.as_deref(), Some("Error: Note not found"));
        assert_eq!(app.input_mode, InputMode::Form);
    }
}
