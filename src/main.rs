mod app;
mod components;
mod config;
mod event;
mod logging;
mod notes;
mod theme;
mod tui;

use std::time::Duration;

use app::App;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use config::AppConfig;
use event::Action;
use notes::{NotesDb, NotesStore};
use ratatui::layout::{Constraint, Layout};

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = AppConfig::load()?;
    logging::init_logging(&config.log_file, &config.log_level)?;
    theme::init(config.theme.clone());

    log::info!("Opening notes database {}", config.database.display());
    let db = NotesDb::open(&config.database)
        .wrap_err_with(|| format!("Failed to open {}", config.database.display()))?;
    let mut app = App::new(NotesStore::new(db), &config)?;

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    log::info!("Exiting");
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: day list + status bar
            let layout = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

            let mut list_state = std::mem::take(&mut app.list_state);
            let rows = app.day_rows();
            components::DayList::render(
                frame,
                layout[0],
                &rows,
                app.selected_date,
                app.selected_note,
                app.today,
                &mut list_state,
            );
            app.list_state = list_state;

            if let Some(ref form) = app.form_state {
                components::NoteForm::render(frame, area, form);
            }

            if app.show_help {
                components::Help::render(frame, area);
            }

            components::StatusBar::render(
                frame,
                layout[1],
                app.input_mode,
                app.status_message.as_deref(),
            );
        })?;

        if let Some(key) = event::next_key_event(Duration::from_millis(250))? {
            // Clear status message on any key
            app.status_message = None;

            if let Some(action) = event::action_for(key, app.input_mode, app.show_help) {
                handle_action(app, action);
            }
        }
    }

    Ok(())
}

fn handle_action(app: &mut App, action: Action) {
    match action {
        Action::Quit => app.running = false,
        Action::ToggleHelp => app.show_help = !app.show_help,
        Action::CloseHelp => app.show_help = false,
        Action::NextDay => app.next_day(),
        Action::PrevDay => app.prev_day(),
        Action::NextWeek => app.next_week(),
        Action::PrevWeek => app.prev_week(),
        Action::NextNote => app.next_note(),
        Action::PrevNote => app.prev_note(),
        Action::Today => app.go_to_today(),
        Action::AddNote => app.open_add_form(),
        Action::EditNote => app.open_edit_form(),
        Action::MoveNote => app.open_move_form(),
        Action::DeleteNote => app.delete_selected_note(),
        Action::NoteUp => app.move_selected_up(),
        Action::NoteDown => app.move_selected_down(),
        Action::Refresh => app.refresh(),
        Action::FormChar(c) => app.form_input_char(c),
        Action::FormBackspace => app.form_backspace(),
        Action::FormNextField => app.form_tab(),
        Action::FormPrevField => app.form_backtab(),
        Action::FormSubmit => app.submit_form(),
        Action::FormCancel => app.close_form(),
    }
}
