use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::InputMode;

pub fn poll_event(timeout: Duration) -> color_eyre::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn next_key_event(timeout: Duration) -> color_eyre::Result<Option<KeyEvent>> {
    loop {
        match poll_event(timeout)? {
            Some(Event::Key(key)) if key.kind != KeyEventKind::Release => return Ok(Some(key)),
            Some(_) => continue,
            None => return Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    ToggleHelp,
    CloseHelp,
    NextDay,
    PrevDay,
    NextWeek,
    PrevWeek,
    NextNote,
    PrevNote,
    Today,
    AddNote,
    EditNote,
    MoveNote,
    DeleteNote,
    NoteUp,
    NoteDown,
    Refresh,
    FormChar(char),
    FormBackspace,
    FormNextField,
    FormPrevField,
    FormSubmit,
    FormCancel,
}

/// Translate a key press into an action for the current mode.
pub fn action_for(key: KeyEvent, mode: InputMode, show_help: bool) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    // Help overlay takes priority
    if show_help {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    match mode {
        InputMode::Form => match key.code {
            KeyCode::Esc => Some(Action::FormCancel),
            KeyCode::Enter => Some(Action::FormSubmit),
            KeyCode::Tab => Some(Action::FormNextField),
            KeyCode::BackTab => Some(Action::FormPrevField),
            KeyCode::Backspace => Some(Action::FormBackspace),
            KeyCode::Char(c) => Some(Action::FormChar(c)),
            _ => None,
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::NextDay),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::PrevDay),
            KeyCode::PageDown => Some(Action::NextWeek),
            KeyCode::PageUp => Some(Action::PrevWeek),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::NextNote),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::PrevNote),
            KeyCode::Char('t') => Some(Action::Today),
            KeyCode::Char('a') => Some(Action::AddNote),
            KeyCode::Enter | KeyCode::Char('e') => Some(Action::EditNote),
            KeyCode::Char('m') => Some(Action::MoveNote),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::DeleteNote),
            KeyCode::Char('K') => Some(Action::NoteUp),
            KeyCode::Char('J') => Some(Action::NoteDown),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn letters_are_text_inside_the_form() {
        let action = action_for(key(KeyCode::Char('q')), InputMode::Form, false);
        assert_eq!(action, Some(Action::FormChar('q')));
        let action = action_for(key(KeyCode::Char('d')), InputMode::Form, false);
        assert_eq!(action, Some(Action::FormChar('d')));
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(ctrl_c, InputMode::Form, false), Some(Action::Quit));
        assert_eq!(action_for(ctrl_c, InputMode::Normal, true), Some(Action::Quit));
    }

    #[test]
    fn help_swallows_other_keys() {
        assert_eq!(action_for(key(KeyCode::Char('a')), InputMode::Normal, true), None);
        assert_eq!(
            action_for(key(KeyCode::Esc), InputMode::Normal, true),
            Some(Action::CloseHelp)
        );
    }

    #[test]
    fn shifted_j_reorders() {
        let shifted = KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT);
        assert_eq!(action_for(shifted, InputMode::Normal, false), Some(Action::NoteDown));
        assert_eq!(
            action_for(key(KeyCode::Char('j')), InputMode::Normal, false),
            Some(Action::NextDay)
        );
    }
}
