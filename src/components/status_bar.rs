use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::InputMode;
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, mode: InputMode, message: Option<&str>) {
        let w = area.width as usize;
        let style = theme::current().status;

        let mode_str = match mode {
            InputMode::Normal => " Days ",
            InputMode::Form => " Days [Note] ",
        };

        // Show status message if present, otherwise show context-aware hints
        let right_text = match message {
            Some(msg) => format!(" {} ", msg),
            None => hints(mode, w).to_string(),
        };

        let padding = " ".repeat(w.saturating_sub(mode_str.len() + right_text.chars().count()));

        let line = Line::from(vec![
            Span::styled(mode_str, style),
            Span::styled(padding, style),
            Span::styled(right_text, style),
        ]);

        frame.render_widget(Paragraph::new(line).style(style), area);
    }
}

fn hints(mode: InputMode, w: usize) -> &'static str {
    match mode {
        InputMode::Form if w >= 50 => " Tab:Field Enter:Save Esc:Cancel ",
        InputMode::Form => " Enter:Save Esc:Cancel ",
        InputMode::Normal if w >= 90 => {
            " jk:Day hl:Note t:Today a:Add e:Edit m:Move d:Del JK:Order ?:Help q:Quit "
        }
        InputMode::Normal if w >= 50 => " jk:Day a:Add e:Edit d:Del ?:Help q:Quit ",
        InputMode::Normal => " ?:Help q:Quit ",
    }
}
