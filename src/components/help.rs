use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k \u{2193}/\u{2191}", "Next/previous day"),
            ("PgDn/PgUp", "Next/previous week"),
            ("h/l \u{2190}/\u{2192}", "Previous/next note"),
            ("t", "Jump to today"),
        ],
    ),
    (
        "Notes",
        &[
            ("a", "Add note"),
            ("e / Enter", "Edit note"),
            ("m", "Move note to another day"),
            ("d", "Delete note"),
            ("K/J", "Move note up/down"),
            ("r", "Reload from disk"),
        ],
    ),
    ("", &[("q / Ctrl-C", "Quit"), ("? / Esc", "Close help")]),
];

pub struct Help;

impl Help {
    pub fn render(frame: &mut Frame, area: Rect) {
        let popup_w = area.width.min(52).max(30);
        let popup_h = area.height.min(20).max(12);
        let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
        let popup_area = Rect::new(x, y, popup_w, popup_h);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

        let mut lines = Vec::new();
        for (i, (section, keys)) in BINDINGS.iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(""));
            }
            if !section.is_empty() {
                lines.push(Line::from(Span::styled(*section, section_style)));
            }
            for (key, desc) in keys.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<12}", key), key_style),
                    Span::styled(*desc, Style::default()),
                ]));
            }
        }

        let para = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(para, inner);
    }
}
