use chrono::{Datelike, NaiveDate, Weekday};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::notes::Note;
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One row of the list: a date and the notes filed under it.
pub struct DayRow<'a> {
    pub date: NaiveDate,
    pub notes: &'a [Note],
}

pub struct DayList;

impl DayList {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        rows: &[DayRow<'_>],
        selected_date: NaiveDate,
        selected_note: Option<usize>,
        today: NaiveDate,
        state: &mut ListState,
    ) {
        let theme = theme::current();

        let title = format!(" {} {} ", month_name(selected_date.month()), selected_date.year());
        let selected_count = rows
            .iter()
            .find(|r| r.date == selected_date)
            .map(|r| r.notes.len())
            .unwrap_or(0);
        let count_str = match selected_count {
            0 => String::new(),
            1 => " 1 note ".to_string(),
            n => format!(" {} notes ", n),
        };

        let block = Block::default()
            .title(title)
            .title_style(theme.header)
            .title_bottom(Line::from(Span::styled(count_str, theme.dim)))
            .borders(Borders::ALL)
            .border_style(theme.border);

        let inner_w = area.width.saturating_sub(4) as usize;

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let note_selection = if row.date == selected_date {
                    selected_note
                } else {
                    None
                };
                format_day(row, today, note_selection, inner_w)
            })
            .collect();

        let selected_row = rows.iter().position(|r| r.date == selected_date);
        state.select(selected_row);

        let list = List::new(items)
            .block(block)
            .highlight_style(theme.highlight)
            .highlight_symbol("\u{25B6} ");
        frame.render_stateful_widget(list, area, state);
    }
}

fn format_day(
    row: &DayRow<'_>,
    today: NaiveDate,
    selected_note: Option<usize>,
    max_width: usize,
) -> ListItem<'static> {
    let theme = theme::current();
    let date = row.date;
    let is_weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

    let date_str = format!(
        "{:02}.{:02}.{} {}",
        date.day(),
        date.month(),
        date.year(),
        DAY_NAMES[date.weekday().num_days_from_monday() as usize]
    );
    let header_style = if date == today {
        theme.today
    } else {
        theme.header
    };
    let mut header = vec![Span::styled(date_str, header_style)];
    if date == today {
        header.push(Span::styled("  today", theme.today.add_modifier(Modifier::ITALIC)));
    }

    let mut lines = vec![Line::from(header)];

    for (i, note) in row.notes.iter().enumerate() {
        lines.push(format_note(note, selected_note == Some(i), max_width));
    }

    let item = ListItem::new(Text::from(lines));
    if is_weekend {
        item.style(theme.weekend)
    } else {
        item
    }
}

fn format_note(note: &Note, selected: bool, max_width: usize) -> Line<'static> {
    let theme = theme::current();

    let mut spans = vec![Span::raw("  \u{2022} ")];
    let mut used = 4;

    if note.has_alarm() {
        let time = note.time_display().unwrap_or_default();
        used += time.len() + 4;
        spans.push(Span::styled(format!("{} ", time), theme.alarm));
        spans.push(Span::styled("\u{1F514} ", theme.alarm));
    }

    let room = max_width.saturating_sub(used).max(1);
    let description = truncate(&note.description, room);
    let style = if selected {
        theme.selected
    } else {
        Style::default()
    };
    spans.push(Span::styled(description, style));

    Line::from(spans)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Şubat ayı notu", 6), "Şubat\u{2026}");
        assert_eq!(truncate("abc", 1), "\u{2026}");
    }

    #[test]
    fn empty_day_is_single_line() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        let row = DayRow { date, notes: &[] };
        let item = format_day(&row, date, None, 40);
        assert_eq!(item.height(), 1);
    }

    #[test]
    fn notes_add_one_line_each() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let notes = vec![
            Note {
                id: 1,
                date,
                time: None,
                description: "one".to_string(),
                order_index: 0,
            },
            Note {
                id: 2,
                date,
                time: chrono::NaiveTime::from_hms_opt(9, 0, 0),
                description: "two".to_string(),
                order_index: 0,
            },
        ];
        let row = DayRow { date, notes: &notes };
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(format_day(&row, today, Some(1), 40).height(), 3);
    }
}
