mod dialog;

pub use dialog::render_dialog;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{FileScreenState, StatusMessage};

pub fn render_header(f: &mut Frame, requesting: bool, area: Rect) {
    let text = if requesting {
        "Bowls Scorer Files - Requesting..."
    } else {
        "Bowls Scorer Files"
    };
    let header = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(header, area);
}

pub fn render_connection_status(
    f: &mut Frame,
    connected: bool,
    last_connected: &str,
    area: Rect,
) {
    let (label, color) = if connected {
        ("Yes", Color::Green)
    } else {
        ("No", Color::Red)
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw("Watch Connected: "),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw("  |  Last Connected: "),
        Span::raw(last_connected),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(status, area);
}

pub fn render_file_list(f: &mut Frame, screen: &FileScreenState, area: Rect) {
    let block = Block::default()
        .title(" Match Files ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if screen.files.is_empty() {
        let empty = Paragraph::new("No match files found")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = screen
        .files
        .iter()
        .map(|name| ListItem::new(name.as_str()))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(screen.selected));
    f.render_stateful_widget(list, area, &mut state);
}

pub fn render_status_bar(f: &mut Frame, status: Option<&StatusMessage>, area: Rect) {
    let status_bar = if let Some(msg) = status {
        let color = if msg.is_error { Color::Red } else { Color::Yellow };
        Paragraph::new(Line::from(vec![
            Span::styled(
                if msg.is_error { "ERROR" } else { "INFO" },
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(": "),
            Span::styled(msg.message.as_str(), Style::default().fg(color)),
        ]))
    } else {
        Paragraph::new(Line::from(vec![
            Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": refresh | "),
            Span::styled("f", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": request from watch | "),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": view | "),
            Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": share | "),
            Span::styled("x", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": save | "),
            Span::styled("d", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": delete | "),
            Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": quit"),
        ]))
    };
    f.render_widget(
        status_bar.block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        ),
        area,
    );
}

pub fn render_debug_log<'a>(
    f: &mut Frame,
    lines: impl Iterator<Item = &'a String>,
    area: Rect,
) {
    let items: Vec<Line> = lines.map(|l| Line::from(l.as_str())).collect();
    let skip = items.len().saturating_sub(area.height.saturating_sub(2) as usize);
    let paragraph = Paragraph::new(items.into_iter().skip(skip).collect::<Vec<_>>())
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .title(" Debug ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(paragraph, area);
}
