use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::DialogMode;

pub fn render_dialog(f: &mut Frame, dialog: &DialogMode, area: Rect) {
    match dialog {
        DialogMode::None => {}
        DialogMode::ViewFile { name, content } => {
            render_text_dialog(f, &format!("Match Details - {name}"), content, area);
        }
        DialogMode::Share { subject, body } => {
            let text = format!("{subject}\n\n{body}");
            render_text_dialog(f, "Share Match File", &text, area);
        }
    }
}

fn render_text_dialog(f: &mut Frame, title: &str, content: &str, area: Rect) {
    let popup_width = 70.min(area.width.saturating_sub(4));
    let popup_height = 20.min(area.height.saturating_sub(4));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines: Vec<Line> = content.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc/Enter: close",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup_area);
}
