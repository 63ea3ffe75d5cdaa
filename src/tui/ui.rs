//! Stateless drawing of the browser.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::browser::{Browser, Mode};
use crate::view::{NodeId, OutlineLine, OutlineSpan};

fn span_style(span: &OutlineSpan, focused: bool) -> Style {
    let has = |class: &str| span.classes.iter().any(|c| c == class);
    let mut style = Style::default();
    if has("error") {
        style = style.fg(Color::Red).add_modifier(Modifier::BOLD);
    } else if has("info") {
        style = style.fg(Color::Green);
    } else if has("disabled") {
        style = style.fg(Color::DarkGray);
    } else if has("myTurn") || has("celebration") {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    } else if span.focusable {
        style = style.fg(Color::Cyan);
    }
    if has("primary") || has("occupied") {
        style = style.add_modifier(Modifier::BOLD);
    }
    if focused {
        style = style.bg(Color::White).fg(Color::Black);
    }
    style
}

fn render_line<'a>(line: &'a OutlineLine, focus: Option<NodeId>) -> Line<'a> {
    let mut spans = vec![Span::raw("  ".repeat(line.depth))];
    for (i, span) in line.spans.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            span.text.as_str(),
            span_style(span, focus == Some(span.node)),
        ));
    }
    Line::from(spans)
}

/// Draws the address bar, the page and the key help.
pub fn draw(
    frame: &mut Frame,
    outline: &[OutlineLine],
    browser: &Browser,
    location: &str,
    title: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let (address, address_style) = match browser.mode() {
        Mode::Address(buffer) => (format!("{}▏", buffer), Style::default().fg(Color::Yellow)),
        _ => (location.to_string(), Style::default()),
    };
    let bar = Paragraph::new(address)
        .style(address_style)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(bar, chunks[0]);

    let focus = browser.focused(outline);
    let editing = match browser.mode() {
        Mode::Edit { node, buffer } => Some((*node, buffer.as_str())),
        _ => None,
    };
    let lines: Vec<Line> = outline
        .iter()
        .map(|line| match editing {
            Some((node, buffer)) if line.spans.iter().any(|s| s.node == node) => Line::from(vec![
                Span::raw("  ".repeat(line.depth)),
                Span::styled(
                    format!("{}▏", buffer),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
                ),
            ]),
            _ => render_line(line, focus),
        })
        .collect();

    let focused_line = outline
        .iter()
        .position(|line| line.spans.iter().any(|s| Some(s.node) == focus))
        .unwrap_or(0);
    let height = chunks[1].height.saturating_sub(2) as usize;
    let scroll = focused_line.saturating_sub(height.saturating_sub(1));
    let page = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(page, chunks[1]);

    let help = match browser.mode() {
        Mode::Browse => "↑/↓ focus · Enter activate · 1-9 board · ←/→ back/forward · : address · q quit",
        Mode::Address(_) => "type a URL · Enter open · Esc cancel",
        Mode::Edit { .. } => "type · Enter/Tab done",
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}
