use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthStr;

use mamba_core::console::Console;
use mamba_core::logging::LogLevel;

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Green,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Trace => Color::DarkGray,
    }
}

/// Drop-down console overlay over the top half of `area`.
///
/// `fraction` is the slide position from [`Console::overlay_fraction`]; the
/// cursor is placed only when `show_cursor` is set (console fully open).
pub fn render_console(
    f: &mut Frame,
    area: Rect,
    console: &Console,
    fps: f64,
    fraction: f64,
    show_cursor: bool,
) {
    let max_height = area.height / 2;
    let mut overlay_height = ((max_height as f64) * fraction).round() as u16;
    // title + log + input need three rows
    if overlay_height < 3 {
        if fraction > 0.0 {
            overlay_height = 3;
        } else {
            return;
        }
    }
    let overlay = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: overlay_height.min(area.height),
    };

    f.render_widget(Clear, overlay);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(overlay);

    let title = Line::from(vec![
        Span::styled(
            " CONSOLE ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  FPS: {:.1}  ", fps)),
        Span::styled("` to close", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray).fg(Color::White)),
        chunks[0],
    );

    let log_lines = console.log_lines();
    let visible_height = chunks[1].height as usize;
    let total = log_lines.len();
    let scroll_offset = console.scroll_offset();

    let start = total.saturating_sub(visible_height + scroll_offset);
    let end = total.saturating_sub(scroll_offset);

    let lines: Vec<Line> = log_lines
        .iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!(" {:5} ", entry.level.to_string()),
                    Style::default()
                        .fg(level_color(entry.level))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("[{}] ", entry.target),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.message.as_str()),
            ])
        })
        .collect();

    let log_block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT)
        .style(Style::default().bg(Color::Black));

    f.render_widget(
        Paragraph::new(lines)
            .block(log_block)
            .wrap(Wrap { trim: false }),
        chunks[1],
    );

    let input_line = Line::from(vec![
        Span::styled(
            "> ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(console.input_buffer.as_str()),
    ]);
    f.render_widget(
        Paragraph::new(input_line).style(Style::default().bg(Color::Black).fg(Color::White)),
        chunks[2],
    );

    if show_cursor {
        let display_col = console.input_buffer[..console.cursor_pos].width() as u16;
        f.set_cursor_position((chunks[2].x + 2 + display_col, chunks[2].y));
    }
}
