//! Status bar rendering with mode flags and keybindings

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar shows about the current parse.
#[derive(Debug, Clone, Copy)]
pub struct StatusInfo<'a> {
    pub message: &'a str,
    pub errors: usize,
    pub warnings: usize,
    pub lenient: bool,
    pub ide_mode: bool,
    pub skip_bodies: bool,
}

fn flag<'a>(label: &'a str, on: bool) -> Span<'a> {
    let style = if on {
        Style::default()
            .bg(DEFAULT_THEME.secondary)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(DEFAULT_THEME.current_line_bg)
            .fg(DEFAULT_THEME.comment)
    };
    Span::styled(label, style)
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, info: StatusInfo<'_>) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let summary_bg = if info.errors > 0 {
        DEFAULT_THEME.error
    } else if info.warnings > 0 {
        DEFAULT_THEME.warning
    } else {
        DEFAULT_THEME.success
    };
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let left_spans = vec![
        Span::styled(
            format!(" {} errors, {} warnings ", info.errors, info.warnings),
            Style::default()
                .bg(summary_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", sep_style),
        Span::styled(
            format!(" {} ", info.message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.fg),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);

    let right_spans = vec![
        flag(" LENIENT ", info.lenient),
        flag(" IDE ", info.ide_mode),
        flag(" SKIP BODIES ", info.skip_bodies),
        Span::styled("│", sep_style),
        Span::styled(" l/i/b ", key_style),
        Span::styled(" toggle ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⇥ ", key_style),
        Span::styled(" focus ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ ", key_style),
        Span::styled(" jump ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" r ", key_style),
        Span::styled(" reload ", desc_style),
        Span::styled("│", sep_style),
        Span::styled("q", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
