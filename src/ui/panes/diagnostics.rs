//! Diagnostics pane rendering

use crate::parser::{ParseDiagnostic, Severity};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the diagnostics list. `handled` is the count of issues recovery
/// absorbed without reporting, shown in the title.
pub fn render_diagnostics_pane(
    frame: &mut Frame,
    area: Rect,
    diagnostics: &[ParseDiagnostic],
    handled: usize,
    selected: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Diagnostics ({}, {} handled) ", diagnostics.len(), handled))
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    if diagnostics.is_empty() {
        let paragraph = Paragraph::new("(no problems)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.success));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = super::follow_selection(*scroll_offset, selected, visible_height);
    *scroll_offset = super::clamp_scroll(*scroll_offset, diagnostics.len(), visible_height);

    let items: Vec<ListItem> = diagnostics
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, diagnostic)| {
            let (tag, color) = match diagnostic.severity {
                Severity::Error => ("error", DEFAULT_THEME.error),
                Severity::Warning => ("warn ", DEFAULT_THEME.warning),
            };
            let mut line = Line::from(vec![
                Span::styled(tag, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!(" {:>4}:{:<3} ", diagnostic.line, diagnostic.column),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(diagnostic.message.clone(), Style::default().fg(DEFAULT_THEME.fg)),
            ]);
            if idx == selected && is_focused {
                line = line.style(Style::default().bg(DEFAULT_THEME.current_line_bg));
            }
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
