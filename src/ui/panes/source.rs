//! Source code pane rendering with syntax highlighting
//!
//! Highlighting comes from the parser's own lexer run with directive tokens
//! enabled, so the pane shows exactly what the parser sees. Characters no
//! token covers are whitespace or code inside an inactive `#ifdef` branch;
//! both are drawn in the comment color, which dims disabled code.
//!
//! Lines carrying a diagnostic get a marker in the gutter, red for errors and
//! yellow for warnings.

use crate::parser::lexer::{KeywordCategory, Token, TokenKind};
use crate::parser::Severity;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rustc_hash::FxHashMap;

fn token_style(token: &Token, is_call: bool) -> Style {
    match token.kind {
        TokenKind::Keyword(KeywordCategory::Type) => Style::default().fg(DEFAULT_THEME.type_name),
        TokenKind::Keyword(KeywordCategory::Literal) => Style::default().fg(DEFAULT_THEME.number),
        TokenKind::Keyword(_) => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        TokenKind::Number => Style::default().fg(DEFAULT_THEME.number),
        TokenKind::String => Style::default().fg(DEFAULT_THEME.string),
        TokenKind::Comment => Style::default().fg(DEFAULT_THEME.comment),
        TokenKind::Preprocessor => Style::default().fg(DEFAULT_THEME.preprocessor),
        TokenKind::Identifier if is_call => Style::default().fg(DEFAULT_THEME.function),
        TokenKind::Punctuation if matches!(token.value.as_str(), "{" | "}" | "(" | ")" | "[" | "]") => {
            Style::default().fg(DEFAULT_THEME.primary) // Brackets
        }
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Highlight `text` into one [`Line`] per source line.
pub fn highlight_lines(text: &str, tokens: &[Token]) -> Vec<Line<'static>> {
    let chars: Vec<char> = text.chars().collect();
    let mut styles = vec![Style::default().fg(DEFAULT_THEME.comment); chars.len()];

    let significant: Vec<&Token> = tokens.iter().filter(|t| !t.is_comment() && !t.is_eof()).collect();
    let calls: Vec<usize> = significant
        .windows(2)
        .filter(|pair| pair[0].is_identifier() && pair[1].is("("))
        .map(|pair| pair[0].start)
        .collect();

    for token in tokens {
        let style = token_style(token, calls.binary_search(&token.start).is_ok());
        let end = token.end.min(chars.len());
        for slot in styles.iter_mut().take(end).skip(token.start) {
            *slot = style;
        }
    }

    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();

    for (ch, style) in chars.iter().zip(styles) {
        if *ch == '\n' || *ch == '\r' {
            if !run.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut run), run_style));
            }
            if *ch == '\n' {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            continue;
        }
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(*ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    lines.push(Line::from(spans));
    lines
}

/// Render the source code pane
///
/// `cursor_line` is 0-based; `markers` maps 1-based line numbers to the most
/// severe diagnostic on that line.
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[Line<'static>],
    markers: &FxHashMap<usize, Severity>,
    cursor_line: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1
    *scroll_offset = super::follow_selection(*scroll_offset, cursor_line, visible_height);
    *scroll_offset = super::clamp_scroll(*scroll_offset, lines.len(), visible_height);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let (marker, marker_style) = match markers.get(&line_num) {
                Some(Severity::Error) => ("●", Style::default().fg(DEFAULT_THEME.error)),
                Some(Severity::Warning) => ("●", Style::default().fg(DEFAULT_THEME.warning)),
                None => (" ", Style::default()),
            };

            let num_style = if idx == cursor_line {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment) // Line numbers
            };

            let mut spans = vec![
                Span::styled(marker, marker_style),
                Span::styled(format!("{:4} ", line_num), num_style),
            ];
            for span in &line.spans {
                let mut span = span.clone();
                if idx == cursor_line {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
                }
                spans.push(span);
            }
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}
