//! Declaration outline pane

use crate::parser::ast::{Declaration, FunctionDecl, LineIndex};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// One row of the flattened declaration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub depth: usize,
    pub kind: &'static str,
    pub label: String,
    /// 1-based line of the declared name
    pub line: usize,
}

fn signature(function: &FunctionDecl) -> String {
    let params: Vec<String> = function
        .parameters
        .iter()
        .map(|p| p.param_type.to_string())
        .collect();
    format!("{}({}) : {}", function.ident.name, params.join(", "), function.return_type)
}

fn label(decl: &Declaration) -> String {
    match decl {
        Declaration::Class(class) => match &class.base_class {
            Some(base) => format!("{} : {}", class.ident.name, base),
            None => class.ident.name.clone(),
        },
        Declaration::Enum(e) => e.ident.name.clone(),
        Declaration::Function(function) => signature(function),
        Declaration::Method(method) => signature(&method.function),
        Declaration::Variable(var) => format!("{} : {}", var.ident.name, var.var_type),
        Declaration::Typedef(t) => format!("{} = {}", t.ident.name, t.aliased_type),
    }
}

/// Flatten `declarations` depth-first, enum members included.
pub fn outline_rows(declarations: &[Declaration], index: &LineIndex) -> Vec<OutlineRow> {
    fn walk(declarations: &[Declaration], index: &LineIndex, depth: usize, rows: &mut Vec<OutlineRow>) {
        for decl in declarations {
            rows.push(OutlineRow {
                depth,
                kind: decl.kind_name(),
                label: label(decl),
                line: index.location(decl.ident().start).line,
            });

            if let Declaration::Enum(e) = decl {
                rows.extend(e.members.iter().map(|member| OutlineRow {
                    depth: depth + 1,
                    kind: "member",
                    label: member.ident.name.clone(),
                    line: index.location(member.ident.start).line,
                }));
            }
            walk(decl.children(), index, depth + 1, rows);
        }
    }

    let mut rows = Vec::new();
    walk(declarations, index, 0, &mut rows);
    rows
}

fn kind_style(kind: &str) -> Style {
    match kind {
        "class" | "enum" => Style::default()
            .fg(DEFAULT_THEME.type_name)
            .add_modifier(Modifier::BOLD),
        "function" | "method" | "constructor" | "destructor" => Style::default().fg(DEFAULT_THEME.function),
        "typedef" => Style::default().fg(DEFAULT_THEME.keyword),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the outline pane
pub fn render_outline_pane(
    frame: &mut Frame,
    area: Rect,
    rows: &[OutlineRow],
    selected: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Outline ({}) ", rows.len()))
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    if rows.is_empty() {
        let paragraph = Paragraph::new("(no declarations)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = super::follow_selection(*scroll_offset, selected, visible_height);
    *scroll_offset = super::clamp_scroll(*scroll_offset, rows.len(), visible_height);

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, row)| {
            let mut line = Line::from(vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(format!("{} ", row.kind), Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(row.label.clone(), kind_style(row.kind)),
            ]);
            if idx == selected && is_focused {
                line = line.style(Style::default().bg(DEFAULT_THEME.current_line_bg));
            }
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParserConfig};

    #[test]
    fn test_outline_rows_nest_members() {
        let text = "class A : B {\n  int x;\n  void F(int a, string b);\n}\nenum E { ONE }\n";
        let output = parse("test.c", text, 1, &ParserConfig::default());
        let rows = outline_rows(&output.file.body, &LineIndex::new(text));

        let labels: Vec<(usize, &str, &str)> = rows.iter().map(|r| (r.depth, r.kind, r.label.as_str())).collect();
        assert_eq!(
            labels,
            [
                (0, "class", "A : B"),
                (1, "variable", "x : int"),
                (1, "method", "F(int, string) : void"),
                (0, "enum", "E"),
                (1, "member", "ONE"),
            ]
        );
        assert_eq!(rows[2].line, 3);
    }
}
