//! Main TUI application state and logic

use crate::parser::ast::LineIndex;
use crate::parser::{lex, parse, LexOptions, ParseOutput, ParserConfig, Severity};
use crate::ui::panes::{self, OutlineRow, StatusInfo};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    text::Line,
    Frame, Terminal,
};
use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Outline,
    Diagnostics,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> outline -> diagnostics)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Outline,
            FocusedPane::Outline => FocusedPane::Diagnostics,
            FocusedPane::Diagnostics => FocusedPane::Source,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Diagnostics,
            FocusedPane::Outline => FocusedPane::Source,
            FocusedPane::Diagnostics => FocusedPane::Outline,
        }
    }
}

/// Rows moved by PageUp/PageDown in the source pane.
const PAGE: usize = 20;

/// The main application state
pub struct App {
    /// File the buffer was read from, if any; `r` re-reads it
    pub path: Option<PathBuf>,
    pub uri: String,
    pub source_code: String,
    pub config: ParserConfig,
    /// Bumped on every re-parse
    pub version: i32,

    pub output: ParseOutput,
    highlighted: Vec<Line<'static>>,
    outline: Vec<OutlineRow>,
    markers: FxHashMap<usize, Severity>,

    pub focused_pane: FocusedPane,

    /// 0-based line of the source cursor
    pub source_cursor: usize,
    pub outline_selected: usize,
    pub diagnostic_selected: usize,

    /// Per-pane scroll offsets
    source_scroll: usize,
    outline_scroll: usize,
    diagnostics_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    /// Create the app and run the first parse.
    pub fn new(uri: impl Into<String>, source_code: String, config: ParserConfig, path: Option<PathBuf>) -> Self {
        let uri = uri.into();
        let output = parse(&uri, &source_code, 1, &config);
        let mut app = App {
            path,
            uri,
            source_code,
            config,
            version: 1,
            output,
            highlighted: Vec::new(),
            outline: Vec::new(),
            markers: FxHashMap::default(),
            focused_pane: FocusedPane::Source,
            source_cursor: 0,
            outline_selected: 0,
            diagnostic_selected: 0,
            source_scroll: 0,
            outline_scroll: 0,
            diagnostics_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
        };
        app.refresh_views();
        app
    }

    /// Parse the buffer again with the current configuration.
    pub fn reparse(&mut self) {
        self.version += 1;
        self.output = parse(&self.uri, &self.source_code, self.version, &self.config);
        self.refresh_views();

        debug!(
            version = self.version,
            diagnostics = self.output.diagnostics.len(),
            "re-parsed buffer"
        );
    }

    /// Rebuild highlighting, outline and gutter markers from `output`.
    fn refresh_views(&mut self) {
        let options = LexOptions {
            defined_symbols: self.config.preprocessor_definitions.clone(),
            include_preprocessor_tokens: true,
        };
        self.highlighted = panes::highlight_lines(&self.source_code, &lex(&self.source_code, &options));
        self.outline = panes::outline_rows(&self.output.file.body, &LineIndex::new(&self.source_code));

        self.markers.clear();
        for diagnostic in &self.output.diagnostics {
            self.markers
                .entry(diagnostic.line)
                .and_modify(|severity| *severity = (*severity).min(diagnostic.severity))
                .or_insert(diagnostic.severity);
        }

        self.source_cursor = self.source_cursor.min(self.highlighted.len().saturating_sub(1));
        self.outline_selected = self.outline_selected.min(self.outline.len().saturating_sub(1));
        self.diagnostic_selected = self
            .diagnostic_selected
            .min(self.output.diagnostics.len().saturating_sub(1));
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key);
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        // Source (left) | Outline over Diagnostics (right)
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        panes::render_source_pane(
            frame,
            columns[0],
            &self.highlighted,
            &self.markers,
            self.source_cursor,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_outline_pane(
            frame,
            right_rows[0],
            &self.outline,
            self.outline_selected,
            self.focused_pane == FocusedPane::Outline,
            &mut self.outline_scroll,
        );

        panes::render_diagnostics_pane(
            frame,
            right_rows[1],
            &self.output.diagnostics,
            self.output.handled.len(),
            self.diagnostic_selected,
            self.focused_pane == FocusedPane::Diagnostics,
            &mut self.diagnostics_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusInfo {
                message: &self.status_message,
                errors: self.output.errors().count(),
                warnings: self.output.warnings().count(),
                lenient: self.config.lenient_semicolons,
                ide_mode: self.config.ide_mode,
                skip_bodies: self.config.skip_function_bodies,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-(PAGE as isize)),
            KeyCode::PageDown => self.move_selection(PAGE as isize),
            KeyCode::Enter => self.jump_to_selection(),
            KeyCode::Char('l') => {
                self.config.lenient_semicolons = !self.config.lenient_semicolons;
                self.reparse();
                self.status_message = format!("Lenient semicolons {}", on_off(self.config.lenient_semicolons));
            }
            KeyCode::Char('i') => {
                self.config.ide_mode = !self.config.ide_mode;
                self.reparse();
                self.status_message = format!("IDE mode {}", on_off(self.config.ide_mode));
            }
            KeyCode::Char('b') => {
                self.config.skip_function_bodies = !self.config.skip_function_bodies;
                self.reparse();
                self.status_message = format!("Skip function bodies {}", on_off(self.config.skip_function_bodies));
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let (current, len) = match self.focused_pane {
            FocusedPane::Source => (&mut self.source_cursor, self.highlighted.len()),
            FocusedPane::Outline => (&mut self.outline_selected, self.outline.len()),
            FocusedPane::Diagnostics => (&mut self.diagnostic_selected, self.output.diagnostics.len()),
        };
        *current = current
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    /// Move the source cursor to the selected outline row or diagnostic.
    fn jump_to_selection(&mut self) {
        let line = match self.focused_pane {
            FocusedPane::Source => return,
            FocusedPane::Outline => self.outline.get(self.outline_selected).map(|row| row.line),
            FocusedPane::Diagnostics => self
                .output
                .diagnostics
                .get(self.diagnostic_selected)
                .map(|d| d.line),
        };

        if let Some(line) = line {
            self.source_cursor = line.saturating_sub(1);
            self.focused_pane = FocusedPane::Source;
            self.status_message = format!("Line {}", line);
        }
    }

    fn reload(&mut self) {
        let Some(path) = self.path.clone() else {
            self.status_message = "Nothing to reload".to_string();
            return;
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                self.source_code = text;
                self.reparse();
                self.status_message = format!("Reloaded {}", path.display());
            }
            Err(e) => {
                self.status_message = format!("Cannot reload {}: {}", path.display(), e);
            }
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app(source: &str) -> App {
        App::new("test.c", source.to_string(), ParserConfig::default(), None)
    }

    #[test]
    fn test_toggle_lenient_reparses() {
        let mut app = app("int x = 1\nclass Y {}");
        assert_eq!(app.output.errors().count(), 1);
        assert_eq!(app.version, 1);

        press(&mut app, KeyCode::Char('l'));
        assert!(app.config.lenient_semicolons);
        assert_eq!(app.output.errors().count(), 0);
        assert_eq!(app.version, 2);
        assert_eq!(app.markers.len(), 0);
    }

    #[test]
    fn test_jump_to_diagnostic_line() {
        let mut app = app("class A {\n  int x;\n  int y\n}\n");
        assert_eq!(app.output.diagnostics.len(), 1);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Diagnostics);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focused_pane, FocusedPane::Source);
        assert_eq!(app.source_cursor, app.output.diagnostics[0].line - 1);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = app("class A {}\nclass B {}\n");
        press(&mut app, KeyCode::Tab);
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.outline_selected, 1);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.outline_selected, 0);
    }

    #[test]
    fn test_reload_reads_the_file_again() {
        let path = std::env::temp_dir().join(format!("enscript-reload-{}.c", std::process::id()));
        fs::write(&path, "class A {}").expect("write fixture");

        let mut app = App::new("test.c", "class A {}".to_string(), ParserConfig::default(), Some(path.clone()));
        fs::write(&path, "class A {}
class B {}").expect("rewrite fixture");
        press(&mut app, KeyCode::Char('r'));
        fs::remove_file(&path).ok();

        assert_eq!(app.output.file.body.len(), 2);
        assert_eq!(app.version, 2);
        assert!(app.status_message.starts_with("Reloaded"));
    }

    #[test]
    fn test_reload_without_path() {
        let mut app = app("int x;");
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.status_message, "Nothing to reload");
    }
}
