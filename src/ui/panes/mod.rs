//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code highlighted from the crate's own lexer, with
//!   diagnostic markers in the gutter
//! - [`outline`]: Declaration tree of the parsed file
//! - [`diagnostics`]: Errors and warnings with their locations
//! - [`status`]: Status bar with parser mode flags and keybindings
//!
//! Each pane module exports a primary `render_*` function taking the frame,
//! its area, the data to show and its scroll state.

pub mod diagnostics;
pub mod outline;
pub mod source;
pub mod status;

pub use diagnostics::render_diagnostics_pane;
pub use outline::{outline_rows, render_outline_pane, OutlineRow};
pub use source::{highlight_lines, render_source_pane};
pub use status::{render_status_bar, StatusInfo};

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

/// Border style shared by all panes.
pub(crate) fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Clamp `offset` so the window of `visible` rows stays inside `total` rows.
pub(crate) fn clamp_scroll(offset: usize, total: usize, visible: usize) -> usize {
    if total > visible {
        offset.min(total - visible)
    } else {
        0
    }
}

/// Scroll offset that keeps `selected` inside the window.
pub(crate) fn follow_selection(offset: usize, selected: usize, visible: usize) -> usize {
    if selected < offset {
        selected
    } else if selected >= offset + visible {
        selected + 1 - visible
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        assert_eq!(clamp_scroll(50, 10, 20), 0);
        assert_eq!(clamp_scroll(50, 30, 20), 10);
        assert_eq!(clamp_scroll(5, 30, 20), 5);
    }

    #[test]
    fn test_follow_selection() {
        assert_eq!(follow_selection(10, 3, 5), 3);
        assert_eq!(follow_selection(0, 7, 5), 3);
        assert_eq!(follow_selection(2, 4, 5), 2);
    }
}
