//! Terminal outline viewer built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus and re-parsing
//! - **[`panes`]**: stateless render functions for each visible pane (source,
//!   outline, diagnostics, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with the document
//! text and a [`ParserConfig`] and call [`App::run`] to start the event loop.
//!
//! [`ParserConfig`]: crate::parser::ParserConfig
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
