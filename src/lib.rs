//! # Introduction
//!
//! enscript is an error-tolerant front end for Enforce Script, the C-like
//! scripting language of the Enfusion engine. It turns source text into an
//! AST plus diagnostics for every input, however broken, which is what an
//! editor needs while the user is still typing.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer (+ preprocessor) → TokenStream → Parser ⇄ Recovery → AST + diagnostics
//! ```
//!
//! 1. [`parser`]: tokenises the source, evaluates conditional compilation
//!    and builds the AST, routing each failure through [`parser::recovery`].
//! 2. [`ui`]: ratatui-based outline viewer used by the `enscript` binary;
//!    not part of the stable library API.

pub mod parser;
pub mod ui;

pub use parser::{parse, ParseDiagnostic, ParseOutput, ParserConfig, Severity};
