//! Enforce Script source code parser
//!
//! This module transforms Enforce Script source text into an Abstract Syntax
//! Tree (AST) while tolerating broken input:
//! - [`lexer`]: Tokenization with inline preprocessor evaluation
//! - [`preprocessor`]: `#ifdef`/`#ifndef`/`#if`/`#elif`/`#else`/`#endif` state
//! - [`stream`]: Cursor over the tokens with position save/restore and patching
//! - [`parse`]: The [`Parser`] struct, diagnostics and the top-level loop
//! - [`recovery`]: Per-category strategies deciding how a failure is handled
//! - [`ast`]: AST node definitions
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence tier for
//! binary operators. The grammar methods live in `declarations`, `statements`,
//! `expressions` and `types` as `impl Parser` blocks.
//!
//! ```
//! use enscript::parser::{parse, ParserConfig};
//!
//! let output = parse("file:///demo.c", "class A { int x; }", 1, &ParserConfig::default());
//! assert!(output.diagnostics.is_empty());
//! assert_eq!(output.file.body[0].name(), "A");
//! ```

pub mod ast;
pub mod config;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod preprocessor;
pub mod recovery;
mod statements;
pub mod stream;
mod types;

pub use config::ParserConfig;
pub use lexer::{lex, LexOptions, Token, TokenKind};
pub use parse::{parse, HandledIssue, ParseContext, ParseDiagnostic, ParseOutput, Parser, Severity, SyntaxError};
pub use stream::{Position, TokenStream};
