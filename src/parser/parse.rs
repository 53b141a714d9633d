//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the shared parsing
//! infrastructure: diagnostics, the thrown [`SyntaxError`], helper methods, the
//! bridge into the recovery strategies, and the top-level declaration loop.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: classes, enums, typedefs, functions, variables
//! - `statements`: statements inside function bodies
//! - `expressions`: expressions with one method per precedence tier
//! - `types`: type references, generic arguments, array suffixes
//!
//! Parser methods are split across these files using `impl Parser` blocks.
//!
//! # Error tolerance
//!
//! The parser never gives up on a document. A construct that cannot be parsed
//! is described as a [`ParseFailure`] and handed to the recovery strategy for
//! its category, which decides between patching the token stream, skipping, or
//! throwing a [`SyntaxError`] that abandons the current declaration. Every
//! call returns a [`ParseOutput`], however broken the input.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::parser::ast::*;
use crate::parser::config::ParserConfig;
use crate::parser::lexer::{LexOptions, Lexer, Token, TokenKind};
use crate::parser::preprocessor::PreprocessorIssue;
use crate::parser::recovery::{
    self, ErrorCategory, Expected, FailureKind, ParseFailure, RecoveryAction, RecoveryContext,
    RecoveryResult,
};
use crate::parser::stream::{Position, TokenStream};

/// Wall-clock ceiling for one document.
pub const PARSE_TIME_BUDGET: Duration = Duration::from_secs(5);

/// A loop that sees the same position more often than this forces progress.
pub const MAX_STUCK_ITERATIONS: usize = 3;

/// Deepest nesting of blocks, classes, generic arguments and expressions
/// before the construct is abandoned.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A problem reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub severity: Severity,
    pub uri: Arc<str>,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub message: String,
    pub offset: usize,
}

impl ParseDiagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Parse error",
            Severity::Warning => "Parse warning",
        };
        write!(
            f,
            "{} at line {}, column {}: {}",
            label, self.line, self.column, self.message
        )
    }
}

/// A problem lenient mode swallowed instead of reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledIssue {
    pub message: String,
    pub offset: usize,
}

/// Thrown to abandon the construct being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Everything one parse call produces.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub file: FileNode,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub handled: Vec<HandledIssue>,
}

impl ParseOutput {
    pub fn errors(&self) -> impl Iterator<Item = &ParseDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ParseDiagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Where in the grammar a declaration is being parsed.
///
/// Class bodies get a context naming their class so constructors and
/// destructors can be told apart from methods; nested classes push their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseContext<'a> {
    pub class_name: Option<&'a str>,
}

impl<'a> ParseContext<'a> {
    pub fn for_class(name: &'a str) -> Self {
        Self {
            class_name: Some(name),
        }
    }
}

/// Notices a parsing loop that keeps starting at the same position.
#[derive(Debug, Default)]
pub(crate) struct ProgressGuard {
    last: Option<Position>,
    repeats: usize,
}

impl ProgressGuard {
    /// Record one iteration at `position`. True once the same position has
    /// repeated more than [`MAX_STUCK_ITERATIONS`] times in a row.
    pub(crate) fn is_stuck(&mut self, position: Position) -> bool {
        if self.last != Some(position) {
            self.last = Some(position);
            self.repeats = 0;
            return false;
        }

        self.repeats += 1;
        if self.repeats > MAX_STUCK_ITERATIONS {
            self.repeats = 0;
            return true;
        }
        false
    }
}

/// Recursive descent parser for Enforce Script
pub struct Parser {
    pub(crate) tokens: TokenStream,
    pub(crate) config: ParserConfig,
    pub(crate) uri: Arc<str>,
    version: i32,
    text_len: usize,
    line_index: LineIndex,
    preprocessor_issues: Vec<PreprocessorIssue>,
    pub(crate) diagnostics: Vec<ParseDiagnostic>,
    pub(crate) handled: Vec<HandledIssue>,
    started: Instant,
    time_budget: Duration,
    depth: usize,
}

impl Parser {
    pub fn new(uri: &str, text: &str, version: i32, config: &ParserConfig) -> Self {
        let options = LexOptions {
            defined_symbols: config.preprocessor_definitions.clone(),
            include_preprocessor_tokens: false,
        };
        let output = Lexer::new(text, &options).tokenize();

        Self {
            tokens: TokenStream::new(output.tokens, false),
            config: config.clone(),
            uri: Arc::from(uri),
            version,
            text_len: text.chars().count(),
            line_index: LineIndex::new(text),
            preprocessor_issues: output.issues,
            diagnostics: Vec::new(),
            handled: Vec::new(),
            started: Instant::now(),
            time_budget: PARSE_TIME_BUDGET,
            depth: 0,
        }
    }

    /// Replace the default [`PARSE_TIME_BUDGET`].
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Parse the whole document.
    pub fn parse_file(mut self) -> ParseOutput {
        self.report_preprocessor_issues();

        let ctx = ParseContext::default();
        let mut body = Vec::new();
        let mut progress = ProgressGuard::default();

        while !self.is_at_end() {
            if self.started.elapsed() >= self.time_budget {
                warn!(uri = %self.uri, "parse exceeded time budget");
                let offset = self.peek().start;
                self.report_error("Parsing aborted: time budget exceeded", offset);
                break;
            }

            let position = self.tokens.position();
            if progress.is_stuck(position) {
                self.force_progress();
                continue;
            }

            if self.check(";") || self.check("}") {
                if let Err(err) = self.skip_stray_token(ErrorCategory::Declaration, "at top level") {
                    self.report_error(err.message, err.offset);
                    break;
                }
                continue;
            }

            match self.parse_declaration(&ctx) {
                Ok(decls) => body.extend(decls),
                Err(err) => {
                    self.report_error(err.message, err.offset);
                    if !self.config.error_recovery {
                        break;
                    }
                    body.extend(self.recover_partial_declaration(position));
                    self.resume_or_synchronize(position);
                }
            }
        }

        if body.is_empty() && self.tokens.has_significant_tokens() {
            self.report_warning("No declarations could be parsed from this file", 0);
        }

        debug!(
            uri = %self.uri,
            declarations = body.len(),
            diagnostics = self.diagnostics.len(),
            handled = self.handled.len(),
            "parsed document"
        );

        ParseOutput {
            file: FileNode {
                uri: Arc::clone(&self.uri),
                body,
                start: 0,
                end: self.text_len,
                version: self.version,
            },
            diagnostics: self.diagnostics,
            handled: self.handled,
        }
    }

    fn report_preprocessor_issues(&mut self) {
        let issues = std::mem::take(&mut self.preprocessor_issues);
        for issue in issues {
            let kind = match &issue {
                PreprocessorIssue::UnclosedConditional { directive, symbol, .. } => FailureKind::UnclosedConditional {
                    directive: directive.clone(),
                    symbol: symbol.clone(),
                },
                PreprocessorIssue::UnmatchedDirective { directive, .. } => FailureKind::UnmatchedDirective {
                    directive: directive.clone(),
                },
            };
            let found = Token::synthetic(TokenKind::Preprocessor, "", issue.offset());
            let failure = ParseFailure::new(kind, found, "", Position::default());
            let strategy = recovery::strategy_for(ErrorCategory::Preprocessor);
            let result = strategy(&self.tokens, &failure, &self.recovery_context());
            self.record(&result, issue.offset());
        }
    }

    /// Consume one token after a loop stopped making progress.
    pub(crate) fn force_progress(&mut self) {
        let token = self.advance();
        self.report_error(format!("Parser made no progress at {}; skipping it", token), token.start);
    }

    // ===== Recovery bridge =====

    pub(crate) fn recovery_context(&self) -> RecoveryContext {
        RecoveryContext {
            lenient_semicolons: self.config.lenient_semicolons,
            ide_mode: self.config.ide_mode,
            error_recovery: self.config.error_recovery,
        }
    }

    pub(crate) fn failure(&self, kind: FailureKind, context: &str) -> ParseFailure {
        let (position, found) = self.tokens.significant_at(self.tokens.position());
        ParseFailure::new(kind, found.clone(), context, position)
    }

    /// Ask the strategy for `category` and act on its answer.
    pub(crate) fn recover(&mut self, category: ErrorCategory, failure: ParseFailure) -> Result<(), SyntaxError> {
        let result = recovery::recover(category, &self.tokens, &failure, &self.recovery_context());
        self.apply_recovery(result, &failure)
    }

    fn apply_recovery(&mut self, result: RecoveryResult, failure: &ParseFailure) -> Result<(), SyntaxError> {
        if self.config.debug {
            debug!(
                action = ?result.action,
                found = %failure.found,
                suppressed = result.suppressed,
                "recovery: {}",
                result.message
            );
        }

        if result.action == RecoveryAction::Throw {
            return Err(SyntaxError::new(result.message, failure.found.start));
        }

        let offset = result
            .synthetic_token
            .as_ref()
            .map(|t| t.start)
            .unwrap_or(failure.found.start);
        self.record(&result, offset);

        match result.action {
            RecoveryAction::Continue | RecoveryAction::WarnAndContinue | RecoveryAction::Throw => {}
            RecoveryAction::InsertSynthetic => {
                if let Some(token) = result.synthetic_token {
                    self.tokens.insert_token(token);
                }
            }
            RecoveryAction::Skip => {
                self.tokens.next();
            }
            RecoveryAction::SplitToken => self.tokens.split_token(),
            RecoveryAction::SkipToSemicolon | RecoveryAction::SkipToBrace | RecoveryAction::SkipToDeclaration => {
                if let Some(position) = result.recovered_position {
                    self.tokens.set_position(position);
                }
            }
        }
        Ok(())
    }

    fn record(&mut self, result: &RecoveryResult, offset: usize) {
        if result.message.is_empty() {
            return;
        }
        if result.suppressed || (result.stylistic && self.config.suppress_stylistic_warnings) {
            self.handled.push(HandledIssue {
                message: result.message.clone(),
                offset,
            });
            return;
        }
        self.push_diagnostic(result.severity, result.message.clone(), offset);
    }

    /// Skip a `;` or `}` where a declaration or statement should start.
    pub(crate) fn skip_stray_token(&mut self, category: ErrorCategory, context: &str) -> Result<(), SyntaxError> {
        let failure = self.failure(FailureKind::StrayToken, context);
        self.recover(category, failure)
    }

    // ===== Diagnostics =====

    fn push_diagnostic(&mut self, severity: Severity, message: String, offset: usize) {
        let location = self.line_index.location(offset);
        self.diagnostics.push(ParseDiagnostic {
            severity,
            uri: Arc::clone(&self.uri),
            line: location.line,
            column: location.column,
            message,
            offset,
        });
    }

    pub(crate) fn report_error(&mut self, message: impl Into<String>, offset: usize) {
        self.push_diagnostic(Severity::Error, message.into(), offset);
    }

    pub(crate) fn report_warning(&mut self, message: impl Into<String>, offset: usize) {
        self.push_diagnostic(Severity::Warning, message.into(), offset);
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.peek()
    }

    pub(crate) fn peek_at(&self, n: usize) -> &Token {
        self.tokens.peek_at(n)
    }

    pub(crate) fn check(&self, value: &str) -> bool {
        self.peek().is(value)
    }

    pub(crate) fn match_token(&mut self, value: &str) -> bool {
        if self.check(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.tokens.next()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.tokens.is_at_end()
    }

    /// End offset of the last consumed token.
    pub(crate) fn previous_end(&self) -> usize {
        self.tokens
            .previous()
            .map(|t| t.end)
            .unwrap_or_else(|| self.peek().start)
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(&self.uri, start, self.previous_end())
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.peek().start)
    }

    /// Run `parse` one nesting level deeper.
    ///
    /// Past [`MAX_NESTING_DEPTH`] nothing is parsed and a [`SyntaxError`] is
    /// returned instead, which the enclosing statement or declaration loop
    /// reports and skips like any other failure.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_here(format!(
                "Code is nested too deeply (more than {} levels)",
                MAX_NESTING_DEPTH
            )));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Consume `value`, recovering through `category` when it is missing.
    pub(crate) fn expect(&mut self, value: &str, category: ErrorCategory, context: &str) -> Result<Token, SyntaxError> {
        if self.check(value) {
            return Ok(self.advance());
        }

        match Expected::from_value(value) {
            Some(expected) => {
                let failure = self.failure(FailureKind::Missing(expected), context);
                self.recover(category, failure)?;
            }
            None => {
                return Err(self.error_here(format!("Expected '{}' {}, found {}", value, context, self.peek())));
            }
        }

        if self.check(value) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("Expected '{}' {}, found {}", value, context, self.peek())))
        }
    }

    pub(crate) fn expect_identifier(&mut self, category: ErrorCategory, context: &str) -> Result<Ident, SyntaxError> {
        if !self.peek().is_identifier() {
            let failure = self.failure(FailureKind::Missing(Expected::Identifier), context);
            self.recover(category, failure)?;
        }

        if self.peek().is_identifier() {
            let token = self.advance();
            Ok(Ident::new(token.value, token.start, token.end))
        } else {
            Err(self.error_here(format!("Expected identifier {}, found {}", context, self.peek())))
        }
    }
}

/// Parse one document.
pub fn parse(uri: &str, text: &str, version: i32, config: &ParserConfig) -> ParseOutput {
    Parser::new(uri, text, version, config).parse_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ParserConfig {
        ParserConfig::workspace()
    }

    fn lenient() -> ParserConfig {
        ParserConfig {
            lenient_semicolons: true,
            ..ParserConfig::default()
        }
    }

    #[test]
    fn test_parse_simple_function() {
        let output = parse("test.c", "int main() { return 0; }", 1, &strict());

        assert!(output.diagnostics.is_empty());
        assert_eq!(output.file.body.len(), 1);
        match &output.file.body[0] {
            Declaration::Function(func) => {
                assert_eq!(func.ident.name, "main");
                assert!(func.parameters.is_empty());
                assert_eq!(func.return_type.name(), "int");
                assert_eq!(func.body.as_ref().map(|b| b.statements.len()), Some(1));
            }
            _ => panic!("Expected function declaration"),
        }
    }

    #[test]
    fn test_missing_semicolon_strict() {
        let output = parse("test.c", "int x = 1 class Y {}", 1, &strict());

        assert_eq!(output.file.body.len(), 2);
        let errors: Vec<_> = output.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("';'"));
        assert!(output.handled.is_empty());
    }

    #[test]
    fn test_missing_semicolon_lenient() {
        let output = parse("test.c", "int x = 1 class Y {}", 1, &lenient());

        assert_eq!(output.file.body.len(), 2);
        assert!(!output.has_errors());
        assert_eq!(output.handled.len(), 1);
    }

    #[test]
    fn test_stray_tokens_at_top_level() {
        let output = parse("test.c", "; int x; }", 1, &strict());
        assert_eq!(output.file.body.len(), 1);
        assert_eq!(output.warnings().count(), 1);
        assert_eq!(output.errors().count(), 1);

        let output = parse("test.c", "; int x; }", 1, &lenient());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_diagnostic_location() {
        let output = parse("test.c", "int x = 1\nint y;", 1, &strict());
        let error = output.errors().next().expect("missing semicolon");
        assert_eq!((error.line, error.column), (1, 10));
        assert_eq!(
            error.to_string(),
            "Parse error at line 1, column 10: Expected ';' after variable declaration, found keyword 'int'"
        );
    }

    #[test]
    fn test_unclosed_conditional_is_a_warning() {
        let output = parse("test.c", "#ifdef SERVER\nint x;", 1, &strict());
        assert!(!output.has_errors());
        let warning = output.warnings().next().expect("unclosed block");
        assert!(warning.message.contains("#ifdef SERVER"));
    }

    #[test]
    fn test_catastrophic_input_warns() {
        let output = parse("test.c", "+ + +", 1, &strict());
        assert!(output.file.body.is_empty());
        assert!(output
            .warnings()
            .any(|w| w.message.contains("No declarations")));
    }

    #[test]
    fn test_without_recovery_stops_at_first_error() {
        let config = ParserConfig {
            error_recovery: false,
            ..ParserConfig::default()
        };
        let output = parse("test.c", "int x = 1 class Y {} int z;", 1, &config);
        assert_eq!(output.errors().count(), 1);
        assert!(output.file.body.is_empty());
    }

    #[test]
    fn test_brace_after_failed_declaration_is_reported() {
        let output = parse("test.c", "int x = ; }", 1, &strict());
        assert_eq!(output.errors().count(), 2);
        assert!(output.diagnostics[1].message.contains('}'), "{}", output.diagnostics[1]);

        let output = parse("test.c", "int x = ; }", 1, &lenient());
        assert_eq!(output.errors().count(), 1);
        assert_eq!(output.handled.len(), 1);
    }

    #[test]
    fn test_time_budget_aborts_parse() {
        let output = Parser::new("test.c", "int x; int y;", 1, &strict())
            .with_time_budget(Duration::ZERO)
            .parse_file();

        assert!(output.file.body.is_empty());
        assert!(output
            .errors()
            .any(|e| e.message.contains("time budget exceeded")));
    }

    #[test]
    fn test_progress_guard_trips_after_repeats() {
        let mut guard = ProgressGuard::default();
        let here = Position::default();

        let trips: Vec<bool> = (0..=MAX_STUCK_ITERATIONS + 1).map(|_| guard.is_stuck(here)).collect();
        assert_eq!(trips, [false, false, false, false, true]);
        assert!(!guard.is_stuck(here));
    }

    #[test]
    fn test_force_progress_skips_one_token() {
        let mut parser = Parser::new("test.c", "a b", 1, &strict());
        parser.force_progress();

        assert!(parser.check("b"));
        assert_eq!(parser.diagnostics.len(), 1);
        assert!(parser.diagnostics[0].message.contains("no progress"));
    }

    #[test]
    fn test_deep_parentheses_are_an_error_not_a_crash() {
        let source = format!("void f() {{ x = {}1{}; }} int after;", "(".repeat(1000), ")".repeat(1000));
        let output = parse("test.c", &source, 1, &strict());

        assert!(output
            .errors()
            .any(|e| e.message.contains("nested too deeply")));
        let names: Vec<&str> = output.file.body.iter().map(|d| d.name()).collect();
        assert_eq!(names, ["f", "after"]);
    }

    #[test]
    fn test_deep_blocks_are_an_error_not_a_crash() {
        let source = format!("void f() {}{}", "{".repeat(500), "}".repeat(500));
        let output = parse("test.c", &source, 1, &strict());

        assert!(output
            .errors()
            .any(|e| e.message.contains("nested too deeply")));
        assert!(output.file.body[0].as_function().is_some());
    }

    #[test]
    fn test_deep_unary_chain_is_an_error_not_a_crash() {
        let source = format!("void f() {{ b = {}a; }}", "!".repeat(5000));
        let output = parse("test.c", &source, 1, &strict());
        assert!(output
            .errors()
            .any(|e| e.message.contains("nested too deeply")));
    }

    #[test]
    fn test_nesting_below_the_limit_parses() {
        let source = format!("void f() {{ x = {}1{}; }}", "(".repeat(20), ")".repeat(20));
        let output = parse("test.c", &source, 1, &strict());
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }

    #[test]
    fn test_file_node_metadata() {
        let output = parse("file:///a.c", "int x;", 7, &strict());
        assert_eq!(&*output.file.uri, "file:///a.c");
        assert_eq!(output.file.version, 7);
        assert_eq!((output.file.start, output.file.end), (0, 6));
    }
}
