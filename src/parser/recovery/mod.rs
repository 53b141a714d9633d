//! Error recovery
//!
//! When the parser cannot continue it describes the problem as a
//! [`ParseFailure`] and asks the strategy registered for the failing
//! [`ErrorCategory`] what to do. Strategies are pure: they look at the stream
//! and the failure, and return a [`RecoveryResult`]. The parser is the only
//! party that acts on a result (splicing a synthetic token, skipping ahead,
//! or giving up on the current declaration).

pub mod declaration;
pub mod expression;
pub mod partial;
pub mod preprocessor;
pub mod statement;
pub mod types;

use super::lexer::{KeywordCategory, Token, TokenKind};
use super::parse::Severity;
use super::stream::{Position, TokenStream};

/// Upper bound on tokens walked by a single recovery scan.
pub const MAX_RECOVERY_STEPS: usize = 1000;

/// Which part of the grammar a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Declaration = 0,
    Statement = 1,
    Expression = 2,
    Type = 3,
    Preprocessor = 4,
}

/// What the parser was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Semicolon,
    Comma,
    Colon,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    CloseBracket,
    CloseAngle,
    Identifier,
    PropertyName,
    Expression,
    Type,
}

impl Expected {
    /// The token value a synthetic stand-in would carry.
    pub fn token_value(self) -> Option<&'static str> {
        match self {
            Expected::Semicolon => Some(";"),
            Expected::Comma => Some(","),
            Expected::Colon => Some(":"),
            Expected::OpenParen => Some("("),
            Expected::CloseParen => Some(")"),
            Expected::OpenBrace => Some("{"),
            Expected::CloseBrace => Some("}"),
            Expected::CloseBracket => Some("]"),
            Expected::CloseAngle => Some(">"),
            Expected::Identifier | Expected::PropertyName => Some(""),
            Expected::Expression | Expected::Type => None,
        }
    }

    pub fn from_value(value: &str) -> Option<Expected> {
        let expected = match value {
            ";" => Expected::Semicolon,
            "," => Expected::Comma,
            ":" => Expected::Colon,
            "(" => Expected::OpenParen,
            ")" => Expected::CloseParen,
            "{" => Expected::OpenBrace,
            "}" => Expected::CloseBrace,
            "]" => Expected::CloseBracket,
            ">" => Expected::CloseAngle,
            _ => return None,
        };
        Some(expected)
    }

    pub fn describe(self) -> &'static str {
        match self {
            Expected::Semicolon => "';'",
            Expected::Comma => "','",
            Expected::Colon => "':'",
            Expected::OpenParen => "'('",
            Expected::CloseParen => "')'",
            Expected::OpenBrace => "'{'",
            Expected::CloseBrace => "'}'",
            Expected::CloseBracket => "']'",
            Expected::CloseAngle => "'>'",
            Expected::Identifier => "identifier",
            Expected::PropertyName => "property name",
            Expected::Expression => "expression",
            Expected::Type => "type",
        }
    }

    fn synthetic_kind(self) -> TokenKind {
        match self {
            Expected::Identifier | Expected::PropertyName => TokenKind::Identifier,
            Expected::CloseAngle => TokenKind::Operator,
            _ => TokenKind::Punctuation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Missing(Expected),
    Unexpected,
    /// `else` with no `if` in front of it.
    OrphanedElse,
    /// A `;` or `}` where a declaration or clause should start.
    StrayToken,
    UnclosedConditional { directive: String, symbol: String },
    UnmatchedDirective { directive: String },
}

/// A description of where and why parsing stopped.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub kind: FailureKind,
    pub found: Token,
    /// Human context such as "after variable declaration".
    pub context: String,
    pub position: Position,
}

impl ParseFailure {
    pub fn new(kind: FailureKind, found: Token, context: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            found,
            context: context.into(),
            position,
        }
    }

    pub fn message(&self) -> String {
        let context = if self.context.is_empty() {
            String::new()
        } else {
            format!(" {}", self.context)
        };
        match &self.kind {
            FailureKind::Missing(expected) => {
                format!("Expected {}{}, found {}", expected.describe(), context, self.found)
            }
            FailureKind::Unexpected => format!("Unexpected {}{}", self.found, context),
            FailureKind::OrphanedElse => "'else' without a matching 'if'".to_string(),
            FailureKind::StrayToken => format!("Unnecessary {}{}", self.found, context),
            FailureKind::UnclosedConditional { directive, symbol } => {
                format!("Unclosed '{} {}' block", directive, symbol)
            }
            FailureKind::UnmatchedDirective { directive } => {
                format!("'{}' without a matching conditional", directive)
            }
        }
    }

    fn found_control_keyword(&self) -> bool {
        self.found.is_keyword(KeywordCategory::Control)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Nothing to do; the failure is not a problem.
    Continue,
    /// Record the message and carry on.
    WarnAndContinue,
    /// Abort the current construct.
    Throw,
    /// Splice `synthetic_token` in at the cursor.
    InsertSynthetic,
    /// Drop the offending token.
    Skip,
    /// Split a compound token after its first char.
    SplitToken,
    SkipToSemicolon,
    SkipToBrace,
    SkipToDeclaration,
}

#[derive(Debug, Clone)]
pub struct RecoveryResult {
    pub action: RecoveryAction,
    pub message: String,
    pub synthetic_token: Option<Token>,
    pub recovered_position: Option<Position>,
    pub severity: Severity,
    /// Style only; hidden when stylistic warnings are suppressed.
    pub stylistic: bool,
    /// Set by [`recover`] when lenient mode swallows the message.
    pub suppressed: bool,
}

impl RecoveryResult {
    fn with(action: RecoveryAction, message: String) -> Self {
        Self {
            action,
            message,
            synthetic_token: None,
            recovered_position: None,
            severity: Severity::Error,
            stylistic: false,
            suppressed: false,
        }
    }

    pub fn silent() -> Self {
        Self::with(RecoveryAction::Continue, String::new())
    }

    pub fn warn(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::with(RecoveryAction::WarnAndContinue, message)
        }
    }

    pub fn throw(message: String) -> Self {
        Self::with(RecoveryAction::Throw, message)
    }

    pub fn skip(message: String) -> Self {
        Self::with(RecoveryAction::Skip, message)
    }

    pub fn split(message: String) -> Self {
        Self::with(RecoveryAction::SplitToken, message)
    }

    pub fn insert(token: Token, message: String) -> Self {
        Self {
            synthetic_token: Some(token),
            ..Self::with(RecoveryAction::InsertSynthetic, message)
        }
    }

    pub fn skip_to(action: RecoveryAction, position: Position, message: String) -> Self {
        Self {
            recovered_position: Some(position),
            ..Self::with(action, message)
        }
    }

    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn as_stylistic(mut self) -> Self {
        self.severity = Severity::Warning;
        self.stylistic = true;
        self
    }
}

/// Parser settings a strategy may consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryContext {
    pub lenient_semicolons: bool,
    pub ide_mode: bool,
    pub error_recovery: bool,
}

pub type Strategy = fn(&TokenStream, &ParseFailure, &RecoveryContext) -> RecoveryResult;

/// Indexed by `ErrorCategory as usize`.
const STRATEGIES: [Strategy; 5] = [
    declaration::recover,
    statement::recover,
    expression::recover,
    types::recover,
    preprocessor::recover,
];

pub fn strategy_for(category: ErrorCategory) -> Strategy {
    STRATEGIES[category as usize]
}

/// Ask the registered strategy, then apply the global policies: everything
/// throws without error recovery, and lenient mode hides the common
/// trusted-source noise.
pub fn recover(
    category: ErrorCategory,
    stream: &TokenStream,
    failure: &ParseFailure,
    ctx: &RecoveryContext,
) -> RecoveryResult {
    if !ctx.error_recovery {
        return RecoveryResult::throw(failure.message());
    }

    let mut result = strategy_for(category)(stream, failure, ctx);
    if ctx.lenient_semicolons && is_lenient_pattern(failure) {
        result.suppressed = true;
    }
    result
}

/// Failures that trusted sources routinely contain.
pub fn is_lenient_pattern(failure: &ParseFailure) -> bool {
    match &failure.kind {
        FailureKind::Missing(Expected::Semicolon | Expected::Comma | Expected::CloseBrace) => true,
        FailureKind::Missing(Expected::Identifier) => failure.found_control_keyword(),
        FailureKind::StrayToken => failure.found.is(";") || failure.found.is("}"),
        _ => false,
    }
}

/// A zero-width token for `expected`, placed at the end of the last consumed
/// token so spans stay tight.
pub fn synthetic_for(stream: &TokenStream, expected: Expected) -> Option<Token> {
    let value = expected.token_value()?;
    let offset = stream
        .previous()
        .map(|t| t.end)
        .unwrap_or_else(|| stream.peek().start);
    Some(Token::synthetic(expected.synthetic_kind(), value, offset))
}

/// Insert a stand-in for `expected`, or throw when there is none.
pub(crate) fn insert_expected(stream: &TokenStream, failure: &ParseFailure, expected: Expected) -> RecoveryResult {
    match synthetic_for(stream, expected) {
        Some(token) => RecoveryResult::insert(token, failure.message()),
        None => RecoveryResult::throw(failure.message()),
    }
}

/// Walk forward from `from` to the next recovery point.
///
/// A `;` in `values` is consumed (the returned position is after it); any
/// other matching value or kind is left in place. Braces opened along the way
/// are skipped as a unit, so a delimiter nested inside `{ ... }` does not stop
/// the scan. Stops at EOF or after [`MAX_RECOVERY_STEPS`] tokens.
pub fn skip_to_recovery_point(
    stream: &TokenStream,
    from: Position,
    values: &[&str],
    kinds: &[TokenKind],
) -> Position {
    let mut pos = from;
    let mut depth = 0usize;

    for _ in 0..MAX_RECOVERY_STEPS {
        let (at, token) = stream.significant_at(pos);
        if token.is_eof() {
            return at;
        }

        if depth == 0 {
            if token.is(";") && values.contains(&";") {
                return stream.step(at);
            }
            if values.iter().any(|v| token.is(v)) || kinds.contains(&token.kind) {
                return at;
            }
        }

        if token.is("{") {
            depth += 1;
        } else if token.is("}") && depth > 0 {
            depth -= 1;
        }
        pos = stream.step(at);
    }

    stream.significant_at(pos).0
}

/// Move the cursor to the next recovery point, consuming at least one token
/// unless the cursor sits on a `}` or EOF.
pub fn skip_to_recovery_point_mut(stream: &mut TokenStream, values: &[&str], kinds: &[TokenKind]) -> Position {
    let start = stream.significant_at(stream.position()).0;
    let target = skip_to_recovery_point(stream, start, values, kinds);
    stream.set_position(target);
    if target == start && !stream.peek().is("}") && !stream.is_at_end() {
        stream.next();
    }
    stream.position()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{lex, LexOptions};

    fn stream(source: &str) -> TokenStream {
        TokenStream::new(lex(source, &LexOptions::default()), false)
    }

    fn failure(kind: FailureKind, s: &TokenStream) -> ParseFailure {
        ParseFailure::new(kind, s.peek().clone(), "after variable declaration", s.position())
    }

    #[test]
    fn test_recovery_point_consumes_semicolon() {
        let s = stream("a b ; c");
        let target = skip_to_recovery_point(&s, s.position(), &[";", "}"], &[]);
        assert_eq!(s.significant_at(target).1.value, "c");
    }

    #[test]
    fn test_recovery_point_stops_before_brace_and_keywords() {
        let s = stream("a { x; } b } c");
        let target = skip_to_recovery_point(&s, s.position(), &[";", "}"], &[]);
        let (at, token) = s.significant_at(target);
        assert!(token.is("}"));
        assert_eq!(s.tokens()[at.index() - 1].value, "b");

        let s = stream("junk junk class A");
        let kinds = [TokenKind::Keyword(KeywordCategory::Declaration)];
        let target = skip_to_recovery_point(&s, s.position(), &[";"], &kinds);
        assert!(s.significant_at(target).1.is("class"));
    }

    #[test]
    fn test_mut_wrapper_forces_progress() {
        let mut s = stream("if x");
        let kinds = [TokenKind::Keyword(KeywordCategory::Control)];
        skip_to_recovery_point_mut(&mut s, &[";"], &kinds);
        assert_eq!(s.peek().value, "x");
    }

    #[test]
    fn test_dispatch_table_matches_categories() {
        let s = stream("class");
        let f = failure(FailureKind::Missing(Expected::Semicolon), &s);
        let ctx = RecoveryContext {
            error_recovery: true,
            ..RecoveryContext::default()
        };
        for category in [
            ErrorCategory::Declaration,
            ErrorCategory::Statement,
            ErrorCategory::Expression,
        ] {
            let result = strategy_for(category)(&s, &f, &ctx);
            assert!(matches!(
                result.action,
                RecoveryAction::InsertSynthetic | RecoveryAction::Throw
            ));
        }
        let result = strategy_for(ErrorCategory::Declaration)(&s, &f, &ctx);
        assert_eq!(result.action, RecoveryAction::InsertSynthetic);
        assert!(result.message.contains("';'"));
    }

    #[test]
    fn test_lenient_suppression() {
        let s = stream("class");
        let f = failure(FailureKind::Missing(Expected::Semicolon), &s);
        let lenient = RecoveryContext {
            lenient_semicolons: true,
            error_recovery: true,
            ..RecoveryContext::default()
        };
        assert!(recover(ErrorCategory::Declaration, &s, &f, &lenient).suppressed);

        let strict = RecoveryContext {
            error_recovery: true,
            ..RecoveryContext::default()
        };
        assert!(!recover(ErrorCategory::Declaration, &s, &f, &strict).suppressed);
    }

    #[test]
    fn test_without_error_recovery_everything_throws() {
        let s = stream("class");
        let f = failure(FailureKind::Missing(Expected::Semicolon), &s);
        let ctx = RecoveryContext::default();
        let result = recover(ErrorCategory::Declaration, &s, &f, &ctx);
        assert_eq!(result.action, RecoveryAction::Throw);
    }

    #[test]
    fn test_synthetic_sits_at_previous_end() {
        let mut s = stream("int x\nclass");
        s.next();
        s.next();
        let token = synthetic_for(&s, Expected::Semicolon).expect("semicolon");
        assert_eq!((token.start, token.end), (5, 5));
        assert!(token.is(";"));
    }
}
