//! Recovery for class, enum, function and variable declarations.

use super::{
    insert_expected, skip_to_recovery_point, Expected, FailureKind, ParseFailure,
    RecoveryAction, RecoveryContext, RecoveryResult,
};
use crate::parser::lexer::{KeywordCategory, TokenKind};
use crate::parser::stream::TokenStream;

/// Tokens that normally follow a declared name.
const AFTER_NAME: [&str; 5] = [",", ")", ";", "=", "["];

pub fn recover(stream: &TokenStream, failure: &ParseFailure, _ctx: &RecoveryContext) -> RecoveryResult {
    match &failure.kind {
        FailureKind::Missing(
            expected @ (Expected::Semicolon
            | Expected::Comma
            | Expected::CloseBrace
            | Expected::CloseParen
            | Expected::CloseBracket
            | Expected::CloseAngle),
        ) => insert_expected(stream, failure, *expected),

        FailureKind::Missing(Expected::Identifier) => {
            let found = &failure.found;
            if found.is_keyword(KeywordCategory::Control) || AFTER_NAME.iter().any(|v| found.is(v)) {
                insert_expected(stream, failure, Expected::Identifier)
            } else {
                RecoveryResult::throw(failure.message())
            }
        }

        FailureKind::StrayToken if failure.found.is(";") => RecoveryResult::skip(failure.message()).as_stylistic(),
        FailureKind::StrayToken => RecoveryResult::skip(failure.message()),

        FailureKind::Unexpected => {
            let kinds = [TokenKind::Keyword(KeywordCategory::Declaration)];
            let target = skip_to_recovery_point(stream, failure.position, &[";", "}"], &kinds);
            if target > stream.significant_at(failure.position).0 {
                RecoveryResult::skip_to(RecoveryAction::SkipToDeclaration, target, failure.message())
            } else if failure.found.is_eof() {
                RecoveryResult::throw(failure.message())
            } else {
                RecoveryResult::skip(failure.message())
            }
        }

        _ => RecoveryResult::throw(failure.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{lex, LexOptions};
    use crate::parser::recovery::RecoveryAction;

    fn run(source: &str, kind: FailureKind) -> RecoveryResult {
        let s = TokenStream::new(lex(source, &LexOptions::default()), false);
        let failure = ParseFailure::new(kind, s.peek().clone(), "", s.position());
        let ctx = RecoveryContext {
            error_recovery: true,
            ..RecoveryContext::default()
        };
        recover(&s, &failure, &ctx)
    }

    #[test]
    fn test_missing_punctuation_is_inserted() {
        let result = run("class", FailureKind::Missing(Expected::CloseBrace));
        assert_eq!(result.action, RecoveryAction::InsertSynthetic);
        assert!(result.synthetic_token.is_some_and(|t| t.is("}")));
    }

    #[test]
    fn test_identifier_before_control_keyword() {
        let result = run("return", FailureKind::Missing(Expected::Identifier));
        assert_eq!(result.action, RecoveryAction::InsertSynthetic);

        let result = run("{", FailureKind::Missing(Expected::Identifier));
        assert_eq!(result.action, RecoveryAction::Throw);
    }

    #[test]
    fn test_stray_tokens() {
        let semi = run(";", FailureKind::StrayToken);
        assert_eq!(semi.action, RecoveryAction::Skip);
        assert!(semi.stylistic);

        let brace = run("}", FailureKind::StrayToken);
        assert_eq!(brace.action, RecoveryAction::Skip);
        assert!(!brace.stylistic);
    }

    #[test]
    fn test_other_failures_throw() {
        let result = run("else", FailureKind::OrphanedElse);
        assert_eq!(result.action, RecoveryAction::Throw);
        assert_eq!(result.message, "'else' without a matching 'if'");
    }

    #[test]
    fn test_unexpected_skips_to_next_declaration() {
        let result = run("+ + class B {}", FailureKind::Unexpected);
        assert_eq!(result.action, RecoveryAction::SkipToDeclaration);
    }
}
