//! Recovery for expressions.

use super::{insert_expected, Expected, FailureKind, ParseFailure, RecoveryContext, RecoveryResult};
use crate::parser::lexer::KeywordCategory;
use crate::parser::stream::TokenStream;

/// Tokens that can end an unfinished expression while the user is typing.
const INCOMPLETE_END: [&str; 5] = [")", ";", "}", "]", ","];

pub fn recover(stream: &TokenStream, failure: &ParseFailure, ctx: &RecoveryContext) -> RecoveryResult {
    match &failure.kind {
        FailureKind::Missing(
            expected @ (Expected::CloseParen | Expected::CloseBracket | Expected::CloseBrace | Expected::Colon | Expected::Comma),
        ) => insert_expected(stream, failure, *expected),

        FailureKind::Missing(Expected::PropertyName) => insert_expected(stream, failure, Expected::PropertyName),

        FailureKind::Missing(Expected::Expression) => {
            let found = &failure.found;
            if ctx.ide_mode && (found.is_eof() || INCOMPLETE_END.iter().any(|v| found.is(v))) {
                insert_expected(stream, failure, Expected::Identifier)
            } else {
                RecoveryResult::throw(failure.message())
            }
        }

        FailureKind::Missing(Expected::Identifier) if failure.found.is_keyword(KeywordCategory::Control) => {
            insert_expected(stream, failure, Expected::Identifier)
        }

        _ => RecoveryResult::throw(failure.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{lex, LexOptions};
    use crate::parser::recovery::RecoveryAction;

    fn run(source: &str, kind: FailureKind, ide_mode: bool) -> RecoveryResult {
        let s = TokenStream::new(lex(source, &LexOptions::default()), false);
        let failure = ParseFailure::new(kind, s.peek().clone(), "", s.position());
        let ctx = RecoveryContext {
            ide_mode,
            error_recovery: true,
            ..RecoveryContext::default()
        };
        recover(&s, &failure, &ctx)
    }

    #[test]
    fn test_missing_expression_throws_outside_ide() {
        let result = run(";", FailureKind::Missing(Expected::Expression), false);
        assert_eq!(result.action, RecoveryAction::Throw);
    }

    #[test]
    fn test_missing_expression_in_ide_mode() {
        let result = run(";", FailureKind::Missing(Expected::Expression), true);
        assert_eq!(result.action, RecoveryAction::InsertSynthetic);
        assert!(result.synthetic_token.is_some_and(|t| t.is_identifier()));

        let result = run("+", FailureKind::Missing(Expected::Expression), true);
        assert_eq!(result.action, RecoveryAction::Throw);
    }

    #[test]
    fn test_missing_close_paren() {
        let result = run(";", FailureKind::Missing(Expected::CloseParen), false);
        assert!(result.synthetic_token.is_some_and(|t| t.is(")")));
    }
}
