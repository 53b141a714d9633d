//! Recovery inside function bodies.

use super::{
    insert_expected, skip_to_recovery_point, Expected, FailureKind, ParseFailure, RecoveryAction,
    RecoveryContext, RecoveryResult,
};
use crate::parser::lexer::{KeywordCategory, TokenKind};
use crate::parser::stream::TokenStream;

pub fn recover(stream: &TokenStream, failure: &ParseFailure, _ctx: &RecoveryContext) -> RecoveryResult {
    match &failure.kind {
        FailureKind::Missing(
            expected @ (Expected::Semicolon
            | Expected::Comma
            | Expected::Colon
            | Expected::OpenParen
            | Expected::CloseParen
            | Expected::CloseBrace
            | Expected::CloseBracket),
        ) => insert_expected(stream, failure, *expected),

        FailureKind::Missing(Expected::Identifier) if failure.found.is_keyword(KeywordCategory::Control) => {
            insert_expected(stream, failure, Expected::Identifier)
        }

        FailureKind::OrphanedElse => RecoveryResult::skip(failure.message()),

        FailureKind::StrayToken => RecoveryResult::skip(failure.message()).as_stylistic(),

        FailureKind::Unexpected => {
            let kinds = [TokenKind::Keyword(KeywordCategory::Control)];
            let start = stream.significant_at(failure.position).0;
            let target = skip_to_recovery_point(stream, stream.step(start), &[";", "}"], &kinds);
            if failure.found.is_eof() || failure.found.is("}") {
                RecoveryResult::throw(failure.message())
            } else {
                RecoveryResult::skip_to(RecoveryAction::SkipToSemicolon, target, failure.message())
            }
        }

        _ => RecoveryResult::throw(failure.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{lex, LexOptions};

    fn run(source: &str, kind: FailureKind) -> (TokenStream, RecoveryResult) {
        let s = TokenStream::new(lex(source, &LexOptions::default()), false);
        let failure = ParseFailure::new(kind, s.peek().clone(), "", s.position());
        let result = recover(&s, &failure, &RecoveryContext::default());
        (s, result)
    }

    #[test]
    fn test_orphaned_else_is_skipped() {
        let (_, result) = run("else x();", FailureKind::OrphanedElse);
        assert_eq!(result.action, RecoveryAction::Skip);
        assert!(result.message.contains("else"));
    }

    #[test]
    fn test_unexpected_skips_past_semicolon() {
        let (s, result) = run("case 1: x = 2; y();", FailureKind::Unexpected);
        assert_eq!(result.action, RecoveryAction::SkipToSemicolon);
        let target = result.recovered_position.expect("position");
        assert_eq!(s.significant_at(target).1.value, "y");
    }

    #[test]
    fn test_missing_colon_is_inserted() {
        let (_, result) = run("return", FailureKind::Missing(Expected::Colon));
        assert!(result.synthetic_token.is_some_and(|t| t.is(":")));
    }
}
