//! Recovery for type references.

use super::{insert_expected, Expected, FailureKind, ParseFailure, RecoveryContext, RecoveryResult};
use crate::parser::lexer::KeywordCategory;
use crate::parser::stream::TokenStream;

pub fn recover(stream: &TokenStream, failure: &ParseFailure, _ctx: &RecoveryContext) -> RecoveryResult {
    match &failure.kind {
        // `array<array<int>>` lexes its closers as one `>>`
        FailureKind::Missing(Expected::CloseAngle) if failure.found.value.starts_with('>') && failure.found.len() > 1 => {
            RecoveryResult::split(String::new())
        }
        FailureKind::Missing(Expected::CloseAngle) => insert_expected(stream, failure, Expected::CloseAngle),
        FailureKind::Missing(Expected::CloseBracket) => insert_expected(stream, failure, Expected::CloseBracket),
        FailureKind::Missing(Expected::Identifier) if failure.found.is_keyword(KeywordCategory::Control) => {
            insert_expected(stream, failure, Expected::Identifier)
        }
        _ => RecoveryResult::throw(failure.message()),
    }
}
