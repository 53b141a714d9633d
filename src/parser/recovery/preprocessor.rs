//! Recovery for preprocessor leftovers.
//!
//! Directive problems never stop parsing: the lexer already decided which
//! code is live, so all that is left is to tell the user.

use super::{FailureKind, ParseFailure, RecoveryContext, RecoveryResult};
use crate::parser::stream::TokenStream;

pub fn recover(_stream: &TokenStream, failure: &ParseFailure, _ctx: &RecoveryContext) -> RecoveryResult {
    match &failure.kind {
        FailureKind::UnclosedConditional { .. } | FailureKind::UnmatchedDirective { .. } => {
            RecoveryResult::warn(failure.message())
        }
        _ if failure.found.is_preprocessor() => RecoveryResult::skip(String::new()),
        _ => RecoveryResult::warn(failure.message()),
    }
}
