//! Type parsing implementation
//!
//! ```text
//! type      ::= "auto" | name generic? array*
//! generic   ::= "<" storage* type ("," storage* type)* ">"
//! array     ::= "[" expression? "]"
//! ```
//!
//! Also home to the read-only lookahead helpers that decide whether the next
//! tokens *look like* a type, which declaration and statement dispatch rely on.

use crate::parser::ast::*;
use crate::parser::lexer::{KeywordCategory, Token};
use crate::parser::parse::{Parser, SyntaxError};
use crate::parser::recovery::{ErrorCategory, Expected, FailureKind};
use crate::parser::stream::Position;

/// Bound on tokens inspected by one lookahead.
pub(crate) const MAX_LOOKAHEAD: usize = 64;

pub(crate) fn is_type_name(token: &Token) -> bool {
    token.is_identifier() || token.is_keyword(KeywordCategory::Type)
}

pub(crate) fn is_declaration_modifier(token: &Token) -> bool {
    token.is_keyword(KeywordCategory::Modifier) || token.is_keyword(KeywordCategory::Storage)
}

impl Parser {
    pub(crate) fn parse_type(&mut self) -> Result<TypeNode, SyntaxError> {
        let start = self.peek().start;

        if self.check("auto") {
            self.advance();
            return Ok(TypeNode::Auto {
                span: self.span_from(start),
            });
        }

        if !is_type_name(self.peek()) {
            let failure = self.failure(FailureKind::Missing(Expected::Type), "");
            self.recover(ErrorCategory::Type, failure)?;
            if !is_type_name(self.peek()) {
                return Err(self.error_here(format!("Expected type, found {}", self.peek())));
            }
        }

        let name = self.advance().value;
        let mut ty = if self.check("<") {
            let args = self.parse_generic_arguments()?;
            TypeNode::Generic {
                base: name,
                args,
                span: self.span_from(start),
            }
        } else {
            TypeNode::Reference {
                name,
                span: self.span_from(start),
            }
        };

        while self.check("[") {
            ty = self.parse_array_suffix(ty, start)?;
        }
        Ok(ty)
    }

    /// `<T, ref U>` after a type name. Storage modifiers inside are dropped.
    pub(crate) fn parse_generic_arguments(&mut self) -> Result<Vec<TypeNode>, SyntaxError> {
        self.nested(|parser| {
            parser.advance(); // <
            let mut args = Vec::new();

            loop {
                while is_declaration_modifier(parser.peek()) {
                    parser.advance();
                }
                args.push(parser.parse_type()?);
                if !parser.match_token(",") {
                    break;
                }
            }

            parser.expect(">", ErrorCategory::Type, "to close generic arguments")?;
            Ok(args)
        })
    }

    /// `[]` or `[size]` wrapping `element`.
    pub(crate) fn parse_array_suffix(&mut self, element: TypeNode, start: usize) -> Result<TypeNode, SyntaxError> {
        self.advance(); // [
        let size = if self.check("]") {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect("]", ErrorCategory::Type, "after array size")?;

        Ok(TypeNode::Array {
            element: Box::new(element),
            size,
            span: self.span_from(start),
        })
    }

    // ===== Lookahead =====

    /// Position after any modifiers starting at `pos`.
    pub(crate) fn skip_modifiers_at(&self, mut pos: Position) -> Position {
        for _ in 0..MAX_LOOKAHEAD {
            let (at, token) = self.tokens.significant_at(pos);
            if !is_declaration_modifier(token) {
                return at;
            }
            pos = self.tokens.step(at);
        }
        pos
    }

    /// Position after a type starting at `pos`, or `None` if there is none.
    pub(crate) fn skip_type_at(&self, pos: Position) -> Option<Position> {
        let (at, token) = self.tokens.significant_at(pos);
        if !is_type_name(token) {
            return None;
        }
        let mut pos = self.tokens.step(at);

        let (at, token) = self.tokens.significant_at(pos);
        if token.is("<") {
            pos = self.skip_balanced_at(at, "<", ">")?;
        }

        loop {
            let (at, token) = self.tokens.significant_at(pos);
            if !token.is("[") {
                return Some(at);
            }
            pos = self.skip_balanced_at(at, "[", "]")?;
        }
    }

    /// Position after the closer matching the opener at `pos`.
    fn skip_balanced_at(&self, pos: Position, open: &str, close: &str) -> Option<Position> {
        let mut depth: i32 = 0;
        let mut pos = pos;

        for _ in 0..MAX_LOOKAHEAD {
            let (at, token) = self.tokens.significant_at(pos);
            if token.is_eof() || token.is(";") || token.is("{") || token.is("}") {
                return None;
            }
            if token.is(open) {
                depth += 1;
            } else if token.is(close) {
                depth -= 1;
            } else if open == "<" && token.is(">>") {
                depth -= 2;
            } else if open == "<" && (token.is("(") || token.is(")") || token.is("=")) {
                return None;
            }

            pos = self.tokens.step(at);
            if depth <= 0 {
                return Some(pos);
            }
        }
        None
    }
}
