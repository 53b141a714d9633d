//! Expression parsing implementation
//!
//! One method per precedence tier, lowest binding first:
//!
//! ```text
//! assignment → conditional → logical-or → logical-and → bitwise-or →
//! bitwise-xor → bitwise-and → equality → relational → shift → additive →
//! multiplicative → unary → postfix → primary
//! ```
//!
//! Assignment and `?:` are right-associative, binary tiers are
//! left-associative loops, prefix operators recurse into `parse_unary`.
//!
//! Two spots are decided by lookahead rather than grammar:
//!
//! - `Name<` opens generic arguments only when the token after the next type
//!   name is `,` or `>`; anything else makes `<` a comparison.
//! - `(X)` is a cast only when `X` is a single type-looking token and what
//!   follows can start an expression. Prefix `-`, `+`, `++` and `--` are not
//!   counted as starting one, so `(float)-x` reads as `float - x`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{KeywordCategory, Token, TokenKind};
use crate::parser::parse::{Parser, SyntaxError};
use crate::parser::recovery::{ErrorCategory, Expected, FailureKind};
use crate::parser::types::is_type_name;

type Tier = fn(&mut Parser) -> Result<Expression, SyntaxError>;

/// Primitive types that can appear in a cast.
const PRIMITIVES: [&str; 6] = ["int", "float", "bool", "string", "vector", "typename"];

pub(crate) fn literal_kind(token: &Token) -> Option<LiteralKind> {
    match token.kind {
        TokenKind::Number => {
            let hex = token.value.starts_with("0x") || token.value.starts_with("0X");
            if !hex && token.value.contains(['.', 'e', 'E']) {
                Some(LiteralKind::Float)
            } else {
                Some(LiteralKind::Int)
            }
        }
        TokenKind::String => Some(LiteralKind::String),
        TokenKind::Keyword(KeywordCategory::Literal) => match token.value.as_str() {
            "true" | "false" => Some(LiteralKind::Bool),
            "null" | "NULL" => Some(LiteralKind::Null),
            _ => None,
        },
        _ => None,
    }
}

/// Primitive keyword, capitalised name, or a name containing `_`.
fn looks_like_type_name(token: &Token) -> bool {
    if token.is_keyword(KeywordCategory::Type) {
        return PRIMITIVES.contains(&token.value.as_str()) || token.is("auto");
    }
    token.is_identifier()
        && (token.value.starts_with(|c: char| c.is_uppercase()) || token.value.contains('_'))
}

fn starts_expression(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier | TokenKind::Number | TokenKind::String => true,
        TokenKind::Keyword(KeywordCategory::Literal | KeywordCategory::Operator | KeywordCategory::Type) => true,
        _ => token.is("(") || token.is("!") || token.is("~"),
    }
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.nested(Parser::parse_assignment)
    }

    /// Parse assignment (right-associative)
    fn parse_assignment(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.peek().start;
        let expr = self.parse_conditional()?;

        let op = match self.peek().kind {
            TokenKind::Operator => AssignOp::from_token(&self.peek().value),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let value = self.nested(Parser::parse_assignment)?;
            return Ok(Expression::Assignment {
                op,
                target: Box::new(expr),
                value: Box::new(value),
                span: self.span_from(start),
            });
        }

        Ok(expr)
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_conditional(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.peek().start;
        let condition = self.parse_logical_or()?;

        if self.match_token("?") {
            let true_expr = self.parse_expression()?;
            self.expect(":", ErrorCategory::Expression, "in conditional expression")?;
            let false_expr = self.nested(Parser::parse_conditional)?;
            return Ok(Expression::Conditional {
                condition: Box::new(condition),
                true_expr: Box::new(true_expr),
                false_expr: Box::new(false_expr),
                span: self.span_from(start),
            });
        }

        Ok(condition)
    }

    /// Left-associative loop shared by the binary tiers.
    fn parse_binary_tier(&mut self, operators: &[&str], next: Tier) -> Result<Expression, SyntaxError> {
        let start = self.peek().start;
        let mut left = next(self)?;

        loop {
            let token = self.peek();
            if token.kind != TokenKind::Operator || !operators.contains(&token.value.as_str()) {
                break;
            }
            let Some(op) = BinOp::from_token(&token.value) else {
                break;
            };
            self.advance();
            let right = next(self)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            };
        }

        Ok(left)
    }

    fn parse_logical_or(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["||"], Parser::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["&&"], Parser::parse_bitwise_or)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["|"], Parser::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["^"], Parser::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["&"], Parser::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["==", "!="], Parser::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["<", ">", "<=", ">="], Parser::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["<<", ">>"], Parser::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["+", "-"], Parser::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_binary_tier(&["*", "/", "%"], Parser::parse_unary)
    }

    /// Parse prefix operators and casts
    fn parse_unary(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.peek().start;

        let op = match self.peek().value.as_str() {
            "-" => Some(UnOp::Neg),
            "+" => Some(UnOp::Plus),
            "!" => Some(UnOp::Not),
            "~" => Some(UnOp::BitNot),
            "++" => Some(UnOp::PreInc),
            "--" => Some(UnOp::PreDec),
            "delete" => Some(UnOp::Delete),
            "thread" => Some(UnOp::Thread),
            _ => None,
        };
        let op = op.filter(|_| matches!(self.peek().kind, TokenKind::Operator | TokenKind::Keyword(_)));

        if let Some(op) = op {
            self.advance();
            let operand = self.nested(Parser::parse_unary)?;
            return Ok(Expression::Unary {
                op,
                operand: Box::new(operand),
                span: self.span_from(start),
            });
        }

        if self.check("(") && self.looks_like_cast() {
            self.advance(); // (
            let name = self.advance();
            let target_type = TypeNode::Reference {
                name: name.value,
                span: Span::new(&self.uri, name.start, name.end),
            };
            self.advance(); // )
            let expr = self.nested(Parser::parse_unary)?;
            return Ok(Expression::Cast {
                target_type,
                expr: Box::new(expr),
                span: self.span_from(start),
            });
        }

        self.parse_postfix()
    }

    /// `( X )` followed by something that starts an expression.
    fn looks_like_cast(&self) -> bool {
        let name = self.peek_at(1);
        looks_like_type_name(name) && self.peek_at(2).is(")") && starts_expression(self.peek_at(3))
    }

    /// Parse postfix: calls, indexing, member access, `++`/`--`
    fn parse_postfix(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.peek().start;
        let mut expr = self.parse_primary()?;

        loop {
            if self.check("(") {
                self.advance();
                let arguments = self.parse_arguments(")")?;
                self.expect(")", ErrorCategory::Expression, "after arguments")?;
                expr = Expression::Call {
                    callee: Box::new(expr),
                    arguments,
                    span: self.span_from(start),
                };
            } else if self.check("[") {
                self.advance();
                let index = self.parse_expression()?;
                self.expect("]", ErrorCategory::Expression, "after index")?;
                expr = Expression::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                    span: self.span_from(start),
                };
            } else if self.check(".") || self.check("->") {
                let arrow = self.advance().is("->");
                expr = self.parse_member(expr, start, arrow)?;
            } else if self.check("++") || self.check("--") {
                let op = if self.advance().is("++") { UnOp::PostInc } else { UnOp::PostDec };
                expr = Expression::Unary {
                    op,
                    operand: Box::new(expr),
                    span: self.span_from(start),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_member(&mut self, object: Expression, start: usize, arrow: bool) -> Result<Expression, SyntaxError> {
        let mut synthetic = false;

        if !self.peek().is_identifier() {
            if self.config.ide_mode {
                // `obj.` while the user is still typing
                let property = Ident::missing(self.previous_end());
                return Ok(Expression::Member {
                    object: Box::new(object),
                    property,
                    arrow,
                    synthetic: true,
                    span: self.span_from(start),
                });
            }
            let failure = self.failure(FailureKind::Missing(Expected::PropertyName), "after member access");
            self.recover(ErrorCategory::Expression, failure)?;
            synthetic = true;
        }

        if !self.peek().is_identifier() {
            return Err(self.error_here(format!("Expected property name, found {}", self.peek())));
        }
        let name = self.advance();
        synthetic |= name.is_synthetic();

        Ok(Expression::Member {
            object: Box::new(object),
            property: Ident::new(name.value, name.start, name.end),
            arrow,
            synthetic,
            span: self.span_from(start),
        })
    }

    /// Comma-separated expressions up to (not including) `close`.
    pub(crate) fn parse_arguments(&mut self, close: &str) -> Result<Vec<Expression>, SyntaxError> {
        let mut arguments = Vec::new();
        if self.check(close) {
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_expression()?);
            if !self.match_token(",") || self.check(close) {
                break;
            }
        }
        Ok(arguments)
    }

    /// Parse primary expressions: literals, names, `new`, grouping, `{...}`
    fn parse_primary(&mut self) -> Result<Expression, SyntaxError> {
        let token = self.peek().clone();
        let start = token.start;

        if let Some(kind) = literal_kind(&token) {
            self.advance();
            return Ok(Expression::Literal {
                kind,
                raw: token.value,
                span: self.span_from(start),
            });
        }

        if token.is("this") || token.is("super") {
            self.advance();
            let span = self.span_from(start);
            return Ok(if token.is("this") {
                Expression::This { span }
            } else {
                Expression::Super { span }
            });
        }

        if token.is("new") {
            self.advance();
            let target_type = self.parse_type()?;
            let mut arguments = Vec::new();
            if self.match_token("(") {
                arguments = self.parse_arguments(")")?;
                self.expect(")", ErrorCategory::Expression, "after constructor arguments")?;
            }
            return Ok(Expression::New {
                target_type,
                arguments,
                span: self.span_from(start),
            });
        }

        if is_type_name(&token) {
            self.advance();
            let type_args = if self.check("<") && self.looks_like_generic_arguments() {
                self.parse_generic_arguments()?
            } else {
                Vec::new()
            };
            return Ok(Expression::Identifier {
                name: token.value,
                type_args,
                span: self.span_from(start),
            });
        }

        if token.is("(") {
            self.advance();
            let expr = self.parse_expression()?;
            self.expect(")", ErrorCategory::Expression, "after expression")?;
            return Ok(expr);
        }

        if token.is("{") {
            self.advance();
            let elements = self.parse_arguments("}")?;
            self.expect("}", ErrorCategory::Expression, "to close array literal")?;
            return Ok(Expression::ArrayLiteral {
                elements,
                span: self.span_from(start),
            });
        }

        let failure = self.failure(FailureKind::Missing(Expected::Expression), "");
        self.recover(ErrorCategory::Expression, failure)?;
        if !self.peek().is_identifier() {
            return Err(self.error_here(format!("Expected expression, found {}", self.peek())));
        }
        let placeholder = self.advance();
        Ok(Expression::Identifier {
            name: placeholder.value,
            type_args: Vec::new(),
            span: self.span_from(start),
        })
    }

    /// Speculate past `<` and one type name; generic only if `,` or `>` follows.
    fn looks_like_generic_arguments(&mut self) -> bool {
        let saved = self.tokens.position();
        self.advance(); // <
        let name = self.advance();
        let generic = is_type_name(&name) && (self.check(",") || self.check(">"));
        self.tokens.set_position(saved);
        generic
    }

    /// Literal where one is required; a bare name is a function reference.
    pub(crate) fn parse_literal(&mut self) -> Result<Expression, SyntaxError> {
        let token = self.peek().clone();
        let start = token.start;

        if let Some(kind) = literal_kind(&token) {
            self.advance();
            return Ok(Expression::Literal {
                kind,
                raw: token.value,
                span: self.span_from(start),
            });
        }

        if token.is("-") && self.peek_at(1).kind == TokenKind::Number {
            self.advance();
            let number = self.advance();
            let kind = literal_kind(&number).unwrap_or(LiteralKind::Int);
            return Ok(Expression::Literal {
                kind,
                raw: format!("-{}", number.value),
                span: self.span_from(start),
            });
        }

        if token.is_identifier() {
            self.advance();
            return Ok(Expression::Literal {
                kind: LiteralKind::FuncReference,
                raw: token.value,
                span: self.span_from(start),
            });
        }

        Err(self.error_here(format!("Expected literal, found {}", token)))
    }
}
