//! Statement parsing implementation
//!
//! This module handles parsing of all statement types inside function bodies:
//!
//! - Variable declarations: `int x = 42;`, `auto a, b;`
//! - Control flow: `if`, `while`, `for`, `foreach`, `switch`
//! - Jump statements: `return`, `break`, `continue`
//! - Compound statements: `{ ... }`
//! - Expression statements: function calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= block | if_stmt | while_stmt | for_stmt | foreach_stmt
//!             | switch_stmt | return_stmt | break_stmt | continue_stmt
//!             | var_decl | expr_stmt | ";"
//! ```
//!
//! A failing statement is reported and skipped up to the next `;`, `}` or
//! control keyword; the rest of the block still parses.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use std::sync::Arc;

use crate::parser::ast::*;
use crate::parser::lexer::{KeywordCategory, Token, TokenKind};
use crate::parser::parse::{Parser, ProgressGuard, SyntaxError};
use crate::parser::recovery::{self, ErrorCategory, FailureKind};

/// Hard ceiling on statements parsed by one block loop.
pub const MAX_BLOCK_ITERATIONS: usize = 10_000;

/// Tokens that may follow the name in a local variable declaration.
const AFTER_LOCAL_NAME: [&str; 6] = ["=", ";", ",", "[", ")", ":"];

fn is_block_end(token: &Token) -> bool {
    token.is("}")
}

fn is_case_end(token: &Token) -> bool {
    token.is("}") || token.is("case") || token.is("default")
}

impl Parser {
    /// Parse `{ statements }`
    pub(crate) fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let start = self.peek().start;
        self.expect("{", ErrorCategory::Statement, "to open block")?;
        let statements = self.parse_statements_until(is_block_end)?;
        self.expect("}", ErrorCategory::Statement, "to close block")?;

        Ok(Block {
            statements,
            span: self.span_from(start),
        })
    }

    /// Parse statements until `stop` matches or the file ends.
    fn parse_statements_until(&mut self, stop: fn(&Token) -> bool) -> Result<Vec<Statement>, SyntaxError> {
        let mut statements = Vec::new();
        let mut iterations = 0;
        let mut progress = ProgressGuard::default();

        while !stop(self.peek()) && !self.is_at_end() {
            iterations += 1;
            if iterations > MAX_BLOCK_ITERATIONS {
                let offset = self.peek().start;
                self.report_error("Block too long; giving up on the rest of it", offset);
                break;
            }

            if progress.is_stuck(self.tokens.position()) {
                self.force_progress();
                continue;
            }

            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    if !self.config.error_recovery {
                        return Err(err);
                    }
                    self.report_error(err.message, err.offset);
                    self.synchronize_statement();
                }
            }
        }

        Ok(statements)
    }

    /// Skip to the next `;` (consumed), `}` or control keyword.
    pub(crate) fn synchronize_statement(&mut self) {
        let kinds = [TokenKind::Keyword(KeywordCategory::Control)];
        recovery::skip_to_recovery_point_mut(&mut self.tokens, &[";", "}"], &kinds);
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        self.nested(Parser::parse_statement_here)
    }

    fn parse_statement_here(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.peek().start;

        if self.peek().is_keyword(KeywordCategory::Control) {
            match self.peek().value.as_str() {
                "if" => return self.parse_if_statement(),
                "while" => return self.parse_while_statement(),
                "for" => return self.parse_for_statement(),
                "foreach" => return self.parse_foreach_statement(),
                "switch" => return self.parse_switch_statement(),
                "return" => return self.parse_return_statement(),
                "break" | "continue" => {
                    let is_break = self.advance().is("break");
                    self.expect(";", ErrorCategory::Statement, "after jump statement")?;
                    let span = self.span_from(start);
                    return Ok(if is_break {
                        Statement::Break { span }
                    } else {
                        Statement::Continue { span }
                    });
                }
                "else" => {
                    let failure = self.failure(FailureKind::OrphanedElse, "");
                    self.recover(ErrorCategory::Statement, failure)?;
                    return self.parse_statement();
                }
                "case" | "default" => {
                    let failure = self.failure(FailureKind::Unexpected, "outside of switch");
                    self.recover(ErrorCategory::Statement, failure)?;
                    return Ok(Statement::Block(Block {
                        statements: Vec::new(),
                        span: self.span_from(start),
                    }));
                }
                _ => {}
            }
        }

        if self.check("{") {
            return Ok(Statement::Block(self.parse_block()?));
        }

        if self.match_token(";") {
            return Ok(Statement::Block(Block {
                statements: Vec::new(),
                span: self.span_from(start),
            }));
        }

        if self.looks_like_variable_declaration() {
            let modifiers = self.parse_modifiers();
            let declarations = self.parse_var_declarators(start, modifiers, Vec::new(), ErrorCategory::Statement)?;
            self.expect(";", ErrorCategory::Statement, "after variable declaration")?;
            return Ok(Statement::Declaration {
                declarations,
                span: self.span_from(start),
            });
        }

        let expression = self.parse_expression()?;
        self.expect(";", ErrorCategory::Statement, "after expression")?;
        Ok(Statement::Expression {
            expression,
            span: self.span_from(start),
        })
    }

    /// Modifiers, a type, a name, then one of `= ; , [ ) :`.
    pub(crate) fn looks_like_variable_declaration(&self) -> bool {
        let pos = self.skip_modifiers_at(self.tokens.position());
        let Some(pos) = self.skip_type_at(pos) else {
            return false;
        };
        let (at, name) = self.tokens.significant_at(pos);
        if !name.is_identifier() {
            return false;
        }
        let next = self.tokens.significant_at(self.tokens.step(at)).1;
        AFTER_LOCAL_NAME.iter().any(|v| next.is(v))
    }

    /// Parse if statement: if (condition) statement [else statement]
    fn parse_if_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().start;

        self.expect("(", ErrorCategory::Statement, "after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(")", ErrorCategory::Statement, "after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token("else") {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        })
    }

    /// Parse while statement: while (condition) statement
    fn parse_while_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().start;

        self.expect("(", ErrorCategory::Statement, "after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(")", ErrorCategory::Statement, "after while condition")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    /// Parse for statement: for (init; condition; update) statement
    fn parse_for_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().start;
        self.expect("(", ErrorCategory::Statement, "after 'for'")?;

        let mut init = Vec::new();
        if !self.check(";") {
            let init_start = self.peek().start;
            if self.looks_like_variable_declaration() {
                let modifiers = self.parse_modifiers();
                let declarations = self.parse_var_declarators(init_start, modifiers, Vec::new(), ErrorCategory::Statement)?;
                init.push(Statement::Declaration {
                    declarations,
                    span: self.span_from(init_start),
                });
            } else {
                loop {
                    let expr_start = self.peek().start;
                    let expression = self.parse_expression()?;
                    init.push(Statement::Expression {
                        expression,
                        span: self.span_from(expr_start),
                    });
                    if !self.match_token(",") {
                        break;
                    }
                }
            }
        }
        self.expect(";", ErrorCategory::Statement, "after for initializer")?;

        let condition = if self.check(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(";", ErrorCategory::Statement, "after for condition")?;

        let mut update = Vec::new();
        if !self.check(")") && !self.check(";") {
            loop {
                update.push(self.parse_expression()?);
                if !self.match_token(",") {
                    break;
                }
            }
        }
        if self.check(";") {
            self.skip_stray_token(ErrorCategory::Statement, "in for loop update clause")?;
        }
        self.expect(")", ErrorCategory::Statement, "after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::For {
            init,
            condition,
            update,
            body,
            span: self.span_from(start),
        })
    }

    /// Parse foreach statement: foreach (T a, U b : iterable) statement
    fn parse_foreach_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().start;
        self.expect("(", ErrorCategory::Statement, "after 'foreach'")?;

        let mut variables = Vec::new();
        loop {
            let var_start = self.peek().start;
            let modifiers = self.parse_modifiers();
            let var_type = Arc::new(self.parse_type()?);
            let ident = self.expect_identifier(ErrorCategory::Statement, "as loop variable")?;
            variables.push(VarDecl {
                span: self.span_from(var_start),
                ident,
                modifiers,
                annotations: Vec::new(),
                var_type,
                initializer: None,
            });
            if !self.match_token(",") {
                break;
            }
        }

        self.expect(":", ErrorCategory::Statement, "after loop variables")?;
        let iterable = self.parse_expression()?;
        self.expect(")", ErrorCategory::Statement, "after foreach collection")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::ForEach {
            variables,
            iterable,
            body,
            span: self.span_from(start),
        })
    }

    /// Parse switch statement: switch (expr) { case value: statements... }
    fn parse_switch_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().start;

        self.expect("(", ErrorCategory::Statement, "after 'switch'")?;
        let discriminant = self.parse_expression()?;
        self.expect(")", ErrorCategory::Statement, "after switch value")?;
        self.expect("{", ErrorCategory::Statement, "to open switch body")?;

        let mut cases = Vec::new();
        while !self.check("}") && !self.is_at_end() {
            let case_start = self.peek().start;
            let test = if self.match_token("case") {
                Some(self.parse_expression()?)
            } else if self.match_token("default") {
                None
            } else {
                let failure = self.failure(FailureKind::Unexpected, "in switch body");
                self.recover(ErrorCategory::Statement, failure)?;
                continue;
            };

            self.expect(":", ErrorCategory::Statement, "after case label")?;
            let body = self.parse_statements_until(is_case_end)?;
            cases.push(CaseClause {
                test,
                body,
                span: self.span_from(case_start),
            });
        }

        self.expect("}", ErrorCategory::Statement, "to close switch")?;

        Ok(Statement::Switch {
            discriminant,
            cases,
            span: self.span_from(start),
        })
    }

    /// Parse return statement: return [expr];
    fn parse_return_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().start;

        let argument = if self.check(";") || self.check("}") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(";", ErrorCategory::Statement, "after return statement")?;

        Ok(Statement::Return {
            argument,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MAX_BLOCK_ITERATIONS;
    use crate::parser::ast::*;
    use crate::parser::{parse, ParseOutput, ParserConfig};

    fn parse_body(body: &str) -> (Vec<Statement>, ParseOutput) {
        let text = format!("void f() {{ {} }}", body);
        let output = parse("test.c", &text, 1, &ParserConfig::default());
        let statements = match output.file.body.first() {
            Some(Declaration::Function(func)) => func.body.as_ref().expect("body").statements.clone(),
            _ => panic!("Expected function"),
        };
        (statements, output)
    }

    #[test]
    fn test_parse_if_else() {
        let (stmts, output) = parse_body("if (x > 0) return 1; else return 0;");
        assert!(output.diagnostics.is_empty());
        assert!(matches!(&stmts[0], Statement::If { else_branch: Some(_), .. }));
    }

    #[test]
    fn test_parse_for_with_declarations() {
        let (stmts, output) = parse_body("for (int i = 0, j = 10; i < j; i++, j--) {}");
        assert!(output.diagnostics.is_empty());
        match &stmts[0] {
            Statement::For { init, update, .. } => {
                assert!(matches!(&init[0], Statement::Declaration { declarations, .. } if declarations.len() == 2));
                assert_eq!(update.len(), 2);
            }
            _ => panic!("Expected for statement"),
        }
    }

    #[test]
    fn test_redundant_semicolon_in_for_update() {
        let (stmts, output) = parse_body("for (int i = 0; i < 3; i++;) {}");
        assert!(matches!(&stmts[0], Statement::For { .. }));
        assert!(!output.has_errors());
        assert_eq!(output.warnings().count(), 1);
    }

    #[test]
    fn test_parse_foreach() {
        let (stmts, output) = parse_body("foreach (int i, string name : names) Print(name);");
        assert!(output.diagnostics.is_empty());
        assert!(matches!(&stmts[0], Statement::ForEach { variables, .. } if variables.len() == 2));
    }

    #[test]
    fn test_parse_switch() {
        let (stmts, output) = parse_body("switch (x) { case 1: a(); break; case 2: default: b(); }");
        assert!(output.diagnostics.is_empty());
        match &stmts[0] {
            Statement::Switch { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert!(cases[2].test.is_none());
                assert_eq!(cases[0].body.len(), 2);
            }
            _ => panic!("Expected switch"),
        }
    }

    #[test]
    fn test_orphaned_else_is_error() {
        let (stmts, output) = parse_body("else x = 1;");
        assert_eq!(output.errors().count(), 1);
        assert!(matches!(&stmts[0], Statement::Expression { .. }));
    }

    #[test]
    fn test_bad_statement_does_not_lose_block() {
        let (stmts, output) = parse_body("x = ; y = 2;");
        assert!(output.has_errors());
        assert!(matches!(stmts.last(), Some(Statement::Expression { .. })));
    }

    #[test]
    fn test_local_declarations() {
        let (stmts, _) = parse_body("ref array<int> values = new array<int>(); Man m;");
        assert!(matches!(&stmts[0], Statement::Declaration { declarations, .. } if declarations[0].modifiers == ["ref"]));
        assert!(matches!(&stmts[1], Statement::Declaration { .. }));
    }

    #[test]
    fn test_block_iteration_ceiling() {
        let body = "; ".repeat(MAX_BLOCK_ITERATIONS + 1);
        let (statements, output) = parse_body(&body);

        assert_eq!(statements.len(), MAX_BLOCK_ITERATIONS);
        assert!(output
            .errors()
            .any(|e| e.message.contains("Block too long")));
    }
}
