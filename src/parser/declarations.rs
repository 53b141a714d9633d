//! Declaration parsing implementation
//!
//! This module handles the declarations that make up a file or class body:
//!
//! - Classes: `modded class Name<Class T> extends Base { members }`
//! - Enums: `enum Name : int { A, B = 2 }`
//! - Typedefs: `typedef array<string> TStringArray;`
//! - Functions and methods, including constructors and destructors
//! - Variables, with comma-separated declarators sharing one type
//! - Annotations: `[Attribute("0", "slider")]` before any of the above
//!
//! # Grammar
//!
//! ```text
//! declaration ::= annotation* modifier* (class | enum | typedef | function | variables)
//! class       ::= "class" name generic_params? (("extends" | ":") type)? ("{" declaration* "}" | ";")
//! function    ::= type? "~"? name "(" params ")" (block | ";")
//! variables   ::= type declarator ("," declarator)* ";"
//! declarator  ::= name array* ("=" expression)?
//! ```
//!
//! Which of the last two applies is decided by lookahead: modifiers, a type,
//! a name, and then `(`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use std::sync::Arc;

use tracing::debug;

use crate::parser::ast::*;
use crate::parser::lexer::{KeywordCategory, TokenKind};
use crate::parser::parse::{ParseContext, Parser, ProgressGuard, SyntaxError};
use crate::parser::recovery::partial::{scan_partial, PartialKind, PARTIAL_SCAN_WINDOW};
use crate::parser::recovery::{self, ErrorCategory};
use crate::parser::stream::Position;
use crate::parser::types::{is_declaration_modifier, is_type_name};

impl Parser {
    /// Parse one declaration. Comma declarators expand to several.
    pub(crate) fn parse_declaration(&mut self, ctx: &ParseContext) -> Result<Vec<Declaration>, SyntaxError> {
        let start = self.peek().start;
        let annotations = self.parse_annotations()?;
        let modifiers = self.parse_modifiers();

        if self.check("class") {
            let class = self.nested(|parser| parser.parse_class(start, modifiers, annotations))?;
            return Ok(vec![class]);
        }
        if self.check("enum") {
            return Ok(vec![self.parse_enum(start, modifiers, annotations)?]);
        }
        if self.check("typedef") {
            return Ok(vec![self.parse_typedef(start, modifiers, annotations)?]);
        }

        if ctx.class_name.is_some_and(|name| self.looks_like_untyped_constructor(name)) {
            return Ok(vec![self.parse_function(start, modifiers, annotations, ctx, false)?]);
        }
        if self.looks_like_function() {
            return Ok(vec![self.parse_function(start, modifiers, annotations, ctx, true)?]);
        }

        let declarations = self.parse_var_declarators(start, modifiers, annotations, ErrorCategory::Declaration)?;
        self.expect(";", ErrorCategory::Declaration, "after variable declaration")?;
        Ok(declarations.into_iter().map(Declaration::Variable).collect())
    }

    /// Parse `[Name(args), Other]` groups.
    pub(crate) fn parse_annotations(&mut self) -> Result<Vec<Annotation>, SyntaxError> {
        let mut annotations = Vec::new();

        while self.match_token("[") {
            loop {
                let name = self.expect_identifier(ErrorCategory::Declaration, "as annotation name")?;
                let mut annotation = vec![name.name];

                if self.match_token("(") {
                    if !self.check(")") {
                        loop {
                            if let Expression::Literal { raw, .. } = self.parse_literal()? {
                                annotation.push(raw);
                            }
                            if !self.match_token(",") {
                                break;
                            }
                        }
                    }
                    self.expect(")", ErrorCategory::Declaration, "after annotation arguments")?;
                }

                annotations.push(annotation);
                if !self.match_token(",") {
                    break;
                }
            }
            self.expect("]", ErrorCategory::Declaration, "to close annotation")?;
        }

        Ok(annotations)
    }

    /// Modifier and storage keywords, in source order.
    pub(crate) fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while is_declaration_modifier(self.peek()) {
            modifiers.push(self.advance().value);
        }
        modifiers
    }

    /// Parse class: class Name<Class T> extends Base { members }
    fn parse_class(
        &mut self,
        start: usize,
        modifiers: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Result<Declaration, SyntaxError> {
        self.advance(); // class
        let ident = self.expect_identifier(ErrorCategory::Declaration, "after 'class'")?;

        let generic_params = if self.check("<") {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let base_class = if self.match_token("extends") || self.match_token(":") {
            Some(self.parse_type()?)
        } else {
            None
        };

        // forward declaration
        if self.match_token(";") {
            return Ok(Declaration::Class(ClassDecl {
                span: self.span_from(start),
                ident,
                modifiers,
                annotations,
                generic_params,
                base_class,
                members: Vec::new(),
            }));
        }

        self.expect("{", ErrorCategory::Declaration, "to open class body")?;
        let members = self.parse_class_members(&ParseContext::for_class(&ident.name))?;
        self.expect("}", ErrorCategory::Declaration, &format!("to close class '{}'", ident.name))?;
        self.match_token(";");

        Ok(Declaration::Class(ClassDecl {
            span: self.span_from(start),
            ident,
            modifiers,
            annotations,
            generic_params,
            base_class,
            members,
        }))
    }

    fn parse_class_members(&mut self, ctx: &ParseContext) -> Result<Vec<Declaration>, SyntaxError> {
        let mut members = Vec::new();
        let mut progress = ProgressGuard::default();

        while !self.check("}") && !self.is_at_end() {
            let position = self.tokens.position();
            if progress.is_stuck(position) {
                self.force_progress();
                continue;
            }

            if self.check(";") {
                self.skip_stray_token(ErrorCategory::Declaration, "in class body")?;
                continue;
            }

            match self.parse_declaration(ctx) {
                Ok(declarations) => members.extend(declarations),
                Err(err) => {
                    if !self.config.error_recovery {
                        return Err(err);
                    }
                    self.report_error(err.message, err.offset);
                    members.extend(self.recover_partial_declaration(position));
                    self.resume_or_synchronize(position);
                }
            }
        }

        Ok(members)
    }

    /// `<Class T, U>` after a class or function name.
    fn parse_generic_params(&mut self) -> Result<Vec<GenericParameter>, SyntaxError> {
        self.advance(); // <
        let mut params = Vec::new();

        loop {
            let start = self.peek().start;
            if !is_type_name(self.peek()) {
                return Err(self.error_here(format!("Expected generic parameter, found {}", self.peek())));
            }
            let first = self.advance();

            let (constraint, ident) = if self.peek().is_identifier() {
                let name = self.advance();
                let constraint = TypeNode::Reference {
                    name: first.value,
                    span: Span::new(&self.uri, first.start, first.end),
                };
                (Some(constraint), Ident::new(name.value, name.start, name.end))
            } else {
                (None, Ident::new(first.value, first.start, first.end))
            };

            params.push(GenericParameter {
                span: self.span_from(start),
                ident,
                constraint,
                modifiers: Vec::new(),
                annotations: Vec::new(),
            });

            if !self.match_token(",") {
                break;
            }
        }

        self.expect(">", ErrorCategory::Declaration, "to close generic parameters")?;
        Ok(params)
    }

    /// Parse enum: enum Name : base { A, B = 2 }
    fn parse_enum(
        &mut self,
        start: usize,
        modifiers: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Result<Declaration, SyntaxError> {
        self.advance(); // enum
        let ident = self.expect_identifier(ErrorCategory::Declaration, "after 'enum'")?;

        let base_type = if self.match_token(":") || self.match_token("extends") {
            if !is_type_name(self.peek()) {
                return Err(self.error_here(format!("Expected enum base type, found {}", self.peek())));
            }
            Some(self.advance().value)
        } else {
            None
        };

        self.expect("{", ErrorCategory::Declaration, "to open enum body")?;

        let mut members = Vec::new();
        let mut progress = ProgressGuard::default();

        while !self.check("}") && !self.is_at_end() {
            let position = self.tokens.position();
            if progress.is_stuck(position) {
                self.force_progress();
                continue;
            }

            let member_start = self.peek().start;
            let member_annotations = self.parse_annotations()?;
            let name = match self.expect_identifier(ErrorCategory::Declaration, "as enum member") {
                Ok(name) => name,
                Err(err) => {
                    if !self.config.error_recovery {
                        return Err(err);
                    }
                    self.report_error(err.message, err.offset);
                    recovery::skip_to_recovery_point_mut(&mut self.tokens, &[",", "}"], &[]);
                    self.match_token(",");
                    continue;
                }
            };

            let value = if self.match_token("=") {
                Some(self.parse_expression()?)
            } else {
                None
            };

            members.push(EnumMemberDecl {
                span: self.span_from(member_start),
                ident: name,
                modifiers: Vec::new(),
                annotations: member_annotations,
                value,
            });

            if self.match_token(",") {
                continue;
            }
            if self.check("}") || self.is_at_end() {
                break;
            }
            self.expect(",", ErrorCategory::Declaration, "between enum members")?;
        }

        self.expect("}", ErrorCategory::Declaration, &format!("to close enum '{}'", ident.name))?;
        self.match_token(";");

        Ok(Declaration::Enum(EnumDecl {
            span: self.span_from(start),
            ident,
            modifiers,
            annotations,
            base_type,
            members,
        }))
    }

    /// Parse typedef: typedef type Name;
    fn parse_typedef(
        &mut self,
        start: usize,
        modifiers: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Result<Declaration, SyntaxError> {
        self.advance(); // typedef
        let aliased_type = self.parse_type()?;
        let ident = self.expect_identifier(ErrorCategory::Declaration, "as typedef name")?;
        self.expect(";", ErrorCategory::Declaration, "after typedef")?;

        Ok(Declaration::Typedef(TypedefDecl {
            span: self.span_from(start),
            ident,
            modifiers,
            annotations,
            aliased_type,
        }))
    }

    /// Modifiers, a type, optional `~`, a name, then `(`.
    fn looks_like_function(&self) -> bool {
        let pos = self.skip_modifiers_at(self.tokens.position());
        let Some(pos) = self.skip_type_at(pos) else {
            return false;
        };

        let (mut at, mut name) = self.tokens.significant_at(pos);
        if name.is("~") {
            (at, name) = self.tokens.significant_at(self.tokens.step(at));
        }
        name.is_identifier() && self.tokens.significant_at(self.tokens.step(at)).1.is("(")
    }

    /// `ClassName(` or `~ClassName(` with no return type.
    fn looks_like_untyped_constructor(&self, class_name: &str) -> bool {
        let pos = self.skip_modifiers_at(self.tokens.position());
        let (mut at, mut name) = self.tokens.significant_at(pos);
        if name.is("~") {
            (at, name) = self.tokens.significant_at(self.tokens.step(at));
        }
        name.is_identifier() && name.value == class_name && self.tokens.significant_at(self.tokens.step(at)).1.is("(")
    }

    /// Parse function: type name(params) { body } or ;
    fn parse_function(
        &mut self,
        start: usize,
        modifiers: Vec<String>,
        annotations: Vec<Annotation>,
        ctx: &ParseContext,
        has_return_type: bool,
    ) -> Result<Declaration, SyntaxError> {
        let return_type = if has_return_type {
            self.parse_type()?
        } else {
            let offset = self.peek().start;
            TypeNode::Reference {
                name: "void".to_string(),
                span: Span::new(&self.uri, offset, offset),
            }
        };

        let tilde = self.match_token("~");
        let ident = self.expect_identifier(ErrorCategory::Declaration, "as function name")?;

        let generic_params = if self.check("<") {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        self.expect("(", ErrorCategory::Declaration, "after function name")?;
        let parameters = self.parse_parameters()?;
        self.expect(")", ErrorCategory::Declaration, "after parameters")?;

        let body = if self.check("{") {
            if self.config.skip_function_bodies {
                Some(self.skip_function_body()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            self.expect(";", ErrorCategory::Declaration, "after function declaration")?;
            None
        };

        let function = FunctionDecl {
            span: self.span_from(start),
            ident,
            modifiers,
            annotations,
            return_type,
            generic_params,
            parameters,
            body,
        };

        let Some(class_name) = ctx.class_name else {
            if tilde {
                self.report_error("Destructor declared outside of a class", function.ident.start);
            }
            return Ok(Declaration::Function(function));
        };

        let kind = if tilde {
            MethodKind::Destructor
        } else if function.ident.name == class_name {
            MethodKind::Constructor
        } else {
            MethodKind::Method
        };

        if tilde && function.ident.name != class_name {
            self.report_error(
                format!("Destructor '~{}' does not match class '{}'", function.ident.name, class_name),
                function.ident.start,
            );
        }

        if kind != MethodKind::Method {
            let label = if kind == MethodKind::Constructor { "Constructor" } else { "Destructor" };
            if !has_return_type {
                self.report_error(
                    format!("{} '{}' must declare return type 'void'", label, function.ident.name),
                    function.ident.start,
                );
            } else if !function.return_type.is_void() {
                self.report_error(
                    format!("{} '{}' must return 'void'", label, function.ident.name),
                    function.return_type.span().start,
                );
            }
        }

        Ok(Declaration::Method(MethodDecl {
            function,
            kind,
            class_name: class_name.to_string(),
        }))
    }

    /// Parse parameter list: (type name, out type name = default, ...)
    fn parse_parameters(&mut self) -> Result<Vec<ParameterDecl>, SyntaxError> {
        let mut params = Vec::new();

        if self.check(")") {
            return Ok(params);
        }
        if self.check("void") && self.peek_at(1).is(")") {
            self.advance();
            return Ok(params);
        }

        loop {
            let start = self.peek().start;
            let annotations = self.parse_annotations()?;
            let modifiers = self.parse_modifiers();
            let type_start = self.peek().start;
            let mut param_type = self.parse_type()?;
            let ident = self.expect_identifier(ErrorCategory::Declaration, "as parameter name")?;

            while self.check("[") {
                param_type = self.parse_array_suffix(param_type, type_start)?;
            }

            let default_value = if self.match_token("=") {
                Some(self.parse_expression()?)
            } else {
                None
            };

            params.push(ParameterDecl {
                span: self.span_from(start),
                ident,
                modifiers,
                annotations,
                param_type,
                default_value,
            });

            if !self.match_token(",") {
                break;
            }
        }

        Ok(params)
    }

    /// Brace-balance over a body without building statements.
    fn skip_function_body(&mut self) -> Result<Block, SyntaxError> {
        let start = self.advance().start; // {
        let mut depth = 1;

        while !self.is_at_end() {
            if self.check("{") {
                depth += 1;
            } else if self.check("}") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            self.advance();
        }

        self.expect("}", ErrorCategory::Declaration, "to close function body")?;
        Ok(Block {
            statements: Vec::new(),
            span: self.span_from(start),
        })
    }

    /// Type followed by `name [= value]` declarators separated by commas.
    ///
    /// Every declarator shares the parsed type unless it carries its own
    /// array suffix; only the first one's span starts at `start`.
    pub(crate) fn parse_var_declarators(
        &mut self,
        start: usize,
        modifiers: Vec<String>,
        annotations: Vec<Annotation>,
        category: ErrorCategory,
    ) -> Result<Vec<VarDecl>, SyntaxError> {
        let type_start = self.peek().start;
        let var_type = Arc::new(self.parse_type()?);
        let mut declarations: Vec<VarDecl> = Vec::new();

        loop {
            let ident = self.expect_identifier(category, "as variable name")?;
            let decl_start = if declarations.is_empty() { start } else { ident.start };

            let mut decl_type = Arc::clone(&var_type);
            if self.check("[") {
                let mut ty = (*var_type).clone();
                while self.check("[") {
                    ty = self.parse_array_suffix(ty, type_start)?;
                }
                decl_type = Arc::new(ty);
            }

            let initializer = if self.match_token("=") {
                Some(self.parse_expression()?)
            } else {
                None
            };

            declarations.push(VarDecl {
                span: self.span_from(decl_start),
                ident,
                modifiers: modifiers.clone(),
                annotations: annotations.clone(),
                var_type: decl_type,
                initializer,
            });

            if !self.match_token(",") {
                break;
            }
        }

        Ok(declarations)
    }

    // ===== Recovery =====

    /// After a failed declaration that started at `from`: carry on from a
    /// declaration keyword if the failure already moved past its start,
    /// otherwise skip to the next recovery point.
    pub(crate) fn resume_or_synchronize(&mut self, from: Position) {
        let started = self.tokens.significant_at(from).0;
        let here = self.tokens.significant_at(self.tokens.position()).0;
        let token = self.peek();
        if here > started && token.is_keyword(KeywordCategory::Declaration) && !token.is("extends") {
            return;
        }

        let kinds = [TokenKind::Keyword(KeywordCategory::Declaration)];
        recovery::skip_to_recovery_point_mut(&mut self.tokens, &[";", "}"], &kinds);
    }

    /// Placeholder for whatever the tokens consumed since `from` were
    /// declaring, if that can still be told.
    pub(crate) fn recover_partial_declaration(&mut self, from: Position) -> Option<Declaration> {
        let partial = {
            let window = self.tokens.consumed_since(from, PARTIAL_SCAN_WINDOW);
            scan_partial(&window)?
        };

        if self.config.debug {
            debug!(kind = ?partial.kind, name = %partial.name.value, "recovered partial declaration");
        }

        let ident = Ident::new(partial.name.value.clone(), partial.name.start, partial.name.end);
        let span = Span::new(&self.uri, partial.start, self.previous_end().max(partial.name.end));
        let declared_type = |uri: &Arc<str>| {
            partial
                .type_token
                .as_ref()
                .map(|t| TypeNode::Reference {
                    name: t.value.clone(),
                    span: Span::new(uri, t.start, t.end),
                })
                .unwrap_or_else(|| TypeNode::Auto {
                    span: Span::new(uri, ident.start, ident.start),
                })
        };

        let declaration = match partial.kind {
            PartialKind::Class => Declaration::Class(ClassDecl {
                span,
                ident: ident.clone(),
                modifiers: Vec::new(),
                annotations: Vec::new(),
                generic_params: Vec::new(),
                base_class: None,
                members: Vec::new(),
            }),
            PartialKind::Enum => Declaration::Enum(EnumDecl {
                span,
                ident: ident.clone(),
                modifiers: Vec::new(),
                annotations: Vec::new(),
                base_type: None,
                members: Vec::new(),
            }),
            PartialKind::Typedef => Declaration::Typedef(TypedefDecl {
                aliased_type: declared_type(&self.uri),
                span,
                ident: ident.clone(),
                modifiers: Vec::new(),
                annotations: Vec::new(),
            }),
            PartialKind::Function => Declaration::Function(FunctionDecl {
                return_type: declared_type(&self.uri),
                span,
                ident: ident.clone(),
                modifiers: Vec::new(),
                annotations: Vec::new(),
                generic_params: Vec::new(),
                parameters: Vec::new(),
                body: None,
            }),
            PartialKind::Variable => Declaration::Variable(VarDecl {
                var_type: Arc::new(declared_type(&self.uri)),
                span,
                ident: ident.clone(),
                modifiers: Vec::new(),
                annotations: Vec::new(),
                initializer: None,
            }),
        };
        Some(declaration)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::{parse, ParseOutput, ParserConfig};

    fn parse_ok(source: &str) -> ParseOutput {
        let output = parse("test.c", source, 1, &ParserConfig::default());
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        output
    }

    #[test]
    fn test_parse_class() {
        let output = parse_ok("modded class Point extends Base { int x; int y; void Move(int dx) {} };");
        let class = output.file.body[0].as_class().expect("class");

        assert_eq!(class.ident.name, "Point");
        assert_eq!(class.modifiers, ["modded"]);
        assert_eq!(class.base_class.as_ref().map(|t| t.name()), Some("Base"));
        assert_eq!(class.members.len(), 3);
        assert!(matches!(&class.members[2], Declaration::Method(m) if m.kind == MethodKind::Method));
    }

    #[test]
    fn test_ident_spans_identifier_only() {
        let source = "class Foo {}";
        let output = parse_ok(source);
        let ident = output.file.body[0].ident();
        assert_eq!((ident.start, ident.end), (6, 9));
        assert_eq!(output.file.body[0].span().start, 0);
    }

    #[test]
    fn test_constructor_and_destructor() {
        let output = parse_ok("class A { void A(); void ~A() {} }");
        let class = output.file.body[0].as_class().expect("class");
        assert!(matches!(&class.members[0], Declaration::Method(m) if m.kind == MethodKind::Constructor));
        assert!(matches!(&class.members[1], Declaration::Method(m) if m.kind == MethodKind::Destructor));
    }

    #[test]
    fn test_constructor_must_return_void() {
        let output = parse("test.c", "class A { int A(); }", 1, &ParserConfig::default());
        assert_eq!(output.errors().count(), 1);

        let output = parse("test.c", "class A { A(); }", 1, &ParserConfig::default());
        assert_eq!(output.errors().count(), 1);
        assert!(output.file.body[0].as_class().is_some_and(|c| c.members.len() == 1));
    }

    #[test]
    fn test_nested_class_context() {
        let output = parse_ok("class Outer { class Inner { void Inner(); } void Outer(); }");
        let outer = output.file.body[0].as_class().expect("outer");
        let inner = outer.members[0].as_class().expect("inner");
        assert!(matches!(&inner.members[0], Declaration::Method(m) if m.class_name == "Inner" && m.kind == MethodKind::Constructor));
        assert!(matches!(&outer.members[1], Declaration::Method(m) if m.class_name == "Outer" && m.kind == MethodKind::Constructor));
    }

    #[test]
    fn test_comma_declarations_share_type() {
        let output = parse_ok("static int a, b[2], c = 3;");
        let vars: Vec<&VarDecl> = output.file.body.iter().filter_map(|d| d.as_variable()).collect();

        assert_eq!(vars.len(), 3);
        assert!(std::sync::Arc::ptr_eq(&vars[0].var_type, &vars[2].var_type));
        assert!(matches!(*vars[1].var_type, TypeNode::Array { .. }));
        assert_eq!(vars[0].span.start, 0);
        assert_eq!(vars[2].span.start, vars[2].ident.start);
        assert_eq!(vars[2].modifiers, ["static"]);
    }

    #[test]
    fn test_enum_and_typedef() {
        let output = parse_ok("enum Color : int { RED, GREEN = 2, BLUE, } typedef array<string> TStringArray;");
        match &output.file.body[0] {
            Declaration::Enum(e) => {
                assert_eq!(e.base_type.as_deref(), Some("int"));
                assert_eq!(e.members.len(), 3);
                assert!(e.members[1].value.is_some());
            }
            _ => panic!("Expected enum"),
        }
        assert!(matches!(&output.file.body[1], Declaration::Typedef(t) if t.ident.name == "TStringArray"));
    }

    #[test]
    fn test_annotations_and_parameters() {
        let output = parse_ok(
            "[Attribute(\"0\", \"slider\", -1, OnChanged)] proto native void Set(out int a, float b = 0.5, notnull Foo c);",
        );
        let func = output.file.body[0].as_function().expect("function");

        assert_eq!(func.annotations[0], ["Attribute", "\"0\"", "\"slider\"", "-1", "OnChanged"]);
        assert_eq!(func.modifiers, ["proto", "native"]);
        assert!(func.body.is_none());
        assert_eq!(func.parameters.len(), 3);
        assert_eq!(func.parameters[0].modifiers, ["out"]);
        assert!(func.parameters[1].default_value.is_some());
    }

    #[test]
    fn test_generic_class() {
        let output = parse_ok("class Container<Class T> { T m_Value; }");
        let class = output.file.body[0].as_class().expect("class");
        assert_eq!(class.generic_params.len(), 1);
        assert_eq!(class.generic_params[0].ident.name, "T");
        assert!(class.generic_params[0].constraint.is_some());
    }

    #[test]
    fn test_skip_function_bodies() {
        let config = ParserConfig {
            skip_function_bodies: true,
            ..ParserConfig::default()
        };
        let output = parse("test.c", "void f() { if (x) { y(); } } int z;", 1, &config);
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.file.body.len(), 2);
        let func = output.file.body[0].as_function().expect("function");
        assert!(func.body.as_ref().is_some_and(|b| b.statements.is_empty()));
    }

    #[test]
    fn test_partial_class_placeholder() {
        let output = parse("test.c", "class Broken extends", 1, &ParserConfig::default());
        assert!(output.has_errors());
        assert!(matches!(&output.file.body[0], Declaration::Class(c) if c.ident.name == "Broken"));
    }

    #[test]
    fn test_forward_declaration() {
        let output = parse_ok("class Later; class Later {}");
        assert_eq!(output.file.body.len(), 2);
    }
}
