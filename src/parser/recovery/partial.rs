//! Salvaging half-parsed declarations
//!
//! When a declaration fails beyond repair, the tokens it consumed usually
//! still say what it was going to be: `class Foo extends` is clearly a class
//! named `Foo`. Scanning them backward lets the parser keep a placeholder in
//! the outline instead of losing the name entirely.

use crate::parser::lexer::{KeywordCategory, Token};

/// How many consumed tokens the backward scan looks at.
pub const PARTIAL_SCAN_WINDOW: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialKind {
    Class,
    Enum,
    Typedef,
    Function,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDeclaration {
    pub kind: PartialKind,
    pub name: Token,
    /// Declared type (functions and variables)
    pub type_token: Option<Token>,
    /// Offset of the first token that belongs to the declaration.
    pub start: usize,
}

fn is_type_token(token: &Token) -> bool {
    token.is_identifier() || token.is_keyword(KeywordCategory::Type) || token.is(">") || token.is("]")
}

/// Scan `window` (oldest first) from the end for the declaration in progress.
pub fn scan_partial(window: &[&Token]) -> Option<PartialDeclaration> {
    let window = &window[window.len().saturating_sub(PARTIAL_SCAN_WINDOW)..];

    for i in (0..window.len()).rev() {
        let token = window[i];

        if token.is("class") || token.is("enum") {
            let name = window.get(i + 1).filter(|t| t.is_identifier())?;
            let kind = if token.is("class") { PartialKind::Class } else { PartialKind::Enum };
            return Some(PartialDeclaration {
                kind,
                name: (*name).clone(),
                type_token: None,
                start: token.start,
            });
        }

        if token.is("typedef") {
            let name = window[i + 1..].iter().rev().find(|t| t.is_identifier())?;
            let type_token = window
                .get(i + 1)
                .filter(|t| is_type_token(t) && t.start != name.start)
                .map(|t| (*t).clone());
            return Some(PartialDeclaration {
                kind: PartialKind::Typedef,
                name: (*name).clone(),
                type_token,
                start: token.start,
            });
        }

        if i >= 2 && (token.is("(") || token.is("=")) {
            let name = window[i - 1];
            let ty = window[i - 2];
            if name.is_identifier() && is_type_token(ty) {
                let kind = if token.is("(") { PartialKind::Function } else { PartialKind::Variable };
                return Some(PartialDeclaration {
                    kind,
                    name: name.clone(),
                    type_token: Some(ty.clone()),
                    start: ty.start,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{lex, LexOptions};

    fn scan(source: &str) -> Option<PartialDeclaration> {
        let tokens = lex(source, &LexOptions::default());
        let window: Vec<&Token> = tokens.iter().filter(|t| !t.is_eof()).collect();
        scan_partial(&window)
    }

    #[test]
    fn test_class_in_progress() {
        let partial = scan("class Foo extends").expect("class");
        assert_eq!(partial.kind, PartialKind::Class);
        assert_eq!(partial.name.value, "Foo");
        assert_eq!(partial.start, 0);
    }

    #[test]
    fn test_function_in_progress() {
        let partial = scan("void Update(float dt, ").expect("function");
        assert_eq!(partial.kind, PartialKind::Function);
        assert_eq!(partial.name.value, "Update");
        assert_eq!(partial.type_token.map(|t| t.value), Some("void".to_string()));
    }

    #[test]
    fn test_variable_in_progress() {
        let partial = scan("int count = (").expect("variable");
        assert_eq!(partial.kind, PartialKind::Variable);
        assert_eq!(partial.name.value, "count");
    }

    #[test]
    fn test_nothing_recognisable() {
        assert!(scan("+ - *").is_none());
        assert!(scan("class {").is_none());
    }
}
