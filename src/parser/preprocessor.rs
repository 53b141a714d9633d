//! Conditional compilation for the lexer
//!
//! Enforce Script only supports a small textual preprocessor. The lexer feeds
//! every `#...` line it meets to a [`ConditionalStack`], which decides whether
//! the following source is live. Directives are evaluated in source order, so a
//! `#define` only affects code that comes after it.
//!
//! Supported directives: `#ifdef`, `#ifndef`, `#if`, `#elif`, `#else`,
//! `#endif`, `#define`, `#undef`. Everything else (`#include`, `#pragma`, ...)
//! is recognised and ignored.

use rustc_hash::FxHashSet;

/// Parentheses and `!` nesting an `#if` condition may use; deeper input
/// evaluates to false.
const MAX_CONDITION_DEPTH: usize = 64;

/// Which directive opened a conditional frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    Ifdef,
    Ifndef,
    If,
}

/// One frame of the conditional stack.
///
/// `has_matched_branch` records whether any branch of the current
/// `#if/#elif/#else` chain was already taken, so at most one of them is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessorState {
    pub kind: ConditionalKind,
    pub symbol: String,
    pub is_active: bool,
    pub has_matched_branch: bool,
}

/// Structural problems found while evaluating directives.
///
/// The lexer never fails on these; the parser reports them as warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessorIssue {
    /// `#else`, `#elif` or `#endif` with no open conditional.
    UnmatchedDirective { directive: String, offset: usize },
    /// A conditional still open at end of file.
    UnclosedConditional {
        directive: String,
        symbol: String,
        offset: usize,
    },
}

impl PreprocessorIssue {
    pub fn offset(&self) -> usize {
        match self {
            PreprocessorIssue::UnmatchedDirective { offset, .. }
            | PreprocessorIssue::UnclosedConditional { offset, .. } => *offset,
        }
    }
}

/// A single classified directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    Ifdef(&'a str),
    Ifndef(&'a str),
    If(&'a str),
    Elif(&'a str),
    Else,
    Endif,
    Define(&'a str),
    Undef(&'a str),
    Other(&'a str),
}

impl Directive<'_> {
    /// Classify the text of a directive line (including the leading `#`).
    pub fn parse(text: &str) -> Directive<'_> {
        let body = text.strip_prefix('#').unwrap_or(text).trim_start();
        let name_end = body
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(body.len());
        let (name, rest) = body.split_at(name_end);
        let rest = rest.trim();
        let first_word = rest
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");

        match name {
            "ifdef" => Directive::Ifdef(first_word),
            "ifndef" => Directive::Ifndef(first_word),
            "if" => Directive::If(rest),
            "elif" => Directive::Elif(rest),
            "else" => Directive::Else,
            "endif" => Directive::Endif,
            "define" => Directive::Define(first_word),
            "undef" => Directive::Undef(first_word),
            _ => Directive::Other(name),
        }
    }
}

/// Live conditional-compilation state of one lex call.
#[derive(Debug, Default)]
pub struct ConditionalStack {
    frames: Vec<(PreprocessorState, usize)>,
    defines: FxHashSet<String>,
    issues: Vec<PreprocessorIssue>,
}

impl ConditionalStack {
    pub fn new(defines: FxHashSet<String>) -> Self {
        Self {
            frames: Vec::new(),
            defines,
            issues: Vec::new(),
        }
    }

    /// True when every open frame is active.
    pub fn is_active(&self) -> bool {
        self.frames.iter().all(|(frame, _)| frame.is_active)
    }

    pub fn is_defined(&self, symbol: &str) -> bool {
        self.defines.contains(symbol)
    }

    /// Evaluate one directive found at `offset`.
    pub fn apply(&mut self, directive: Directive<'_>, offset: usize) {
        match directive {
            Directive::Ifdef(symbol) => {
                let active = self.is_defined(symbol);
                self.push(ConditionalKind::Ifdef, symbol, active, offset);
            }
            Directive::Ifndef(symbol) => {
                let active = !self.is_defined(symbol);
                self.push(ConditionalKind::Ifndef, symbol, active, offset);
            }
            Directive::If(expr) => {
                let active = self.evaluate(expr);
                self.push(ConditionalKind::If, expr, active, offset);
            }
            Directive::Elif(expr) => {
                let value = self.evaluate(expr);
                match self.frames.last_mut() {
                    Some((frame, _)) => {
                        if frame.has_matched_branch {
                            frame.is_active = false;
                        } else {
                            frame.is_active = value;
                            frame.has_matched_branch = value;
                        }
                    }
                    None => self.unmatched("#elif", offset),
                }
            }
            Directive::Else => match self.frames.last_mut() {
                Some((frame, _)) => {
                    frame.is_active = !frame.has_matched_branch;
                    frame.has_matched_branch = true;
                }
                None => self.unmatched("#else", offset),
            },
            Directive::Endif => {
                if self.frames.pop().is_none() {
                    self.unmatched("#endif", offset);
                }
            }
            Directive::Define(symbol) => {
                if self.is_active() && !symbol.is_empty() {
                    self.defines.insert(symbol.to_string());
                }
            }
            Directive::Undef(symbol) => {
                if self.is_active() {
                    self.defines.remove(symbol);
                }
            }
            Directive::Other(_) => {}
        }
    }

    /// Close the stack at end of input and return every issue found.
    pub fn finish(mut self) -> Vec<PreprocessorIssue> {
        for (frame, offset) in self.frames.drain(..) {
            let directive = match frame.kind {
                ConditionalKind::Ifdef => "#ifdef",
                ConditionalKind::Ifndef => "#ifndef",
                ConditionalKind::If => "#if",
            };
            self.issues.push(PreprocessorIssue::UnclosedConditional {
                directive: directive.to_string(),
                symbol: frame.symbol,
                offset,
            });
        }
        self.issues
    }

    fn push(&mut self, kind: ConditionalKind, symbol: &str, active: bool, offset: usize) {
        self.frames.push((
            PreprocessorState {
                kind,
                symbol: symbol.to_string(),
                is_active: active,
                has_matched_branch: active,
            },
            offset,
        ));
    }

    fn unmatched(&mut self, directive: &str, offset: usize) {
        self.issues.push(PreprocessorIssue::UnmatchedDirective {
            directive: directive.to_string(),
            offset,
        });
    }

    fn evaluate(&self, expr: &str) -> bool {
        let tokens = condition_tokens(expr);
        let mut eval = ConditionEval {
            tokens: &tokens,
            position: 0,
            depth: 0,
            defines: &self.defines,
        };
        eval.or()
    }
}

/// Split an `#if` condition into words and operators.
fn condition_tokens(expr: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_alphanumeric() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(&expr[start..i]);
        } else if (c == b'&' || c == b'|') && bytes.get(i + 1) == Some(&c) {
            tokens.push(&expr[i..i + 2]);
            i += 2;
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            break;
        } else {
            let len = expr[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            tokens.push(&expr[i..i + len]);
            i += len;
        }
    }

    tokens
}

/// Recursive evaluator for `#if` conditions: `||` < `&&` < `!` < atoms.
struct ConditionEval<'a> {
    tokens: &'a [&'a str],
    position: usize,
    depth: usize,
    defines: &'a FxHashSet<String>,
}

impl<'a> ConditionEval<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).copied()
    }

    fn bump(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position).copied();
        self.position += 1;
        token
    }

    /// Evaluate one level deeper; past the limit the rest of the condition
    /// is dropped.
    fn deeper(&mut self, eval: fn(&mut Self) -> bool) -> bool {
        if self.depth >= MAX_CONDITION_DEPTH {
            self.position = self.tokens.len();
            return false;
        }
        self.depth += 1;
        let value = eval(self);
        self.depth -= 1;
        value
    }

    fn or(&mut self) -> bool {
        let mut value = self.and();
        while self.peek() == Some("||") {
            self.bump();
            let rhs = self.and();
            value = value || rhs;
        }
        value
    }

    fn and(&mut self) -> bool {
        let mut value = self.not();
        while self.peek() == Some("&&") {
            self.bump();
            let rhs = self.not();
            value = value && rhs;
        }
        value
    }

    fn not(&mut self) -> bool {
        if self.peek() == Some("!") {
            self.bump();
            return !self.deeper(Self::not);
        }
        self.atom()
    }

    fn atom(&mut self) -> bool {
        match self.bump() {
            Some("(") => {
                let value = self.deeper(Self::or);
                if self.peek() == Some(")") {
                    self.bump();
                }
                value
            }
            Some("defined") => {
                let parenthesized = self.peek() == Some("(");
                if parenthesized {
                    self.bump();
                }
                let value = self
                    .bump()
                    .map(|symbol| self.defines.contains(symbol))
                    .unwrap_or(false);
                if parenthesized && self.peek() == Some(")") {
                    self.bump();
                }
                value
            }
            Some(word) if word.starts_with(|c: char| c.is_ascii_digit()) => {
                word.parse::<i64>().map(|n| n != 0).unwrap_or(false)
            }
            Some(word) => self.defines.contains(word),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(defines: &[&str]) -> ConditionalStack {
        ConditionalStack::new(defines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_directive_classification() {
        assert_eq!(Directive::parse("#ifdef SERVER"), Directive::Ifdef("SERVER"));
        assert_eq!(Directive::parse("# ifndef  X // c"), Directive::Ifndef("X"));
        assert_eq!(Directive::parse("#define DEBUG 1"), Directive::Define("DEBUG"));
        assert_eq!(Directive::parse("#include \"a.c\""), Directive::Other("include"));
        assert_eq!(Directive::parse("#endif"), Directive::Endif);
    }

    #[test]
    fn test_else_only_after_unmatched_branch() {
        let mut s = stack(&["A"]);
        s.apply(Directive::Ifdef("A"), 0);
        assert!(s.is_active());
        s.apply(Directive::Else, 10);
        assert!(!s.is_active());
        s.apply(Directive::Endif, 20);
        assert!(s.is_active());
        assert!(s.finish().is_empty());
    }

    #[test]
    fn test_elif_chain_takes_one_branch() {
        let mut s = stack(&["B", "C"]);
        s.apply(Directive::If("defined(A)"), 0);
        assert!(!s.is_active());
        s.apply(Directive::Elif("defined(B)"), 1);
        assert!(s.is_active());
        s.apply(Directive::Elif("C"), 2);
        assert!(!s.is_active());
        s.apply(Directive::Else, 3);
        assert!(!s.is_active());
    }

    #[test]
    fn test_define_ignored_in_inactive_region() {
        let mut s = stack(&[]);
        s.apply(Directive::Ifdef("NOPE"), 0);
        s.apply(Directive::Define("X"), 1);
        s.apply(Directive::Endif, 2);
        assert!(!s.is_defined("X"));
        s.apply(Directive::Define("X"), 3);
        assert!(s.is_defined("X"));
        s.apply(Directive::Undef("X"), 4);
        assert!(!s.is_defined("X"));
    }

    #[test]
    fn test_condition_operators() {
        let s = stack(&["A"]);
        assert!(s.evaluate("A && !B"));
        assert!(s.evaluate("defined B || defined(A)"));
        assert!(!s.evaluate("(A && B)"));
        assert!(s.evaluate("1"));
        assert!(!s.evaluate("0"));
    }

    #[test]
    fn test_deeply_nested_condition_is_false() {
        let s = stack(&["A"]);
        assert!(s.evaluate(&format!("{}A{}", "(".repeat(10), ")".repeat(10))));

        let deep = format!("{}A{}", "(".repeat(50_000), ")".repeat(50_000));
        assert!(!s.evaluate(&deep));
        assert!(!s.evaluate(&"!".repeat(50_000)));
    }

    #[test]
    fn test_unbalanced_directives_reported() {
        let mut s = stack(&[]);
        s.apply(Directive::Endif, 5);
        s.apply(Directive::Ifdef("X"), 9);
        let issues = s.finish();
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            PreprocessorIssue::UnmatchedDirective { directive, offset: 5 } if directive == "#endif"
        ));
        assert!(matches!(
            &issues[1],
            PreprocessorIssue::UnclosedConditional { symbol, .. } if symbol == "X"
        ));
    }
}
