//! Lexer (tokenizer) for Enforce Script source code
//!
//! Converts raw source text into a flat [`Token`] array consumed by the
//! parser. The lexer is total: every input produces a token array ending in
//! [`TokenKind::Eof`], malformed literals become best-effort tokens and unknown
//! characters become single-character operator tokens.
//!
//! Preprocessor directives are evaluated inline through a
//! [`ConditionalStack`]. While the stack is inactive the scanner keeps running
//! (so nested directives, strings and comments are still recognised) but no
//! tokens are emitted.

use super::preprocessor::{ConditionalStack, Directive, PreprocessorIssue};
use rustc_hash::FxHashSet;
use std::fmt;

/// Keyword classes assigned at lex time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// `class`, `enum`, `typedef`, `extends`
    Declaration,
    /// `static`, `private`, `override`, `proto`, `modded`, ...
    Modifier,
    /// `void`, `int`, `float`, `bool`, `string`, `vector`, `auto`, ...
    Type,
    /// `if`, `else`, `for`, `foreach`, `switch`, `return`, ...
    Control,
    /// `ref`, `autoptr`, `out`, `inout`, `const`
    Storage,
    /// `true`, `false`, `null`, `NULL`, `this`, `super`
    Literal,
    /// `new`, `delete`, `thread`
    Operator,
}

/// Token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword(KeywordCategory),
    Number,
    String,
    Operator,
    Punctuation,
    Comment,
    Preprocessor,
    Eof,
}

/// A single lexed token. `start..end` are char offsets into the source.
///
/// Tokens fabricated by error recovery are zero-width (`start == end`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            end,
        }
    }

    pub fn eof(offset: usize) -> Self {
        Self::new(TokenKind::Eof, "", offset, offset)
    }

    /// A zero-width token standing in for something the source is missing.
    pub fn synthetic(kind: TokenKind, value: &str, offset: usize) -> Self {
        Self::new(kind, value, offset, offset)
    }

    /// Value comparison for operators, punctuation, keywords and identifiers.
    pub fn is(&self, value: &str) -> bool {
        self.value == value
            && !matches!(
                self.kind,
                TokenKind::String | TokenKind::Comment | TokenKind::Preprocessor | TokenKind::Eof
            )
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn is_keyword(&self, category: KeywordCategory) -> bool {
        self.kind == TokenKind::Keyword(category)
    }

    pub fn is_synthetic(&self) -> bool {
        self.start == self.end && !self.is_eof()
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    pub fn is_preprocessor(&self) -> bool {
        self.kind == TokenKind::Preprocessor
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.value),
            TokenKind::Keyword(_) => write!(f, "keyword '{}'", self.value),
            TokenKind::Number => write!(f, "number {}", self.value),
            TokenKind::String => write!(f, "string {}", self.value),
            TokenKind::Operator | TokenKind::Punctuation => write!(f, "'{}'", self.value),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::Preprocessor => write!(f, "directive '{}'", self.value.trim()),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// Keyword → category table.
pub fn keyword_category(word: &str) -> Option<KeywordCategory> {
    use KeywordCategory::*;

    let category = match word {
        "class" | "enum" | "typedef" | "extends" => Declaration,
        "private" | "protected" | "static" | "override" | "proto" | "native" | "external"
        | "sealed" | "final" | "event" | "volatile" | "owned" | "local" | "reference"
        | "notnull" | "modded" => Modifier,
        "void" | "int" | "float" | "bool" | "string" | "vector" | "typename" | "auto"
        | "func" => Type,
        "if" | "else" | "while" | "for" | "foreach" | "switch" | "case" | "default"
        | "return" | "break" | "continue" => Control,
        "ref" | "autoptr" | "out" | "inout" | "const" => Storage,
        "true" | "false" | "null" | "NULL" | "this" | "super" => Literal,
        "new" | "delete" | "thread" => Operator,
        _ => return None,
    };

    Some(category)
}

const THREE_CHAR_OPERATORS: [&str; 2] = ["<<=", ">>="];

const TWO_CHAR_OPERATORS: [&str; 19] = [
    "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "<<", ">>", "->",
];

const PUNCTUATION: [char; 11] = ['(', ')', '{', '}', '[', ']', ';', ',', '.', ':', '?'];

/// Lexer options.
#[derive(Debug, Clone, Default)]
pub struct LexOptions {
    /// Symbols defined before the first line (`#define`s in the file extend it).
    pub defined_symbols: FxHashSet<String>,
    /// Emit [`TokenKind::Preprocessor`] tokens for directive lines.
    pub include_preprocessor_tokens: bool,
}

/// Tokens plus the directive problems found along the way.
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub issues: Vec<PreprocessorIssue>,
}

/// Tokenize `text`. The result always ends with an EOF token.
pub fn lex(text: &str, options: &LexOptions) -> Vec<Token> {
    Lexer::new(text, options).tokenize().tokens
}

/// Lexer for Enforce Script source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    conditionals: ConditionalStack,
    include_preprocessor_tokens: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str, options: &LexOptions) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            conditionals: ConditionalStack::new(options.defined_symbols.clone()),
            include_preprocessor_tokens: options.include_preprocessor_tokens,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> LexOutput {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            let before = self.position;
            let token = self.scan_token();

            // Every sub-scanner consumes at least one char; this keeps the
            // loop total even if one of them regresses.
            if self.position == before {
                self.position += 1;
            }

            if let Some(token) = token {
                tokens.push(token);
            }
        }

        tokens.push(Token::eof(self.input.len()));

        LexOutput {
            tokens,
            issues: self.conditionals.finish(),
        }
    }

    /// Try each sub-scanner in order; the first that matches wins.
    fn scan_token(&mut self) -> Option<Token> {
        let c = self.peek()?;
        let next = self.peek_ahead(1);

        if c.is_whitespace() {
            self.skip_whitespace();
            return None;
        }

        if c == '/' && next == Some('/') {
            let token = self.line_comment();
            return self.emit(token);
        }

        if c == '/' && next == Some('*') {
            let token = self.block_comment();
            return self.emit(token);
        }

        if c == '#' {
            return self.directive();
        }

        let token = if c == '"' || c == '\'' {
            self.string_literal(c)
        } else if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            self.number_literal()
        } else if c.is_alphabetic() || c == '_' {
            self.identifier_or_keyword()
        } else {
            self.operator_or_punctuation()
        };

        self.emit(token)
    }

    /// Drop tokens while inside an inactive conditional block.
    fn emit(&self, token: Token) -> Option<Token> {
        if self.conditionals.is_active() {
            Some(token)
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    /// `// ...` up to (not including) the newline
    fn line_comment(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.position += 1;
        }
        self.token_from(TokenKind::Comment, start)
    }

    /// `/* ... */`; an unterminated comment runs to end of input
    fn block_comment(&mut self) -> Token {
        let start = self.position;
        self.position += 2;

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.position += 2;
                break;
            }
            self.position += 1;
        }

        self.token_from(TokenKind::Comment, start)
    }

    /// A `#` line, with backslash continuations. Evaluated immediately.
    fn directive(&mut self) -> Option<Token> {
        let start = self.position;
        let was_active = self.conditionals.is_active();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                let continued = self.position > start && self.input[self.position - 1] == '\\';
                if !continued {
                    break;
                }
            }
            self.position += 1;
        }

        let text: String = self.input[start..self.position].iter().collect();
        let directive = Directive::parse(&text);
        self.conditionals.apply(directive, start);

        let now_active = self.conditionals.is_active();
        if self.include_preprocessor_tokens && (was_active || now_active) {
            Some(Token::new(TokenKind::Preprocessor, text, start, self.position))
        } else {
            None
        }
    }

    /// Quoted literal; escapes skip the next char. An unterminated literal
    /// stops at the end of the line.
    fn string_literal(&mut self, quote: char) -> Token {
        let start = self.position;
        self.position += 1;

        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.position += 1;
                if self.peek().is_some_and(|c| c != '\n') {
                    self.position += 1;
                }
                continue;
            }
            if ch == '\n' {
                break;
            }
            self.position += 1;
            if ch == quote {
                break;
            }
        }

        self.token_from(TokenKind::String, start)
    }

    /// Decimal, `0x` hex, fractional and `e[+-]?digits` forms
    fn number_literal(&mut self) -> Token {
        let start = self.position;

        if self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x') | Some('X')) {
            self.position += 2;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.position += 1;
            }
            return self.token_from(TokenKind::Number, start);
        }

        self.consume_digits();

        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            self.position += 1;
            self.consume_digits();
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let digit_at = match self.peek_ahead(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.position += digit_at;
                self.consume_digits();
            }
        }

        self.token_from(TokenKind::Number, start)
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.position += 1;
        }
    }

    /// Identifier or keyword
    fn identifier_or_keyword(&mut self) -> Token {
        let start = self.position;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.position += 1;
        }

        let text: String = self.input[start..self.position].iter().collect();
        let kind = match keyword_category(&text) {
            Some(category) => TokenKind::Keyword(category),
            None => TokenKind::Identifier,
        };

        Token::new(kind, text, start, self.position)
    }

    /// Compound operators first, then single-char fallback
    fn operator_or_punctuation(&mut self) -> Token {
        let start = self.position;

        for op in THREE_CHAR_OPERATORS {
            if self.matches_text(op) {
                self.position += 3;
                return self.token_from(TokenKind::Operator, start);
            }
        }

        for op in TWO_CHAR_OPERATORS {
            if self.matches_text(op) {
                self.position += 2;
                return self.token_from(TokenKind::Operator, start);
            }
        }

        let ch = self.input[self.position];
        self.position += 1;
        let kind = if PUNCTUATION.contains(&ch) {
            TokenKind::Punctuation
        } else {
            TokenKind::Operator
        };

        Token::new(kind, ch.to_string(), start, self.position)
    }

    fn matches_text(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_ahead(i) == Some(c))
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        let text: String = self.input[start..self.position].iter().collect();
        Token::new(kind, text, start, self.position)
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}
