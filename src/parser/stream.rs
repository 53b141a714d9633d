//! Token cursor used by the parser
//!
//! [`TokenStream`] wraps the lexer's token array with a cursor that skips
//! trivia. Positions are plain `Copy` values, so speculative parsing saves a
//! [`Position`], tries something, and restores it on mismatch. Lookahead that
//! only needs to inspect tokens walks positions with [`TokenStream::significant_at`]
//! and never moves the cursor at all.
//!
//! Error recovery edits the sequence through [`TokenPatch`] values (a
//! fabricated token spliced in, or a compound `>>` split in two); the stream
//! is the only place where the token array changes.

use super::lexer::{Token, TokenKind};

/// Index into the token array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position(usize);

impl Position {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An edit of the token sequence produced by recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPatch {
    /// Splice `token` in before the raw index `at`.
    Insert { at: Position, token: Token },
    /// Split the significant token at `at` after its first char
    /// (`>>` → `>` `>`).
    Split { at: Position },
}

/// Cursor over a token array that always ends in EOF.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: Position,
    respect_preprocessor: bool,
    eof: Token,
}

impl TokenStream {
    /// `respect_preprocessor` keeps directive tokens visible to `peek`/`next`.
    pub fn new(mut tokens: Vec<Token>, respect_preprocessor: bool) -> Self {
        let end = tokens.last().map(|t| t.end).unwrap_or(0);
        if !tokens.last().is_some_and(Token::is_eof) {
            tokens.push(Token::eof(end));
        }
        let eof = tokens.last().cloned().unwrap_or_else(|| Token::eof(end));

        Self {
            tokens,
            position: Position(0),
            respect_preprocessor,
            eof,
        }
    }

    fn is_trivia(&self, token: &Token) -> bool {
        token.is_comment() || (token.is_preprocessor() && !self.respect_preprocessor)
    }

    fn get(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or(&self.eof)
    }

    /// First significant token at or after `pos`, with its position.
    pub fn significant_at(&self, pos: Position) -> (Position, &Token) {
        let mut index = pos.0;
        while index < self.tokens.len() && self.is_trivia(&self.tokens[index]) {
            index += 1;
        }
        let index = index.min(self.tokens.len().saturating_sub(1));
        (Position(index), self.get(index))
    }

    /// The position right after the token at `pos` (EOF never advances).
    pub fn step(&self, pos: Position) -> Position {
        if self.get(pos.0).is_eof() {
            pos
        } else {
            Position(pos.0 + 1)
        }
    }

    /// Position of the significant token following the one at or after `pos`.
    pub fn next_significant(&self, pos: Position) -> Position {
        let (at, _) = self.significant_at(pos);
        self.significant_at(self.step(at)).0
    }

    pub fn peek(&self) -> &Token {
        self.significant_at(self.position).1
    }

    /// The `n`-th significant token ahead (`peek_at(0) == peek()`).
    pub fn peek_at(&self, n: usize) -> &Token {
        let mut pos = self.significant_at(self.position).0;
        for _ in 0..n {
            pos = self.next_significant(pos);
        }
        self.get(pos.0)
    }

    pub fn next(&mut self) -> Token {
        let (at, token) = self.significant_at(self.position);
        let token = token.clone();
        self.position = self.step(at);
        token
    }

    /// Like [`peek`](Self::peek) but directive tokens are visible.
    pub fn peek_raw(&self) -> &Token {
        let mut index = self.position.0;
        while index < self.tokens.len() && self.tokens[index].is_comment() {
            index += 1;
        }
        self.get(index)
    }

    pub fn next_raw(&mut self) -> Token {
        while self.position.0 < self.tokens.len() && self.tokens[self.position.0].is_comment() {
            self.position.0 += 1;
        }
        let token = self.get(self.position.0).clone();
        self.position = self.step(self.position);
        token
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = Position(position.0.min(self.tokens.len().saturating_sub(1)));
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    /// Last significant token before the cursor.
    pub fn previous(&self) -> Option<&Token> {
        self.tokens[..self.position.0.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|t| !self.is_trivia(t))
    }

    /// Up to `n` significant tokens before the cursor, in source order.
    pub fn recent_tokens(&self, n: usize) -> Vec<&Token> {
        let mut recent: Vec<&Token> = self.tokens[..self.position.0.min(self.tokens.len())]
            .iter()
            .rev()
            .filter(|t| !self.is_trivia(t))
            .take(n)
            .collect();
        recent.reverse();
        recent
    }

    /// Significant tokens in `[from, cursor)`, at most the last `n`.
    pub fn consumed_since(&self, from: Position, n: usize) -> Vec<&Token> {
        let end = self.position.0.min(self.tokens.len());
        let start = from.0.min(end);
        let mut window: Vec<&Token> = self.tokens[start..end]
            .iter()
            .filter(|t| !self.is_trivia(t))
            .collect();
        if window.len() > n {
            window.drain(..window.len() - n);
        }
        window
    }

    /// Splice a token in at the cursor, so it is the next one returned.
    pub fn insert_token(&mut self, token: Token) {
        let at = self.position;
        self.apply(TokenPatch::Insert { at, token });
    }

    /// Splice a token in before the raw index `at`. The cursor keeps
    /// pointing at the same token.
    pub fn insert_token_at(&mut self, at: Position, token: Token) {
        self.apply(TokenPatch::Insert { at, token });
    }

    /// Split the next significant token after its first char.
    pub fn split_token(&mut self) {
        let (at, _) = self.significant_at(self.position);
        self.apply(TokenPatch::Split { at });
    }

    pub fn apply(&mut self, patch: TokenPatch) {
        match patch {
            TokenPatch::Insert { at, token } => {
                let index = at.0.min(self.tokens.len().saturating_sub(1));
                self.tokens.insert(index, token);
                if index < self.position.0 {
                    self.position.0 += 1;
                }
            }
            TokenPatch::Split { at } => {
                let Some(token) = self.tokens.get(at.0) else {
                    return;
                };
                let mut chars = token.value.chars();
                let Some(first) = chars.next() else {
                    return;
                };
                let rest: String = chars.collect();
                if rest.is_empty() {
                    return;
                }

                let split_at = token.start + 1;
                let head = Token::new(TokenKind::Operator, first.to_string(), token.start, split_at);
                let tail = Token::new(TokenKind::Operator, rest, split_at, token.end.max(split_at));
                self.tokens[at.0] = head;
                self.tokens.insert(at.0 + 1, tail);
                if at.0 < self.position.0 {
                    self.position.0 += 1;
                }
            }
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether anything besides trivia and EOF was lexed.
    pub fn has_significant_tokens(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| !t.is_eof() && !t.is_comment() && !t.is_preprocessor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{lex, LexOptions};

    fn stream(source: &str) -> TokenStream {
        let options = LexOptions {
            include_preprocessor_tokens: true,
            ..LexOptions::default()
        };
        TokenStream::new(lex(source, &options), false)
    }

    #[test]
    fn test_skips_trivia() {
        let mut s = stream("a /* c */ b // d\n#define X\nc");
        assert_eq!(s.next().value, "a");
        assert_eq!(s.next().value, "b");
        assert_eq!(s.peek().value, "c");
        assert_eq!(s.peek_at(1).kind, TokenKind::Eof);
    }

    #[test]
    fn test_raw_access_sees_directives() {
        let mut s = stream("#define X\nc");
        assert_eq!(s.peek_raw().kind, TokenKind::Preprocessor);
        assert_eq!(s.next_raw().kind, TokenKind::Preprocessor);
        assert_eq!(s.next_raw().value, "c");
    }

    #[test]
    fn test_never_past_eof() {
        let mut s = stream("x");
        s.next();
        assert!(s.next().is_eof());
        assert!(s.next().is_eof());
        assert!(s.is_at_end());
    }

    #[test]
    fn test_speculation_restores_position() {
        let mut s = stream("a b c");
        let saved = s.position();
        s.next();
        s.next();
        s.set_position(saved);
        assert_eq!(s.peek().value, "a");
    }

    #[test]
    fn test_insert_and_split() {
        let mut s = stream("x >> y");
        s.next();
        s.split_token();
        assert_eq!(s.next().value, ">");
        let second = s.next();
        assert_eq!(second.value, ">");
        assert_eq!((second.start, second.end), (3, 4));

        s.insert_token(Token::synthetic(TokenKind::Punctuation, ";", 4));
        assert!(s.next().is(";"));
        assert_eq!(s.next().value, "y");
    }

    #[test]
    fn test_insert_away_from_cursor() {
        let mut s = stream("a b c");
        s.next();
        let ahead = s.next_significant(s.position());
        s.insert_token_at(ahead, Token::synthetic(TokenKind::Punctuation, ";", 3));
        assert_eq!(s.peek().value, "b");
        assert!(s.peek_at(1).is(";"));
        assert_eq!(s.peek_at(2).value, "c");

        // before the cursor: `b` is still next
        s.insert_token_at(Position::default(), Token::synthetic(TokenKind::Identifier, "z", 0));
        assert_eq!(s.peek().value, "b");
        assert_eq!(s.previous().map(|t| t.value.as_str()), Some("a"));
        assert_eq!(s.tokens()[0].value, "z");
    }

    #[test]
    fn test_recent_tokens() {
        let mut s = stream("class A /* x */ extends B");
        for _ in 0..4 {
            s.next();
        }
        let recent: Vec<&str> = s.recent_tokens(3).iter().map(|t| t.value.as_str()).collect();
        assert_eq!(recent, vec!["A", "extends", "B"]);
        assert_eq!(s.previous().map(|t| t.value.as_str()), Some("B"));
    }
}
