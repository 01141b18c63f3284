//! Recursive-descent parser state and token helpers.

mod expr;
mod items;
mod stmt;
mod types;

use std::collections::HashSet;

use sg_ast::{Ident, Program, SyntaxFlags};
use sg_lexer::{Token, TokenAndSpan};
use swc_common::Span;

use crate::parse::ParseError;

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Typedef names commonly pulled in by standard headers. Headers are not
/// read, so these are seeded up front.
const STD_TYPEDEFS: &[&str] = &[
    "size_t", "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t", "int8_t", "int16_t",
    "int32_t", "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "bool", "FILE",
    "va_list",
];

pub(crate) struct Parser<'a> {
    tokens: Vec<TokenAndSpan>,
    pos: usize,
    syntax: &'a SyntaxFlags,
    typedefs: HashSet<String>,
    eof: Span,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: Vec<TokenAndSpan>, syntax: &'a SyntaxFlags, eof: Span) -> Self {
        Self {
            tokens,
            pos: 0,
            syntax,
            typedefs: STD_TYPEDEFS.iter().map(|s| s.to_string()).collect(),
            eof,
        }
    }

    pub(crate) fn parse_program(mut self) -> PResult<Program> {
        let mut items = Vec::new();
        while !self.at_end() {
            items.push(self.parse_item()?);
        }
        Ok(Program { items })
    }

    // -- token access -------------------------------------------------------

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    fn span(&self) -> Span {
        self.tokens.get(self.pos).map_or(self.eof, |t| t.span)
    }

    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(self.eof, |t| t.span)
    }

    fn advance(&mut self) -> Option<TokenAndSpan> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn check_ident(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident(word))
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> PResult<Span> {
        if self.check(token) {
            let span = self.span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(&token.describe()))
        }
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let ident = Ident::new(name.clone(), self.span());
                self.pos += 1;
                Ok(ident)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect_word(&mut self, word: &str) -> PResult<Span> {
        if self.check_ident(word) {
            let span = self.span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self
            .peek()
            .map_or_else(|| "end of file".to_string(), Token::describe);
        ParseError::new(format!("expected {expected}, found {found}"), self.span())
    }

    /// Whether the `(` at `open` is closed by a `)` directly followed by `{`.
    /// Distinguishes `match (x) {` and `defer (c) {` from calls to functions
    /// named `match` or `defer`.
    fn paren_group_precedes_block(&self, open: usize) -> bool {
        if self.peek_at(open) != Some(&Token::LParen) {
            return false;
        }
        let mut depth = 0usize;
        let mut i = self.pos + open;
        while let Some(tok) = self.tokens.get(i) {
            match tok.token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(
                            self.tokens.get(i + 1).map(|t| &t.token),
                            Some(Token::LBrace)
                        );
                    }
                }
                _ => {}
            }
            i += 1;
        }
        false
    }
}

pub(crate) fn join(lo: Span, hi: Span) -> Span {
    Span::new(lo.lo, hi.hi)
}

#[cfg(test)]
mod tests;
