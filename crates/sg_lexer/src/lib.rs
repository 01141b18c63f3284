//! Tokenizer for sugarc.
//!
//! Turns extended C source into a flat token stream. Spans are
//! `swc_common` spans offset by the file's start position, so every later
//! stage can resolve them through the same `SourceMap`.

mod token;

pub use token::Token;

use logos::Logos;
use swc_common::{BytePos, Span};
use thiserror::Error;

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAndSpan {
    pub token: Token,
    pub span: Span,
}

#[derive(Debug, Clone, Error)]
#[error("unexpected character `{text}`")]
pub struct LexError {
    pub text: String,
    pub span: Span,
}

/// Tokenize `source`, whose first byte sits at `base` in the source map.
pub fn tokenize(source: &str, base: BytePos) -> Result<Vec<TokenAndSpan>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(
            base + BytePos(range.start as u32),
            base + BytePos(range.end as u32),
        );
        match result {
            Ok(token) => tokens.push(TokenAndSpan { token, span }),
            Err(()) => {
                return Err(LexError {
                    text: lexer.slice().to_string(),
                    span,
                })
            }
        }
    }

    Ok(tokens)
}
