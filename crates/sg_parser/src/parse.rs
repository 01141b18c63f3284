use sg_ast::{Program, SyntaxFlags};
use sg_lexer::{tokenize, LexError};
use swc_common::{sync::Lrc, FileName, SourceMap, Span};
use thiserror::Error;

use crate::parser::Parser;

/// Result of parsing a sugarc source file.
pub struct ParseResult {
    pub program: Program,
    pub source_map: Lrc<SourceMap>,
}

/// A syntax error. Malformed input stops here and never reaches lowering.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self::new(err.to_string(), err.span)
    }
}

/// Parse a source string with sugarc extensions into a fresh source map.
pub fn parse_program(
    source: &str,
    filename: &str,
    syntax: &SyntaxFlags,
) -> Result<ParseResult, ParseError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let program = parse_program_in(&source_map, source, filename, syntax)?;
    Ok(ParseResult {
        program,
        source_map,
    })
}

/// Parse into a caller-owned source map, so error spans can be resolved to
/// line and column even when parsing fails.
pub fn parse_program_in(
    source_map: &Lrc<SourceMap>,
    source: &str,
    filename: &str,
    syntax: &SyntaxFlags,
) -> Result<Program, ParseError> {
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let tokens = tokenize(source, source_file.start_pos)?;
    let eof = Span::new(source_file.end_pos, source_file.end_pos);
    Parser::new(tokens, syntax, eof).parse_program()
}
