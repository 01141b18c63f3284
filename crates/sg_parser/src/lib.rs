//! C parser with sugarc syntax extensions.
//!
//! Recursive descent over the `sg_lexer` token stream, producing the surface
//! tree from `sg_ast`:
//!
//! - Tagged enums (`enum Result { Ok(int), Err(char *) };`) and
//!   constructors (`Result::Ok(42)`)
//! - `if let T::V(x) = expr { ... }` and `match (expr) { case P { ... } }`
//! - `for i in A to B { ... }`
//! - `defer (cleanup) { ... }`
//!
//! Each extension is gated by a `SyntaxFlags` switch; with all of them off
//! this is a plain C parser.

pub mod parse;
mod parser;

pub use parse::{parse_program, parse_program_in, ParseError, ParseResult};
