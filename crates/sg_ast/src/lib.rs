//! Extended C AST for sugarc.
//!
//! Two tree families live here:
//! - [`ast`]: the surface tree produced by the parser. It is plain C plus the
//!   sugarc nodes: tagged enums with payloads, `if let`, `match`,
//!   `for x in A to B` and `defer (cleanup) { body }`.
//! - [`target`]: the lowered tree handed to the printer. It has no extended
//!   nodes at all, so nothing sugarc-specific can reach the output.

pub mod ast;
pub mod target;

pub use ast::*;
pub use swc_common::Span;

use serde::{Deserialize, Serialize};

/// Feature flags controlling which sugarc extensions the parser accepts.
///
/// With every flag off the front end is a plain C parser; extension keywords
/// (`match`, `defer`, `let`, `in`, `to`) are then ordinary identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxFlags {
    /// `enum T { V(payload) }` declarations and `T::V(x)` constructors.
    pub adt: bool,
    /// `if let` and `match`.
    pub patterns: bool,
    /// `for i in A to B`.
    pub range_for: bool,
    /// `defer (cleanup) { body }`.
    pub defer: bool,
}

impl SyntaxFlags {
    /// Plain C: every extension disabled.
    pub fn plain() -> Self {
        Self {
            adt: false,
            patterns: false,
            range_for: false,
            defer: false,
        }
    }
}

impl Default for SyntaxFlags {
    fn default() -> Self {
        Self {
            adt: true,
            patterns: true,
            range_for: true,
            defer: true,
        }
    }
}
