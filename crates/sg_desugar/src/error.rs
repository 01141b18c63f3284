//! Lowering failures.
//!
//! All of these are compile-time rejections of the input program. A run
//! stops at the first one and produces no output.

use serde::Serialize;
use swc_common::Span;
use thiserror::Error;

pub type LowerResult<T> = Result<T, LowerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LowerErrorKind {
    /// A pattern or constructor names an undeclared `(type, variant)` pair.
    UnknownVariant,
    /// Two variants of one type share a name, or a type is declared twice.
    DuplicateVariant,
    /// A `match` over a tagged enum omits a variant and has no wildcard.
    NonExhaustiveMatch,
    /// A defer cleanup contains `return`, or a `break`/`continue` that
    /// leaves the cleanup.
    CleanupControlEscape,
    /// A pattern's type disagrees with the scrutinee or with its siblings.
    MismatchedPatternType,
    /// A `match` case repeats an earlier case or follows a wildcard.
    UnreachablePattern,
    /// Payload arity of a pattern or constructor disagrees with the variant.
    PayloadMismatch,
    /// An exit edge sits inside a declaration that hides a name the pending
    /// cleanup reads.
    ShadowedCleanupBinding,
    /// `break` or `continue` with nothing to break out of.
    StrayControl,
    /// An extended node survived lowering. Always a compiler bug.
    Internal,
}

impl LowerErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LowerErrorKind::UnknownVariant => "UnknownVariant",
            LowerErrorKind::DuplicateVariant => "DuplicateVariant",
            LowerErrorKind::NonExhaustiveMatch => "NonExhaustiveMatch",
            LowerErrorKind::CleanupControlEscape => "CleanupControlEscape",
            LowerErrorKind::MismatchedPatternType => "MismatchedPatternType",
            LowerErrorKind::UnreachablePattern => "UnreachablePattern",
            LowerErrorKind::PayloadMismatch => "PayloadMismatch",
            LowerErrorKind::ShadowedCleanupBinding => "ShadowedCleanupBinding",
            LowerErrorKind::StrayControl => "StrayControl",
            LowerErrorKind::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for LowerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured diagnostic: kind, location and message. Rendering is left
/// to the caller.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct LowerError {
    pub kind: LowerErrorKind,
    #[serde(skip)]
    pub span: Span,
    pub message: String,
}

impl LowerError {
    pub fn new(kind: LowerErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub(crate) fn unknown_variant(ty: &str, variant: &str, span: Span) -> Self {
        Self::new(
            LowerErrorKind::UnknownVariant,
            span,
            format!("`{ty}::{variant}` does not name a declared variant"),
        )
    }

    pub(crate) fn mismatched(span: Span, message: impl Into<String>) -> Self {
        Self::new(LowerErrorKind::MismatchedPatternType, span, message)
    }

    pub(crate) fn internal(span: Span, message: impl Into<String>) -> Self {
        Self::new(LowerErrorKind::Internal, span, message)
    }
}
