//! Lowering pass that rewrites sugarc syntax trees into plain C.
//!
//! Transforms:
//! - `enum T { V(int), W }` → `union T_payload` + `struct T { tag; payload; }`
//! - `T::V(x)`              → `(struct T){ .tag = 0, .payload = { .s0 = x } }`
//! - `if let` / `match`     → tag tests on a once-evaluated temporary
//! - `for i in A to B`      → counted `for` loop with a once-evaluated bound
//! - `defer (c) { body }`   → `c` copied onto every exit edge of `body`

mod defer;
pub mod desugar;
pub mod error;
mod finalize;
mod fold;
mod pattern;
mod range_for;
pub mod registry;
mod scope;
mod symbols;

#[cfg(test)]
mod tests;

pub use desugar::desugar_program;
pub use error::{LowerError, LowerErrorKind, LowerResult};
pub use registry::{PayloadSlot, TagWidth, Variant, VariantRegistry, VariantType};
pub use scope::TEMP_PREFIX;
