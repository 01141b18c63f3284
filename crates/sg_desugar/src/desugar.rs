//! Top-level lowering entry point.
//!
//! Runs the passes in dependency order over one parsed program:
//!
//! 1. build the variant registry,
//! 2. pattern lowering (tagged enums, constructors, `if let`, `match`),
//! 3. range loop lowering,
//! 4. defer lowering, which must see the final control flow,
//! 5. conversion to the target tree.
//!
//! The first error stops the run; no partial output is produced.

use sg_ast::{target, Program};

use crate::defer::DeferLowering;
use crate::error::LowerResult;
use crate::finalize::into_target;
use crate::pattern::PatternLowering;
use crate::range_for::LoopLowering;
use crate::registry::VariantRegistry;

/// Lower every sugarc construct in `program` to plain C.
#[tracing::instrument(level = "debug", skip_all, fields(items = program.items.len()))]
pub fn desugar_program(program: Program) -> LowerResult<target::Program> {
    let registry = VariantRegistry::build(&program)?;
    tracing::debug!(tagged_enums = registry.len(), "variant registry built");

    let program = PatternLowering::new(&registry, &program).lower_program(program)?;
    let program = LoopLowering::default().lower_program(program)?;
    let program = DeferLowering::default().lower_program(program)?;
    into_target(program)
}
