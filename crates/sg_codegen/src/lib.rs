//! C source printer for the lowered target tree.
//!
//! Output is deterministic: fixed indentation, one declaration or statement
//! per line, and parentheses only where operator precedence needs them.

mod decl;
mod expr;
mod stmt;
pub mod text_writer;


use sg_ast::target::{Item, Program};

use crate::text_writer::CWriter;

#[derive(Debug, Clone)]
pub struct Config {
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl Config {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

pub struct Emitter {
    pub cfg: Config,
    pub wr: CWriter,
}

impl Emitter {
    pub fn new(cfg: Config) -> Self {
        let wr = CWriter::new(cfg.indent);
        Self { cfg, wr }
    }

    /// Items are separated by a blank line, except runs of preprocessor
    /// lines which stay together.
    pub fn emit_program(&mut self, program: &Program) {
        let mut prev: Option<&Item> = None;
        for item in &program.items {
            let directives = matches!(
                (prev, item),
                (Some(Item::Directive(_)), Item::Directive(_))
            );
            if prev.is_some() && !directives {
                self.wr.newline();
            }
            self.emit_item(item);
            prev = Some(item);
        }
    }

    pub fn finish(self) -> String {
        self.wr.into_string()
    }
}

/// Print `program` as C source text.
#[tracing::instrument(level = "debug", skip_all, fields(items = program.items.len()))]
pub fn emit_program(program: &Program, cfg: &Config) -> String {
    let mut emitter = Emitter::new(cfg.clone());
    emitter.emit_program(program);
    emitter.finish()
}
