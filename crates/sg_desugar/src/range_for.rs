//! `for i in A to B body` lowering.
//!
//! ```c
//! {
//!     int _sg_start0 = A;
//!     int _sg_end0 = B;
//!     for (int i = _sg_start0; i < _sg_end0; i++) body
//! }
//! ```
//!
//! Both bounds are evaluated once, in order, in the enclosing scope, so a
//! loop variable that shadows a name used in a bound does not capture it.
//! A literal bound is used directly and needs no temporary; with two literal
//! bounds no enclosing block is emitted.
//!
//! The counter takes the type of the upper bound (or else the lower bound)
//! when that is a known integer type, and `int` otherwise.

use sg_ast::{
    BaseType, BinOp, Block, Expr, ExprKind, FnDecl, ForInit, Ident, PostfixOp, Program, RangeFor,
    Stmt, StmtKind, TypeName, VarDecl,
};
use swc_common::Span;

use crate::error::LowerResult;
use crate::fold::{fold_program, walk_block, walk_function, walk_stmt, Fold};
use crate::scope::TempNames;
use crate::symbols::SymbolTable;

/// Integer typedefs from the standard headers, which are never parsed.
const INTEGER_TYPEDEFS: &[&str] = &[
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "intptr_t",
    "uintptr_t",
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
];

pub(crate) struct LoopLowering {
    symbols: SymbolTable,
    starts: TempNames,
    ends: TempNames,
}

impl Default for LoopLowering {
    fn default() -> Self {
        Self {
            symbols: SymbolTable::default(),
            starts: TempNames::new("start"),
            ends: TempNames::new("end"),
        }
    }
}

impl LoopLowering {
    pub fn lower_program(&mut self, program: Program) -> LowerResult<Program> {
        self.symbols = SymbolTable::collect(&program);
        fold_program(self, program)
    }

    fn counter_type(&self, start: &Expr, end: &Expr) -> TypeName {
        [end, start]
            .into_iter()
            .find_map(|bound| self.symbols.type_of(bound).and_then(integer_type))
            .unwrap_or_else(|| TypeName::builtin("int"))
    }

    /// A literal bound as is, anything else through a fresh temporary
    /// declared in `temps`.
    fn bound(
        temps: &mut TempNames,
        decls: &mut Vec<Stmt>,
        ty: &TypeName,
        value: Expr,
    ) -> Expr {
        if value.is_literal() {
            return value;
        }
        let name = temps.fresh();
        let span = value.span;
        decls.push(Stmt::decl(ty.clone(), &name, Some(value), span));
        Expr::ident(&name, span)
    }

    fn lower_range_for(&mut self, rf: RangeFor, span: Span) -> LowerResult<Stmt> {
        let start = self.fold_expr(rf.start)?;
        let end = self.fold_expr(rf.end)?;
        let ty = self.counter_type(&start, &end);

        let mut prelude = Vec::new();
        let start = Self::bound(&mut self.starts, &mut prelude, &ty, start);
        let end = Self::bound(&mut self.ends, &mut prelude, &ty, end);

        let var = rf.var;
        self.symbols.push();
        self.symbols.declare(&var.name, ty.clone());
        let body = self.fold_stmt(*rf.body);
        self.symbols.pop();

        tracing::trace!(var = %var.name, temps = prelude.len(), "lowered range for");
        let counter = Expr::ident(&var.name, var.span);
        let lowered = Stmt::new(
            StmtKind::For {
                init: Some(ForInit::Decl(vec![VarDecl {
                    ty,
                    name: Ident::new(var.name.clone(), var.span),
                    init: Some(start),
                }])),
                cond: Some(Expr::binary(BinOp::Lt, counter.clone(), end)),
                step: Some(Expr::new(
                    ExprKind::Postfix {
                        op: PostfixOp::Inc,
                        operand: Box::new(counter),
                    },
                    var.span,
                )),
                body: Box::new(body?),
            },
            span,
        );
        if prelude.is_empty() {
            return Ok(lowered);
        }
        prelude.push(lowered);
        Ok(Stmt::block(prelude, span))
    }
}

impl Fold for LoopLowering {
    fn fold_function(&mut self, func: FnDecl) -> LowerResult<FnDecl> {
        self.symbols.push();
        for param in &func.params {
            if let Some(name) = &param.name {
                self.symbols.declare(&name.name, param.ty.clone());
            }
        }
        let func = walk_function(self, func);
        self.symbols.pop();
        func
    }

    fn fold_block(&mut self, block: Block) -> LowerResult<Block> {
        self.symbols.push();
        let block = walk_block(self, block);
        self.symbols.pop();
        block
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> LowerResult<Stmt> {
        match stmt.kind {
            StmtKind::RangeFor(rf) => self.lower_range_for(rf, stmt.span),
            StmtKind::Decl(decls) => {
                let stmt = walk_stmt(self, Stmt::new(StmtKind::Decl(decls), stmt.span))?;
                if let StmtKind::Decl(decls) = &stmt.kind {
                    for d in decls {
                        self.symbols.declare(&d.name.name, d.ty.clone());
                    }
                }
                Ok(stmt)
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.symbols.push();
                if let Some(ForInit::Decl(decls)) = &init {
                    for d in decls {
                        self.symbols.declare(&d.name.name, d.ty.clone());
                    }
                }
                let kind = StmtKind::For {
                    init,
                    cond,
                    step,
                    body,
                };
                let stmt = walk_stmt(self, Stmt::new(kind, stmt.span));
                self.symbols.pop();
                stmt
            }
            kind => walk_stmt(self, Stmt::new(kind, stmt.span)),
        }
    }
}

/// `ty` as a mutable counter type when it is an integer type.
fn integer_type(ty: TypeName) -> Option<TypeName> {
    if ty.pointers > 0 || !ty.array.is_empty() {
        return None;
    }
    let integer = match &ty.base {
        BaseType::Builtin(words) => !matches!(
            words.as_str(),
            "float" | "double" | "long double" | "void" | "_Bool"
        ),
        BaseType::Named(name) => INTEGER_TYPEDEFS.contains(&name.as_str()),
        BaseType::Struct(_) | BaseType::Union(_) | BaseType::Enum(_) => false,
    };
    integer.then(|| TypeName::new(ty.base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sg_ast::{ItemKind, SyntaxFlags};

    fn lower(src: &str) -> Vec<Stmt> {
        let program = sg_parser::parse_program(src, "t.c", &SyntaxFlags::default())
            .unwrap()
            .program;
        let program = LoopLowering::default().lower_program(program).unwrap();
        match program.items.into_iter().last().map(|i| i.kind) {
            Some(ItemKind::Function(f)) => f.body.unwrap().stmts,
            _ => panic!("expected a function"),
        }
    }

    fn decl_names(stmt: &Stmt) -> Vec<String> {
        match &stmt.kind {
            StmtKind::Decl(decls) => decls.iter().map(|d| d.name.name.clone()).collect(),
            _ => panic!("expected a declaration"),
        }
    }

    /// The prelude declarations and the loop of a lowered range loop.
    fn split(stmt: &Stmt) -> (Vec<String>, &Stmt) {
        match &stmt.kind {
            StmtKind::Block(b) => {
                let (last, prelude) = b.stmts.split_last().unwrap();
                (prelude.iter().flat_map(decl_names).collect(), last)
            }
            _ => (Vec::new(), stmt),
        }
    }

    fn loop_var(stmt: &Stmt) -> &VarDecl {
        match &stmt.kind {
            StmtKind::For {
                init: Some(ForInit::Decl(decls)),
                ..
            } => &decls[0],
            _ => panic!("expected for"),
        }
    }

    #[test]
    fn computed_bound_gets_a_temporary() {
        let stmts = lower("void f(int n) { for i in 0 to n * 2 { g(i); } }");
        let (prelude, lowered) = split(&stmts[0]);
        assert_eq!(prelude, vec!["_sg_end0"]);
        let StmtKind::For { cond: Some(cond), .. } = &lowered.kind else {
            panic!("expected for");
        };
        assert!(matches!(
            &cond.kind,
            ExprKind::Binary { op: BinOp::Lt, rhs, .. } if matches!(&rhs.kind, ExprKind::Ident(n) if n == "_sg_end0")
        ));
    }

    #[test]
    fn literal_bounds_need_no_block() {
        let stmts = lower("void f() { for i in 0 to 10 { g(i); } }");
        assert!(matches!(stmts[0].kind, StmtKind::For { .. }));
        assert_eq!(loop_var(&stmts[0]).name.name, "i");
    }

    #[test]
    fn bounds_are_evaluated_outside_the_loop_scope() {
        let stmts = lower("void f(int n) { for n in n to n + 1 { g(n); } }");
        let (prelude, lowered) = split(&stmts[0]);
        assert_eq!(prelude, vec!["_sg_start0", "_sg_end0"]);
        let var = loop_var(lowered);
        assert_eq!(var.name.name, "n");
        assert!(matches!(
            &var.init.as_ref().unwrap().kind,
            ExprKind::Ident(name) if name == "_sg_start0"
        ));
    }

    #[test]
    fn nested_range_loops_number_temps_in_source_order() {
        let stmts = lower("void f(int n) { for i in 0 to n { for j in i to n { g(i, j); } } }");
        let (prelude, outer) = split(&stmts[0]);
        assert_eq!(prelude, vec!["_sg_end0"]);
        let StmtKind::For { body, .. } = &outer.kind else {
            panic!("expected for");
        };
        let StmtKind::Block(inner) = &body.kind else {
            panic!("expected block body");
        };
        let (prelude, _) = split(&inner.stmts[0]);
        assert_eq!(prelude, vec!["_sg_start0", "_sg_end1"]);
    }

    #[test]
    fn counter_follows_an_integer_bound_type() {
        let stmts = lower("void f(const size_t len, double x) { for i in 0 to len { } for j in 0 to x { } }");
        let (_, sized) = split(&stmts[0]);
        assert_eq!(
            loop_var(sized).ty,
            TypeName::new(BaseType::Named("size_t".into()))
        );
        let (_, float) = split(&stmts[1]);
        assert_eq!(loop_var(float).ty, TypeName::builtin("int"));
    }
}
