//! Defer lowering.
//!
//! `defer (cleanup) { body }` becomes a plain block whose every exit edge
//! runs the cleanup exactly once:
//!
//! - falling off the end of the body appends the cleanup,
//! - `return` runs every pending cleanup, innermost first, after the return
//!   value has been computed into `_sg_retN`,
//! - `break`/`continue` run the cleanups registered between the jump and the
//!   loop (or switch) it targets.
//!
//! Cleanups are lowered once, under a boundary frame that rejects any exit,
//! and copied to each edge.

use std::collections::HashSet;

use sg_ast::{
    Block, Defer, Expr, ExprKind, FnDecl, ForInit, Item, ItemKind, Program, Stmt, StmtKind,
    TypeName,
};
use swc_common::Span;

use crate::error::{LowerError, LowerResult};
use crate::scope::{ExitEdge, FrameKind, Obligation, ScopeStack, TempNames};

pub(crate) struct DeferLowering {
    scopes: ScopeStack,
    ret: TypeName,
    temps: TempNames,
}

impl Default for DeferLowering {
    fn default() -> Self {
        Self {
            scopes: ScopeStack::default(),
            ret: TypeName::builtin("void"),
            temps: TempNames::new("ret"),
        }
    }
}

impl DeferLowering {
    pub fn lower_program(&mut self, program: Program) -> LowerResult<Program> {
        let mut items = Vec::with_capacity(program.items.len());
        for item in program.items {
            let kind = match item.kind {
                ItemKind::Function(func) if func.body.is_some() => {
                    ItemKind::Function(self.lower_function(func)?)
                }
                kind => kind,
            };
            items.push(Item {
                kind,
                span: item.span,
            });
        }
        Ok(Program { items })
    }

    fn lower_function(&mut self, func: FnDecl) -> LowerResult<FnDecl> {
        self.ret = func.ret.value_type();
        self.scopes = ScopeStack::default();
        self.scopes.push(FrameKind::Function);
        for param in &func.params {
            if let Some(name) = &param.name {
                self.scopes.declare(&name.name);
            }
        }
        let body = match func.body {
            Some(b) => Some(Block::new(self.lower_stmts(b.stmts)?, b.span)),
            None => None,
        };
        self.scopes.pop();
        Ok(FnDecl { body, ..func })
    }

    fn lower_stmts(&mut self, stmts: Vec<Stmt>) -> LowerResult<Vec<Stmt>> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            out.extend(self.lower_stmt(stmt)?);
        }
        Ok(out)
    }

    /// Lower `stmts` inside a fresh frame of `kind`.
    fn lower_in(&mut self, kind: FrameKind, stmts: Vec<Stmt>) -> LowerResult<Vec<Stmt>> {
        self.scopes.push(kind);
        let lowered = self.lower_stmts(stmts);
        self.scopes.pop();
        lowered
    }

    /// Lower a statement that sits where C wants exactly one statement.
    fn lower_single(&mut self, stmt: Stmt) -> LowerResult<Stmt> {
        let span = stmt.span;
        let mut lowered = self.lower_stmt(stmt)?;
        if lowered.len() == 1 {
            if let Some(stmt) = lowered.pop() {
                return Ok(stmt);
            }
        }
        Ok(Stmt::block(lowered, span))
    }

    fn lower_body(&mut self, kind: FrameKind, body: Box<Stmt>) -> LowerResult<Box<Stmt>> {
        self.scopes.push(kind);
        let lowered = self.lower_single(*body);
        self.scopes.pop();
        Ok(Box::new(lowered?))
    }

    fn lower_stmt(&mut self, stmt: Stmt) -> LowerResult<Vec<Stmt>> {
        let Stmt { kind, span } = stmt;
        let kind = match kind {
            StmtKind::Empty
            | StmtKind::Expr(_)
            | StmtKind::Case(_)
            | StmtKind::Default => kind,
            StmtKind::Decl(decls) => {
                for d in &decls {
                    self.scopes.declare(&d.name.name);
                }
                StmtKind::Decl(decls)
            }
            StmtKind::Block(block) => {
                let stmts = self.lower_in(FrameKind::Block, block.stmts)?;
                StmtKind::Block(Block::new(stmts, block.span))
            }
            StmtKind::If { cond, then, els } => StmtKind::If {
                cond,
                then: self.lower_body(FrameKind::Block, then)?,
                els: els
                    .map(|e| self.lower_body(FrameKind::Block, e))
                    .transpose()?,
            },
            StmtKind::While { cond, body } => StmtKind::While {
                cond,
                body: self.lower_body(FrameKind::Loop, body)?,
            },
            StmtKind::DoWhile { body, cond } => StmtKind::DoWhile {
                body: self.lower_body(FrameKind::Loop, body)?,
                cond,
            },
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.scopes.push(FrameKind::Loop);
                if let Some(ForInit::Decl(decls)) = &init {
                    for d in decls {
                        self.scopes.declare(&d.name.name);
                    }
                }
                let body = self.lower_single(*body);
                self.scopes.pop();
                StmtKind::For {
                    init,
                    cond,
                    step,
                    body: Box::new(body?),
                }
            }
            StmtKind::Switch { scrutinee, body } => {
                let stmts = self.lower_in(FrameKind::Switch, body.stmts)?;
                StmtKind::Switch {
                    scrutinee,
                    body: Block::new(stmts, body.span),
                }
            }
            StmtKind::Return(value) => return self.lower_return(value, span),
            StmtKind::Break => return self.lower_jump(ExitEdge::Break, StmtKind::Break, span),
            StmtKind::Continue => {
                return self.lower_jump(ExitEdge::Continue, StmtKind::Continue, span)
            }
            StmtKind::Defer(defer) => return self.lower_defer(defer, span),
            StmtKind::IfLet(_) | StmtKind::Match(_) | StmtKind::RangeFor(_) => {
                return Err(LowerError::internal(
                    span,
                    "pattern or range loop reached defer lowering",
                ));
            }
        };
        Ok(vec![Stmt::new(kind, span)])
    }

    fn lower_return(&mut self, value: Option<Expr>, span: Span) -> LowerResult<Vec<Stmt>> {
        let owed = self.scopes.exit_obligations(ExitEdge::Return, span)?;
        if owed.is_empty() {
            return Ok(vec![Stmt::new(StmtKind::Return(value), span)]);
        }
        tracing::trace!(cleanups = owed.len(), "return discharges cleanups");

        let mut out = Vec::new();
        let mut scoped = false;
        let value = match value {
            Some(v) if self.ret.is_void() => {
                out.push(Stmt::expr(v));
                None
            }
            Some(v) if !v.is_literal() => {
                let temp = self.temps.fresh();
                out.push(Stmt::decl(self.ret.clone(), &temp, Some(v), span));
                scoped = true;
                Some(Expr::ident(&temp, span))
            }
            value => value,
        };
        for ob in &owed {
            out.extend(ob.discharge());
        }
        out.push(Stmt::new(StmtKind::Return(value), span));

        Ok(if scoped {
            vec![Stmt::block(out, span)]
        } else {
            out
        })
    }

    fn lower_jump(&mut self, edge: ExitEdge, jump: StmtKind, span: Span) -> LowerResult<Vec<Stmt>> {
        let owed = self.scopes.exit_obligations(edge, span)?;
        if !owed.is_empty() {
            tracing::trace!(?edge, cleanups = owed.len(), "jump discharges cleanups");
        }
        let mut out: Vec<Stmt> = owed.iter().flat_map(Obligation::discharge).collect();
        out.push(Stmt::new(jump, span));
        Ok(out)
    }

    fn lower_defer(&mut self, defer: Defer, span: Span) -> LowerResult<Vec<Stmt>> {
        let cleanup = self.lower_in(FrameKind::CleanupBoundary, defer.cleanup)?;
        let mut reads = HashSet::new();
        for stmt in &cleanup {
            idents_in_stmt(stmt, &mut reads);
        }

        let obligation = Obligation {
            cleanup,
            reads,
            span: defer.cleanup_span,
        };
        self.scopes.push(FrameKind::Defer(obligation));
        let body = self.lower_stmts(defer.body.stmts).and_then(|mut body| {
            if can_complete(&body) {
                let owed = self
                    .scopes
                    .exit_obligations(ExitEdge::FallThrough, defer.body.span)?;
                body.extend(owed.iter().flat_map(Obligation::discharge));
            }
            Ok(body)
        });
        self.scopes.pop();

        Ok(vec![Stmt::block(body?, span)])
    }
}

/// Whether control can reach the end of `stmts`.
fn can_complete(stmts: &[Stmt]) -> bool {
    !stmts.iter().any(diverges)
}

fn diverges(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue => true,
        StmtKind::Block(b) => !can_complete(&b.stmts),
        StmtKind::If {
            then,
            els: Some(els),
            ..
        } => diverges(then) && diverges(els),
        _ => false,
    }
}

fn idents_in_stmt(stmt: &Stmt, out: &mut HashSet<String>) {
    match &stmt.kind {
        StmtKind::Expr(e) | StmtKind::Case(e) | StmtKind::Return(Some(e)) => {
            idents_in_expr(e, out);
        }
        StmtKind::Decl(decls) => {
            for init in decls.iter().filter_map(|d| d.init.as_ref()) {
                idents_in_expr(init, out);
            }
        }
        StmtKind::Block(b) => {
            for s in &b.stmts {
                idents_in_stmt(s, out);
            }
        }
        StmtKind::Switch { scrutinee, body } => {
            idents_in_expr(scrutinee, out);
            for s in &body.stmts {
                idents_in_stmt(s, out);
            }
        }
        StmtKind::If { cond, then, els } => {
            idents_in_expr(cond, out);
            idents_in_stmt(then, out);
            if let Some(els) = els {
                idents_in_stmt(els, out);
            }
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            idents_in_expr(cond, out);
            idents_in_stmt(body, out);
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            match init {
                Some(ForInit::Decl(decls)) => {
                    for init in decls.iter().filter_map(|d| d.init.as_ref()) {
                        idents_in_expr(init, out);
                    }
                }
                Some(ForInit::Expr(e)) => idents_in_expr(e, out),
                None => {}
            }
            for e in cond.iter().chain(step.iter()) {
                idents_in_expr(e, out);
            }
            idents_in_stmt(body, out);
        }
        _ => {}
    }
}

fn idents_in_expr(expr: &Expr, out: &mut HashSet<String>) {
    match &expr.kind {
        ExprKind::Ident(name) => {
            out.insert(name.clone());
        }
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Char(_)
        | ExprKind::Str(_)
        | ExprKind::SizeofType(_) => {}
        ExprKind::Unary { operand, .. }
        | ExprKind::Postfix { operand, .. }
        | ExprKind::SizeofExpr(operand)
        | ExprKind::Cast { expr: operand, .. }
        | ExprKind::Member { base: operand, .. } => idents_in_expr(operand, out),
        ExprKind::Binary { lhs, rhs, .. }
        | ExprKind::Assign {
            target: lhs,
            value: rhs,
            ..
        }
        | ExprKind::Index {
            base: lhs,
            index: rhs,
        } => {
            idents_in_expr(lhs, out);
            idents_in_expr(rhs, out);
        }
        ExprKind::Ternary { cond, then, els } => {
            idents_in_expr(cond, out);
            idents_in_expr(then, out);
            idents_in_expr(els, out);
        }
        ExprKind::Call { callee, args } => {
            idents_in_expr(callee, out);
            for arg in args {
                idents_in_expr(arg, out);
            }
        }
        ExprKind::InitList(inits) | ExprKind::CompoundLiteral { inits, .. } => {
            for init in inits {
                idents_in_expr(&init.value, out);
            }
        }
        ExprKind::Variant(v) => {
            if let Some(payload) = &v.payload {
                idents_in_expr(payload, out);
            }
        }
    }
}
