//! Owned tree rewriting shared by the lowering passes.
//!
//! A pass implements [`Fold`] and overrides the hooks for the nodes it
//! rewrites; the `walk_*` functions rebuild everything else with folded
//! children, in source order.

use sg_ast::{
    Block, Defer, Expr, ExprKind, FnDecl, ForInit, IfLet, Initializer, Item, ItemKind, Match,
    MatchArm, Program, RangeFor, Stmt, StmtKind, VarDecl, VariantExpr,
};

use crate::error::LowerResult;

pub(crate) trait Fold {
    fn fold_item(&mut self, item: Item) -> LowerResult<Vec<Item>> {
        Ok(vec![walk_item(self, item)?])
    }

    fn fold_function(&mut self, func: FnDecl) -> LowerResult<FnDecl> {
        walk_function(self, func)
    }

    fn fold_block(&mut self, block: Block) -> LowerResult<Block> {
        walk_block(self, block)
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> LowerResult<Stmt> {
        walk_stmt(self, stmt)
    }

    fn fold_expr(&mut self, expr: Expr) -> LowerResult<Expr> {
        walk_expr(self, expr)
    }
}

pub(crate) fn fold_program<F: Fold + ?Sized>(f: &mut F, program: Program) -> LowerResult<Program> {
    let mut items = Vec::with_capacity(program.items.len());
    for item in program.items {
        items.extend(f.fold_item(item)?);
    }
    Ok(Program { items })
}

pub(crate) fn walk_item<F: Fold + ?Sized>(f: &mut F, item: Item) -> LowerResult<Item> {
    let kind = match item.kind {
        ItemKind::Function(func) => ItemKind::Function(f.fold_function(func)?),
        ItemKind::Global(decls) => ItemKind::Global(walk_decls(f, decls)?),
        other => other,
    };
    Ok(Item {
        kind,
        span: item.span,
    })
}

pub(crate) fn walk_function<F: Fold + ?Sized>(f: &mut F, func: FnDecl) -> LowerResult<FnDecl> {
    let body = func.body.map(|b| f.fold_block(b)).transpose()?;
    Ok(FnDecl { body, ..func })
}

pub(crate) fn walk_block<F: Fold + ?Sized>(f: &mut F, block: Block) -> LowerResult<Block> {
    let stmts = block
        .stmts
        .into_iter()
        .map(|s| f.fold_stmt(s))
        .collect::<LowerResult<_>>()?;
    Ok(Block::new(stmts, block.span))
}

pub(crate) fn walk_decls<F: Fold + ?Sized>(
    f: &mut F,
    decls: Vec<VarDecl>,
) -> LowerResult<Vec<VarDecl>> {
    decls
        .into_iter()
        .map(|d| {
            Ok(VarDecl {
                init: fold_opt(f, d.init)?,
                ..d
            })
        })
        .collect()
}

fn fold_opt<F: Fold + ?Sized>(f: &mut F, expr: Option<Expr>) -> LowerResult<Option<Expr>> {
    expr.map(|e| f.fold_expr(e)).transpose()
}

fn fold_boxed<F: Fold + ?Sized>(f: &mut F, stmt: Box<Stmt>) -> LowerResult<Box<Stmt>> {
    Ok(Box::new(f.fold_stmt(*stmt)?))
}

fn fold_boxed_expr<F: Fold + ?Sized>(f: &mut F, expr: Box<Expr>) -> LowerResult<Box<Expr>> {
    Ok(Box::new(f.fold_expr(*expr)?))
}

pub(crate) fn walk_stmt<F: Fold + ?Sized>(f: &mut F, stmt: Stmt) -> LowerResult<Stmt> {
    let Stmt { kind, span } = stmt;
    let kind = match kind {
        StmtKind::Empty | StmtKind::Default | StmtKind::Break | StmtKind::Continue => kind,
        StmtKind::Expr(e) => StmtKind::Expr(f.fold_expr(e)?),
        StmtKind::Decl(decls) => StmtKind::Decl(walk_decls(f, decls)?),
        StmtKind::Block(b) => StmtKind::Block(f.fold_block(b)?),
        StmtKind::If { cond, then, els } => StmtKind::If {
            cond: f.fold_expr(cond)?,
            then: fold_boxed(f, then)?,
            els: els.map(|e| fold_boxed(f, e)).transpose()?,
        },
        StmtKind::While { cond, body } => StmtKind::While {
            cond: f.fold_expr(cond)?,
            body: fold_boxed(f, body)?,
        },
        StmtKind::DoWhile { body, cond } => StmtKind::DoWhile {
            body: fold_boxed(f, body)?,
            cond: f.fold_expr(cond)?,
        },
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => StmtKind::For {
            init: match init {
                Some(ForInit::Decl(decls)) => Some(ForInit::Decl(walk_decls(f, decls)?)),
                Some(ForInit::Expr(e)) => Some(ForInit::Expr(f.fold_expr(e)?)),
                None => None,
            },
            cond: fold_opt(f, cond)?,
            step: fold_opt(f, step)?,
            body: fold_boxed(f, body)?,
        },
        StmtKind::Switch { scrutinee, body } => StmtKind::Switch {
            scrutinee: f.fold_expr(scrutinee)?,
            body: f.fold_block(body)?,
        },
        StmtKind::Case(e) => StmtKind::Case(f.fold_expr(e)?),
        StmtKind::Return(value) => StmtKind::Return(fold_opt(f, value)?),
        StmtKind::IfLet(il) => StmtKind::IfLet(IfLet {
            scrutinee: f.fold_expr(il.scrutinee)?,
            then: f.fold_block(il.then)?,
            els: il.els.map(|e| fold_boxed(f, e)).transpose()?,
            pattern: il.pattern,
            pattern_span: il.pattern_span,
        }),
        StmtKind::Match(m) => StmtKind::Match(Match {
            scrutinee: f.fold_expr(m.scrutinee)?,
            arms: m
                .arms
                .into_iter()
                .map(|arm| {
                    Ok(MatchArm {
                        body: f.fold_block(arm.body)?,
                        pattern: arm.pattern,
                    })
                })
                .collect::<LowerResult<_>>()?,
        }),
        StmtKind::RangeFor(rf) => StmtKind::RangeFor(RangeFor {
            start: f.fold_expr(rf.start)?,
            end: f.fold_expr(rf.end)?,
            body: fold_boxed(f, rf.body)?,
            var: rf.var,
        }),
        StmtKind::Defer(d) => StmtKind::Defer(Defer {
            cleanup: d
                .cleanup
                .into_iter()
                .map(|s| f.fold_stmt(s))
                .collect::<LowerResult<_>>()?,
            body: f.fold_block(d.body)?,
            cleanup_span: d.cleanup_span,
        }),
    };
    Ok(Stmt::new(kind, span))
}

pub(crate) fn walk_expr<F: Fold + ?Sized>(f: &mut F, expr: Expr) -> LowerResult<Expr> {
    let Expr { kind, span } = expr;
    let kind = match kind {
        ExprKind::Ident(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Char(_)
        | ExprKind::Str(_)
        | ExprKind::SizeofType(_) => kind,
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: fold_boxed_expr(f, operand)?,
        },
        ExprKind::Postfix { op, operand } => ExprKind::Postfix {
            op,
            operand: fold_boxed_expr(f, operand)?,
        },
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op,
            lhs: fold_boxed_expr(f, lhs)?,
            rhs: fold_boxed_expr(f, rhs)?,
        },
        ExprKind::Assign { op, target, value } => ExprKind::Assign {
            op,
            target: fold_boxed_expr(f, target)?,
            value: fold_boxed_expr(f, value)?,
        },
        ExprKind::Ternary { cond, then, els } => ExprKind::Ternary {
            cond: fold_boxed_expr(f, cond)?,
            then: fold_boxed_expr(f, then)?,
            els: fold_boxed_expr(f, els)?,
        },
        ExprKind::Call { callee, args } => ExprKind::Call {
            callee: fold_boxed_expr(f, callee)?,
            args: args
                .into_iter()
                .map(|a| f.fold_expr(a))
                .collect::<LowerResult<_>>()?,
        },
        ExprKind::Index { base, index } => ExprKind::Index {
            base: fold_boxed_expr(f, base)?,
            index: fold_boxed_expr(f, index)?,
        },
        ExprKind::Member { base, field, arrow } => ExprKind::Member {
            base: fold_boxed_expr(f, base)?,
            field,
            arrow,
        },
        ExprKind::Cast { ty, expr } => ExprKind::Cast {
            ty,
            expr: fold_boxed_expr(f, expr)?,
        },
        ExprKind::SizeofExpr(e) => ExprKind::SizeofExpr(fold_boxed_expr(f, e)?),
        ExprKind::InitList(inits) => ExprKind::InitList(walk_inits(f, inits)?),
        ExprKind::CompoundLiteral { ty, inits } => ExprKind::CompoundLiteral {
            ty,
            inits: walk_inits(f, inits)?,
        },
        ExprKind::Variant(v) => ExprKind::Variant(VariantExpr {
            payload: v.payload.map(|p| fold_boxed_expr(f, p)).transpose()?,
            ..v
        }),
    };
    Ok(Expr::new(kind, span))
}

fn walk_inits<F: Fold + ?Sized>(
    f: &mut F,
    inits: Vec<Initializer>,
) -> LowerResult<Vec<Initializer>> {
    inits
        .into_iter()
        .map(|init| {
            Ok(Initializer {
                value: f.fold_expr(init.value)?,
                field: init.field,
            })
        })
        .collect()
}
