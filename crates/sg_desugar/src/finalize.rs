//! Conversion of the fully lowered surface tree into the target tree.
//!
//! The target tree cannot represent an extended node, so any that is still
//! present here is reported as an `Internal` error instead of being printed.

use sg_ast::{self as ast, target};

use crate::error::{LowerError, LowerResult};

pub(crate) fn into_target(program: ast::Program) -> LowerResult<target::Program> {
    let items = program
        .items
        .into_iter()
        .map(item)
        .collect::<LowerResult<_>>()?;
    Ok(target::Program { items })
}

fn item(item: ast::Item) -> LowerResult<target::Item> {
    Ok(match item.kind {
        ast::ItemKind::Directive(text) => target::Item::Directive(text),
        ast::ItemKind::Enum(decl) => {
            if decl.is_algebraic() {
                return Err(LowerError::internal(
                    decl.name.span,
                    format!("tagged enum `{}` was not lowered", decl.name.name),
                ));
            }
            target::Item::Enum(target::EnumDecl {
                name: decl.name.name,
                constants: decl
                    .variants
                    .into_iter()
                    .map(|v| {
                        Ok(target::EnumConstant {
                            name: v.name.name,
                            value: v.value.map(expr).transpose()?,
                        })
                    })
                    .collect::<LowerResult<_>>()?,
            })
        }
        ast::ItemKind::Struct(r) => target::Item::Struct(record(r)),
        ast::ItemKind::Union(r) => target::Item::Union(record(r)),
        ast::ItemKind::Typedef(t) => target::Item::Typedef {
            ty: t.ty,
            name: t.name.name,
        },
        ast::ItemKind::Function(f) => target::Item::Function(target::FnDecl {
            ret: f.ret,
            name: f.name.name,
            params: f
                .params
                .into_iter()
                .map(|p| target::Param {
                    ty: p.ty,
                    name: p.name.map(|n| n.name),
                })
                .collect(),
            variadic: f.variadic,
            body: f.body.map(block).transpose()?,
        }),
        ast::ItemKind::Global(decls) => target::Item::Global(var_decls(decls)?),
    })
}

fn record(r: ast::RecordDecl) -> target::RecordDecl {
    target::RecordDecl {
        name: r.name.name,
        fields: r.fields.map(|fields| {
            fields
                .into_iter()
                .map(|f| target::Field {
                    ty: f.ty,
                    name: f.name.name,
                })
                .collect()
        }),
    }
}

fn var_decls(decls: Vec<ast::VarDecl>) -> LowerResult<Vec<target::VarDecl>> {
    decls
        .into_iter()
        .map(|d| {
            Ok(target::VarDecl {
                ty: d.ty,
                name: d.name.name,
                init: d.init.map(expr).transpose()?,
            })
        })
        .collect()
}

fn block(b: ast::Block) -> LowerResult<target::Block> {
    Ok(target::Block {
        stmts: b.stmts.into_iter().map(stmt).collect::<LowerResult<_>>()?,
    })
}

fn boxed(s: Box<ast::Stmt>) -> LowerResult<Box<target::Stmt>> {
    Ok(Box::new(stmt(*s)?))
}

fn stmt(s: ast::Stmt) -> LowerResult<target::Stmt> {
    use ast::StmtKind as K;
    Ok(match s.kind {
        K::Empty => target::Stmt::Empty,
        K::Expr(e) => target::Stmt::Expr(expr(e)?),
        K::Decl(decls) => target::Stmt::Decl(var_decls(decls)?),
        K::Block(b) => target::Stmt::Block(block(b)?),
        K::If { cond, then, els } => target::Stmt::If {
            cond: expr(cond)?,
            then: boxed(then)?,
            els: els.map(boxed).transpose()?,
        },
        K::While { cond, body } => target::Stmt::While {
            cond: expr(cond)?,
            body: boxed(body)?,
        },
        K::DoWhile { body, cond } => target::Stmt::DoWhile {
            body: boxed(body)?,
            cond: expr(cond)?,
        },
        K::For {
            init,
            cond,
            step,
            body,
        } => target::Stmt::For {
            init: match init {
                Some(ast::ForInit::Decl(decls)) => Some(target::ForInit::Decl(var_decls(decls)?)),
                Some(ast::ForInit::Expr(e)) => Some(target::ForInit::Expr(expr(e)?)),
                None => None,
            },
            cond: cond.map(expr).transpose()?,
            step: step.map(expr).transpose()?,
            body: boxed(body)?,
        },
        K::Switch { scrutinee, body } => target::Stmt::Switch {
            scrutinee: expr(scrutinee)?,
            body: block(body)?,
        },
        K::Case(e) => target::Stmt::Case(expr(e)?),
        K::Default => target::Stmt::Default,
        K::Return(value) => target::Stmt::Return(value.map(expr).transpose()?),
        K::Break => target::Stmt::Break,
        K::Continue => target::Stmt::Continue,
        K::IfLet(_) => return Err(LowerError::internal(s.span, "`if let` was not lowered")),
        K::Match(_) => return Err(LowerError::internal(s.span, "`match` was not lowered")),
        K::RangeFor(_) => return Err(LowerError::internal(s.span, "range loop was not lowered")),
        K::Defer(_) => return Err(LowerError::internal(s.span, "`defer` was not lowered")),
    })
}

fn boxed_expr(e: Box<ast::Expr>) -> LowerResult<Box<target::Expr>> {
    Ok(Box::new(expr(*e)?))
}

fn inits(inits: Vec<ast::Initializer>) -> LowerResult<Vec<target::Initializer>> {
    inits
        .into_iter()
        .map(|i| {
            Ok(target::Initializer {
                field: i.field,
                value: expr(i.value)?,
            })
        })
        .collect()
}

fn expr(e: ast::Expr) -> LowerResult<target::Expr> {
    use ast::ExprKind as K;
    Ok(match e.kind {
        K::Ident(name) => target::Expr::Ident(name),
        K::Int(v) => target::Expr::Int(v),
        K::Float(v) => target::Expr::Float(v),
        K::Char(v) => target::Expr::Char(v),
        K::Str(v) => target::Expr::Str(v),
        K::Unary { op, operand } => target::Expr::Unary {
            op,
            operand: boxed_expr(operand)?,
        },
        K::Postfix { op, operand } => target::Expr::Postfix {
            op,
            operand: boxed_expr(operand)?,
        },
        K::Binary { op, lhs, rhs } => target::Expr::Binary {
            op,
            lhs: boxed_expr(lhs)?,
            rhs: boxed_expr(rhs)?,
        },
        K::Assign { op, target, value } => target::Expr::Assign {
            op,
            target: boxed_expr(target)?,
            value: boxed_expr(value)?,
        },
        K::Ternary { cond, then, els } => target::Expr::Ternary {
            cond: boxed_expr(cond)?,
            then: boxed_expr(then)?,
            els: boxed_expr(els)?,
        },
        K::Call { callee, args } => target::Expr::Call {
            callee: boxed_expr(callee)?,
            args: args.into_iter().map(expr).collect::<LowerResult<_>>()?,
        },
        K::Index { base, index } => target::Expr::Index {
            base: boxed_expr(base)?,
            index: boxed_expr(index)?,
        },
        K::Member { base, field, arrow } => target::Expr::Member {
            base: boxed_expr(base)?,
            field,
            arrow,
        },
        K::Cast { ty, expr: inner } => target::Expr::Cast {
            ty,
            expr: boxed_expr(inner)?,
        },
        K::SizeofType(ty) => target::Expr::SizeofType(ty),
        K::SizeofExpr(inner) => target::Expr::SizeofExpr(boxed_expr(inner)?),
        K::InitList(list) => target::Expr::InitList(inits(list)?),
        K::CompoundLiteral { ty, inits: list } => target::Expr::CompoundLiteral {
            ty,
            inits: inits(list)?,
        },
        K::Variant(v) => {
            return Err(LowerError::internal(
                e.span,
                format!(
                    "constructor `{}::{}` was not lowered",
                    v.ty.name, v.variant.name
                ),
            ));
        }
    })
}
