//! Expression printing with minimal parentheses.

use sg_ast::target::{Expr, Initializer, UnaryOp};

use crate::decl::declaration;
use crate::Emitter;

pub(crate) const ASSIGN_PREC: u8 = 2;
const TERNARY_PREC: u8 = 3;
const UNARY_PREC: u8 = 14;
const POSTFIX_PREC: u8 = 15;
const PRIMARY_PREC: u8 = 16;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Assign { .. } => ASSIGN_PREC,
        Expr::Ternary { .. } => TERNARY_PREC,
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Unary { .. } | Expr::Cast { .. } | Expr::SizeofExpr(_) | Expr::SizeofType(_) => {
            UNARY_PREC
        }
        Expr::Postfix { .. }
        | Expr::Call { .. }
        | Expr::Index { .. }
        | Expr::Member { .. }
        | Expr::CompoundLiteral { .. } => POSTFIX_PREC,
        Expr::Ident(_)
        | Expr::Int(_)
        | Expr::Float(_)
        | Expr::Char(_)
        | Expr::Str(_)
        | Expr::InitList(_) => PRIMARY_PREC,
    }
}

/// `- -x` and `+ +x` would lex as `--x` and `++x`.
fn glues(op: UnaryOp, operand: &Expr) -> bool {
    matches!(
        (op, operand),
        (
            UnaryOp::Neg,
            Expr::Unary {
                op: UnaryOp::Neg | UnaryOp::PreDec,
                ..
            }
        ) | (
            UnaryOp::Plus,
            Expr::Unary {
                op: UnaryOp::Plus | UnaryOp::PreInc,
                ..
            }
        )
    )
}

impl Emitter {
    pub fn emit_expr(&mut self, expr: &Expr) {
        self.emit_expr_prec(expr, 0);
    }

    /// Print `expr`, parenthesized when it binds looser than `min`.
    pub(crate) fn emit_expr_prec(&mut self, expr: &Expr, min: u8) {
        if precedence(expr) < min {
            self.wr.write("(");
            self.emit_bare(expr);
            self.wr.write(")");
        } else {
            self.emit_bare(expr);
        }
    }

    fn emit_bare(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(text) | Expr::Int(text) | Expr::Float(text) | Expr::Char(text)
            | Expr::Str(text) => self.wr.write(text),
            Expr::Unary { op, operand } => {
                self.wr.write(op.as_str());
                if glues(*op, operand) {
                    self.wr.write("(");
                    self.emit_expr(operand);
                    self.wr.write(")");
                } else {
                    self.emit_expr_prec(operand, UNARY_PREC);
                }
            }
            Expr::Postfix { op, operand } => {
                self.emit_expr_prec(operand, POSTFIX_PREC);
                self.wr.write(op.as_str());
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                self.emit_expr_prec(lhs, prec);
                self.wr.write(&format!(" {} ", op.as_str()));
                self.emit_expr_prec(rhs, prec + 1);
            }
            Expr::Assign { op, target, value } => {
                self.emit_expr_prec(target, TERNARY_PREC);
                self.wr.write(&format!(" {} ", op.as_str()));
                self.emit_expr_prec(value, ASSIGN_PREC);
            }
            Expr::Ternary { cond, then, els } => {
                self.emit_expr_prec(cond, TERNARY_PREC + 1);
                self.wr.write(" ? ");
                self.emit_expr_prec(then, ASSIGN_PREC);
                self.wr.write(" : ");
                self.emit_expr_prec(els, TERNARY_PREC);
            }
            Expr::Call { callee, args } => {
                self.emit_expr_prec(callee, POSTFIX_PREC);
                self.wr.write("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.wr.write(", ");
                    }
                    self.emit_expr_prec(arg, ASSIGN_PREC);
                }
                self.wr.write(")");
            }
            Expr::Index { base, index } => {
                self.emit_expr_prec(base, POSTFIX_PREC);
                self.wr.write("[");
                self.emit_expr(index);
                self.wr.write("]");
            }
            Expr::Member { base, field, arrow } => {
                self.emit_expr_prec(base, POSTFIX_PREC);
                self.wr.write(if *arrow { "->" } else { "." });
                self.wr.write(field);
            }
            Expr::Cast { ty, expr } => {
                self.wr.write(&format!("({})", declaration(ty, None)));
                self.emit_expr_prec(expr, UNARY_PREC);
            }
            Expr::SizeofType(ty) => {
                self.wr.write(&format!("sizeof({})", declaration(ty, None)));
            }
            Expr::SizeofExpr(inner) => {
                self.wr.write("sizeof(");
                self.emit_expr(inner);
                self.wr.write(")");
            }
            Expr::InitList(inits) => self.emit_inits(inits),
            Expr::CompoundLiteral { ty, inits } => {
                self.wr.write(&format!("({})", declaration(ty, None)));
                self.emit_inits(inits);
            }
        }
    }

    fn emit_inits(&mut self, inits: &[Initializer]) {
        if inits.is_empty() {
            self.wr.write("{}");
            return;
        }
        self.wr.write("{ ");
        for (i, init) in inits.iter().enumerate() {
            if i > 0 {
                self.wr.write(", ");
            }
            if let Some(field) = &init.field {
                self.wr.write(&format!(".{field} = "));
            }
            self.emit_expr_prec(&init.value, ASSIGN_PREC);
        }
        self.wr.write(" }");
    }
}
