//! Expressions: precedence climbing over the C operator table.

use sg_ast::{AssignOp, BinOp, Expr, ExprKind, PostfixOp, UnaryOp, VariantExpr};
use sg_lexer::Token;

use super::{join, PResult, Parser};

fn binary_op(token: &Token) -> Option<BinOp> {
    Some(match token {
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::Percent => BinOp::Rem,
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Shl => BinOp::Shl,
        Token::Shr => BinOp::Shr,
        Token::Lt => BinOp::Lt,
        Token::Gt => BinOp::Gt,
        Token::Le => BinOp::Le,
        Token::Ge => BinOp::Ge,
        Token::EqEq => BinOp::Eq,
        Token::Ne => BinOp::Ne,
        Token::Amp => BinOp::BitAnd,
        Token::Caret => BinOp::BitXor,
        Token::Pipe => BinOp::BitOr,
        Token::AndAnd => BinOp::And,
        Token::OrOr => BinOp::Or,
        _ => return None,
    })
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    Some(match token {
        Token::Eq => AssignOp::Assign,
        Token::StarEq => AssignOp::Mul,
        Token::SlashEq => AssignOp::Div,
        Token::PercentEq => AssignOp::Rem,
        Token::PlusEq => AssignOp::Add,
        Token::MinusEq => AssignOp::Sub,
        Token::ShlEq => AssignOp::Shl,
        Token::ShrEq => AssignOp::Shr,
        Token::AmpEq => AssignOp::And,
        Token::CaretEq => AssignOp::Xor,
        Token::PipeEq => AssignOp::Or,
        _ => return None,
    })
}

fn unary_op(token: &Token) -> Option<UnaryOp> {
    Some(match token {
        Token::Minus => UnaryOp::Neg,
        Token::Plus => UnaryOp::Plus,
        Token::Bang => UnaryOp::Not,
        Token::Tilde => UnaryOp::BitNot,
        Token::Star => UnaryOp::Deref,
        Token::Amp => UnaryOp::AddrOf,
        Token::PlusPlus => UnaryOp::PreInc,
        Token::MinusMinus => UnaryOp::PreDec,
        _ => return None,
    })
}

/// Lowest binary precedence: `||`.
const MIN_BINARY_PREC: u8 = 4;

impl Parser<'_> {
    pub(super) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_assign()
    }

    pub(super) fn parse_assign(&mut self) -> PResult<Expr> {
        let target = self.parse_ternary()?;
        let Some(op) = self.peek().and_then(assign_op) else {
            return Ok(target);
        };
        self.pos += 1;
        let value = self.parse_assign()?;
        let span = join(target.span, value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    pub(super) fn parse_ternary(&mut self) -> PResult<Expr> {
        let cond = self.parse_binary(MIN_BINARY_PREC)?;
        if !self.eat(&Token::Question) {
            return Ok(cond);
        }
        let then = self.parse_expr()?;
        self.expect(&Token::Colon)?;
        let els = self.parse_ternary()?;
        let span = join(cond.span, els.span);
        Ok(Expr::new(
            ExprKind::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                els: Box::new(els),
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.peek().and_then(binary_op) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_binary(prec + 1)?;
            let span = join(lhs.span, rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.span();

        if let Some(op) = self.peek().and_then(unary_op) {
            self.pos += 1;
            let operand = self.parse_unary()?;
            let span = join(start, operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        if self.eat(&Token::Sizeof) {
            if self.check(&Token::LParen) && self.starts_type_at(1) {
                self.pos += 1;
                let ty = self.parse_type_name()?;
                let end = self.expect(&Token::RParen)?;
                return Ok(Expr::new(ExprKind::SizeofType(ty), join(start, end)));
            }
            let operand = self.parse_unary()?;
            let span = join(start, operand.span);
            return Ok(Expr::new(ExprKind::SizeofExpr(Box::new(operand)), span));
        }

        if self.check(&Token::LParen) && self.starts_type_at(1) {
            self.pos += 1;
            let ty = self.parse_type_name()?;
            self.expect(&Token::RParen)?;
            if self.check(&Token::LBrace) {
                let inits = self.parse_init_list()?;
                let literal = Expr::new(
                    ExprKind::CompoundLiteral { ty, inits },
                    join(start, self.prev_span()),
                );
                return self.parse_postfix_ops(literal);
            }
            let operand = self.parse_unary()?;
            let span = join(start, operand.span);
            return Ok(Expr::new(
                ExprKind::Cast {
                    ty,
                    expr: Box::new(operand),
                },
                span,
            ));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix_ops(primary)
    }

    fn parse_postfix_ops(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            let kind = match self.peek() {
                Some(Token::LParen) => {
                    self.pos += 1;
                    let mut args = Vec::new();
                    while !self.check(&Token::RParen) {
                        args.push(self.parse_assign()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    self.expect(&Token::RParen)?;
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let index = self.parse_expr()?;
                    self.expect(&Token::RBracket)?;
                    ExprKind::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                Some(tok @ (Token::Dot | Token::Arrow)) => {
                    let arrow = *tok == Token::Arrow;
                    self.pos += 1;
                    let field = self.expect_ident()?.name;
                    ExprKind::Member {
                        base: Box::new(expr),
                        field,
                        arrow,
                    }
                }
                Some(tok @ (Token::PlusPlus | Token::MinusMinus)) => {
                    let op = if *tok == Token::PlusPlus {
                        PostfixOp::Inc
                    } else {
                        PostfixOp::Dec
                    };
                    self.pos += 1;
                    ExprKind::Postfix {
                        op,
                        operand: Box::new(expr),
                    }
                }
                _ => return Ok(expr),
            };
            let span = join(expr_span(&kind), self.prev_span());
            expr = Expr::new(kind, span);
        }
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.span();
        let kind = match self.peek() {
            Some(Token::Ident(_))
                if self.syntax.adt && self.peek_at(1) == Some(&Token::ColonColon) =>
            {
                let ty = self.expect_ident()?;
                self.expect(&Token::ColonColon)?;
                let variant = self.expect_ident()?;
                let payload = if self.eat(&Token::LParen) {
                    let payload = self.parse_expr()?;
                    self.expect(&Token::RParen)?;
                    Some(Box::new(payload))
                } else {
                    None
                };
                ExprKind::Variant(VariantExpr {
                    ty,
                    variant,
                    payload,
                })
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                ExprKind::Ident(name)
            }
            Some(Token::Int(value)) => {
                let value = value.clone();
                self.pos += 1;
                ExprKind::Int(value)
            }
            Some(Token::Float(value)) => {
                let value = value.clone();
                self.pos += 1;
                ExprKind::Float(value)
            }
            Some(Token::Char(value)) => {
                let value = value.clone();
                self.pos += 1;
                ExprKind::Char(value)
            }
            Some(Token::Str(_)) => {
                // Adjacent literals concatenate; keep each piece's spelling.
                let mut pieces = Vec::new();
                while let Some(Token::Str(piece)) = self.peek() {
                    pieces.push(piece.clone());
                    self.pos += 1;
                }
                ExprKind::Str(pieces.join(" "))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                return Ok(Expr::new(inner.kind, join(start, self.prev_span())));
            }
            _ => return Err(self.unexpected("an expression")),
        };
        Ok(Expr::new(kind, join(start, self.prev_span())))
    }
}

/// Start of the span of the operand a postfix operator was applied to.
fn expr_span(kind: &ExprKind) -> swc_common::Span {
    match kind {
        ExprKind::Call { callee: base, .. }
        | ExprKind::Index { base, .. }
        | ExprKind::Member { base, .. }
        | ExprKind::Postfix { operand: base, .. } => base.span,
        _ => swc_common::DUMMY_SP,
    }
}
