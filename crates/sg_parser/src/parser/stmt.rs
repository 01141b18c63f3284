//! Statements, including the sugarc statement forms.

use sg_ast::{
    Block, Defer, ForInit, IfLet, Match, MatchArm, Pattern, PatternKind, RangeFor, Stmt,
    StmtKind, VariantPattern,
};
use sg_lexer::Token;

use super::{join, PResult, Parser};
use crate::parse::ParseError;

impl Parser<'_> {
    pub(super) fn parse_block(&mut self) -> PResult<Block> {
        let start = self.expect(&Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.at_end() {
                return Err(self.unexpected("`}`"));
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.expect(&Token::RBrace)?;
        Ok(Block::new(stmts, join(start, end)))
    }

    pub(super) fn parse_stmt(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let kind = match self.peek() {
            Some(Token::LBrace) => StmtKind::Block(self.parse_block()?),
            Some(Token::Semi) => {
                self.pos += 1;
                StmtKind::Empty
            }
            Some(Token::If) => self.parse_if()?,
            Some(Token::While) => {
                self.pos += 1;
                let cond = self.parse_paren_expr()?;
                let body = Box::new(self.parse_stmt()?);
                StmtKind::While { cond, body }
            }
            Some(Token::Do) => {
                self.pos += 1;
                let body = Box::new(self.parse_stmt()?);
                self.expect(&Token::While)?;
                let cond = self.parse_paren_expr()?;
                self.expect(&Token::Semi)?;
                StmtKind::DoWhile { body, cond }
            }
            Some(Token::For) => self.parse_for()?,
            Some(Token::Switch) => {
                self.pos += 1;
                let scrutinee = self.parse_paren_expr()?;
                let body = self.parse_block()?;
                StmtKind::Switch { scrutinee, body }
            }
            Some(Token::Case) => {
                self.pos += 1;
                let value = self.parse_ternary()?;
                self.expect(&Token::Colon)?;
                StmtKind::Case(value)
            }
            Some(Token::Default) => {
                self.pos += 1;
                self.expect(&Token::Colon)?;
                StmtKind::Default
            }
            Some(Token::Return) => {
                self.pos += 1;
                let value = if self.check(&Token::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&Token::Semi)?;
                StmtKind::Return(value)
            }
            Some(Token::Break) => {
                self.pos += 1;
                self.expect(&Token::Semi)?;
                StmtKind::Break
            }
            Some(Token::Continue) => {
                self.pos += 1;
                self.expect(&Token::Semi)?;
                StmtKind::Continue
            }
            Some(Token::Goto) => {
                return Err(ParseError::new("`goto` is not supported", start));
            }
            Some(Token::Ident(word))
                if word == "match"
                    && self.syntax.patterns
                    && self.paren_group_precedes_block(1) =>
            {
                StmtKind::Match(self.parse_match()?)
            }
            Some(Token::Ident(word))
                if word == "defer" && self.syntax.defer && self.paren_group_precedes_block(1) =>
            {
                StmtKind::Defer(self.parse_defer()?)
            }
            _ if self.starts_type() => StmtKind::Decl(self.parse_declaration()?),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(&Token::Semi)?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt::new(kind, join(start, self.prev_span())))
    }

    fn parse_paren_expr(&mut self) -> PResult<sg_ast::Expr> {
        self.expect(&Token::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        Ok(expr)
    }

    fn parse_if(&mut self) -> PResult<StmtKind> {
        self.expect(&Token::If)?;
        if self.syntax.patterns && self.check_ident("let") {
            return self.parse_if_let().map(StmtKind::IfLet);
        }
        let cond = self.parse_paren_expr()?;
        let then = Box::new(self.parse_stmt()?);
        let els = self.parse_else()?;
        Ok(StmtKind::If { cond, then, els })
    }

    fn parse_else(&mut self) -> PResult<Option<Box<Stmt>>> {
        if self.eat(&Token::Else) {
            Ok(Some(Box::new(self.parse_stmt()?)))
        } else {
            Ok(None)
        }
    }

    /// `let T::V(binding) = scrutinee { ... } [else ...]`, after `if`.
    fn parse_if_let(&mut self) -> PResult<IfLet> {
        self.expect_word("let")?;
        let pattern_start = self.span();
        let pattern = self.parse_variant_pattern()?;
        let pattern_span = join(pattern_start, self.prev_span());
        self.expect(&Token::Eq)?;
        let scrutinee = self.parse_expr()?;
        let then = self.parse_block()?;
        let els = self.parse_else()?;
        Ok(IfLet {
            pattern,
            pattern_span,
            scrutinee,
            then,
            els,
        })
    }

    fn parse_variant_pattern(&mut self) -> PResult<VariantPattern> {
        let ty = self.expect_ident()?;
        self.expect(&Token::ColonColon)?;
        let variant = self.expect_ident()?;
        let binding = if self.eat(&Token::LParen) {
            let binding = self.expect_ident()?;
            self.expect(&Token::RParen)?;
            Some(binding).filter(|b| b.name != "_")
        } else {
            None
        };
        Ok(VariantPattern {
            ty,
            variant,
            binding,
        })
    }

    fn parse_for(&mut self) -> PResult<StmtKind> {
        self.expect(&Token::For)?;

        if self.syntax.range_for
            && matches!(self.peek(), Some(Token::Ident(_)))
            && self.peek_at(1).is_some_and(|t| t.is_ident("in"))
        {
            let var = self.expect_ident()?;
            self.expect_word("in")?;
            let start = self.parse_expr()?;
            self.expect_word("to")?;
            let end = self.parse_expr()?;
            let body = Box::new(self.parse_stmt()?);
            return Ok(StmtKind::RangeFor(RangeFor {
                var,
                start,
                end,
                body,
            }));
        }

        self.expect(&Token::LParen)?;
        let init = if self.eat(&Token::Semi) {
            None
        } else if self.starts_type() {
            Some(ForInit::Decl(self.parse_declaration()?))
        } else {
            let expr = self.parse_expr()?;
            self.expect(&Token::Semi)?;
            Some(ForInit::Expr(expr))
        };
        let cond = if self.check(&Token::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Token::Semi)?;
        let step = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Token::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }

    /// `match (expr) { case P { ... } ... default { ... } }`
    fn parse_match(&mut self) -> PResult<Match> {
        self.expect_word("match")?;
        let scrutinee = self.parse_paren_expr()?;
        self.expect(&Token::LBrace)?;

        let mut arms = Vec::new();
        while !self.check(&Token::RBrace) {
            let start = self.span();
            let pattern = if self.eat(&Token::Default) {
                Pattern {
                    kind: PatternKind::Wildcard,
                    span: start,
                }
            } else {
                self.expect(&Token::Case)?;
                self.parse_pattern()?
            };
            self.eat(&Token::Colon);
            let body = self.parse_block()?;
            arms.push(MatchArm { pattern, body });
        }
        self.expect(&Token::RBrace)?;
        Ok(Match { scrutinee, arms })
    }

    fn parse_pattern(&mut self) -> PResult<Pattern> {
        let start = self.span();
        let kind = match self.peek() {
            Some(Token::Ident(name)) if name == "_" => {
                self.pos += 1;
                PatternKind::Wildcard
            }
            Some(Token::Ident(_)) if self.peek_at(1) == Some(&Token::ColonColon) => {
                PatternKind::Variant(self.parse_variant_pattern()?)
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                PatternKind::Const(name)
            }
            Some(Token::Int(value)) => {
                let value = value.clone();
                self.pos += 1;
                PatternKind::Int(value)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                match self.peek() {
                    Some(Token::Int(value)) => {
                        let value = format!("-{value}");
                        self.pos += 1;
                        PatternKind::Int(value)
                    }
                    _ => return Err(self.unexpected("an integer literal")),
                }
            }
            Some(Token::Char(value)) => {
                let value = value.clone();
                self.pos += 1;
                PatternKind::Char(value)
            }
            _ => return Err(self.unexpected("a pattern")),
        };
        Ok(Pattern {
            kind,
            span: join(start, self.prev_span()),
        })
    }

    /// `defer (c1; c2; ...) { body }`
    fn parse_defer(&mut self) -> PResult<Defer> {
        self.expect_word("defer")?;
        let open = self.expect(&Token::LParen)?;

        let mut cleanup = Vec::new();
        while !self.check(&Token::RParen) {
            if self.at_end() {
                return Err(self.unexpected("`)`"));
            }
            cleanup.push(self.parse_cleanup_stmt()?);
        }
        let close = self.expect(&Token::RParen)?;
        if cleanup.is_empty() {
            return Err(ParseError::new(
                "defer needs at least one cleanup statement",
                join(open, close),
            ));
        }

        let body = self.parse_block()?;
        Ok(Defer {
            cleanup,
            cleanup_span: join(open, close),
            body,
        })
    }

    /// One cleanup statement. The `;` before the closing `)` may be left
    /// out.
    fn parse_cleanup_stmt(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let kind = match self.peek() {
            Some(Token::Return) => {
                self.pos += 1;
                let value = if matches!(self.peek(), Some(Token::Semi | Token::RParen)) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                StmtKind::Return(value)
            }
            Some(Token::Break) => {
                self.pos += 1;
                StmtKind::Break
            }
            Some(Token::Continue) => {
                self.pos += 1;
                StmtKind::Continue
            }
            Some(
                Token::LBrace
                | Token::If
                | Token::While
                | Token::Do
                | Token::For
                | Token::Switch
                | Token::Goto
                | Token::Semi,
            ) => return self.parse_stmt(),
            Some(Token::Ident(word))
                if (word == "match" || word == "defer") && self.paren_group_precedes_block(1) =>
            {
                return self.parse_stmt();
            }
            _ if self.starts_type() => return self.parse_stmt(),
            _ => StmtKind::Expr(self.parse_expr()?),
        };
        if !self.check(&Token::RParen) {
            self.expect(&Token::Semi)?;
        }
        Ok(Stmt::new(kind, join(start, self.prev_span())))
    }
}
