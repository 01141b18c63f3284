//! Pattern lowering.
//!
//! Rewrites everything that depends on tagged enums:
//! - algebraic `enum` declarations become the union and struct from the
//!   registry layout,
//! - `T::V(x)` constructors become designated initializers,
//! - `if let` becomes a tag test on a temporary,
//! - `match` becomes a `switch` on the tag (or the scalar value), falling
//!   back to an `if`/`else if` chain when an arm body holds a `break` that
//!   must reach an enclosing loop.
//!
//! The scrutinee is always evaluated exactly once, into a `_sg_scrutN`
//! temporary, before any test.

use std::collections::HashSet;

use sg_ast::{
    BaseType, BinOp, Block, Expr, ExprKind, FnDecl, ForInit, Ident, IfLet, Initializer, Item,
    ItemKind, Match, MatchArm, PatternKind, Program, Stmt, StmtKind, TypeName, UnaryOp, VarDecl,
    VariantExpr, VariantPattern,
};
use swc_common::Span;

use crate::error::{LowerError, LowerErrorKind, LowerResult};
use crate::fold::{fold_program, walk_block, walk_expr, walk_function, walk_item, walk_stmt, Fold};
use crate::registry::{PayloadSlot, VariantRegistry, VariantType, PAYLOAD_FIELD, TAG_FIELD};
use crate::scope::TempNames;
use crate::symbols::{describe_type, SymbolTable};

/// What the scrutinee of a pattern turned out to be.
#[derive(Debug, Clone, PartialEq)]
enum Scrutinee {
    Adt(String),
    Scalar(TypeName),
    /// Floats, pointers, arrays and non-enum records: nothing matches them.
    Other(TypeName),
    Unknown,
}

pub(crate) struct PatternLowering<'r> {
    registry: &'r VariantRegistry,
    symbols: SymbolTable,
    temps: TempNames,
}

impl<'r> PatternLowering<'r> {
    pub fn new(registry: &'r VariantRegistry, program: &Program) -> Self {
        Self {
            registry,
            symbols: SymbolTable::collect(program),
            temps: TempNames::new("scrut"),
        }
    }

    pub fn lower_program(&mut self, program: Program) -> LowerResult<Program> {
        fold_program(self, program)
    }

    fn classify(&self, expr: &Expr) -> Scrutinee {
        let Some(ty) = self.symbols.type_of(expr) else {
            return Scrutinee::Unknown;
        };
        if ty.pointers > 0 || !ty.array.is_empty() {
            return Scrutinee::Other(ty);
        }
        match &ty.base {
            BaseType::Struct(name) | BaseType::Named(name) if self.registry.get(name).is_some() => {
                Scrutinee::Adt(name.clone())
            }
            BaseType::Struct(_) | BaseType::Union(_) => Scrutinee::Other(ty),
            BaseType::Builtin(b)
                if matches!(b.as_str(), "float" | "double" | "long double" | "void") =>
            {
                Scrutinee::Other(ty)
            }
            _ => Scrutinee::Scalar(ty),
        }
    }

    /// Reject a scrutinee whose known type is not the tagged enum `vt`.
    fn expect_adt(&self, scrutinee: &Expr, vt: &VariantType, span: Span) -> LowerResult<()> {
        match self.classify(scrutinee) {
            Scrutinee::Unknown => Ok(()),
            Scrutinee::Adt(name) if name == vt.name => Ok(()),
            Scrutinee::Adt(name) => Err(LowerError::mismatched(
                span,
                format!("pattern of `{}` cannot match a value of `{name}`", vt.name),
            )),
            Scrutinee::Scalar(ty) | Scrutinee::Other(ty) => Err(LowerError::mismatched(
                span,
                format!(
                    "pattern of `{}` cannot match a value of type `{}`",
                    vt.name,
                    describe_type(&ty)
                ),
            )),
        }
    }

    /// Designated initializers for `T::V(payload)`, with the struct type
    /// they initialize.
    fn constructor_inits(
        &mut self,
        v: VariantExpr,
        span: Span,
    ) -> LowerResult<(TypeName, Vec<Initializer>)> {
        let registry = self.registry;
        let (vt, variant) = registry.resolve(&v.ty, &v.variant)?;
        let mut inits = vec![Initializer {
            field: Some(TAG_FIELD.to_string()),
            value: Expr::int(variant.discriminant, span),
        }];
        match (vt.slot(variant), v.payload) {
            (Some(slot), Some(payload)) => {
                let value = self.fold_expr(*payload)?;
                inits.push(Initializer {
                    field: Some(PAYLOAD_FIELD.to_string()),
                    value: Expr::new(
                        ExprKind::InitList(vec![Initializer {
                            field: Some(slot.field.clone()),
                            value,
                        }]),
                        span,
                    ),
                });
            }
            (None, None) => {}
            (Some(slot), None) => {
                return Err(LowerError::new(
                    LowerErrorKind::PayloadMismatch,
                    span,
                    format!(
                        "`{}::{}` needs a payload of type `{}`",
                        vt.name,
                        variant.name,
                        describe_type(&slot.ty)
                    ),
                ));
            }
            (None, Some(_)) => {
                return Err(LowerError::new(
                    LowerErrorKind::PayloadMismatch,
                    span,
                    format!("`{}::{}` carries no payload", vt.name, variant.name),
                ));
            }
        }
        Ok((vt.struct_type(), inits))
    }

    /// Declarations in a block or at file scope. A constructor that directly
    /// initializes a declaration becomes a plain initializer list, which is
    /// also valid at file scope.
    fn lower_decls(&mut self, decls: Vec<VarDecl>, declare: bool) -> LowerResult<Vec<VarDecl>> {
        let mut out = Vec::with_capacity(decls.len());
        for d in decls {
            let init = match d.init {
                Some(Expr {
                    kind: ExprKind::Variant(v),
                    span,
                }) if d.ty.pointers == 0 && d.ty.array.is_empty() => {
                    let (_, inits) = self.constructor_inits(v, span)?;
                    Some(Expr::new(ExprKind::InitList(inits), span))
                }
                init => init.map(|e| self.fold_expr(e)).transpose()?,
            };
            if declare {
                self.symbols.declare(&d.name.name, d.ty.clone());
            }
            out.push(VarDecl { init, ..d });
        }
        Ok(out)
    }

    /// `PT x = tmp.payload.sN;` for a pattern binding.
    fn bind(&mut self, binding: &Ident, slot: &PayloadSlot, temp: &str) -> Stmt {
        let ty = binding_type(&slot.ty);
        self.symbols.declare(&binding.name, ty.clone());
        let value = Expr::member(
            Expr::member(Expr::ident(temp, binding.span), PAYLOAD_FIELD),
            &slot.field,
        );
        Stmt::decl(ty, &binding.name, Some(value), binding.span)
    }

    fn lower_if_let(&mut self, il: IfLet, span: Span) -> LowerResult<Stmt> {
        let registry = self.registry;
        let (vt, variant) = registry.resolve(&il.pattern.ty, &il.pattern.variant)?;
        let slot = vt.slot(variant);
        if il.pattern.binding.is_some() && slot.is_none() {
            return Err(LowerError::new(
                LowerErrorKind::PayloadMismatch,
                il.pattern_span,
                format!("`{}::{}` has no payload to bind", vt.name, variant.name),
            ));
        }

        let scrutinee = self.fold_expr(il.scrutinee)?;
        self.expect_adt(&scrutinee, vt, il.pattern_span)?;
        let temp = self.temps.fresh();

        self.symbols.push();
        let mut then = Vec::new();
        if let (Some(binding), Some(slot)) = (&il.pattern.binding, slot) {
            then.push(self.bind(binding, slot, &temp));
        }
        let then_span = il.then.span;
        let body = self.fold_block(il.then);
        self.symbols.pop();
        then.extend(body?.stmts);

        let els = il
            .els
            .map(|e| self.fold_stmt(*e))
            .transpose()?
            .map(Box::new);

        tracing::debug!(ty = %vt.name, variant = %variant.name, %temp, "lowered if let");
        Ok(Stmt::block(
            vec![
                Stmt::decl(vt.struct_type(), &temp, Some(scrutinee), span),
                Stmt::new(
                    StmtKind::If {
                        cond: tag_is(&temp, variant.discriminant, span),
                        then: Box::new(Stmt::block(then, then_span)),
                        els,
                    },
                    span,
                ),
            ],
            span,
        ))
    }

    fn lower_match(&mut self, m: Match, span: Span) -> LowerResult<Stmt> {
        let registry = self.registry;
        let scrutinee = self.fold_expr(m.scrutinee)?;

        let mut adt: Option<&'r VariantType> = None;
        let mut literal: Option<Span> = None;
        for arm in &m.arms {
            let pattern_span = arm.pattern.span;
            match &arm.pattern.kind {
                PatternKind::Wildcard => {}
                PatternKind::Variant(vp) => {
                    let (vt, variant) = registry.resolve(&vp.ty, &vp.variant)?;
                    if vp.binding.is_some() && variant.slot.is_none() {
                        return Err(LowerError::new(
                            LowerErrorKind::PayloadMismatch,
                            pattern_span,
                            format!("`{}::{}` has no payload to bind", vt.name, variant.name),
                        ));
                    }
                    if literal.is_some() {
                        return Err(LowerError::mismatched(
                            pattern_span,
                            format!("pattern of `{}` mixed with literal patterns", vt.name),
                        ));
                    }
                    if let Some(prev) = adt.filter(|prev| prev.name != vt.name) {
                        return Err(LowerError::mismatched(
                            pattern_span,
                            format!(
                                "pattern of `{}` in a match over `{}`",
                                vt.name, prev.name
                            ),
                        ));
                    }
                    adt = Some(vt);
                }
                PatternKind::Int(_) | PatternKind::Char(_) | PatternKind::Const(_) => {
                    if let Some(vt) = adt {
                        return Err(LowerError::mismatched(
                            pattern_span,
                            format!("literal pattern in a match over `{}`", vt.name),
                        ));
                    }
                    literal.get_or_insert(pattern_span);
                }
            }
        }
        check_reachability(&m.arms)?;

        let class = self.classify(&scrutinee);
        match (adt, &class) {
            (Some(vt), _) => {
                let first = m.arms.first().map_or(span, |a| a.pattern.span);
                self.expect_adt(&scrutinee, vt, first)?;
            }
            (None, Scrutinee::Adt(name)) => {
                if let Some(at) = literal {
                    return Err(LowerError::mismatched(
                        at,
                        format!("literal pattern cannot match a value of `{name}`"),
                    ));
                }
                adt = registry.get(name);
            }
            (None, Scrutinee::Other(ty)) if literal.is_some() => {
                return Err(LowerError::mismatched(
                    literal.unwrap_or(span),
                    format!(
                        "literal pattern cannot match a value of type `{}`",
                        describe_type(ty)
                    ),
                ));
            }
            _ => {}
        }
        if let Some(vt) = adt {
            check_exhaustive(vt, &m.arms, span)?;
        }

        if m.arms.is_empty() {
            return Ok(Stmt::expr(scrutinee));
        }
        if adt.is_none() && literal.is_none() {
            return self.lower_match_wildcard(scrutinee, m.arms, span);
        }

        let chain = m.arms.iter().any(|arm| breaks_out(&arm.body.stmts));
        tracing::debug!(
            arms = m.arms.len(),
            tagged = adt.is_some(),
            dispatch = if chain { "if-chain" } else { "switch" },
            "lowered match"
        );
        if chain {
            self.lower_match_chain(scrutinee, m.arms, adt, class, span)
        } else {
            self.lower_match_switch(scrutinee, m.arms, adt, span)
        }
    }

    /// A lone wildcard arm over a value of unknown type, which may not be
    /// switchable: `{ (void)scrutinee; body }`.
    fn lower_match_wildcard(
        &mut self,
        scrutinee: Expr,
        arms: Vec<MatchArm>,
        span: Span,
    ) -> LowerResult<Stmt> {
        tracing::debug!(arms = arms.len(), dispatch = "block", "lowered match");
        let discard = Expr::new(
            ExprKind::Cast {
                ty: TypeName::builtin("void"),
                expr: Box::new(scrutinee),
            },
            span,
        );
        let mut stmts = vec![Stmt::expr(discard)];
        for arm in arms {
            stmts.extend(self.lower_arm(arm, None, None)?);
        }
        Ok(Stmt::block(stmts, span))
    }

    /// Arm body with its pattern binding declared in front.
    fn lower_arm(
        &mut self,
        arm: MatchArm,
        adt: Option<&VariantType>,
        temp: Option<&str>,
    ) -> LowerResult<Vec<Stmt>> {
        self.symbols.push();
        let mut stmts = Vec::new();
        if let (PatternKind::Variant(vp), Some(vt), Some(temp)) = (&arm.pattern.kind, adt, temp) {
            let slot = vt.variant(&vp.variant.name).and_then(|v| vt.slot(v));
            if let (Some(binding), Some(slot)) = (&vp.binding, slot) {
                stmts.push(self.bind(binding, slot, temp));
            }
        }
        let body = self.fold_block(arm.body);
        self.symbols.pop();
        stmts.extend(body?.stmts);
        Ok(stmts)
    }

    fn discriminant(&self, vp: &VariantPattern) -> LowerResult<u32> {
        let (_, variant) = self.registry.resolve(&vp.ty, &vp.variant)?;
        Ok(variant.discriminant)
    }

    fn lower_match_switch(
        &mut self,
        scrutinee: Expr,
        arms: Vec<MatchArm>,
        adt: Option<&VariantType>,
        span: Span,
    ) -> LowerResult<Stmt> {
        let temp = adt.map(|_| self.temps.fresh());
        let (decl, dispatch) = match (adt, &temp) {
            (Some(vt), Some(temp)) => (
                Some(Stmt::decl(vt.struct_type(), temp, Some(scrutinee), span)),
                Expr::member(Expr::ident(temp, span), TAG_FIELD),
            ),
            _ => (None, scrutinee),
        };

        let mut body = Vec::new();
        for arm in arms {
            let label = match &arm.pattern.kind {
                PatternKind::Wildcard => StmtKind::Default,
                PatternKind::Variant(vp) => {
                    StmtKind::Case(Expr::int(self.discriminant(vp)?, arm.pattern.span))
                }
                kind => StmtKind::Case(literal_expr(kind, arm.pattern.span)),
            };
            body.push(Stmt::new(label, arm.pattern.span));
            let arm_span = arm.body.span;
            let mut stmts = self.lower_arm(arm, adt, temp.as_deref())?;
            stmts.push(Stmt::new(StmtKind::Break, arm_span));
            body.push(Stmt::block(stmts, arm_span));
        }

        let switch = Stmt::new(
            StmtKind::Switch {
                scrutinee: dispatch,
                body: Block::new(body, span),
            },
            span,
        );
        Ok(match decl {
            Some(decl) => Stmt::block(vec![decl, switch], span),
            None => switch,
        })
    }

    fn lower_match_chain(
        &mut self,
        scrutinee: Expr,
        arms: Vec<MatchArm>,
        adt: Option<&VariantType>,
        class: Scrutinee,
        span: Span,
    ) -> LowerResult<Stmt> {
        let temp = self.temps.fresh();
        let temp_ty = match (adt, class) {
            (Some(vt), _) => vt.struct_type(),
            (None, Scrutinee::Scalar(ty)) => ty.value_type(),
            _ => TypeName::builtin("long long"),
        };

        let mut tests = Vec::new();
        let mut fallback = None;
        for arm in arms {
            let cond = match &arm.pattern.kind {
                PatternKind::Wildcard => None,
                PatternKind::Variant(vp) => Some(tag_is(&temp, self.discriminant(vp)?, span)),
                kind => Some(Expr::binary(
                    BinOp::Eq,
                    Expr::ident(&temp, span),
                    literal_expr(kind, arm.pattern.span),
                )),
            };
            let arm_span = arm.body.span;
            let stmts = self.lower_arm(arm, adt, Some(&temp))?;
            let block = Stmt::block(stmts, arm_span);
            match cond {
                Some(cond) => tests.push((cond, block)),
                None => fallback = Some(block),
            }
        }

        let mut chain = fallback;
        for (cond, then) in tests.into_iter().rev() {
            chain = Some(Stmt::new(
                StmtKind::If {
                    cond,
                    then: Box::new(then),
                    els: chain.map(Box::new),
                },
                span,
            ));
        }

        let mut stmts = vec![Stmt::decl(temp_ty, &temp, Some(scrutinee), span)];
        stmts.extend(chain);
        Ok(Stmt::block(stmts, span))
    }
}

impl Fold for PatternLowering<'_> {
    fn fold_item(&mut self, item: Item) -> LowerResult<Vec<Item>> {
        match item.kind {
            ItemKind::Enum(decl) if decl.is_algebraic() => {
                let vt = self.registry.get(&decl.name.name).ok_or_else(|| {
                    LowerError::internal(
                        decl.name.span,
                        format!("tagged enum `{}` missing from the registry", decl.name.name),
                    )
                })?;
                Ok(vt.layout(item.span))
            }
            ItemKind::Global(decls) => Ok(vec![Item {
                kind: ItemKind::Global(self.lower_decls(decls, false)?),
                span: item.span,
            }]),
            kind => Ok(vec![walk_item(
                self,
                Item {
                    kind,
                    span: item.span,
                },
            )?]),
        }
    }

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
        let Stmt { kind, span } = stmt;
        match kind {
            StmtKind::Decl(decls) => Ok(Stmt::new(
                StmtKind::Decl(self.lower_decls(decls, true)?),
                span,
            )),
            StmtKind::IfLet(il) => self.lower_if_let(il, span),
            StmtKind::Match(m) => self.lower_match(m, span),
            StmtKind::For { .. } | StmtKind::RangeFor(_) => {
                self.symbols.push();
                match &kind {
                    StmtKind::For {
                        init: Some(ForInit::Decl(decls)),
                        ..
                    } => {
                        for d in decls {
                            self.symbols.declare(&d.name.name, d.ty.clone());
                        }
                    }
                    StmtKind::RangeFor(rf) => {
                        self.symbols.declare(&rf.var.name, TypeName::builtin("int"));
                    }
                    _ => {}
                }
                let stmt = walk_stmt(self, Stmt::new(kind, span));
                self.symbols.pop();
                stmt
            }
            kind => walk_stmt(self, Stmt::new(kind, span)),
        }
    }

    fn fold_expr(&mut self, expr: Expr) -> LowerResult<Expr> {
        match expr.kind {
            ExprKind::Variant(v) => {
                let (ty, inits) = self.constructor_inits(v, expr.span)?;
                Ok(Expr::new(ExprKind::CompoundLiteral { ty, inits }, expr.span))
            }
            kind => walk_expr(self, Expr::new(kind, expr.span)),
        }
    }
}

/// `tmp.tag == k`
fn tag_is(temp: &str, discriminant: u32, span: Span) -> Expr {
    Expr::binary(
        BinOp::Eq,
        Expr::member(Expr::ident(temp, span), TAG_FIELD),
        Expr::int(discriminant, span),
    )
}

/// Type of a binding to a payload of type `ty`. Array payloads bind as a
/// pointer to their first element.
fn binding_type(ty: &TypeName) -> TypeName {
    let mut ty = ty.value_type();
    if !ty.array.is_empty() {
        ty.array.clear();
        ty.pointers += 1;
    }
    ty
}

/// Case label or comparison operand for a literal pattern.
fn literal_expr(kind: &PatternKind, span: Span) -> Expr {
    match kind {
        PatternKind::Int(raw) => match raw.strip_prefix('-') {
            Some(digits) => Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(Expr::new(ExprKind::Int(digits.to_string()), span)),
                },
                span,
            ),
            None => Expr::new(ExprKind::Int(raw.clone()), span),
        },
        PatternKind::Char(raw) => Expr::new(ExprKind::Char(raw.clone()), span),
        PatternKind::Const(name) => Expr::ident(name, span),
        PatternKind::Wildcard | PatternKind::Variant(_) => Expr::int(0, span),
    }
}

/// Whether a statement list holds a `break` that no nested loop or switch
/// captures. Matches, `if let` and defer bodies do not capture.
fn breaks_out(stmts: &[Stmt]) -> bool {
    stmts.iter().any(stmt_breaks_out)
}

fn stmt_breaks_out(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Break => true,
        StmtKind::Block(b) => breaks_out(&b.stmts),
        StmtKind::If { then, els, .. } => {
            stmt_breaks_out(then) || els.as_deref().is_some_and(stmt_breaks_out)
        }
        StmtKind::IfLet(il) => {
            breaks_out(&il.then.stmts) || il.els.as_deref().is_some_and(stmt_breaks_out)
        }
        StmtKind::Match(m) => m.arms.iter().any(|a| breaks_out(&a.body.stmts)),
        StmtKind::Defer(d) => breaks_out(&d.body.stmts),
        _ => false,
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum PatternKey {
    Variant(String),
    Value(i128),
    Text(String),
}

fn check_reachability(arms: &[MatchArm]) -> LowerResult<()> {
    let mut seen = HashSet::new();
    let mut after_wildcard = false;
    for arm in arms {
        if after_wildcard {
            return Err(LowerError::new(
                LowerErrorKind::UnreachablePattern,
                arm.pattern.span,
                "case follows a wildcard and can never match",
            ));
        }
        let key = match &arm.pattern.kind {
            PatternKind::Wildcard => {
                after_wildcard = true;
                continue;
            }
            PatternKind::Variant(vp) => PatternKey::Variant(vp.variant.name.clone()),
            PatternKind::Int(raw) | PatternKind::Char(raw) => literal_value(raw)
                .map(PatternKey::Value)
                .unwrap_or_else(|| PatternKey::Text(raw.clone())),
            PatternKind::Const(name) => PatternKey::Text(name.clone()),
        };
        if !seen.insert(key) {
            return Err(LowerError::new(
                LowerErrorKind::UnreachablePattern,
                arm.pattern.span,
                "case repeats an earlier pattern",
            ));
        }
    }
    Ok(())
}

fn check_exhaustive(vt: &VariantType, arms: &[MatchArm], span: Span) -> LowerResult<()> {
    if arms
        .iter()
        .any(|a| matches!(a.pattern.kind, PatternKind::Wildcard))
    {
        return Ok(());
    }
    let covered: HashSet<&str> = arms
        .iter()
        .filter_map(|a| match &a.pattern.kind {
            PatternKind::Variant(vp) => Some(vp.variant.name.as_str()),
            _ => None,
        })
        .collect();
    let missing: Vec<String> = vt
        .variants
        .iter()
        .filter(|v| !covered.contains(v.name.as_str()))
        .map(|v| format!("`{}::{}`", vt.name, v.name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(LowerError::new(
        LowerErrorKind::NonExhaustiveMatch,
        span,
        format!("match over `{}` does not cover {}", vt.name, missing.join(", ")),
    ))
}

/// Numeric value of an integer or character literal pattern.
fn literal_value(raw: &str) -> Option<i128> {
    if let Some(quoted) = raw.strip_prefix('\'') {
        return char_value(quoted.strip_suffix('\'')?);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let digits = digits.trim_end_matches(['u', 'U', 'l', 'L']);
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i128::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse().ok()?
    };
    Some(if negative { -value } else { value })
}

fn char_value(body: &str) -> Option<i128> {
    let mut chars = body.chars();
    let first = chars.next()?;
    if first != '\\' {
        return chars.next().is_none().then_some(first as i128);
    }
    let escape = chars.as_str();
    let value = match escape {
        "n" => 10,
        "t" => 9,
        "r" => 13,
        "a" => 7,
        "b" => 8,
        "f" => 12,
        "v" => 11,
        "\\" => 92,
        "'" => 39,
        "\"" => 34,
        "?" => 63,
        _ => match escape.strip_prefix('x') {
            Some(hex) => i128::from_str_radix(hex, 16).ok()?,
            None => i128::from_str_radix(escape, 8).ok()?,
        },
    };
    Some(value)
}
