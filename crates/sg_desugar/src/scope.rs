//! Lexical frames walked by defer lowering, and fresh temporary names.

use std::collections::HashSet;

use sg_ast::{Stmt, StmtKind};
use swc_common::Span;

use crate::error::{LowerError, LowerErrorKind, LowerResult};

/// Reserved prefix for every name the lowering introduces.
pub const TEMP_PREFIX: &str = "_sg_";

#[derive(Debug)]
pub(crate) struct TempNames {
    kind: &'static str,
    next: usize,
}

impl TempNames {
    pub fn new(kind: &'static str) -> Self {
        Self { kind, next: 0 }
    }

    pub fn fresh(&mut self) -> String {
        let name = format!("{TEMP_PREFIX}{}{}", self.kind, self.next);
        self.next += 1;
        name
    }
}

/// A way control leaves a region of code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitEdge {
    FallThrough,
    Return,
    Break,
    Continue,
}

impl ExitEdge {
    fn keyword(self) -> &'static str {
        match self {
            ExitEdge::FallThrough => "fall-through",
            ExitEdge::Return => "return",
            ExitEdge::Break => "break",
            ExitEdge::Continue => "continue",
        }
    }
}

/// A registered cleanup, already lowered, waiting to be discharged on
/// every exit edge of its defer body.
#[derive(Debug, Clone)]
pub(crate) struct Obligation {
    pub cleanup: Vec<Stmt>,
    /// Every identifier the cleanup mentions.
    pub reads: HashSet<String>,
    pub span: Span,
}

impl Obligation {
    /// A fresh copy of the cleanup for one exit edge.
    pub fn discharge(&self) -> Vec<Stmt> {
        let declares = self
            .cleanup
            .iter()
            .any(|s| matches!(s.kind, StmtKind::Decl(_)));
        if declares {
            vec![Stmt::block(self.cleanup.clone(), self.span)]
        } else {
            self.cleanup.clone()
        }
    }
}

#[derive(Debug)]
pub(crate) enum FrameKind {
    Function,
    Block,
    Loop,
    Switch,
    Defer(Obligation),
    /// Inside a cleanup: nothing may leave it.
    CleanupBoundary,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    declared: HashSet<String>,
}

#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            declared: HashSet::new(),
        });
    }

    pub fn pop(&mut self) -> Option<FrameKind> {
        self.frames.pop().map(|f| f.kind)
    }

    pub fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.declared.insert(name.to_string());
        }
    }

    /// Obligations discharged on `edge` taken at the current position,
    /// innermost first.
    pub fn exit_obligations(&self, edge: ExitEdge, span: Span) -> LowerResult<Vec<Obligation>> {
        if edge == ExitEdge::FallThrough {
            return match self.frames.last() {
                Some(Frame {
                    kind: FrameKind::Defer(ob),
                    declared,
                }) => {
                    check_shadowing(ob, declared, span)?;
                    Ok(vec![ob.clone()])
                }
                _ => Ok(Vec::new()),
            };
        }

        let mut owed = Vec::new();
        let mut hidden: HashSet<&str> = HashSet::new();
        for frame in self.frames.iter().rev() {
            match (&frame.kind, edge) {
                (FrameKind::Loop, ExitEdge::Break | ExitEdge::Continue)
                | (FrameKind::Switch, ExitEdge::Break)
                | (FrameKind::Function, ExitEdge::Return) => return Ok(owed),
                (FrameKind::Function, _) => break,
                (FrameKind::CleanupBoundary, _) => {
                    return Err(LowerError::new(
                        LowerErrorKind::CleanupControlEscape,
                        span,
                        format!("`{}` cannot leave a defer cleanup", edge.keyword()),
                    ));
                }
                (FrameKind::Defer(ob), _) => {
                    hidden.extend(frame.declared.iter().map(String::as_str));
                    check_shadowing(ob, &hidden, span)?;
                    owed.push(ob.clone());
                    continue;
                }
                _ => {}
            }
            hidden.extend(frame.declared.iter().map(String::as_str));
        }

        match edge {
            ExitEdge::Return => Ok(owed),
            _ => Err(LowerError::new(
                LowerErrorKind::StrayControl,
                span,
                match edge {
                    ExitEdge::Continue => "`continue` outside of a loop".to_string(),
                    _ => format!("`{}` outside of a loop or switch", edge.keyword()),
                },
            )),
        }
    }
}

fn check_shadowing<S>(ob: &Obligation, hidden: &HashSet<S>, span: Span) -> LowerResult<()>
where
    S: std::borrow::Borrow<str> + std::hash::Hash + Eq,
{
    let mut shadowed: Vec<&str> = ob
        .reads
        .iter()
        .map(String::as_str)
        .filter(|name| hidden.contains(*name))
        .collect();
    if shadowed.is_empty() {
        return Ok(());
    }
    shadowed.sort_unstable();
    Err(LowerError::new(
        LowerErrorKind::ShadowedCleanupBinding,
        span,
        format!(
            "deferred cleanup reads `{}`, which is redeclared between this exit and the defer",
            shadowed[0]
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_ast::Expr;
    use swc_common::DUMMY_SP;

    fn obligation(reads: &[&str]) -> Obligation {
        Obligation {
            cleanup: vec![Stmt::expr(Expr::ident("done", DUMMY_SP))],
            reads: reads.iter().map(|s| s.to_string()).collect(),
            span: DUMMY_SP,
        }
    }

    #[test]
    fn fresh_names_count_up() {
        let mut temps = TempNames::new("ret");
        assert_eq!(temps.fresh(), "_sg_ret0");
        assert_eq!(temps.fresh(), "_sg_ret1");
    }

    #[test]
    fn return_collects_every_defer_innermost_first() {
        let mut scopes = ScopeStack::default();
        scopes.push(FrameKind::Function);
        scopes.push(FrameKind::Defer(obligation(&["outer"])));
        scopes.push(FrameKind::Loop);
        scopes.push(FrameKind::Defer(obligation(&["inner"])));
        let owed = scopes.exit_obligations(ExitEdge::Return, DUMMY_SP).unwrap();
        let reads: Vec<_> = owed
            .iter()
            .map(|o| o.reads.iter().next().unwrap().as_str())
            .collect();
        assert_eq!(reads, vec!["inner", "outer"]);
    }

    #[test]
    fn break_stops_at_the_innermost_loop() {
        let mut scopes = ScopeStack::default();
        scopes.push(FrameKind::Function);
        scopes.push(FrameKind::Defer(obligation(&["outer"])));
        scopes.push(FrameKind::Loop);
        scopes.push(FrameKind::Defer(obligation(&["inner"])));
        let owed = scopes.exit_obligations(ExitEdge::Break, DUMMY_SP).unwrap();
        assert_eq!(owed.len(), 1);
    }

    #[test]
    fn continue_skips_switches() {
        let mut scopes = ScopeStack::default();
        scopes.push(FrameKind::Function);
        scopes.push(FrameKind::Switch);
        let err = scopes
            .exit_obligations(ExitEdge::Continue, DUMMY_SP)
            .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::StrayControl);
        assert!(scopes.exit_obligations(ExitEdge::Break, DUMMY_SP).is_ok());
    }

    #[test]
    fn cleanup_boundary_rejects_exits() {
        let mut scopes = ScopeStack::default();
        scopes.push(FrameKind::Function);
        scopes.push(FrameKind::Loop);
        scopes.push(FrameKind::CleanupBoundary);
        for edge in [ExitEdge::Return, ExitEdge::Break, ExitEdge::Continue] {
            let err = scopes.exit_obligations(edge, DUMMY_SP).unwrap_err();
            assert_eq!(err.kind, LowerErrorKind::CleanupControlEscape);
        }
        scopes.push(FrameKind::Loop);
        assert!(scopes.exit_obligations(ExitEdge::Break, DUMMY_SP).is_ok());
    }

    #[test]
    fn redeclared_cleanup_names_are_rejected() {
        let mut scopes = ScopeStack::default();
        scopes.push(FrameKind::Function);
        scopes.push(FrameKind::Defer(obligation(&["fd"])));
        scopes.push(FrameKind::Block);
        scopes.declare("fd");
        let err = scopes
            .exit_obligations(ExitEdge::Return, DUMMY_SP)
            .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::ShadowedCleanupBinding);
    }

    #[test]
    fn fall_through_checks_the_defer_body_scope() {
        let mut scopes = ScopeStack::default();
        scopes.push(FrameKind::Function);
        scopes.push(FrameKind::Defer(obligation(&["fd"])));
        assert_eq!(
            scopes
                .exit_obligations(ExitEdge::FallThrough, DUMMY_SP)
                .unwrap()
                .len(),
            1
        );
        scopes.declare("fd");
        assert!(scopes
            .exit_obligations(ExitEdge::FallThrough, DUMMY_SP)
            .is_err());
    }

    #[test]
    fn declaring_cleanups_are_wrapped() {
        let ob = Obligation {
            cleanup: vec![Stmt::decl(
                sg_ast::TypeName::builtin("int"),
                "t",
                None,
                DUMMY_SP,
            )],
            reads: HashSet::new(),
            span: DUMMY_SP,
        };
        let stmts = ob.discharge();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0].kind, StmtKind::Block(_)));
    }
}
