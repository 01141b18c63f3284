use pretty_assertions::assert_eq;
use sg_ast::*;

use crate::parse::{parse_program, ParseError};

fn parse(src: &str) -> Program {
    parse_program(src, "test.c", &SyntaxFlags::default())
        .unwrap()
        .program
}

fn parse_err(src: &str) -> ParseError {
    match parse_program(src, "test.c", &SyntaxFlags::default()) {
        Ok(_) => panic!("expected a parse error for {src:?}"),
        Err(err) => err,
    }
}

fn body(program: &Program) -> &[Stmt] {
    match &program.items.last().unwrap().kind {
        ItemKind::Function(f) => &f.body.as_ref().unwrap().stmts,
        other => panic!("expected a function, got {other:?}"),
    }
}

#[test]
fn tagged_enum_declares_payloads() {
    let program = parse("enum Result { Ok(int), Err(struct Info), Raw(char[]), Empty };");
    let ItemKind::Enum(decl) = &program.items[0].kind else {
        panic!("expected enum");
    };
    assert!(decl.is_algebraic());
    let payloads: Vec<_> = decl.variants.iter().map(|v| v.payload.clone()).collect();
    let mut raw = TypeName::builtin("char");
    raw.array = vec![None];
    assert_eq!(
        payloads,
        vec![
            Some(TypeName::builtin("int")),
            Some(TypeName::record("Info")),
            Some(raw),
            None,
        ]
    );
}

#[test]
fn classic_enum_keeps_values() {
    let program = parse("enum Color { Red, Green = 4, };");
    let ItemKind::Enum(decl) = &program.items[0].kind else {
        panic!("expected enum");
    };
    assert!(!decl.is_algebraic());
    assert_eq!(decl.variants.len(), 2);
    assert!(decl.variants[1].value.is_some());
}

#[test]
fn if_let_with_else() {
    let program = parse(
        "int main() { if let Result::Ok(x) = r { use(x); } else { fail(); } return 0; }",
    );
    let StmtKind::IfLet(if_let) = &body(&program)[0].kind else {
        panic!("expected if let");
    };
    assert_eq!(if_let.pattern.ty.name, "Result");
    assert_eq!(if_let.pattern.variant.name, "Ok");
    assert_eq!(if_let.pattern.binding.as_ref().unwrap().name, "x");
    assert!(if_let.els.is_some());
}

#[test]
fn underscore_binding_is_dropped() {
    let program = parse("void f() { if let R::Err(_) = r { } }");
    let StmtKind::IfLet(if_let) = &body(&program)[0].kind else {
        panic!("expected if let");
    };
    assert!(if_let.pattern.binding.is_none());
}

#[test]
fn match_arms_and_patterns() {
    let program = parse(
        "void f() { match (op) { case '+' { add(); } case -1: { neg(); } case MAX { } default { other(); } } }",
    );
    let StmtKind::Match(m) = &body(&program)[0].kind else {
        panic!("expected match");
    };
    let kinds: Vec<_> = m.arms.iter().map(|a| a.pattern.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            PatternKind::Char("'+'".into()),
            PatternKind::Int("-1".into()),
            PatternKind::Const("MAX".into()),
            PatternKind::Wildcard,
        ]
    );
}

#[test]
fn match_without_block_is_a_call() {
    let program = parse("void f() { match(a, b); defer(x); }");
    let stmts = body(&program);
    assert!(matches!(stmts[0].kind, StmtKind::Expr(_)));
    assert!(matches!(stmts[1].kind, StmtKind::Expr(_)));
}

#[test]
fn range_for_bounds() {
    let program = parse("void f() { for i in 0 to n + 1 { g(i); } }");
    let StmtKind::RangeFor(rf) = &body(&program)[0].kind else {
        panic!("expected range for");
    };
    assert_eq!(rf.var.name, "i");
    assert!(matches!(rf.start.kind, ExprKind::Int(ref v) if v == "0"));
    assert!(matches!(rf.end.kind, ExprKind::Binary { op: BinOp::Add, .. }));
}

#[test]
fn defer_collects_cleanup_statements() {
    let program = parse("void f() { defer (free(a); free(b)) { use(a, b); } }");
    let StmtKind::Defer(defer) = &body(&program)[0].kind else {
        panic!("expected defer");
    };
    assert_eq!(defer.cleanup.len(), 2);
    assert_eq!(defer.body.stmts.len(), 1);
}

#[test]
fn defer_cleanup_may_hold_control_flow() {
    let program = parse("int f() { defer (return 1) { } return 0; }");
    let StmtKind::Defer(defer) = &body(&program)[0].kind else {
        panic!("expected defer");
    };
    assert!(matches!(defer.cleanup[0].kind, StmtKind::Return(Some(_))));
}

#[test]
fn variant_constructor_expression() {
    let program = parse("struct Result r = Result::Ok(42);");
    let ItemKind::Global(decls) = &program.items[0].kind else {
        panic!("expected global");
    };
    let init = decls[0].init.as_ref().unwrap();
    let ExprKind::Variant(v) = &init.kind else {
        panic!("expected variant constructor");
    };
    assert_eq!(v.variant.name, "Ok");
    assert!(v.payload.is_some());
}

#[test]
fn precedence_climbing() {
    let program = parse("int x = a + b * c == d && e;");
    let ItemKind::Global(decls) = &program.items[0].kind else {
        panic!("expected global");
    };
    let ExprKind::Binary { op, lhs, .. } = &decls[0].init.as_ref().unwrap().kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinOp::And);
    assert!(matches!(lhs.kind, ExprKind::Binary { op: BinOp::Eq, .. }));
}

#[test]
fn casts_and_compound_literals() {
    let program = parse(
        "void f() { char *p = (char *)malloc(8); struct P q = (struct P){ .x = 1, 2 }; }",
    );
    let stmts = body(&program);
    let StmtKind::Decl(decls) = &stmts[0].kind else {
        panic!("expected decl");
    };
    assert_eq!(decls[0].ty.pointers, 1);
    assert!(matches!(
        decls[0].init.as_ref().unwrap().kind,
        ExprKind::Cast { .. }
    ));
    let StmtKind::Decl(decls) = &stmts[1].kind else {
        panic!("expected decl");
    };
    let ExprKind::CompoundLiteral { inits, .. } = &decls[0].init.as_ref().unwrap().kind else {
        panic!("expected compound literal");
    };
    assert_eq!(inits[0].field.as_deref(), Some("x"));
    assert_eq!(inits[1].field, None);
}

#[test]
fn typedef_names_start_declarations() {
    let program = parse("typedef unsigned long word; void f() { word w = 1; size_t n; }");
    let stmts = body(&program);
    assert!(matches!(stmts[0].kind, StmtKind::Decl(_)));
    assert!(matches!(stmts[1].kind, StmtKind::Decl(_)));
}

#[test]
fn functions_prototypes_and_directives() {
    let program = parse(
        "#include <stdio.h>\nint printf(const char *fmt, ...);\nint main(void) { return 0; }",
    );
    assert!(matches!(program.items[0].kind, ItemKind::Directive(ref d) if d == "#include <stdio.h>"));
    let ItemKind::Function(proto) = &program.items[1].kind else {
        panic!("expected prototype");
    };
    assert!(proto.variadic);
    assert!(proto.body.is_none());
    let ItemKind::Function(main) = &program.items[2].kind else {
        panic!("expected main");
    };
    assert!(main.params[0].ty.is_void());
}

#[test]
fn plain_syntax_treats_keywords_as_identifiers() {
    let src = "void f() { int match = 1; int to = match; }";
    let program = parse_program(src, "plain.c", &SyntaxFlags::plain())
        .unwrap()
        .program;
    assert_eq!(body(&program).len(), 2);

    let err = parse_program(
        "void f() { for i in 0 to 3 { } }",
        "plain.c",
        &SyntaxFlags::plain(),
    );
    assert!(err.is_err());
}

#[test]
fn goto_is_rejected() {
    let err = parse_err("void f() { goto out; }");
    assert!(err.message.contains("goto"));
}

#[test]
fn error_reports_found_token() {
    let err = parse_err("int main() { return 0 }");
    assert_eq!(err.message, "expected `;`, found `}`");
}
