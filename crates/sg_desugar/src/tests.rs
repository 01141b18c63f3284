use pretty_assertions::assert_eq;
use sg_ast::SyntaxFlags;
use sg_codegen::{emit_program, Config};

use crate::{desugar_program, LowerError, LowerErrorKind};

fn lower(src: &str) -> String {
    let parsed = sg_parser::parse_program(src, "test.c", &SyntaxFlags::default())
        .unwrap_or_else(|e| panic!("parse failed: {}", e.message));
    let program = desugar_program(parsed.program).unwrap_or_else(|e| panic!("lowering failed: {e}"));
    emit_program(&program, &Config::default())
}

fn lower_err(src: &str) -> LowerError {
    let parsed = sg_parser::parse_program(src, "test.c", &SyntaxFlags::default())
        .unwrap_or_else(|e| panic!("parse failed: {}", e.message));
    match desugar_program(parsed.program) {
        Ok(_) => panic!("expected a lowering error for {src:?}"),
        Err(err) => err,
    }
}

#[test]
fn plain_c_passes_through() {
    let src = "#include <stdio.h>\n\nint main(void) {\n    printf(\"hi\\n\");\n    return 0;\n}\n";
    assert_eq!(lower(src), src);
}

#[test]
fn tagged_enum_and_constructors() {
    let out = lower(
        "enum Shape { Circle(double), Rect(int), Empty };\n\
         struct Shape s = Shape::Circle(1.5);\n\
         void f(void) { struct Shape t; t = Shape::Empty; }",
    );
    assert_eq!(
        out,
        "union Shape_payload {
    double s0;
    int s1;
};

struct Shape {
    unsigned char tag;
    union Shape_payload payload;
};

struct Shape s = { .tag = 0, .payload = { .s0 = 1.5 } };

void f(void) {
    struct Shape t;
    t = (struct Shape){ .tag = 2 };
}
"
    );
}

#[test]
fn if_let_tests_a_single_evaluation() {
    let out = lower(
        "enum R { Ok(int), Err(char *) };\n\
         struct R get(void);\n\
         int f(void) { if let R::Ok(v) = get() { return v; } else { return -1; } return 0; }",
    );
    assert_eq!(
        out,
        "union R_payload {
    int s0;
    char *s1;
};

struct R {
    unsigned char tag;
    union R_payload payload;
};

struct R get(void);

int f(void) {
    {
        struct R _sg_scrut0 = get();
        if (_sg_scrut0.tag == 0) {
            int v = _sg_scrut0.payload.s0;
            return v;
        } else {
            return -1;
        }
    }
    return 0;
}
"
    );
    assert_eq!(out.matches("get()").count(), 1);
}

#[test]
fn match_over_tagged_enum_becomes_switch() {
    let out = lower(
        "enum Shape { Circle(double), Square(double), Empty };\n\
         double area(struct Shape s) {\n\
             double a = 0;\n\
             match (s) {\n\
                 case Shape::Circle(r) { a = 3 * r * r; }\n\
                 case Shape::Square(w): { a = w * w; }\n\
                 case Shape::Empty { }\n\
             }\n\
             return a;\n\
         }",
    );
    assert_eq!(
        out,
        "union Shape_payload {
    double s0;
};

struct Shape {
    unsigned char tag;
    union Shape_payload payload;
};

double area(struct Shape s) {
    double a = 0;
    {
        struct Shape _sg_scrut0 = s;
        switch (_sg_scrut0.tag) {
            case 0: {
                double r = _sg_scrut0.payload.s0;
                a = 3 * r * r;
                break;
            }
            case 1: {
                double w = _sg_scrut0.payload.s0;
                a = w * w;
                break;
            }
            case 2: {
                break;
            }
        }
    }
    return a;
}
"
    );
}

#[test]
fn scalar_match_switches_on_the_value() {
    let out = lower(
        "int f(int c) { match (c) { case 'a' { return 1; } case -1 { return 2; } default { return 0; } } }",
    );
    assert_eq!(
        out,
        "int f(int c) {
    switch (c) {
        case 'a': {
            return 1;
            break;
        }
        case -1: {
            return 2;
            break;
        }
        default: {
            return 0;
            break;
        }
    }
}
"
    );
}

#[test]
fn break_in_an_arm_reaches_the_enclosing_loop() {
    let out = lower(
        "enum Tok { Num(int), End };\n\
         struct Tok next(void);\n\
         int sum(void) {\n\
             int total = 0;\n\
             while (1) {\n\
                 match (next()) {\n\
                     case Tok::Num(n) { total += n; }\n\
                     case Tok::End { break; }\n\
                 }\n\
             }\n\
             return total;\n\
         }",
    );
    assert!(out.ends_with(
        "int sum(void) {
    int total = 0;
    while (1) {
        {
            struct Tok _sg_scrut0 = next();
            if (_sg_scrut0.tag == 0) {
                int n = _sg_scrut0.payload.s0;
                total += n;
            } else if (_sg_scrut0.tag == 1) {
                break;
            }
        }
    }
    return total;
}
"
    ));
    assert!(!out.contains("switch"));
}

#[test]
fn arms_in_any_order_dispatch_on_their_own_tags() {
    let out = lower(
        "enum Op { Add, Sub, Neg(int) };\n\
         int eval(struct Op op, int a, int b) {\n\
             match (op) {\n\
                 case Op::Neg(x) { return -x; }\n\
                 case Op::Add { return a + b; }\n\
                 case Op::Sub { return a - b; }\n\
             }\n\
             return 0;\n\
         }",
    );
    assert!(out.ends_with(
        "int eval(struct Op op, int a, int b) {
    {
        struct Op _sg_scrut0 = op;
        switch (_sg_scrut0.tag) {
            case 2: {
                int x = _sg_scrut0.payload.s0;
                return -x;
                break;
            }
            case 0: {
                return a + b;
                break;
            }
            case 1: {
                return a - b;
                break;
            }
        }
    }
    return 0;
}
"
    ));
}

#[test]
fn default_arm_completes_a_partial_match() {
    let out = lower(
        "enum Op { Add, Sub, Neg(int) };\n\
         void run(struct Op op) {\n\
             match (op) {\n\
                 case Op::Neg(x) { g(x); }\n\
                 case Op::Add { g(0); }\n\
                 default { g(-1); }\n\
             }\n\
         }",
    );
    assert!(out.ends_with(
        "void run(struct Op op) {
    {
        struct Op _sg_scrut0 = op;
        switch (_sg_scrut0.tag) {
            case 2: {
                int x = _sg_scrut0.payload.s0;
                g(x);
                break;
            }
            case 0: {
                g(0);
                break;
            }
            default: {
                g(-1);
                break;
            }
        }
    }
}
"
    ));
}

#[test]
fn lone_default_over_an_unknown_value_runs_as_a_block() {
    let out = lower(
        "void f(void) {\n\
             match (next()) { default { g(); } }\n\
             while (1) { match (next()) { default { break; } } }\n\
         }",
    );
    assert_eq!(
        out,
        "void f(void) {
    {
        (void)next();
        g();
    }
    while (1) {
        {
            (void)next();
            break;
        }
    }
}
"
    );
}

#[test]
fn range_loops() {
    let out = lower("void f(int n) { for i in 0 to n * 2 { g(i); } for j in 1 to 10 { g(j); } }");
    assert_eq!(
        out,
        "void f(int n) {
    {
        int _sg_end0 = n * 2;
        for (int i = 0; i < _sg_end0; i++) {
            g(i);
        }
    }
    for (int j = 1; j < 10; j++) {
        g(j);
    }
}
"
    );
}

#[test]
fn loop_variable_does_not_capture_its_own_bounds() {
    let out = lower("void f(int n) { for n in 0 to n { g(n); } for n in n to 8 { g(n); } }");
    assert_eq!(
        out,
        "void f(int n) {
    {
        int _sg_end0 = n;
        for (int n = 0; n < _sg_end0; n++) {
            g(n);
        }
    }
    {
        int _sg_start0 = n;
        for (int n = _sg_start0; n < 8; n++) {
            g(n);
        }
    }
}
"
    );
}

#[test]
fn range_counter_takes_the_bound_type() {
    let out = lower("void f(unsigned long n) { for i in 0 to n { g(i); } }");
    assert_eq!(
        out,
        "void f(unsigned long n) {
    {
        unsigned long _sg_end0 = n;
        for (unsigned long i = 0; i < _sg_end0; i++) {
            g(i);
        }
    }
}
"
    );
}

#[test]
fn defer_runs_cleanup_on_every_return() {
    let out = lower(
        "int f(void) {\n\
             int *p = malloc(4);\n\
             defer (free(p)) {\n\
                 if (!p) { return -1; }\n\
                 return compute(p);\n\
             }\n\
         }",
    );
    assert_eq!(
        out,
        "int f(void) {
    int *p = malloc(4);
    {
        if (!p) {
            free(p);
            return -1;
        }
        {
            int _sg_ret0 = compute(p);
            free(p);
            return _sg_ret0;
        }
    }
}
"
    );
}

#[test]
fn nested_defers_unwind_innermost_first() {
    let out = lower(
        "void f(void) {\n\
             for (int i = 0; i < 3; i++) {\n\
                 defer (a()) {\n\
                     defer (b()) {\n\
                         if (i) { break; }\n\
                         c();\n\
                     }\n\
                 }\n\
             }\n\
         }",
    );
    assert_eq!(
        out,
        "void f(void) {
    for (int i = 0; i < 3; i++) {
        {
            {
                if (i) {
                    b();
                    a();
                    break;
                }
                c();
                b();
            }
            a();
        }
    }
}
"
    );
}

#[test]
fn void_return_with_value_keeps_its_effect() {
    let out = lower("void f(void) { defer (done()) { return work(); } }");
    assert_eq!(
        out,
        "void f(void) {
    {
        work();
        done();
        return;
    }
}
"
    );
}

#[test]
fn continue_only_unwinds_defers_inside_the_loop() {
    let out = lower(
        "void f(int n) { defer (outer()) { while (n--) { defer (inner()) { continue; } } } }",
    );
    assert_eq!(
        out,
        "void f(int n) {
    {
        while (n--) {
            {
                inner();
                continue;
            }
        }
        outer();
    }
}
"
    );
}

#[test]
fn error_kinds() {
    let cases = [
        (
            "enum R { Ok(int) }; void f(void) { struct R r = R::Nope(1); }",
            LowerErrorKind::UnknownVariant,
        ),
        ("enum R { A(int), A };", LowerErrorKind::DuplicateVariant),
        (
            "enum R { A(int), B }; void f(struct R r) { match (r) { case R::A(x) { } } }",
            LowerErrorKind::NonExhaustiveMatch,
        ),
        (
            "int f(void) { defer (return 1) { } return 0; }",
            LowerErrorKind::CleanupControlEscape,
        ),
        (
            "enum R { A(int), B }; void f(int x) { if let R::A(v) = x { } }",
            LowerErrorKind::MismatchedPatternType,
        ),
        (
            "enum R { A(int), B }; void f(struct R r) { match (r) { case R::A(x) { } case 1 { } } }",
            LowerErrorKind::MismatchedPatternType,
        ),
        (
            "void f(int x) { match (x) { case 10 { } case 0xA { } } }",
            LowerErrorKind::UnreachablePattern,
        ),
        (
            "void f(int x) { match (x) { default { } case 1 { } } }",
            LowerErrorKind::UnreachablePattern,
        ),
        (
            "enum R { A(int), B }; void f(struct R r) { if let R::B(v) = r { } }",
            LowerErrorKind::PayloadMismatch,
        ),
        (
            "enum R { A(int), B }; struct R r = R::A;",
            LowerErrorKind::PayloadMismatch,
        ),
        (
            "void f(int fd) { defer (close(fd)) { int fd = 3; use(fd); } }",
            LowerErrorKind::ShadowedCleanupBinding,
        ),
        ("void f(void) { break; }", LowerErrorKind::StrayControl),
        (
            "void f(int x) { switch (x) { case 1: continue; } }",
            LowerErrorKind::StrayControl,
        ),
    ];
    for (src, kind) in cases {
        assert_eq!(lower_err(src).kind, kind, "{src}");
    }
}

#[test]
fn non_exhaustive_match_names_the_missing_variants() {
    let err = lower_err(
        "enum Op { Add, Sub, Mul(int) }; void f(struct Op op) { match (op) { case Op::Sub { } } }",
    );
    assert_eq!(err.kind, LowerErrorKind::NonExhaustiveMatch);
    assert!(err.message.contains("`Op::Add`"), "{}", err.message);
    assert!(err.message.contains("`Op::Mul`"), "{}", err.message);
    assert!(!err.message.contains("`Op::Sub`"), "{}", err.message);
}

#[test]
fn cleanup_may_not_break_out_of_an_enclosing_loop() {
    let err = lower_err("void f(void) { while (1) { defer (break) { g(); } } }");
    assert_eq!(err.kind, LowerErrorKind::CleanupControlEscape);
}

#[test]
fn temporaries_never_collide_with_user_names() {
    let out = lower(
        "enum R { A(int), B };\n\
         void f(struct R x, struct R y) {\n\
             if let R::A(v) = x { use(v); }\n\
             if let R::A(v) = y { use(v); }\n\
         }",
    );
    assert!(out.contains("struct R _sg_scrut0 = x;"));
    assert!(out.contains("struct R _sg_scrut1 = y;"));
}
