//! Surface syntax tree: C99 subset plus the sugarc extensions.

use serde::Serialize;
use swc_common::{Span, DUMMY_SP};

/// A name with the span it was written at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ident {
    pub name: String,
    #[serde(skip)]
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The type part of a declaration: `static const char *name[4]` has
/// qualifiers `[static, const]`, base `char`, one pointer and one array
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeName {
    pub qualifiers: Vec<String>,
    pub base: BaseType,
    pub pointers: u8,
    /// Array dimensions as written; `None` for `[]`.
    pub array: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum BaseType {
    /// Builtin specifier words joined by a space, e.g. `unsigned long`.
    Builtin(String),
    Struct(String),
    Union(String),
    Enum(String),
    /// A typedef name.
    Named(String),
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaseType::Builtin(name) | BaseType::Named(name) => write!(f, "{name}"),
            BaseType::Struct(name) => write!(f, "struct {name}"),
            BaseType::Union(name) => write!(f, "union {name}"),
            BaseType::Enum(name) => write!(f, "enum {name}"),
        }
    }
}

/// Storage-class words that belong to a declaration rather than to the type
/// of the value it holds.
const STORAGE_CLASSES: &[&str] = &["static", "extern", "inline", "register", "auto"];

impl TypeName {
    pub fn new(base: BaseType) -> Self {
        Self {
            qualifiers: Vec::new(),
            base,
            pointers: 0,
            array: Vec::new(),
        }
    }

    pub fn builtin(name: &str) -> Self {
        Self::new(BaseType::Builtin(name.to_string()))
    }

    pub fn record(name: &str) -> Self {
        Self::new(BaseType::Struct(name.to_string()))
    }

    pub fn is_void(&self) -> bool {
        matches!(&self.base, BaseType::Builtin(b) if b == "void")
            && self.pointers == 0
            && self.array.is_empty()
    }

    /// Name of the struct when this is a struct held by value.
    pub fn struct_name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Struct(name) if self.pointers == 0 && self.array.is_empty() => Some(name),
            _ => None,
        }
    }

    /// The type reached by one `*` or one `[i]`.
    pub fn element(&self) -> Option<TypeName> {
        let mut inner = self.clone();
        if !inner.array.is_empty() {
            inner.array.remove(0);
            return Some(inner);
        }
        if inner.pointers > 0 {
            inner.pointers -= 1;
            return Some(inner);
        }
        None
    }

    /// The same type without storage-class words, fit for a fresh local.
    pub fn value_type(&self) -> TypeName {
        let mut ty = self.clone();
        ty.qualifiers
            .retain(|q| !STORAGE_CLASSES.contains(&q.as_str()));
        ty
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub kind: ItemKind,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemKind {
    /// A preprocessor line, kept verbatim.
    Directive(String),
    Enum(EnumDecl),
    Struct(RecordDecl),
    Union(RecordDecl),
    Typedef(Typedef),
    Function(FnDecl),
    Global(Vec<VarDecl>),
}

/// `enum Name { ... };`, either a classic C enum or an algebraic one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: Ident,
    pub variants: Vec<EnumVariant>,
}

impl EnumDecl {
    /// An enum is algebraic as soon as one variant carries a payload.
    pub fn is_algebraic(&self) -> bool {
        self.variants.iter().any(|v| v.payload.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumVariant {
    pub name: Ident,
    pub payload: Option<TypeName>,
    /// Explicit value of a classic enum constant (`A = 3`).
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDecl {
    pub name: Ident,
    /// `None` for a forward declaration.
    pub fields: Option<Vec<Field>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub ty: TypeName,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Typedef {
    pub ty: TypeName,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FnDecl {
    pub ret: TypeName,
    pub name: Ident,
    pub params: Vec<Param>,
    pub variadic: bool,
    /// `None` for a prototype.
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub ty: TypeName,
    pub name: Option<Ident>,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    #[serde(skip)]
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub ty: TypeName,
    pub name: Ident,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    #[serde(skip)]
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn block(stmts: Vec<Stmt>, span: Span) -> Self {
        Self::new(StmtKind::Block(Block::new(stmts, span)), span)
    }

    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StmtKind::Expr(expr), span)
    }

    pub fn decl(ty: TypeName, name: &str, init: Option<Expr>, span: Span) -> Self {
        Self::new(
            StmtKind::Decl(vec![VarDecl {
                ty,
                name: Ident::new(name, span),
                init,
            }]),
            span,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StmtKind {
    Empty,
    Expr(Expr),
    Decl(Vec<VarDecl>),
    Block(Block),
    If {
        cond: Expr,
        then: Box<Stmt>,
        els: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<ForInit>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    /// A C `switch`; its body holds `Case`/`Default` labels inline.
    Switch {
        scrutinee: Expr,
        body: Block,
    },
    Case(Expr),
    Default,
    Return(Option<Expr>),
    Break,
    Continue,
    IfLet(IfLet),
    Match(Match),
    RangeFor(RangeFor),
    Defer(Defer),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForInit {
    Decl(Vec<VarDecl>),
    Expr(Expr),
}

/// `if let T::V(binding) = scrutinee { then } else els`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfLet {
    pub pattern: VariantPattern,
    #[serde(skip)]
    pub pattern_span: Span,
    pub scrutinee: Expr,
    pub then: Block,
    pub els: Option<Box<Stmt>>,
}

/// `match (scrutinee) { case P { ... } ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Block,
}

/// `for var in start to end body`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeFor {
    pub var: Ident,
    pub start: Expr,
    pub end: Expr,
    pub body: Box<Stmt>,
}

/// `defer (cleanup...) { body }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Defer {
    pub cleanup: Vec<Stmt>,
    #[serde(skip)]
    pub cleanup_span: Span,
    pub body: Block,
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub kind: PatternKind,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatternKind {
    /// `_` or `default`.
    Wildcard,
    Variant(VariantPattern),
    /// Integer literal as written, sign included.
    Int(String),
    /// Character literal including its quotes.
    Char(String),
    /// A named constant such as a classic enum member.
    Const(String),
}

/// `T::V`, `T::V(binding)` or `T::V(_)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPattern {
    pub ty: Ident,
    pub variant: Ident,
    pub binding: Option<Ident>,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    Ident(String),
    /// Numeric and text literals keep their source spelling.
    Int(String),
    Float(String),
    Char(String),
    Str(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        field: String,
        arrow: bool,
    },
    Cast {
        ty: TypeName,
        expr: Box<Expr>,
    },
    SizeofType(TypeName),
    SizeofExpr(Box<Expr>),
    InitList(Vec<Initializer>),
    CompoundLiteral {
        ty: TypeName,
        inits: Vec<Initializer>,
    },
    /// `T::V(payload)` or `T::V`.
    Variant(VariantExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Initializer {
    /// `.field =` designator.
    pub field: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantExpr {
    pub ty: Ident,
    pub variant: Ident,
    pub payload: Option<Box<Expr>>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn ident(name: &str, span: Span) -> Self {
        Self::new(ExprKind::Ident(name.to_string()), span)
    }

    pub fn int(value: impl std::fmt::Display, span: Span) -> Self {
        Self::new(ExprKind::Int(value.to_string()), span)
    }

    pub fn member(base: Expr, field: &str) -> Self {
        let span = base.span;
        Self::new(
            ExprKind::Member {
                base: Box::new(base),
                field: field.to_string(),
                arrow: false,
            },
            span,
        )
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        let span = if lhs.span == DUMMY_SP { rhs.span } else { lhs.span };
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    /// Literal values whose evaluation has no effect and cannot be changed by
    /// intervening statements.
    pub fn is_literal(&self) -> bool {
        match &self.kind {
            ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Char(_) | ExprKind::Str(_) => true,
            ExprKind::Unary {
                op: UnaryOp::Neg | UnaryOp::Plus,
                operand,
            } => matches!(operand.kind, ExprKind::Int(_) | ExprKind::Float(_)),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Operators (shared with the target tree)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Deref,
    AddrOf,
    PreInc,
    PreDec,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinOp {
    /// C binding strength; larger binds tighter. Assignment is 2 and ternary
    /// is 3, so binary operators occupy 4..=13.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 4,
            BinOp::And => 5,
            BinOp::BitOr => 6,
            BinOp::BitXor => 7,
            BinOp::BitAnd => 8,
            BinOp::Eq | BinOp::Ne => 9,
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 10,
            BinOp::Shl | BinOp::Shr => 11,
            BinOp::Add | BinOp::Sub => 12,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 13,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
            BinOp::BitOr => "|",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignOp {
    Assign,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    And,
    Xor,
    Or,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::And => "&=",
            AssignOp::Xor => "^=",
            AssignOp::Or => "|=",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_strips_array_before_pointer() {
        let mut ty = TypeName::builtin("char");
        ty.pointers = 1;
        ty.array = vec![Some("4".into())];
        let elem = ty.element().unwrap();
        assert!(elem.array.is_empty());
        assert_eq!(elem.pointers, 1);
        assert_eq!(elem.element().unwrap(), TypeName::builtin("char"));
        assert_eq!(TypeName::builtin("int").element(), None);
    }

    #[test]
    fn value_type_drops_storage_class_only() {
        let mut ty = TypeName::builtin("int");
        ty.qualifiers = vec!["static".into(), "const".into()];
        assert_eq!(ty.value_type().qualifiers, vec!["const".to_string()]);
    }

    #[test]
    fn struct_name_requires_by_value() {
        let mut ty = TypeName::record("Result");
        assert_eq!(ty.struct_name(), Some("Result"));
        ty.pointers = 1;
        assert_eq!(ty.struct_name(), None);
    }

    #[test]
    fn enum_is_algebraic_with_any_payload() {
        let plain = EnumDecl {
            name: Ident::new("Color", DUMMY_SP),
            variants: vec![EnumVariant {
                name: Ident::new("Red", DUMMY_SP),
                payload: None,
                value: None,
            }],
        };
        assert!(!plain.is_algebraic());
        let mut adt = plain.clone();
        adt.variants.push(EnumVariant {
            name: Ident::new("Custom", DUMMY_SP),
            payload: Some(TypeName::builtin("int")),
            value: None,
        });
        assert!(adt.is_algebraic());
    }
}
