//! Target tree: plain C only.
//!
//! Produced by `sg_desugar` and consumed by `sg_codegen`. There is no way to
//! spell a tagged enum, pattern, range loop or defer in this tree, and no
//! spans either; the printer only needs shape.

use serde::Serialize;

pub use crate::ast::{AssignOp, BaseType, BinOp, PostfixOp, TypeName, UnaryOp};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    Directive(String),
    Enum(EnumDecl),
    Struct(RecordDecl),
    Union(RecordDecl),
    Typedef { ty: TypeName, name: String },
    Function(FnDecl),
    Global(Vec<VarDecl>),
}

/// A classic C enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub constants: Vec<EnumConstant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumConstant {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Option<Vec<Field>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub ty: TypeName,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FnDecl {
    pub ret: TypeName,
    pub name: String,
    pub params: Vec<Param>,
    pub variadic: bool,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub ty: TypeName,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub ty: TypeName,
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
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
    Switch {
        scrutinee: Expr,
        body: Block,
    },
    Case(Expr),
    Default,
    Return(Option<Expr>),
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForInit {
    Decl(Vec<VarDecl>),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Ident(String),
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
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Initializer {
    pub field: Option<String>,
    pub value: Expr,
}
