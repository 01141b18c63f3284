//! Lexically scoped declared types, enough to tell what a `match` scrutinee
//! is without a full C type checker.

use std::collections::HashMap;

use sg_ast::{BaseType, BinOp, Expr, ExprKind, ItemKind, Program, TypeName, UnaryOp};

#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    scopes: Vec<HashMap<String, TypeName>>,
    functions: HashMap<String, TypeName>,
    /// Field types of every struct and union with a body, keyed by tag name.
    records: HashMap<String, HashMap<String, TypeName>>,
}

impl SymbolTable {
    /// Seed the table with file-scope names: globals, function return types
    /// and record fields.
    pub fn collect(program: &Program) -> Self {
        let mut table = Self {
            scopes: vec![HashMap::new()],
            ..Self::default()
        };
        for item in &program.items {
            match &item.kind {
                ItemKind::Global(decls) => {
                    for d in decls {
                        table.declare(&d.name.name, d.ty.clone());
                    }
                }
                ItemKind::Function(f) => {
                    table.functions.insert(f.name.name.clone(), f.ret.clone());
                }
                ItemKind::Struct(r) | ItemKind::Union(r) => {
                    if let Some(fields) = &r.fields {
                        let fields = fields
                            .iter()
                            .map(|f| (f.name.name.clone(), f.ty.clone()))
                            .collect();
                        table.records.insert(r.name.name.clone(), fields);
                    }
                }
                _ => {}
            }
        }
        table
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn declare(&mut self, name: &str, ty: TypeName) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty.value_type());
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeName> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    /// Best-effort static type of `expr`; `None` when it cannot be told.
    pub fn type_of(&self, expr: &Expr) -> Option<TypeName> {
        match &expr.kind {
            ExprKind::Ident(name) => self.lookup(name).cloned(),
            ExprKind::Int(_) | ExprKind::Char(_) => Some(TypeName::builtin("int")),
            ExprKind::Float(_) => Some(TypeName::builtin("double")),
            ExprKind::Str(_) => {
                let mut ty = TypeName::builtin("char");
                ty.pointers = 1;
                Some(ty)
            }
            ExprKind::Call { callee, .. } => match &callee.kind {
                ExprKind::Ident(name) => self.functions.get(name).cloned(),
                _ => None,
            },
            ExprKind::Member { base, field, arrow } => {
                let mut base_ty = self.type_of(base)?;
                if *arrow {
                    base_ty = base_ty.element()?;
                }
                if base_ty.pointers > 0 || !base_ty.array.is_empty() {
                    return None;
                }
                let record = match &base_ty.base {
                    BaseType::Struct(n) | BaseType::Union(n) => n,
                    _ => return None,
                };
                self.records.get(record)?.get(field).cloned()
            }
            ExprKind::Index { base, .. } => self.type_of(base)?.element(),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Deref => self.type_of(operand)?.element(),
                UnaryOp::AddrOf => {
                    let mut ty = self.type_of(operand)?;
                    ty.pointers += 1;
                    Some(ty)
                }
                UnaryOp::Not => Some(TypeName::builtin("int")),
                _ => self.type_of(operand),
            },
            ExprKind::Postfix { operand, .. } => self.type_of(operand),
            ExprKind::Binary { op, lhs, .. } => match op {
                BinOp::Lt
                | BinOp::Gt
                | BinOp::Le
                | BinOp::Ge
                | BinOp::Eq
                | BinOp::Ne
                | BinOp::And
                | BinOp::Or => Some(TypeName::builtin("int")),
                _ => self.type_of(lhs),
            },
            ExprKind::Assign { target, .. } => self.type_of(target),
            ExprKind::Ternary { then, .. } => self.type_of(then),
            ExprKind::Cast { ty, .. } | ExprKind::CompoundLiteral { ty, .. } => Some(ty.clone()),
            ExprKind::SizeofType(_) | ExprKind::SizeofExpr(_) => {
                Some(TypeName::new(BaseType::Named("size_t".into())))
            }
            ExprKind::Variant(v) => Some(TypeName::record(&v.ty.name)),
            ExprKind::InitList(_) => None,
        }
    }
}

/// C spelling of a type for diagnostics, e.g. `const char *[4]`.
pub(crate) fn describe_type(ty: &TypeName) -> String {
    let mut out = String::new();
    for q in &ty.qualifiers {
        out.push_str(q);
        out.push(' ');
    }
    out.push_str(&ty.base.to_string());
    if ty.pointers > 0 {
        out.push(' ');
        out.push_str(&"*".repeat(ty.pointers as usize));
    }
    for dim in &ty.array {
        out.push('[');
        out.push_str(dim.as_deref().unwrap_or(""));
        out.push(']');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sg_ast::{ItemKind, StmtKind, SyntaxFlags};

    fn table_and_exprs(src: &str) -> (SymbolTable, Vec<Expr>) {
        let program = sg_parser::parse_program(src, "t.c", &SyntaxFlags::default())
            .unwrap()
            .program;
        let mut table = SymbolTable::collect(&program);
        let mut exprs = Vec::new();
        if let Some(ItemKind::Function(f)) = program.items.last().map(|i| &i.kind) {
            table.push();
            for stmt in &f.body.as_ref().unwrap().stmts {
                match &stmt.kind {
                    StmtKind::Decl(decls) => {
                        for d in decls {
                            table.declare(&d.name.name, d.ty.clone());
                        }
                    }
                    StmtKind::Expr(e) => exprs.push(e.clone()),
                    _ => {}
                }
            }
        }
        (table, exprs)
    }

    #[test]
    fn resolves_locals_members_and_calls() {
        let (table, exprs) = table_and_exprs(
            "struct Box { struct Shape inner; int n; };
             struct Shape make(void);
             void f() { struct Box b; struct Box *p; static int k; b.inner; p->n; make(); k; }",
        );
        let types: Vec<_> = exprs.iter().map(|e| table.type_of(e)).collect();
        assert_eq!(
            types,
            vec![
                Some(TypeName::record("Shape")),
                Some(TypeName::builtin("int")),
                Some(TypeName::record("Shape")),
                Some(TypeName::builtin("int")),
            ]
        );
    }

    #[test]
    fn pointers_and_arrays_step_to_elements() {
        let (table, exprs) = table_and_exprs(
            "void f() { struct Shape *ps; struct Shape arr[4]; *ps; arr[1]; &arr[0]; }",
        );
        assert_eq!(table.type_of(&exprs[0]), Some(TypeName::record("Shape")));
        assert_eq!(table.type_of(&exprs[1]), Some(TypeName::record("Shape")));
        let mut ptr = TypeName::record("Shape");
        ptr.pointers = 1;
        assert_eq!(table.type_of(&exprs[2]), Some(ptr));
    }

    #[test]
    fn describes_types_in_c_spelling() {
        let mut ty = TypeName::builtin("char");
        ty.qualifiers.push("const".into());
        ty.pointers = 1;
        ty.array.push(Some("4".into()));
        assert_eq!(describe_type(&ty), "const char *[4]");
        assert_eq!(describe_type(&TypeName::record("Shape")), "struct Shape");
    }

    #[test]
    fn unknown_names_have_no_type() {
        let (table, exprs) = table_and_exprs("void f() { mystery; unknown(); }");
        assert_eq!(table.type_of(&exprs[0]), None);
        assert_eq!(table.type_of(&exprs[1]), None);
    }
}
