//! Types, declarators and top-level items.

use sg_ast::target::{FnDecl, Item, Param, RecordDecl, TypeName, VarDecl};

use crate::Emitter;

/// Qualifiers and base type: `const unsigned char`.
pub(crate) fn type_prefix(ty: &TypeName) -> String {
    let mut out = String::new();
    for q in &ty.qualifiers {
        out.push_str(q);
        out.push(' ');
    }
    out.push_str(&ty.base.to_string());
    out
}

/// Pointer stars, name and array dimensions: `*argv[]`.
pub(crate) fn declarator(ty: &TypeName, name: &str) -> String {
    let mut out = "*".repeat(ty.pointers as usize);
    out.push_str(name);
    for dim in &ty.array {
        out.push('[');
        out.push_str(dim.as_deref().unwrap_or(""));
        out.push(']');
    }
    out
}

/// A full declaration of one name, or an abstract type when `name` is
/// `None`: `char *p`, `int a[3]`, `char *`.
pub(crate) fn declaration(ty: &TypeName, name: Option<&str>) -> String {
    let mut out = type_prefix(ty);
    let rest = declarator(ty, name.unwrap_or(""));
    if !rest.is_empty() {
        if name.is_some() || ty.pointers > 0 {
            out.push(' ');
        }
        out.push_str(&rest);
    }
    out
}

impl Emitter {
    pub(crate) fn emit_item(&mut self, item: &Item) {
        match item {
            Item::Directive(text) => self.wr.write(text),
            Item::Enum(e) => {
                self.wr.write(&format!("enum {} {{", e.name));
                self.wr.newline();
                self.wr.indent();
                let last = e.constants.len().saturating_sub(1);
                for (i, c) in e.constants.iter().enumerate() {
                    self.wr.write(&c.name);
                    if let Some(value) = &c.value {
                        self.wr.write(" = ");
                        self.emit_expr(value);
                    }
                    if i != last {
                        self.wr.write(",");
                    }
                    self.wr.newline();
                }
                self.wr.dedent();
                self.wr.write("};");
            }
            Item::Struct(r) => self.emit_record("struct", r),
            Item::Union(r) => self.emit_record("union", r),
            Item::Typedef { ty, name } => {
                self.wr.write("typedef ");
                self.wr.write(&declaration(ty, Some(name)));
                self.wr.write(";");
            }
            Item::Function(f) => self.emit_function(f),
            Item::Global(decls) => {
                self.emit_var_decls(decls);
                self.wr.write(";");
            }
        }
        self.wr.newline();
    }

    fn emit_record(&mut self, keyword: &str, r: &RecordDecl) {
        self.wr.write(&format!("{keyword} {}", r.name));
        match &r.fields {
            None => self.wr.write(";"),
            Some(fields) if fields.is_empty() => self.wr.write(" {};"),
            Some(fields) => {
                self.wr.write(" {");
                self.wr.newline();
                self.wr.indent();
                for field in fields {
                    self.wr.write(&declaration(&field.ty, Some(&field.name)));
                    self.wr.write(";");
                    self.wr.newline();
                }
                self.wr.dedent();
                self.wr.write("};");
            }
        }
    }

    fn emit_function(&mut self, f: &FnDecl) {
        self.wr.write(&declaration(&f.ret, Some(&f.name)));
        self.wr.write("(");
        let params: Vec<String> = f.params.iter().map(param).collect();
        self.wr.write(&params.join(", "));
        if f.variadic {
            self.wr.write(if params.is_empty() { "..." } else { ", ..." });
        }
        self.wr.write(")");
        match &f.body {
            Some(body) => {
                self.wr.write(" ");
                self.emit_block(body);
            }
            None => self.wr.write(";"),
        }
    }

    /// `int a = 1, *b` without the trailing `;`. Declarators after the
    /// first share its base type.
    pub(crate) fn emit_var_decls(&mut self, decls: &[VarDecl]) {
        for (i, d) in decls.iter().enumerate() {
            if i == 0 {
                self.wr.write(&declaration(&d.ty, Some(&d.name)));
            } else {
                self.wr.write(", ");
                self.wr.write(&declarator(&d.ty, &d.name));
            }
            if let Some(init) = &d.init {
                self.wr.write(" = ");
                self.emit_expr_prec(init, crate::expr::ASSIGN_PREC);
            }
        }
    }
}

fn param(p: &Param) -> String {
    declaration(&p.ty, p.name.as_deref())
}
