use sg_ast::target::{Block, Expr, ForInit, Stmt};

use crate::Emitter;

impl Emitter {
    pub(crate) fn emit_block(&mut self, block: &Block) {
        if block.stmts.is_empty() {
            self.wr.write("{}");
            return;
        }
        self.wr.write("{");
        self.wr.newline();
        self.wr.indent();
        for stmt in &block.stmts {
            self.emit_stmt(stmt);
        }
        self.wr.dedent();
        self.wr.write("}");
    }

    pub fn emit_stmt(&mut self, stmt: &Stmt) {
        if self.emit_inline(stmt) {
            self.wr.newline();
        }
    }

    /// Emit `stmt` starting at the current position. Returns whether the
    /// output stops mid-line, which lets `else` and `while` follow a
    /// closing brace.
    fn emit_inline(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Empty => self.wr.write(";"),
            Stmt::Expr(e) => {
                self.emit_expr(e);
                self.wr.write(";");
            }
            Stmt::Decl(decls) => {
                self.emit_var_decls(decls);
                self.wr.write(";");
            }
            Stmt::Block(block) => self.emit_block(block),
            Stmt::If { cond, then, els } => {
                self.emit_head("if", cond);
                let open = self.emit_body(then);
                let Some(els) = els else {
                    return open;
                };
                self.wr.write(if open { " else" } else { "else" });
                if matches!(**els, Stmt::If { .. }) {
                    self.wr.write(" ");
                    return self.emit_inline(els);
                }
                return self.emit_body(els);
            }
            Stmt::While { cond, body } => {
                self.emit_head("while", cond);
                return self.emit_body(body);
            }
            Stmt::DoWhile { body, cond } => {
                self.wr.write("do");
                let open = self.emit_body(body);
                if open {
                    self.wr.write(" ");
                }
                self.emit_head("while", cond);
                self.wr.write(";");
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                self.wr.write("for (");
                match init {
                    Some(ForInit::Decl(decls)) => self.emit_var_decls(decls),
                    Some(ForInit::Expr(e)) => self.emit_expr(e),
                    None => {}
                }
                self.wr.write(";");
                if let Some(cond) = cond {
                    self.wr.write(" ");
                    self.emit_expr(cond);
                }
                self.wr.write(";");
                if let Some(step) = step {
                    self.wr.write(" ");
                    self.emit_expr(step);
                }
                self.wr.write(")");
                return self.emit_body(body);
            }
            Stmt::Switch { scrutinee, body } => {
                self.emit_head("switch", scrutinee);
                self.wr.write(" ");
                self.emit_switch_body(body);
            }
            Stmt::Case(value) => {
                self.wr.write("case ");
                self.emit_expr(value);
                self.wr.write(":");
            }
            Stmt::Default => self.wr.write("default:"),
            Stmt::Return(None) => self.wr.write("return;"),
            Stmt::Return(Some(value)) => {
                self.wr.write("return ");
                self.emit_expr(value);
                self.wr.write(";");
            }
            Stmt::Break => self.wr.write("break;"),
            Stmt::Continue => self.wr.write("continue;"),
        }
        true
    }

    fn emit_head(&mut self, keyword: &str, cond: &Expr) {
        self.wr.write(keyword);
        self.wr.write(" (");
        self.emit_expr(cond);
        self.wr.write(")");
    }

    /// Body of a control statement: a block stays on the header line,
    /// anything else goes on its own indented line.
    fn emit_body(&mut self, body: &Stmt) -> bool {
        if let Stmt::Block(block) = body {
            self.wr.write(" ");
            self.emit_block(block);
            return true;
        }
        self.wr.newline();
        self.wr.indent();
        self.emit_stmt(body);
        self.wr.dedent();
        false
    }

    /// Labels sit one level in, the statements they guard two levels in.
    fn emit_switch_body(&mut self, body: &Block) {
        if body.stmts.is_empty() {
            self.wr.write("{}");
            return;
        }
        self.wr.write("{");
        self.wr.newline();
        self.wr.indent();
        let mut stmts = body.stmts.iter().peekable();
        while let Some(stmt) = stmts.next() {
            if !matches!(stmt, Stmt::Case(_) | Stmt::Default) {
                self.wr.indent();
                self.emit_stmt(stmt);
                self.wr.dedent();
                continue;
            }
            self.emit_inline(stmt);
            if let Some(Stmt::Block(block)) = stmts.peek() {
                self.wr.write(" ");
                self.emit_block(block);
                stmts.next();
            }
            self.wr.newline();
        }
        self.wr.dedent();
        self.wr.write("}");
    }
}
