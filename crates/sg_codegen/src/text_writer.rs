//! Line-oriented writer that indents each line on its first write.

#[derive(Debug)]
pub struct CWriter {
    out: String,
    unit: String,
    level: usize,
    line_start: bool,
}

impl CWriter {
    pub fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            unit: " ".repeat(indent),
            level: 0,
            line_start: true,
        }
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.line_start {
            for _ in 0..self.level {
                self.out.push_str(&self.unit);
            }
            self.line_start = false;
        }
        self.out.push_str(text);
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
        self.line_start = true;
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn into_string(self) -> String {
        self.out
    }
}
