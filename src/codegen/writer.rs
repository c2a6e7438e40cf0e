//! Indentation-aware Kotlin source writer

use crate::options::GeneratorOptions;
use crate::types::{Import, Imports};

const INDENT: &str = "    ";

/// Accumulates Kotlin source lines and the imports they need
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    depth: usize,
    imports: Imports,
}

impl CodeWriter {
    /// Empty writer at depth zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current depth; an empty line stays empty
    pub fn line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(line);
        }
        self.buf.push('\n');
    }

    /// Extend the last written line, e.g. to turn a header into a block
    pub fn append(&mut self, text: &str) {
        if self.buf.ends_with('\n') {
            self.buf.pop();
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write an empty line unless the previous line already is one
    pub fn blank(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    /// Write a line that opens a block, then indent
    pub fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.depth += 1;
    }

    /// Dedent, then write the line that closes a block
    pub fn close(&mut self, line: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(line);
    }

    /// Indent without writing anything
    pub fn indent(&mut self) {
        self.depth += 1;
    }

    /// Dedent without writing anything
    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Record an import
    pub fn import(&mut self, import: Import) {
        self.imports.insert(import);
    }

    /// Record every import of a set
    pub fn import_all(&mut self, imports: &Imports) {
        self.imports.extend(imports);
    }

    /// Render a complete file: header, package, imports, body
    pub fn into_file(self, source: &str, package: &str, options: &GeneratorOptions) -> String {
        let mut out = String::new();
        out.push_str("// Generated by protoc-gen-kdata. DO NOT EDIT.\n");
        out.push_str(&format!("// source: {}\n\n", source));

        if !package.is_empty() {
            out.push_str(&format!("package {}\n\n", package));
        }

        let imports = self.imports.render(package, options);
        if !imports.is_empty() {
            for import in imports {
                out.push_str(&import);
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(self.buf.trim_end_matches('\n'));
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_indent() {
        let mut w = CodeWriter::new();
        w.open("class A {");
        w.line("val x = 1");
        w.blank();
        w.blank();
        w.line("val y = 2");
        w.close("}");

        let file = w.into_file("a.proto", "p", &GeneratorOptions::default());
        assert_eq!(
            file,
            "// Generated by protoc-gen-kdata. DO NOT EDIT.\n// source: a.proto\n\npackage p\n\nclass A {\n    val x = 1\n\n    val y = 2\n}\n"
        );
    }

    #[test]
    fn test_imports_rendered_sorted() {
        let mut w = CodeWriter::new();
        w.import(Import::Symbol("io.grpc.Status"));
        w.import(Import::Symbol("io.grpc.Channel"));
        w.line("object X");

        let file = w.into_file("a.proto", "p", &GeneratorOptions::default());
        assert!(file.contains("import io.grpc.Channel\nimport io.grpc.Status\n\nobject X\n"));
    }
}
