//! File context supplied to ensemble rule evaluators.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A lightweight structural view of one syntax node.
///
/// This is not a semantic model: callers that have a token/AST stream can
/// project it into these records; callers that do not simply omit the view
/// and syntax-node rules abstain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Node kind, e.g. "assignment" or "function_def".
    pub kind: String,
    /// Declared name, where the node has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw source text of the node.
    pub text: String,
    /// 1-based line of the node start.
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl SyntaxNode {
    pub fn new(kind: impl Into<String>, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            text: text.into(),
            line,
            column: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Everything an evaluator may inspect for one file: path, raw text, and an
/// optional structural view.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub path: PathBuf,
    pub text: String,
    pub syntax: Option<Vec<SyntaxNode>>,
}

impl FileContext {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            syntax: None,
        }
    }

    pub fn with_syntax(mut self, nodes: Vec<SyntaxNode>) -> Self {
        self.syntax = Some(nodes);
        self
    }

    pub fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    /// Lines with their 1-based line numbers.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.text.lines().enumerate().map(|(i, l)| (i + 1, l))
    }

    /// First line (1-based) containing the given substring.
    pub fn find_line(&self, needle: &str) -> Option<usize> {
        self.numbered_lines()
            .find(|(_, line)| line.contains(needle))
            .map(|(n, _)| n)
    }
}

pub fn file_name_of(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_lines() {
        let ctx = FileContext::new("a.py", "one\ntwo\nthree");
        let lines: Vec<_> = ctx.numbered_lines().collect();
        assert_eq!(lines, vec![(1, "one"), (2, "two"), (3, "three")]);
    }

    #[test]
    fn test_find_line() {
        let ctx = FileContext::new("a.py", "x = 1\neval(x)\ny = 2");
        assert_eq!(ctx.find_line("eval("), Some(2));
        assert_eq!(ctx.find_line("exec("), None);
    }

    #[test]
    fn test_syntax_view_optional() {
        let ctx = FileContext::new("a.py", "x = 1");
        assert!(ctx.syntax.is_none());

        let node = SyntaxNode::new("assignment", "x = \"*\"", 1).with_name("x");
        let ctx = ctx.with_syntax(vec![node]);
        assert_eq!(ctx.syntax.as_ref().unwrap().len(), 1);
        assert_eq!(ctx.syntax.as_ref().unwrap()[0].name.as_deref(), Some("x"));
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(Path::new("/a/b/test_mod.py")), "test_mod.py");
        assert_eq!(file_name_of(Path::new("")), "");
    }
}
