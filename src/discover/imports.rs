//! Import declarations of Go source files.
//!
//! Files are parsed with tree-sitter, but only the head is inspected: the
//! `package` clause followed by any number of `import` declarations. Syntax
//! errors further down the file go unnoticed; a malformed head is an error.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tree_sitter::{Node, Parser};

use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    fn at(node: Node, message: impl Into<String>) -> Self {
        Self::new(node.start_position().row + 1, message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Import paths declared by one source file, in declaration order.
pub fn parse_imports(src: &str) -> Result<Vec<String>, ParseError> {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);

    let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|err| ParseError::new(1, format!("Go grammar unavailable: {}", err)))?;
    let tree = parser
        .parse(src, None)
        .ok_or_else(|| ParseError::new(1, "parser gave up"))?;

    let root = tree.root_node();
    let mut imports = Vec::new();
    let mut seen_package = false;

    let mut cursor = root.walk();
    for node in root.children(&mut cursor) {
        if node.is_error() || node.is_missing() {
            return Err(syntax_error(node, src));
        }
        if !node.is_named() || node.kind() == "comment" {
            continue;
        }
        if !seen_package {
            if node.kind() != "package_clause" {
                return Err(ParseError::at(node, "expected 'package'"));
            }
            check_head(node, src)?;
            seen_package = true;
            continue;
        }
        if node.kind() != "import_declaration" {
            break;
        }
        check_head(node, src)?;
        import_specs(node, src, &mut imports)?;
    }

    if !seen_package {
        return Err(ParseError::new(1, "expected 'package'"));
    }
    Ok(imports)
}

fn check_head(node: Node, src: &str) -> Result<(), ParseError> {
    match first_error(node) {
        Some(bad) => Err(syntax_error(bad, src)),
        None => Ok(()),
    }
}

/// Innermost-first `ERROR` or `MISSING` node under `node`.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(bad) = first_error(child) {
            return Some(bad);
        }
    }
    Some(node)
}

fn syntax_error(node: Node, src: &str) -> ParseError {
    if node.is_missing() {
        return ParseError::at(node, format!("missing `{}`", node.kind()));
    }
    let text: String = src[node.byte_range()]
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .chars()
        .take(24)
        .collect();
    if text.is_empty() {
        ParseError::at(node, "syntax error")
    } else {
        ParseError::at(node, format!("unexpected `{}`", text))
    }
}

fn import_specs(node: Node, src: &str, imports: &mut Vec<String>) -> Result<(), ParseError> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec_list" => import_specs(child, src, imports)?,
            "import_spec" => {
                let path = child
                    .child_by_field_name("path")
                    .and_then(|path| string_value(path, src))
                    .ok_or_else(|| ParseError::at(child, "expected import path"))?;
                if path.is_empty() {
                    return Err(ParseError::at(child, "invalid import path: \"\""));
                }
                imports.push(path);
            }
            _ => {}
        }
    }
    Ok(())
}

fn string_value(node: Node, src: &str) -> Option<String> {
    let text = &src[node.byte_range()];
    match node.kind() {
        "interpreted_string_literal" => {
            let inner = text.strip_prefix('"')?.strip_suffix('"')?;
            Some(unescape(inner))
        }
        "raw_string_literal" => {
            let inner = text.strip_prefix('`')?.strip_suffix('`')?;
            Some(inner.replace('\r', ""))
        }
        _ => None,
    }
}

// Import paths never need more than the simple escapes; anything else is
// kept verbatim.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(c @ ('\\' | '"' | '\'')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Union of the imports of every file. Any unreadable or malformed file fails
/// the whole scan.
pub fn collect_imports(files: &[PathBuf]) -> Result<BTreeSet<String>> {
    let per_file: Vec<Vec<String>> = files
        .par_iter()
        .map(|path| -> Result<Vec<String>> {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let imports = parse_imports(&content)
                .with_context(|| format!("Failed to parse imports of {}", path.display()))?;
            ui::detail(format!("{}: {} imports", path.display(), imports.len()));
            Ok(imports)
        })
        .collect::<Result<_>>()?;

    Ok(per_file.into_iter().flatten().collect())
}
