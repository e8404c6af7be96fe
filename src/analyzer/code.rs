use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::language::Language;

lazy_static! {
    static ref PY_IMPORT: Regex = Regex::new(r"(?m)^(?:import|from)\s+(\S+)").unwrap();
    static ref PY_DEF: Regex = Regex::new(r"(?m)^\s*(?:async\s+)?def\s+(\w+)").unwrap();
    static ref PY_CLASS: Regex = Regex::new(r"(?m)^\s*class\s+(\w+)").unwrap();

    static ref JS_IMPORT: Regex =
        Regex::new(r#"(?:import|require)\(?\s*(?:[^'"()]*?\bfrom\s*)?['"]([^'"]+)['"]\)?"#).unwrap();
    static ref JS_EXPORT: Regex = Regex::new(
        r"export\s+(?:default\s+)?(?:async\s+)?(?:function\*?|class|const|let|var)\s+(\w+)"
    )
    .unwrap();
    static ref JS_FUNCTION: Regex = Regex::new(
        r"(?:function\*?\s+(\w+)\s*\(|(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|\w+\s*=>))"
    )
    .unwrap();
    static ref JS_CLASS: Regex = Regex::new(r"\bclass\s+(\w+)").unwrap();

    static ref GO_IMPORT: Regex = Regex::new(r#"(?m)^\s*(?:import\s+)?(?:[\w.]+\s+)?"([^"]+)"\s*$"#).unwrap();
    static ref GO_FUNC: Regex = Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s*)?(\w+)").unwrap();
    static ref GO_TYPE: Regex = Regex::new(r"(?m)^\s*type\s+(\w+)").unwrap();

    static ref RS_USE: Regex = Regex::new(r"\buse\s+([^;]+);").unwrap();
    static ref RS_FN: Regex = Regex::new(r"\bfn\s+(\w+)").unwrap();
    static ref RS_TYPE: Regex = Regex::new(r"\b(?:struct|enum|trait)\s+(\w+)").unwrap();
}

/// How a file's structure was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Full syntax tree.
    Syntax,
    /// Line/regex heuristics.
    Heuristic,
    /// No analyzer exists for the language.
    None,
}

/// A named declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// 1-based; only known when a syntax tree was available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Parameters for functions, base classes for classes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<String>,
}

impl Symbol {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line: None,
            detail: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file_path: String,
    pub language: Language,
    pub parse_mode: ParseMode,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub functions: Vec<Symbol>,
    pub classes: Vec<Symbol>,
    /// Structs, enums, traits, and Go types.
    pub types: Vec<String>,
}

impl FileAnalysis {
    fn empty(file_path: &str, language: Language) -> Self {
        Self {
            file_path: file_path.to_string(),
            language,
            parse_mode: ParseMode::None,
            imports: Vec::new(),
            exports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            types: Vec::new(),
        }
    }
}

/// Per-language structural summaries. Informational only; never fails.
pub struct CodeAnalyzer {
    parser: Option<Parser>,
}

impl CodeAnalyzer {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let parser = match parser.set_language(&language) {
            Ok(()) => Some(parser),
            Err(e) => {
                debug!("python grammar unavailable, using heuristics: {}", e);
                None
            }
        };
        Self { parser }
    }

    pub fn analyze_file(&mut self, file_path: &str, content: &str) -> FileAnalysis {
        let language = Language::from_path(file_path);
        let mut analysis = FileAnalysis::empty(file_path, language);

        match language {
            Language::Python => {
                if !self.analyze_python_tree(content, &mut analysis) {
                    debug!(file = file_path, "syntax tree unavailable, falling back to regex");
                    analyze_python_heuristic(content, &mut analysis);
                }
            }
            Language::JavaScript | Language::TypeScript => analyze_javascript(content, &mut analysis),
            Language::Go => analyze_go(content, &mut analysis),
            Language::Rust => analyze_rust(content, &mut analysis),
            _ => {}
        }

        analysis
    }

    /// Returns `false` when no clean tree could be produced.
    fn analyze_python_tree(&mut self, content: &str, analysis: &mut FileAnalysis) -> bool {
        let Some(parser) = self.parser.as_mut() else {
            return false;
        };
        let Some(tree) = parser.parse(content, None) else {
            return false;
        };
        let root = tree.root_node();
        if root.has_error() {
            return false;
        }

        let source = content.as_bytes();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "import_statement" => {
                    let mut cursor = node.walk();
                    for name in node.children_by_field_name("name", &mut cursor) {
                        let target = match name.kind() {
                            "aliased_import" => name.child_by_field_name("name").unwrap_or(name),
                            _ => name,
                        };
                        analysis.imports.push(text(target, source));
                    }
                }
                "import_from_statement" => {
                    if let Some(module) = node.child_by_field_name("module_name") {
                        analysis.imports.push(text(module, source));
                    }
                }
                "function_definition" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        analysis.functions.push(Symbol {
                            name: text(name, source),
                            line: Some(node.start_position().row + 1),
                            detail: node
                                .child_by_field_name("parameters")
                                .map(|params| parameter_names(params, source))
                                .unwrap_or_default(),
                        });
                    }
                }
                "class_definition" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        analysis.classes.push(Symbol {
                            name: text(name, source),
                            line: Some(node.start_position().row + 1),
                            detail: node
                                .child_by_field_name("superclasses")
                                .map(|bases| base_names(bases, source))
                                .unwrap_or_default(),
                        });
                    }
                }
                _ => {}
            }

            // Push in reverse so declarations come out in source order.
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        analysis.parse_mode = ParseMode::Syntax;
        true
    }
}

impl Default for CodeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().to_string()
}

fn parameter_names(params: Node, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        let name = match param.kind() {
            "identifier" => Some(param),
            "default_parameter" | "typed_default_parameter" => param.child_by_field_name("name"),
            "typed_parameter" => param.named_child(0).filter(|n| n.kind() == "identifier"),
            _ => None,
        };
        if let Some(name) = name {
            names.push(text(name, source));
        }
    }
    names
}

fn base_names(bases: Node, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = bases.walk();
    for base in bases.named_children(&mut cursor) {
        if matches!(base.kind(), "identifier" | "attribute") {
            names.push(text(base, source));
        }
    }
    names
}

fn captures(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|caps| caps.iter().skip(1).flatten().next().map(|m| m.as_str().to_string()))
        .collect()
}

fn analyze_python_heuristic(content: &str, analysis: &mut FileAnalysis) {
    analysis.parse_mode = ParseMode::Heuristic;
    analysis.imports = captures(&PY_IMPORT, content);
    analysis.functions = captures(&PY_DEF, content).into_iter().map(Symbol::named).collect();
    analysis.classes = captures(&PY_CLASS, content).into_iter().map(Symbol::named).collect();
}

fn analyze_javascript(content: &str, analysis: &mut FileAnalysis) {
    analysis.parse_mode = ParseMode::Heuristic;
    analysis.imports = captures(&JS_IMPORT, content);
    analysis.exports = captures(&JS_EXPORT, content);
    analysis.functions = captures(&JS_FUNCTION, content).into_iter().map(Symbol::named).collect();
    analysis.classes = captures(&JS_CLASS, content).into_iter().map(Symbol::named).collect();
}

fn analyze_go(content: &str, analysis: &mut FileAnalysis) {
    analysis.parse_mode = ParseMode::Heuristic;
    analysis.imports = captures(&GO_IMPORT, content);
    analysis.functions = captures(&GO_FUNC, content).into_iter().map(Symbol::named).collect();
    analysis.types = captures(&GO_TYPE, content);
}

fn analyze_rust(content: &str, analysis: &mut FileAnalysis) {
    analysis.parse_mode = ParseMode::Heuristic;
    analysis.imports = captures(&RS_USE, content)
        .into_iter()
        .map(|path| path.trim().to_string())
        .collect();
    analysis.functions = captures(&RS_FN, content).into_iter().map(Symbol::named).collect();
    analysis.types = captures(&RS_TYPE, content);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(symbols: &[Symbol]) -> Vec<&str> {
        symbols.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_python_syntax_tree() {
        let code = r#"import os
import numpy as np
from flask import Flask

class Handler(Base, mixins.Json):
    def get(self, request, retries=3):
        return None

def main(argv: list, *args, verbose: bool = False):
    pass
"#;
        let mut analyzer = CodeAnalyzer::new();
        let analysis = analyzer.analyze_file("app.py", code);

        assert_eq!(analysis.language, Language::Python);
        assert_eq!(analysis.parse_mode, ParseMode::Syntax);
        assert_eq!(analysis.imports, vec!["os", "numpy", "flask"]);
        assert_eq!(names(&analysis.classes), vec!["Handler"]);
        assert_eq!(analysis.classes[0].detail, vec!["Base", "mixins.Json"]);
        assert_eq!(analysis.classes[0].line, Some(5));
        assert_eq!(names(&analysis.functions), vec!["get", "main"]);
        assert_eq!(analysis.functions[0].detail, vec!["self", "request", "retries"]);
        assert_eq!(analysis.functions[1].detail, vec!["argv", "verbose"]);
        assert_eq!(analysis.functions[1].line, Some(9));
    }

    #[test]
    fn test_python_falls_back_on_syntax_error() {
        let code = "import requests\n\ndef broken(:\n    pass\n\nclass Thing:\n    pass\n";
        let mut analyzer = CodeAnalyzer::new();
        let analysis = analyzer.analyze_file("broken.py", code);

        assert_eq!(analysis.parse_mode, ParseMode::Heuristic);
        assert_eq!(analysis.imports, vec!["requests"]);
        assert_eq!(names(&analysis.functions), vec!["broken"]);
        assert_eq!(names(&analysis.classes), vec!["Thing"]);
        assert!(analysis.functions[0].line.is_none());
    }

    #[test]
    fn test_javascript_regex() {
        let code = r#"import React from 'react';
const axios = require('axios');
export default function App() {}
export const helper = () => 1;
class Widget extends React.Component {}
"#;
        let mut analyzer = CodeAnalyzer::new();
        let analysis = analyzer.analyze_file("src/App.jsx", code);

        assert_eq!(analysis.language, Language::JavaScript);
        assert_eq!(analysis.imports, vec!["react", "axios"]);
        assert_eq!(analysis.exports, vec!["App", "helper"]);
        assert_eq!(names(&analysis.functions), vec!["App", "helper"]);
        assert_eq!(names(&analysis.classes), vec!["Widget"]);
    }

    #[test]
    fn test_go_regex() {
        let code = "package main\n\nimport (\n\t\"fmt\"\n\t\"github.com/google/uuid\"\n)\n\ntype Server struct{}\n\nfunc (s *Server) Start() {}\n\nfunc main() {}\n";
        let mut analyzer = CodeAnalyzer::new();
        let analysis = analyzer.analyze_file("main.go", code);

        assert_eq!(analysis.imports, vec!["fmt", "github.com/google/uuid"]);
        assert_eq!(names(&analysis.functions), vec!["Start", "main"]);
        assert_eq!(analysis.types, vec!["Server"]);
    }

    #[test]
    fn test_rust_regex() {
        let code = "use std::io;\nuse serde::{Deserialize, Serialize};\n\npub struct Config {}\nenum Mode { A }\ntrait Run {}\nfn main() {}\n";
        let mut analyzer = CodeAnalyzer::new();
        let analysis = analyzer.analyze_file("src/main.rs", code);

        assert_eq!(analysis.imports, vec!["std::io", "serde::{Deserialize, Serialize}"]);
        assert_eq!(names(&analysis.functions), vec!["main"]);
        assert_eq!(analysis.types, vec!["Config", "Mode", "Run"]);
    }

    #[test]
    fn test_other_languages_get_tag_only() {
        let mut analyzer = CodeAnalyzer::new();
        let analysis = analyzer.analyze_file("Main.java", "class Main {}");
        assert_eq!(analysis.language, Language::Java);
        assert_eq!(analysis.parse_mode, ParseMode::None);
        assert!(analysis.classes.is_empty());
    }
}
