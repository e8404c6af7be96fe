use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Dependency, Ecosystem, ExtractionResult, NormalizedDependencies};

lazy_static! {
    static ref PY_IMPORT: Regex = Regex::new(r"^import\s+(.+)$").unwrap();
    static ref PY_FROM: Regex = Regex::new(r"^from\s+(\w+)").unwrap();

    static ref JS_FROM: Regex = Regex::new(r#"\bfrom\s*['"]([^'"]+)['"]"#).unwrap();
    static ref JS_SIDE_EFFECT: Regex = Regex::new(r#"^\s*import\s*['"]([^'"]+)['"]"#).unwrap();
    static ref JS_REQUIRE: Regex =
        Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();
    static ref JS_DYNAMIC: Regex =
        Regex::new(r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap();

    static ref GO_IMPORT: Regex = Regex::new(r#"^import\s+(?:[\w.]+\s+)?"([^"]+)""#).unwrap();
    static ref GO_BLOCK_START: Regex = Regex::new(r"^import\s*\($").unwrap();
    static ref GO_BLOCK_ENTRY: Regex = Regex::new(r#"^(?:[\w.]+\s+)?"([^"]+)""#).unwrap();

    static ref RS_USE: Regex =
        Regex::new(r"\buse\s+(?:::)?([A-Za-z_]\w*)\s*(?:::|;|\bas\b)").unwrap();
    static ref RS_EXTERN: Regex = Regex::new(r"\bextern\s+crate\s+(\w+)").unwrap();
}

const PYTHON_STDLIB: &[&str] = &[
    "__future__", "abc", "argparse", "asyncio", "base64", "collections", "copy", "csv",
    "dataclasses", "datetime", "doctest", "email", "enum", "functools", "glob", "hashlib",
    "html", "http", "io", "itertools", "json", "logging", "math", "multiprocessing", "os",
    "pathlib", "pickle", "random", "re", "shutil", "socket", "sqlite3", "string",
    "subprocess", "sys", "tempfile", "threading", "time", "typing", "unittest", "urllib",
    "uuid", "xml",
];

const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "crypto", "dgram", "dns", "events", "fs",
    "http", "https", "net", "os", "path", "querystring", "readline", "repl", "stream",
    "timers", "tls", "url", "util", "vm", "worker_threads", "zlib",
];

const RUST_STDLIB: &[&str] = &[
    "alloc", "collections", "core", "crate", "fmt", "io", "net", "os", "path", "proc_macro",
    "process", "self", "Self", "std", "str", "super", "sync", "test", "thread", "time",
];

/// Import scanner selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanner {
    Python,
    JavaScript,
    Go,
    Rust,
    /// Files no scanner understands. Yields nothing.
    Unknown,
}

impl Scanner {
    pub fn for_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        match ext {
            "py" => Scanner::Python,
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" => Scanner::JavaScript,
            "go" => Scanner::Go,
            "rs" => Scanner::Rust,
            _ => Scanner::Unknown,
        }
    }

    pub fn ecosystem(self) -> Option<Ecosystem> {
        match self {
            Scanner::Python => Some(Ecosystem::Pip),
            Scanner::JavaScript => Some(Ecosystem::Npm),
            Scanner::Go => Some(Ecosystem::Go),
            Scanner::Rust => Some(Ecosystem::Cargo),
            Scanner::Unknown => None,
        }
    }

    /// Module tokens referenced by `code`, before standard-library filtering.
    fn scan(self, code: &str) -> Vec<String> {
        match self {
            Scanner::Python => scan_python(code),
            Scanner::JavaScript => scan_javascript(code),
            Scanner::Go => scan_go(code),
            Scanner::Rust => scan_rust(code),
            Scanner::Unknown => Vec::new(),
        }
    }

    fn is_stdlib(self, module: &str) -> bool {
        match self {
            Scanner::Python => PYTHON_STDLIB.contains(&module),
            Scanner::JavaScript => NODE_BUILTINS.contains(&module),
            // Standard-library import paths have no dot in their first segment.
            Scanner::Go => !module.split('/').next().unwrap_or("").contains('.'),
            Scanner::Rust => RUST_STDLIB.contains(&module),
            Scanner::Unknown => true,
        }
    }
}

/// Heuristic, line-oriented import scanner.
///
/// Remembers which ecosystem each identifier was first seen in so a flat
/// list of raw identifiers can later be bucketed with
/// [`normalize_dependencies`](Self::normalize_dependencies).
#[derive(Debug, Default)]
pub struct DependencyAnalyzer {
    ecosystems: HashMap<String, Ecosystem>,
}

impl DependencyAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// External packages imported by `content`, unique, in first-seen order.
    pub fn analyze_code(&mut self, content: &str, file_path: &str) -> Vec<String> {
        let scanner = Scanner::for_path(file_path);
        let Some(ecosystem) = scanner.ecosystem() else {
            return Vec::new();
        };

        let mut deps: Vec<String> = Vec::new();
        for module in scanner.scan(content) {
            if module.is_empty() || scanner.is_stdlib(&module) || deps.contains(&module) {
                continue;
            }
            self.ecosystems.entry(module.clone()).or_insert(ecosystem);
            deps.push(module);
        }
        deps
    }

    /// Same as [`analyze_code`](Self::analyze_code), tagged with each
    /// identifier's recorded ecosystem.
    pub fn dependencies_in(&mut self, content: &str, file_path: &str) -> Vec<Dependency> {
        self.analyze_code(content, file_path)
            .into_iter()
            .map(|id| {
                let ecosystem = self.ecosystem_of(&id).unwrap_or(Ecosystem::Other);
                Dependency::new(id, ecosystem)
            })
            .collect()
    }

    /// Scan every file in `result` and append import-derived dependencies
    /// whose package is not already listed for its ecosystem.
    ///
    /// Returns how many were added. `files` is never touched.
    pub fn supplement(&mut self, result: &mut ExtractionResult) -> usize {
        let found: Vec<Dependency> = result
            .files
            .iter()
            .flat_map(|(path, content)| self.dependencies_in(content, path))
            .collect();

        found
            .into_iter()
            .filter(|dep| result.add_dependency_if_new_package(dep.clone()))
            .count()
    }

    pub fn ecosystem_of(&self, id: &str) -> Option<Ecosystem> {
        self.ecosystems.get(id).copied()
    }

    /// Bucket raw identifiers by recorded ecosystem; untracked ones land in
    /// [`Ecosystem::Other`].
    pub fn normalize_dependencies(&self, raw: &[String]) -> NormalizedDependencies {
        let mut normalized = NormalizedDependencies::default();
        for id in raw {
            let ecosystem = self.ecosystem_of(id).unwrap_or(Ecosystem::Other);
            normalized.insert(ecosystem, id);
        }
        normalized
    }
}

fn scan_python(code: &str) -> Vec<String> {
    let mut modules = Vec::new();
    for line in code.lines() {
        let line = line.trim();
        if let Some(caps) = PY_IMPORT.captures(line) {
            // import a, b.c as d
            for part in caps[1].split(',') {
                let target = part.split_whitespace().next().unwrap_or("");
                let top = target.split('.').next().unwrap_or("");
                if !top.is_empty() && top.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    modules.push(top.to_string());
                }
            }
        } else if let Some(caps) = PY_FROM.captures(line) {
            modules.push(caps[1].to_string());
        }
    }
    modules
}

fn scan_javascript(code: &str) -> Vec<String> {
    let mut modules = Vec::new();
    for line in code.lines() {
        for re in [&*JS_FROM, &*JS_SIDE_EFFECT, &*JS_REQUIRE, &*JS_DYNAMIC] {
            for caps in re.captures_iter(line) {
                if let Some(name) = js_package_name(&caps[1]) {
                    modules.push(name);
                }
            }
        }
    }
    modules
}

/// Package portion of a module specifier: `@scope/pkg/sub` → `@scope/pkg`,
/// `lodash/fp` → `lodash`. Relative paths yield `None`; `node:` builtins
/// yield their bare name so the builtin filter removes them.
fn js_package_name(specifier: &str) -> Option<String> {
    if specifier.starts_with('.') || specifier.starts_with('/') {
        return None;
    }
    let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);
    let mut segments = specifier.split('/');
    let first = segments.next()?;
    if first.starts_with('@') {
        let second = segments.next()?;
        Some(format!("{}/{}", first, second))
    } else {
        Some(first.to_string())
    }
}

fn scan_go(code: &str) -> Vec<String> {
    let mut modules = Vec::new();
    let mut in_block = false;
    for line in code.lines() {
        let line = line.trim();
        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else if let Some(caps) = GO_BLOCK_ENTRY.captures(line) {
                modules.push(caps[1].to_string());
            }
        } else if GO_BLOCK_START.is_match(line) {
            in_block = true;
        } else if let Some(caps) = GO_IMPORT.captures(line) {
            modules.push(caps[1].to_string());
        }
    }
    modules
}

fn scan_rust(code: &str) -> Vec<String> {
    let mut crates = Vec::new();
    for line in code.lines() {
        for caps in RS_USE.captures_iter(line) {
            crates.push(caps[1].to_string());
        }
        for caps in RS_EXTERN.captures_iter(line) {
            crates.push(caps[1].to_string());
        }
    }
    crates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_stdlib_excluded() {
        let mut analyzer = DependencyAnalyzer::new();
        let deps = analyzer.analyze_code("import os\nimport requests", "app.py");
        assert_eq!(deps, vec!["requests"]);
        assert_eq!(analyzer.ecosystem_of("requests"), Some(Ecosystem::Pip));
        assert_eq!(analyzer.ecosystem_of("os"), None);
    }

    #[test]
    fn test_python_forms() {
        let mut analyzer = DependencyAnalyzer::new();
        let code = "import numpy as np, pandas\nfrom flask import Flask\nfrom . import views\nfrom .models import User\nimport os.path\n    import yaml\n";
        let deps = analyzer.analyze_code(code, "src/app.py");
        assert_eq!(deps, vec!["numpy", "pandas", "flask", "yaml"]);
    }

    #[test]
    fn test_javascript_forms() {
        let mut analyzer = DependencyAnalyzer::new();
        let code = r#"
import React from 'react';
import { createClient } from "@supabase/supabase-js";
import './styles.css';
import 'dotenv/config';
const fs = require('fs');
const path = require("node:path");
const _ = require('lodash/fp');
const lazy = import('chart.js');
export { x } from './local';
import {
  a,
} from 'react-router-dom'
"#;
        let deps = analyzer.analyze_code(code, "src/index.jsx");
        assert_eq!(
            deps,
            vec!["react", "@supabase/supabase-js", "dotenv", "lodash", "chart.js", "react-router-dom"]
        );
        assert_eq!(analyzer.ecosystem_of("react"), Some(Ecosystem::Npm));
    }

    #[test]
    fn test_go_single_and_block_imports() {
        let mut analyzer = DependencyAnalyzer::new();
        let code = r#"package main

import "fmt"
import gin "github.com/gin-gonic/gin"

import (
	"net/http"
	"github.com/google/uuid"
	_ "github.com/lib/pq"
)
"#;
        let deps = analyzer.analyze_code(code, "main.go");
        assert_eq!(
            deps,
            vec!["github.com/gin-gonic/gin", "github.com/google/uuid", "github.com/lib/pq"]
        );
    }

    #[test]
    fn test_rust_use_and_extern_crate() {
        let mut analyzer = DependencyAnalyzer::new();
        let code = "use std::collections::HashMap;\nuse serde::Deserialize;\nuse crate::models;\nextern crate rand;\npub use anyhow;\nuse super::x;\n";
        let deps = analyzer.analyze_code(code, "src/lib.rs");
        assert_eq!(deps, vec!["serde", "rand", "anyhow"]);
        assert_eq!(analyzer.ecosystem_of("serde"), Some(Ecosystem::Cargo));
    }

    #[test]
    fn test_unknown_extension_and_binary_content() {
        let mut analyzer = DependencyAnalyzer::new();
        assert!(analyzer.analyze_code("import requests", "notes.txt").is_empty());
        let garbage = String::from_utf8_lossy(&[0xff, 0x00, 0x9f, b'i', b'm']).into_owned();
        assert!(analyzer.analyze_code(&garbage, "blob.py").is_empty());
    }

    #[test]
    fn test_first_sighting_ecosystem_wins() {
        let mut analyzer = DependencyAnalyzer::new();
        analyzer.analyze_code("import redis", "a.py");
        analyzer.analyze_code("const r = require('redis');", "b.js");
        assert_eq!(analyzer.ecosystem_of("redis"), Some(Ecosystem::Pip));
    }

    #[test]
    fn test_supplement_skips_packages_already_declared() {
        use crate::models::Platform;

        let mut result = ExtractionResult::new(Platform::Generic, Path::new("."));
        result.add_dependency(Dependency::new("flask==2.3.0", Ecosystem::Pip));
        result.add_file("app.py", "import flask\nimport redis\n".to_string());
        result.add_file("web/main.ts", "import { z } from 'zod';\n".to_string());

        let mut analyzer = DependencyAnalyzer::new();
        assert_eq!(analyzer.supplement(&mut result), 2);
        assert_eq!(
            result.dependencies,
            vec![
                Dependency::new("flask==2.3.0", Ecosystem::Pip),
                Dependency::new("redis", Ecosystem::Pip),
                Dependency::new("zod", Ecosystem::Npm),
            ]
        );
        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn test_normalize_dependencies_buckets_and_dedupes() {
        let mut analyzer = DependencyAnalyzer::new();
        analyzer.analyze_code("import requests\nimport flask", "a.py");
        analyzer.analyze_code("import express from 'express';", "b.js");

        let raw: Vec<String> = ["requests", "express", "flask", "requests", "mystery", "mystery"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let normalized = analyzer.normalize_dependencies(&raw);
        assert_eq!(normalized.get(Ecosystem::Pip), ["requests", "flask"]);
        assert_eq!(normalized.get(Ecosystem::Npm), ["express"]);
        assert_eq!(normalized.get(Ecosystem::Other), ["mystery"]);
        assert_eq!(normalized.total(), 4);
    }
}
