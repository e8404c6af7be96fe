use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Package/dependency management system a dependency belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    Pip,
    Go,
    Cargo,
    Other,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 5] = [
        Ecosystem::Npm,
        Ecosystem::Pip,
        Ecosystem::Go,
        Ecosystem::Cargo,
        Ecosystem::Other,
    ];

    /// Human-facing heading used in generated documentation.
    pub fn label(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "Node.js",
            Ecosystem::Pip => "Python",
            Ecosystem::Go => "Go",
            Ecosystem::Cargo => "Rust",
            Ecosystem::Other => "Other",
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ecosystem::Npm => write!(f, "npm"),
            Ecosystem::Pip => write!(f, "pip"),
            Ecosystem::Go => write!(f, "go"),
            Ecosystem::Cargo => write!(f, "cargo"),
            Ecosystem::Other => write!(f, "other"),
        }
    }
}

/// A raw dependency identifier tagged with its ecosystem.
///
/// The identifier keeps whatever form its source produced: `express@^4.18.2`
/// from a `package.json`, `flask==2.3.0` from a requirements file, or a bare
/// module name recovered from an import statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    pub ecosystem: Ecosystem,
}

impl Dependency {
    pub fn new(id: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self {
            id: id.into(),
            ecosystem,
        }
    }

    /// Package name with any version requirement stripped.
    ///
    /// Used to decide whether an import-derived dependency is already covered
    /// by a manifest-derived one (`flask` vs `flask==2.3.0`).
    pub fn package_name(&self) -> String {
        match self.ecosystem {
            Ecosystem::Npm => match self.id.rfind('@') {
                Some(idx) if idx > 0 => self.id[..idx].to_string(),
                _ => self.id.clone(),
            },
            Ecosystem::Pip => self
                .id
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
                .map(|c| match c {
                    '_' | '.' => '-',
                    c => c.to_ascii_lowercase(),
                })
                .collect(),
            // Cargo treats `-` and `_` in crate names as the same name.
            Ecosystem::Cargo => self.id.replace('-', "_"),
            Ecosystem::Go | Ecosystem::Other => self.id.clone(),
        }
    }

    /// Whether `self` already accounts for `other`'s package.
    ///
    /// Go imports name packages, not modules: `example.com/mod/sub` belongs
    /// to a declared `example.com/mod`.
    pub fn covers(&self, other: &Dependency) -> bool {
        if self.ecosystem != other.ecosystem {
            return false;
        }
        let (mine, theirs) = (self.package_name(), other.package_name());
        match self.ecosystem {
            Ecosystem::Go => {
                theirs == mine
                    || theirs
                        .strip_prefix(mine.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            _ => theirs == mine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Base44,
    Replit,
    Generic,
}

impl Platform {
    /// Detector consultation order. The generic fallback is always last.
    pub const PRIORITY: [Platform; 3] = [Platform::Base44, Platform::Replit, Platform::Generic];
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Base44 => write!(f, "base44"),
            Platform::Replit => write!(f, "replit"),
            Platform::Generic => write!(f, "generic"),
        }
    }
}

/// Platform configuration captured during extraction, keyed by its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", content = "content", rename_all = "snake_case")]
pub enum ConfigEntry {
    /// Parsed Base44 marker file.
    Base44(serde_json::Value),
    /// Parsed `.replit` file.
    Replit(serde_json::Value),
    /// Raw `replit.nix` text.
    ReplitNix(String),
    /// Raw `.env` text. Exported only in redacted form.
    Env(String),
    /// Command the hosting platform used to start the app.
    RunCommand(String),
    Other {
        key: String,
        value: serde_json::Value,
    },
}

impl ConfigEntry {
    pub fn key(&self) -> &str {
        match self {
            ConfigEntry::Base44(_) => "base44",
            ConfigEntry::Replit(_) => "replit",
            ConfigEntry::ReplitNix(_) => "replit_nix",
            ConfigEntry::Env(_) => "env",
            ConfigEntry::RunCommand(_) => "run_command",
            ConfigEntry::Other { key, .. } => key,
        }
    }
}

/// Provenance of an extraction. `extra` holds platform-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub platform: Platform,
    pub source_path: PathBuf,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Everything a detector pulled out of one source tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Relative, forward-slash path → file content.
    pub files: BTreeMap<String, String>,
    /// First-seen order, no duplicates.
    pub dependencies: Vec<Dependency>,
    pub config: Vec<ConfigEntry>,
    pub metadata: Metadata,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    pub fn new(platform: Platform, source_path: &Path) -> Self {
        Self {
            files: BTreeMap::new(),
            dependencies: Vec::new(),
            config: Vec::new(),
            metadata: Metadata {
                platform,
                source_path: source_path.to_path_buf(),
                extra: BTreeMap::new(),
            },
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Insert a file unless the key is already present or escapes the root.
    pub fn add_file(&mut self, path: impl Into<String>, content: String) -> bool {
        let path = path.into();
        if !is_safe_relative_key(&path) {
            self.add_error(format!("Refusing file key outside the source root: {}", path));
            return false;
        }
        if self.files.contains_key(&path) {
            return false;
        }
        self.files.insert(path, content);
        true
    }

    pub fn add_dependency(&mut self, dep: Dependency) -> bool {
        if self.dependencies.contains(&dep) {
            return false;
        }
        self.dependencies.push(dep);
        true
    }

    /// Append `dep` unless a dependency naming the same package already exists
    /// in its ecosystem.
    pub fn add_dependency_if_new_package(&mut self, dep: Dependency) -> bool {
        if self.dependencies.iter().any(|d| d.covers(&dep)) {
            return false;
        }
        self.add_dependency(dep)
    }

    pub fn add_config(&mut self, entry: ConfigEntry) {
        self.config.push(entry);
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        warn!("{}", error);
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Captured `.env` content, if any.
    pub fn env_file(&self) -> Option<&str> {
        self.config.iter().find_map(|entry| match entry {
            ConfigEntry::Env(content) => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn run_command(&self) -> Option<&str> {
        self.config.iter().find_map(|entry| match entry {
            ConfigEntry::RunCommand(cmd) => Some(cmd.as_str()),
            _ => None,
        })
    }
}

/// A relative key must not be absolute and must not contain `..` segments.
pub fn is_safe_relative_key(key: &str) -> bool {
    if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
        return false;
    }
    Path::new(key)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && !key.split(['/', '\\']).any(|segment| segment == "..")
}

/// Dependencies bucketed by ecosystem, unique within each bucket, first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDependencies(BTreeMap<Ecosystem, Vec<String>>);

impl Default for NormalizedDependencies {
    fn default() -> Self {
        Self(Ecosystem::ALL.iter().map(|e| (*e, Vec::new())).collect())
    }
}

impl NormalizedDependencies {
    pub fn from_dependencies(deps: &[Dependency]) -> Self {
        let mut normalized = Self::default();
        for dep in deps {
            normalized.insert(dep.ecosystem, &dep.id);
        }
        normalized
    }

    pub fn insert(&mut self, ecosystem: Ecosystem, id: &str) -> bool {
        let bucket = self.0.entry(ecosystem).or_default();
        if bucket.iter().any(|existing| existing == id) {
            return false;
        }
        bucket.push(id.to_string());
        true
    }

    pub fn get(&self, ecosystem: Ecosystem) -> &[String] {
        self.0.get(&ecosystem).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty buckets in ecosystem order.
    pub fn iter(&self) -> impl Iterator<Item = (Ecosystem, &[String])> {
        self.0
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(eco, ids)| (*eco, ids.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Success,
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::Success => write!(f, "success"),
        }
    }
}

/// What the exporter wrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub files_exported: usize,
    pub dependencies: NormalizedDependencies,
    /// Synthesized files, relative to `output_path`.
    pub generated: Vec<String>,
    pub status: ExportStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_strips_versions() {
        assert_eq!(Dependency::new("express@^4.18.2", Ecosystem::Npm).package_name(), "express");
        assert_eq!(
            Dependency::new("@types/node@20.1.0", Ecosystem::Npm).package_name(),
            "@types/node"
        );
        assert_eq!(Dependency::new("@scope/pkg", Ecosystem::Npm).package_name(), "@scope/pkg");
        assert_eq!(Dependency::new("Flask==2.3.0", Ecosystem::Pip).package_name(), "flask");
        assert_eq!(Dependency::new("typing_extensions>=4", Ecosystem::Pip).package_name(), "typing-extensions");
    }

    #[test]
    fn test_add_file_keeps_first_and_rejects_escapes() {
        let mut result = ExtractionResult::new(Platform::Generic, Path::new("/tmp/src"));
        assert!(result.add_file("a/b.py", "one".to_string()));
        assert!(!result.add_file("a/b.py", "two".to_string()));
        assert_eq!(result.files["a/b.py"], "one");

        assert!(!result.add_file("/etc/passwd", String::new()));
        assert!(!result.add_file("../outside.txt", String::new()));
        assert!(!result.add_file("a/../../x", String::new()));
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_dependency_union_by_package_name() {
        let mut result = ExtractionResult::new(Platform::Generic, Path::new("."));
        assert!(result.add_dependency(Dependency::new("flask==2.3.0", Ecosystem::Pip)));
        assert!(!result.add_dependency(Dependency::new("flask==2.3.0", Ecosystem::Pip)));
        assert!(!result.add_dependency_if_new_package(Dependency::new("flask", Ecosystem::Pip)));
        assert!(result.add_dependency_if_new_package(Dependency::new("flask", Ecosystem::Other)));
        assert_eq!(result.dependencies.len(), 2);
    }

    #[test]
    fn test_cargo_names_match_across_hyphen_and_underscore() {
        let mut result = ExtractionResult::new(Platform::Generic, Path::new("."));
        result.add_dependency(Dependency::new("tokio-util", Ecosystem::Cargo));
        result.add_dependency(Dependency::new("tracing-subscriber", Ecosystem::Cargo));

        assert!(!result.add_dependency_if_new_package(Dependency::new("tokio_util", Ecosystem::Cargo)));
        assert!(!result.add_dependency_if_new_package(Dependency::new("tracing_subscriber", Ecosystem::Cargo)));
        assert!(result.add_dependency_if_new_package(Dependency::new("serde", Ecosystem::Cargo)));
        assert_eq!(result.dependencies.len(), 3);
    }

    #[test]
    fn test_go_subpackage_covered_by_module() {
        let mut result = ExtractionResult::new(Platform::Generic, Path::new("."));
        result.add_dependency(Dependency::new("github.com/gin-gonic/gin", Ecosystem::Go));

        assert!(!result.add_dependency_if_new_package(Dependency::new("github.com/gin-gonic/gin", Ecosystem::Go)));
        assert!(!result.add_dependency_if_new_package(Dependency::new(
            "github.com/gin-gonic/gin/binding",
            Ecosystem::Go
        )));
        // Shared prefix without a path boundary is a different module.
        assert!(result.add_dependency_if_new_package(Dependency::new(
            "github.com/gin-gonic/gin-contrib",
            Ecosystem::Go
        )));
        assert_eq!(result.dependencies.len(), 2);
    }

    #[test]
    fn test_normalized_is_duplicate_free_and_ordered() {
        let deps = vec![
            Dependency::new("react", Ecosystem::Npm),
            Dependency::new("requests", Ecosystem::Pip),
            Dependency::new("axios", Ecosystem::Npm),
            Dependency::new("react", Ecosystem::Npm),
            Dependency::new("react", Ecosystem::Other),
        ];
        let normalized = NormalizedDependencies::from_dependencies(&deps);
        assert_eq!(normalized.get(Ecosystem::Npm), ["react", "axios"]);
        assert_eq!(normalized.get(Ecosystem::Pip), ["requests"]);
        assert_eq!(normalized.get(Ecosystem::Other), ["react"]);
        assert!(normalized.get(Ecosystem::Go).is_empty());
        assert_eq!(normalized.total(), 4);
    }

    #[test]
    fn test_export_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ExportStatus::Success).unwrap(), "\"success\"");
    }
}
