use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use super::code::{CodeAnalyzer, FileAnalysis};
use super::dependency::DependencyAnalyzer;
use crate::language::Language;
use crate::models::NormalizedDependencies;
use crate::reader::{read_lossy, walk_files, WalkEntry};

/// Structure and import-derived dependencies of a whole tree.
#[derive(Debug, Serialize)]
pub struct ProjectAnalysis {
    pub files: Vec<FileAnalysis>,
    pub dependencies: NormalizedDependencies,
    pub languages: BTreeSet<Language>,
    /// Files that could not be read, with the reason.
    pub skipped: Vec<String>,
}

/// Analyze every non-hidden file below `root`.
pub fn analyze_project(root: &Path) -> ProjectAnalysis {
    let mut code_analyzer = CodeAnalyzer::new();
    let mut dependency_analyzer = DependencyAnalyzer::new();
    let mut files = Vec::new();
    let mut languages = BTreeSet::new();
    let mut raw_deps: Vec<String> = Vec::new();
    let mut skipped = Vec::new();

    for entry in walk_files(root) {
        let (path, key) = match entry {
            WalkEntry::File { path, key } => (path, key),
            WalkEntry::Symlink { .. } => continue,
            WalkEntry::Failed(reason) => {
                skipped.push(reason);
                continue;
            }
        };
        if key.split('/').any(|part| part.starts_with('.')) {
            continue;
        }

        let content = match read_lossy(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(file = %key, "unreadable: {}", e);
                skipped.push(format!("{}: {}", key, e));
                continue;
            }
        };

        let analysis = code_analyzer.analyze_file(&key, &content);
        if analysis.language != Language::Unknown {
            languages.insert(analysis.language);
        }
        files.push(analysis);

        for dep in dependency_analyzer.analyze_code(&content, &key) {
            if !raw_deps.contains(&dep) {
                raw_deps.push(dep);
            }
        }
    }

    let dependencies = dependency_analyzer.normalize_dependencies(&raw_deps);
    info!(
        files = files.len(),
        dependencies = dependencies.total(),
        "analyzed project"
    );

    ProjectAnalysis {
        files,
        dependencies,
        languages,
        skipped,
    }
}
