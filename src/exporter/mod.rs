//! Portable Exporter.
//!
//! Writes an [`ExtractionResult`] to disk and synthesizes what the project
//! needs to build outside its hosting platform: ecosystem manifests, a
//! Dockerfile and compose file, an environment template, README, ignore file
//! and license.
//!
//! Only the output root itself is a hard requirement. Every other write is
//! attempted independently; a failure is logged and the export carries on.

pub mod docker;
pub mod docs;
pub mod manifests;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::analyzer::dependency::DependencyAnalyzer;
use crate::config::ExportConfig;
use crate::error::{LiberatorError, Result};
use crate::models::{
    is_safe_relative_key, Ecosystem, ExportStatus, ExportSummary, ExtractionResult,
    NormalizedDependencies,
};

use docker::{dockerfile, docker_compose, dominant_stack, DockerContext};
use docs::{env_template, gitignore, license, readme, structure, ReadmeInput};

pub struct PortableExporter {
    output: PathBuf,
    config: ExportConfig,
}

impl PortableExporter {
    pub fn new(output: impl Into<PathBuf>, config: ExportConfig) -> Self {
        Self {
            output: output.into(),
            config,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Configured name, else the output directory's name.
    fn project_name(&self) -> String {
        if let Some(name) = self.config.project_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.output
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| self.output.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "liberated-app".to_string())
    }

    /// Write `content` to `output/key`, creating parents. Logs and returns
    /// `false` on any failure.
    fn write(&self, key: &str, content: &str) -> bool {
        if !is_safe_relative_key(key) {
            warn!(file = %key, "refusing to write outside the output directory");
            return false;
        }
        let target = self.output.join(key);
        if let Some(parent) = target.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(file = %key, "cannot create parent directory: {}", e);
                return false;
            }
        }
        match std::fs::write(&target, content) {
            Ok(()) => {
                debug!(file = %key, "written");
                true
            }
            Err(e) => {
                warn!(file = %key, "write failed: {}", e);
                false
            }
        }
    }

    /// Entry script for Python images: `app.py`, else `main.py`, else `app.py`.
    fn python_entry(result: &ExtractionResult) -> &'static str {
        if !result.files.contains_key("app.py") && result.files.contains_key("main.py") {
            "main.py"
        } else {
            "app.py"
        }
    }

    /// Export `result` to the output directory.
    ///
    /// The import sweep appends any newly found dependencies to
    /// `result.dependencies`; `files` is left untouched. Exporting the same
    /// result twice yields identical output.
    pub fn export(&self, result: &mut ExtractionResult) -> Result<ExportSummary> {
        std::fs::create_dir_all(&self.output).map_err(|source| LiberatorError::OutputDir {
            path: self.output.clone(),
            source,
        })?;
        let project_name = self.project_name();
        info!(output = %self.output.display(), project = %project_name, "exporting");

        let added = DependencyAnalyzer::new().supplement(result);
        if added > 0 {
            info!(added, "import scan found additional dependencies");
        }

        let mut files_exported = 0;
        for (key, content) in &result.files {
            if self.write(key, content) {
                files_exported += 1;
            }
        }

        let dependencies = NormalizedDependencies::from_dependencies(&result.dependencies);
        let generated = self.synthesize(result, &dependencies, &project_name);

        info!(
            files = files_exported,
            generated = generated.len(),
            dependencies = dependencies.total(),
            "export complete"
        );

        Ok(ExportSummary {
            output_path: self.output.clone(),
            files_exported,
            dependencies,
            generated,
            status: ExportStatus::Success,
        })
    }

    /// Produce every synthesized file, in write order, then write them.
    fn synthesize(
        &self,
        result: &ExtractionResult,
        dependencies: &NormalizedDependencies,
        project_name: &str,
    ) -> Vec<String> {
        let original = |key: &str| result.files.get(key).map(String::as_str);
        let mut planned: Vec<(&'static str, String)> = Vec::new();

        let npm = dependencies.get(Ecosystem::Npm);
        if !npm.is_empty() {
            planned.push((
                "package.json",
                manifests::package_json(original("package.json"), npm, project_name),
            ));
        }
        let pip = dependencies.get(Ecosystem::Pip);
        if !pip.is_empty() {
            planned.push(("requirements.txt", manifests::requirements_txt(pip)));
        }
        let go = dependencies.get(Ecosystem::Go);
        if !go.is_empty() {
            planned.push(("go.mod", manifests::go_mod(original("go.mod"), go, project_name)));
        }
        let cargo = dependencies.get(Ecosystem::Cargo);
        if !cargo.is_empty() {
            planned.push(("Cargo.toml", manifests::cargo_toml(cargo, project_name)));
        }

        let python_entry = Self::python_entry(result);
        let stack = dominant_stack(result.files.keys());
        debug!(?stack, "container stack");
        let ctx = DockerContext {
            run_command: result.run_command(),
            python_entry,
            port: self.config.port,
        };
        planned.push(("Dockerfile", dockerfile(stack, &ctx)));
        planned.push(("docker-compose.yml", docker_compose(self.config.port)));
        planned.push((".env.example", env_template(result.env_file())));
        planned.push((".gitignore", gitignore(original(".gitignore"))));
        planned.push(("LICENSE", license(&self.config)));

        // The README lists the final tree, so it is rendered last from the
        // planned paths rather than from whatever is already on disk.
        let mut paths: BTreeSet<&str> = result
            .files
            .keys()
            .map(String::as_str)
            .filter(|key| is_safe_relative_key(key))
            .collect();
        paths.extend(planned.iter().map(|(key, _)| *key));
        paths.insert("README.md");
        let tree = structure(project_name, paths, self.config.max_files_per_dir);
        let readme = readme(&ReadmeInput {
            project_name,
            metadata: &result.metadata,
            dependencies,
            structure: &tree,
            python_entry,
            run_command: result.run_command(),
        });
        planned.push(("README.md", readme));

        planned
            .into_iter()
            .filter(|(key, content)| self.write(key, content))
            .map(|(key, _)| key.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigEntry, Dependency, Platform};
    use tempfile::TempDir;

    fn sample_result() -> ExtractionResult {
        let mut result = ExtractionResult::new(Platform::Generic, Path::new("/src/app"));
        result.add_file("app.py", "import os\nimport requests\n".to_string());
        result.add_file("static/site.js", "const a = require('axios');\n".to_string());
        result.add_file("requirements.txt", "flask==2.3.0\n".to_string());
        result.add_dependency(Dependency::new("flask==2.3.0", Ecosystem::Pip));
        result.add_config(ConfigEntry::Env("PORT=5000\nSECRET_KEY=test123".to_string()));
        result
    }

    fn config(name: &str) -> ExportConfig {
        ExportConfig {
            project_name: Some(name.to_string()),
            ..ExportConfig::default()
        }
    }

    fn read(dir: &Path, key: &str) -> String {
        std::fs::read_to_string(dir.join(key)).unwrap()
    }

    #[test]
    fn test_export_writes_files_and_manifests() {
        let out = TempDir::new().unwrap();
        let mut result = sample_result();

        let summary = PortableExporter::new(out.path(), config("demo"))
            .export(&mut result)
            .unwrap();

        assert_eq!(summary.status, ExportStatus::Success);
        assert_eq!(summary.files_exported, 3);
        assert_eq!(summary.dependencies.get(Ecosystem::Pip), ["flask==2.3.0", "requests"]);
        assert_eq!(summary.dependencies.get(Ecosystem::Npm), ["axios"]);
        assert_eq!(read(out.path(), "static/site.js"), "const a = require('axios');\n");
        assert_eq!(read(out.path(), "requirements.txt"), "flask==2.3.0\nrequests\n");
        assert_eq!(
            read(out.path(), ".env.example"),
            "PORT=your_value_here\nSECRET_KEY=your_value_here"
        );
        for generated in [
            "package.json",
            "Dockerfile",
            "docker-compose.yml",
            "README.md",
            ".gitignore",
            "LICENSE",
        ] {
            assert!(summary.generated.iter().any(|g| g == generated), "{}", generated);
        }
        assert!(!out.path().join("go.mod").exists());
        assert!(!out.path().join("Cargo.toml").exists());
        assert!(read(out.path(), "Dockerfile").starts_with("FROM python:3.11-slim"));
    }

    #[test]
    fn test_export_is_idempotent() {
        let out = TempDir::new().unwrap();
        let mut result = sample_result();
        let exporter = PortableExporter::new(out.path(), config("demo"));

        exporter.export(&mut result).unwrap();
        let first: Vec<(String, String)> = ["README.md", "package.json", "requirements.txt", "Dockerfile"]
            .iter()
            .map(|k| (k.to_string(), read(out.path(), k)))
            .collect();
        let deps_after_first = result.dependencies.clone();

        exporter.export(&mut result).unwrap();
        for (key, content) in first {
            assert_eq!(read(out.path(), &key), content, "{} changed", key);
        }
        assert_eq!(result.dependencies, deps_after_first);
    }

    #[test]
    fn test_readme_lists_planned_tree() {
        let out = TempDir::new().unwrap();
        let mut result = sample_result();
        PortableExporter::new(out.path(), config("demo"))
            .export(&mut result)
            .unwrap();

        let text = read(out.path(), "README.md");
        assert!(text.contains("demo/\n"));
        assert!(text.contains("  README.md\n"));
        assert!(text.contains("  static/\n    site.js\n"));
    }

    #[test]
    fn test_unsafe_keys_are_not_written() {
        let out = TempDir::new().unwrap();
        let mut result = ExtractionResult::new(Platform::Generic, Path::new("/src"));
        // Bypass add_file's own check to exercise the exporter's guard.
        result.files.insert("../escape.txt".to_string(), "x".to_string());
        result.files.insert("ok.txt".to_string(), "y".to_string());

        let summary = PortableExporter::new(out.path().join("nested"), config("demo"))
            .export(&mut result)
            .unwrap();

        assert_eq!(summary.files_exported, 1);
        assert!(!out.path().join("escape.txt").exists());
        assert_eq!(read(&out.path().join("nested"), ".env.example"), docs::ENV_PLACEHOLDER);
        assert!(read(&out.path().join("nested"), "Dockerfile").starts_with("FROM alpine:latest"));
    }

    #[test]
    fn test_output_root_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let mut result = ExtractionResult::new(Platform::Generic, dir.path());
        let err = PortableExporter::new(blocker.join("out"), ExportConfig::default())
            .export(&mut result)
            .unwrap_err();
        assert!(matches!(err, LiberatorError::OutputDir { .. }));
    }

    #[test]
    fn test_project_name_defaults_to_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("my-export");
        let mut result = ExtractionResult::new(Platform::Generic, dir.path());
        result.add_dependency(Dependency::new("serde", Ecosystem::Cargo));

        PortableExporter::new(&out, ExportConfig::default())
            .export(&mut result)
            .unwrap();

        assert!(read(&out, "Cargo.toml").contains("name = \"my-export\""));
        assert!(read(&out, "README.md").starts_with("# my-export\n"));
    }
}
