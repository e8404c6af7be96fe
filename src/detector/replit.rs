use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{capture_env, collect_files, sweep_imports, Detector};
use crate::manifest::{
    self, go::GoMod, node::PackageJson, python::Pyproject, python::Requirements,
    rust::CargoToml,
};
use crate::models::{ConfigEntry, ExtractionResult, Platform};
use crate::reader::read_lossy;

const MARKERS: [&str; 4] = [".replit", "replit.nix", ".config/replit", "replit.json"];

/// Replit projects, recognized by `.replit` / `replit.nix` and friends.
pub struct ReplitDetector;

impl ReplitDetector {
    fn is_platform_file(key: &str) -> bool {
        matches!(key, ".replit" | "replit.nix" | "replit.json")
            || key.starts_with(".config/replit/")
            || key == ".config/replit"
    }

    /// `.replit` is TOML in practice; older exports used JSON.
    fn parse_dot_replit(content: &str) -> Option<Value> {
        toml::from_str::<Value>(content)
            .ok()
            .or_else(|| serde_json::from_str::<Value>(content).ok())
    }

    fn run_command(config: &Value) -> Option<String> {
        match config.get("run")? {
            Value::String(cmd) if !cmd.trim().is_empty() => Some(cmd.trim().to_string()),
            Value::Array(parts) => {
                let parts: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
                (!parts.is_empty()).then(|| parts.join(" "))
            }
            _ => None,
        }
    }

    fn read_config(root: &Path, result: &mut ExtractionResult) -> Value {
        let mut replit_config = Value::Null;

        let dot_replit = root.join(".replit");
        if dot_replit.is_file() {
            match read_lossy(&dot_replit) {
                Ok(content) => match Self::parse_dot_replit(&content) {
                    Some(config) => {
                        if let Some(cmd) = Self::run_command(&config) {
                            result.add_config(ConfigEntry::RunCommand(cmd));
                        }
                        result.add_config(ConfigEntry::Replit(config.clone()));
                        replit_config = config;
                    }
                    None => result.add_warning("Could not parse .replit as TOML or JSON"),
                },
                Err(e) => result.add_error(format!("Failed to read .replit: {}", e)),
            }
        }

        let nix = root.join("replit.nix");
        if nix.is_file() {
            match read_lossy(&nix) {
                Ok(content) => result.add_config(ConfigEntry::ReplitNix(content)),
                Err(e) => result.add_error(format!("Failed to read replit.nix: {}", e)),
            }
        }

        replit_config
    }
}

impl Detector for ReplitDetector {
    fn platform(&self) -> Platform {
        Platform::Replit
    }

    fn detect(&self, root: &Path) -> bool {
        MARKERS.iter().any(|marker| root.join(marker).exists())
    }

    fn extract_excluding(&self, root: &Path, skip: &[PathBuf]) -> ExtractionResult {
        let mut result = ExtractionResult::new(Platform::Replit, root);

        let config = Self::read_config(root, &mut result);
        result
            .metadata
            .extra
            .insert("replit_config".to_string(), config);

        collect_files(root, skip, &mut result, Self::is_platform_file);
        manifest::collect(
            root,
            &[&Requirements, &Pyproject, &PackageJson, &GoMod, &CargoToml],
            &mut result,
        );
        capture_env(root, &mut result);
        sweep_imports(&mut result);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, Ecosystem};
    use tempfile::TempDir;

    #[test]
    fn test_detect_config_directory_alone() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".config/replit")).unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();
        assert!(ReplitDetector.detect(dir.path()));

        let plain = TempDir::new().unwrap();
        std::fs::create_dir_all(plain.path().join(".config/other")).unwrap();
        assert!(!ReplitDetector.detect(plain.path()));
    }

    #[test]
    fn test_marker_plus_one_import() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".replit"), "run = \"python main.py\"\n").unwrap();
        std::fs::write(dir.path().join("main.py"), "import os\nimport requests\n").unwrap();

        let result = ReplitDetector.extract(dir.path());

        assert_eq!(result.metadata.platform, Platform::Replit);
        assert_eq!(result.files.keys().collect::<Vec<_>>(), vec!["main.py"]);
        assert_eq!(
            result.dependencies,
            vec![Dependency::new("requests", Ecosystem::Pip)]
        );
        assert_eq!(result.run_command(), Some("python main.py"));
        assert_eq!(result.metadata.extra["replit_config"]["run"], "python main.py");
    }

    #[test]
    fn test_json_dot_replit_and_nix_captured() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".config/replit")).unwrap();
        std::fs::write(
            dir.path().join(".replit"),
            r#"{"run": ["node", "index.js"], "language": "nodejs"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("replit.nix"), "{ pkgs }: { deps = [ pkgs.nodejs ]; }").unwrap();
        std::fs::write(dir.path().join(".config/replit/settings"), "x").unwrap();
        std::fs::write(dir.path().join("index.js"), "const x = 1;\n").unwrap();
        std::fs::write(dir.path().join(".env"), "PORT=5000\n").unwrap();

        let result = ReplitDetector.extract(dir.path());

        assert_eq!(result.run_command(), Some("node index.js"));
        assert!(result
            .config
            .iter()
            .any(|c| matches!(c, ConfigEntry::ReplitNix(nix) if nix.contains("nodejs"))));
        assert_eq!(result.env_file(), Some("PORT=5000\n"));
        assert_eq!(
            result.files.keys().collect::<Vec<_>>(),
            vec![".env", "index.js"]
        );
    }

    #[test]
    fn test_manifests_across_ecosystems() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("replit.nix"), "{}").unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask==2.3.0\n").unwrap();
        std::fs::write(dir.path().join("go.mod"), "module x\n\nrequire github.com/a/b v1.0.0\n").unwrap();
        std::fs::write(dir.path().join("main.py"), "from flask import Flask\n").unwrap();

        let result = ReplitDetector.extract(dir.path());

        assert_eq!(
            result.dependencies,
            vec![
                Dependency::new("flask==2.3.0", Ecosystem::Pip),
                Dependency::new("github.com/a/b", Ecosystem::Go),
            ]
        );
    }
}
