use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Root configuration structure, deserialized from `.liberator/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
}

/// Knobs for the files the exporter synthesizes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Name used in generated manifests and the README title. When unset,
    /// the output directory's name is used.
    pub project_name: Option<String>,
    /// Holder named on the LICENSE copyright line.
    pub copyright_holder: String,
    /// Year on the LICENSE copyright line; omitted when unset.
    pub copyright_year: Option<u16>,
    /// Port published by the generated `docker-compose.yml`.
    pub port: u16,
    /// Cap on files listed per directory in the README structure section.
    pub max_files_per_dir: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            project_name: None,
            copyright_holder: "The project contributors".to_string(),
            copyright_year: None,
            port: 3000,
            max_files_per_dir: 10,
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Load configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<working_dir>/.liberator/config.toml`
/// 3. `~/.config/liberator/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = working_dir.join(".liberator").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("liberator").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.export.port, 3000);
        assert_eq!(cfg.export.max_files_per_dir, 10);
        assert_eq!(cfg.export.copyright_holder, "The project contributors");
        assert!(cfg.export.project_name.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[export]\nproject_name = \"shop\"\nport = 8080\n").unwrap();

        let cfg = load_config(dir.path(), Some(&path)).unwrap();
        assert_eq!(cfg.export.project_name.as_deref(), Some("shop"));
        assert_eq!(cfg.export.port, 8080);
        assert_eq!(cfg.export.max_files_per_dir, 10);
    }

    #[test]
    fn test_working_dir_config_is_found() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".liberator")).unwrap();
        std::fs::write(
            dir.path().join(".liberator/config.toml"),
            "[export]\ncopyright_holder = \"Acme\"\ncopyright_year = 2024\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.export.copyright_holder, "Acme");
        assert_eq!(cfg.export.copyright_year, Some(2024));
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[export\n").unwrap();
        assert!(load_config(dir.path(), Some(&path)).is_err());
    }
}
