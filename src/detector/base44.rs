use std::path::{Path, PathBuf};

use tracing::debug;

use super::{capture_env, collect_files, sweep_imports, Detector};
use crate::manifest::{self, node::PackageJson};
use crate::models::{ConfigEntry, ExtractionResult, Platform};
use crate::reader::{read_lossy, read_optional};

const MARKERS: [&str; 4] = [".base44", "base44.json", "base44.config", ".base44config"];

/// Base44 projects: a marker file, or a `package.json` mentioning the platform.
pub struct Base44Detector;

impl Base44Detector {
    /// Marker files anywhere in the tree, and everything under a `.base44/`
    /// directory.
    fn is_platform_file(key: &str) -> bool {
        key.split('/').any(|segment| MARKERS.contains(&segment))
    }

    fn read_config(root: &Path, result: &mut ExtractionResult) -> serde_json::Value {
        for marker in MARKERS {
            let path = root.join(marker);
            if !path.is_file() {
                continue;
            }
            let parsed = read_lossy(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| Ok(serde_json::from_str::<serde_json::Value>(&content)?));
            match parsed {
                Ok(config) => {
                    result.add_config(ConfigEntry::Base44(config.clone()));
                    return config;
                }
                Err(e) => result.add_warning(format!("Could not parse {}: {}", marker, e)),
            }
        }
        serde_json::Value::Null
    }
}

impl Detector for Base44Detector {
    fn platform(&self) -> Platform {
        Platform::Base44
    }

    fn detect(&self, root: &Path) -> bool {
        if MARKERS.iter().any(|marker| root.join(marker).exists()) {
            return true;
        }
        read_optional(root, "package.json")
            .map(|content| content.to_lowercase().contains("base44"))
            .unwrap_or(false)
    }

    fn extract_excluding(&self, root: &Path, skip: &[PathBuf]) -> ExtractionResult {
        let mut result = ExtractionResult::new(Platform::Base44, root);

        let config = Self::read_config(root, &mut result);
        result
            .metadata
            .extra
            .insert("base44_config".to_string(), config);

        collect_files(root, skip, &mut result, Self::is_platform_file);
        manifest::collect(root, &[&PackageJson], &mut result);
        capture_env(root, &mut result);
        sweep_imports(&mut result);

        debug!(files = result.files.len(), deps = result.dependencies.len(), "base44 extraction done");
        result
    }
}
