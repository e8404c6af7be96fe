//! Manifest-based dependency discovery.
//!
//! Each reader parses one well-known manifest file and returns the
//! dependencies it declares. These are authoritative, unlike the
//! import-statement heuristics in [`crate::analyzer::dependency`].

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::models::{Dependency, ExtractionResult};
use crate::reader::read_lossy;

pub mod go;
pub mod node;
pub mod python;
pub mod rust;

pub trait ManifestReader {
    /// File name relative to the project root.
    fn file_name(&self) -> &'static str;

    fn parse(&self, content: &str) -> Result<Vec<Dependency>>;
}

/// Run every reader whose manifest exists under `root`, recording the
/// declared dependencies into `result`.
///
/// A manifest that cannot be read is an error; one that cannot be parsed is a
/// warning. Neither stops the remaining readers.
pub fn collect(root: &Path, readers: &[&dyn ManifestReader], result: &mut ExtractionResult) {
    for reader in readers {
        let path = root.join(reader.file_name());
        if !path.is_file() {
            continue;
        }

        let content = match read_lossy(&path) {
            Ok(content) => content,
            Err(e) => {
                result.add_error(format!("Failed to read {}: {}", reader.file_name(), e));
                continue;
            }
        };

        match reader.parse(&content) {
            Ok(deps) => {
                debug!(manifest = reader.file_name(), count = deps.len(), "parsed manifest");
                for dep in deps {
                    result.add_dependency(dep);
                }
            }
            Err(e) => {
                result.add_warning(format!("Could not parse {}: {}", reader.file_name(), e));
            }
        }
    }
}
