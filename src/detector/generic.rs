use std::path::{Path, PathBuf};

use super::{capture_env, collect_files, sweep_imports, Detector};
use crate::manifest::{
    self, go::GoMod, node::PackageJson, python::Pipfile, python::Pyproject,
    python::Requirements, rust::CargoToml,
};
use crate::models::{ExtractionResult, Platform};

/// Fallback for trees no platform detector claims. Always matches.
pub struct GenericDetector;

impl Detector for GenericDetector {
    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn detect(&self, _root: &Path) -> bool {
        true
    }

    fn extract_excluding(&self, root: &Path, skip: &[PathBuf]) -> ExtractionResult {
        let mut result = ExtractionResult::new(Platform::Generic, root);

        collect_files(root, skip, &mut result, |_| false);
        manifest::collect(
            root,
            &[
                &PackageJson,
                &Requirements,
                &Pipfile,
                &Pyproject,
                &GoMod,
                &CargoToml,
            ],
            &mut result,
        );
        capture_env(root, &mut result);
        sweep_imports(&mut result);

        result
    }
}
