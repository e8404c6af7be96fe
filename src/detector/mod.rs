//! Platform detectors.
//!
//! Each detector recognizes one hosting platform's project layout and knows
//! how to extract it. [`select_detector`] consults them in
//! [`Platform::PRIORITY`] order; the generic fallback always matches, so some
//! detector is always chosen.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::analyzer::dependency::DependencyAnalyzer;
use crate::models::{ConfigEntry, ExtractionResult, Platform};
use crate::reader::{read_lossy, walk_files_excluding, WalkEntry};

pub mod base44;
pub mod generic;
pub mod replit;

pub use base44::Base44Detector;
pub use generic::GenericDetector;
pub use replit::ReplitDetector;

pub trait Detector {
    fn platform(&self) -> Platform;

    /// Cheap marker check. Must not write anything and must treat any I/O
    /// failure as "not recognized".
    fn detect(&self, root: &Path) -> bool;

    /// Walk the whole tree once and collect files, config, and dependencies.
    ///
    /// Per-file failures land in the result's `errors`/`warnings`; this never
    /// fails as a whole.
    fn extract(&self, root: &Path) -> ExtractionResult {
        self.extract_excluding(root, &[])
    }

    /// [`extract`](Self::extract), leaving out the `skip` subtrees (relative
    /// to `root`), e.g. an export directory placed inside the source.
    fn extract_excluding(&self, root: &Path, skip: &[PathBuf]) -> ExtractionResult;
}

pub fn detector_for(platform: Platform) -> Box<dyn Detector> {
    match platform {
        Platform::Base44 => Box::new(Base44Detector),
        Platform::Replit => Box::new(ReplitDetector),
        Platform::Generic => Box::new(GenericDetector),
    }
}

/// Detectors in consultation order, generic last.
pub fn detectors() -> Vec<Box<dyn Detector>> {
    Platform::PRIORITY.iter().map(|p| detector_for(*p)).collect()
}

/// First detector that recognizes `root`.
pub fn select_detector(root: &Path) -> Box<dyn Detector> {
    for detector in detectors() {
        if detector.detect(root) {
            info!(platform = %detector.platform(), "detected platform");
            return detector;
        }
        debug!(platform = %detector.platform(), "not recognized");
    }
    Box::new(GenericDetector)
}

/// Copy every readable file into `result`, except those the platform owns.
pub(crate) fn collect_files(
    root: &Path,
    skip: &[PathBuf],
    result: &mut ExtractionResult,
    is_platform_file: impl Fn(&str) -> bool,
) {
    for entry in walk_files_excluding(root, skip) {
        match entry {
            WalkEntry::File { path, key } => {
                if is_platform_file(&key) {
                    debug!(file = %key, "platform configuration, not copied");
                    continue;
                }
                match read_lossy(&path) {
                    Ok(content) => {
                        result.add_file(key, content);
                    }
                    Err(e) => result.add_error(format!("Failed to read {}: {}", key, e)),
                }
            }
            WalkEntry::Symlink { key } => {
                result.add_warning(format!("Skipped symlink {}", key));
            }
            WalkEntry::Failed(reason) => result.add_error(reason),
        }
    }
}

/// Keep the root `.env`, if present, for redacted re-emission.
pub(crate) fn capture_env(root: &Path, result: &mut ExtractionResult) {
    let env = root.join(".env");
    if !env.is_file() {
        return;
    }
    match read_lossy(&env) {
        Ok(content) => result.add_config(ConfigEntry::Env(content)),
        Err(e) => result.add_error(format!("Failed to read .env: {}", e)),
    }
}

/// Add import-derived dependencies the manifests did not declare.
pub(crate) fn sweep_imports(result: &mut ExtractionResult) {
    let added = DependencyAnalyzer::new().supplement(result);
    debug!(added, "import sweep");
}
