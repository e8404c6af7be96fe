//! Detect → extract → export orchestration.
//!
//! [`validate_source`] is the single fatal precondition. Everything after it
//! produces a best-effort result; progress is reported through a callback so
//! a front end can run [`liberate`] on a worker and forward the events.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::detector::{detector_for, select_detector};
use crate::error::{LiberatorError, Result};
use crate::exporter::PortableExporter;
use crate::models::{ExportSummary, ExtractionResult, Platform};

/// Progress notifications emitted by [`liberate`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Detected(Platform),
    Extracted {
        files: usize,
        dependencies: usize,
        errors: usize,
    },
    Exporting(PathBuf),
    Exported {
        files: usize,
        generated: usize,
    },
}

/// Source must exist and be a directory.
pub fn validate_source(source: &Path) -> Result<()> {
    if !source.exists() {
        return Err(LiberatorError::SourceNotFound(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(LiberatorError::NotADirectory(source.to_path_buf()));
    }
    Ok(())
}

/// `output` relative to `source` when it lies strictly inside it.
///
/// Both paths are canonicalized, so an output directory that does not exist
/// yet (nothing to skip) yields `None`.
pub fn nested_output(source: &Path, output: &Path) -> Option<PathBuf> {
    let source = source.canonicalize().ok()?;
    let output = output.canonicalize().ok()?;
    let rel = output.strip_prefix(&source).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_path_buf())
}

/// Extract `source` with the forced `platform`, or the auto-selected detector.
/// Subtrees in `skip` (relative to `source`) are not walked.
pub fn extract(
    source: &Path,
    platform: Option<Platform>,
    skip: &[PathBuf],
    on_event: &mut dyn FnMut(PipelineEvent),
) -> Result<ExtractionResult> {
    validate_source(source)?;

    let detector = match platform {
        Some(platform) => {
            info!(%platform, "platform forced");
            detector_for(platform)
        }
        None => select_detector(source),
    };
    on_event(PipelineEvent::Detected(detector.platform()));

    let result = detector.extract_excluding(source, skip);
    info!(
        files = result.files.len(),
        dependencies = result.dependencies.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "extraction finished"
    );
    on_event(PipelineEvent::Extracted {
        files: result.files.len(),
        dependencies: result.dependencies.len(),
        errors: result.errors.len(),
    });
    Ok(result)
}

/// Full pipeline. Returns the (import-supplemented) extraction alongside the
/// export summary.
pub fn liberate(
    source: &Path,
    output: &Path,
    platform: Option<Platform>,
    config: ExportConfig,
    on_event: &mut dyn FnMut(PipelineEvent),
) -> Result<(ExtractionResult, ExportSummary)> {
    let skip: Vec<PathBuf> = nested_output(source, output).into_iter().collect();
    if let Some(rel) = skip.first() {
        warn!(output = %rel.display(), "output directory is inside the source; skipping it");
    }
    let mut result = extract(source, platform, &skip, on_event)?;

    on_event(PipelineEvent::Exporting(output.to_path_buf()));
    let summary = PortableExporter::new(output, config).export(&mut result)?;
    on_event(PipelineEvent::Exported {
        files: summary.files_exported,
        generated: summary.generated.len(),
    });

    Ok((result, summary))
}
