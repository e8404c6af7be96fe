//! `liberator` — detect which hosting platform produced a project, extract it,
//! and re-emit it as a portable, self-contained source tree.
//!
//! # Flow
//! 1. Check the source path ([`pipeline::validate_source`]), the only fatal precondition.
//! 2. Pick a detector ([`detector::select_detector`]) or use the forced one.
//! 3. Extract files, platform config, and manifest dependencies
//!    ([`detector::Detector::extract`]), supplemented by an import sweep
//!    ([`analyzer::dependency`]).
//! 4. Export ([`exporter::PortableExporter`]): copy files, normalize dependencies
//!    by ecosystem, and synthesize manifests, container files, and docs.
//!
//! Per-file failures never abort a run; they accumulate in
//! [`models::ExtractionResult::errors`] / [`models::ExtractionResult::warnings`].

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod exporter;
pub mod language;
pub mod manifest;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod report;
