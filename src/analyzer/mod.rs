//! Source-level analysis.
//!
//! - [`dependency`] — heuristic import scanners that recover external
//!   packages from code, with per-ecosystem standard-library filters.
//! - [`code`] — structural summaries (imports, functions, classes, types)
//!   for reporting.
//! - [`project`] — runs both over a whole directory tree.

pub mod code;
pub mod dependency;
pub mod project;
