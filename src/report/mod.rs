//! Report renderers for pipeline results.
//!
//! - [`terminal`] — colored, tabular output; respects `--verbose` / `--quiet`.
//! - [`json`] — one machine-readable document on stdout.

pub mod json;
pub mod terminal;
