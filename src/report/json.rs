use anyhow::Result;
use serde::Serialize;

use crate::analyzer::code::FileAnalysis;
use crate::models::{ExportSummary, ExtractionResult};

/// Everything the `extract` command produced, in one document.
#[derive(Serialize)]
pub struct ExtractReport<'a> {
    pub extraction: &'a ExtractionResult,
    pub export: &'a ExportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<&'a [FileAnalysis]>,
}

/// Pretty JSON without file contents, which can be arbitrarily large.
pub fn render(report: &ExtractReport<'_>) -> Result<String> {
    let mut value = serde_json::to_value(report)?;
    if let Some(files) = value
        .get_mut("extraction")
        .and_then(|e| e.get_mut("files"))
        .and_then(|f| f.as_object_mut())
    {
        for content in files.values_mut() {
            let bytes = content.as_str().map(str::len).unwrap_or(0);
            *content = serde_json::json!({ "bytes": bytes });
        }
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Dependency, Ecosystem, ExportStatus, NormalizedDependencies, Platform,
    };
    use std::path::{Path, PathBuf};

    #[test]
    fn test_json_report_replaces_contents_with_sizes() {
        let mut result = ExtractionResult::new(Platform::Replit, Path::new("/src"));
        result.add_file("main.py", "import requests\n".to_string());
        result.add_dependency(Dependency::new("requests", Ecosystem::Pip));
        let summary = ExportSummary {
            output_path: PathBuf::from("/out"),
            files_exported: 1,
            dependencies: NormalizedDependencies::from_dependencies(&result.dependencies),
            generated: vec!["README.md".into()],
            status: ExportStatus::Success,
        };

        let text = render(&ExtractReport {
            extraction: &result,
            export: &summary,
            analysis: None,
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["extraction"]["files"]["main.py"]["bytes"], 16);
        assert_eq!(value["extraction"]["metadata"]["platform"], "replit");
        assert_eq!(value["export"]["status"], "success");
        assert_eq!(value["export"]["dependencies"]["pip"][0], "requests");
        assert!(value.get("analysis").is_none());
    }
}
