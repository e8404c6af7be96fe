use anyhow::Result;
use serde::Deserialize;

use crate::models::{Dependency, Ecosystem};

/// `requirements.txt` — every requirement line verbatim, minus inline comments.
///
/// Option lines (`-r other.txt`, `-e .`, `--index-url …`) are skipped.
pub struct Requirements;

impl super::ManifestReader for Requirements {
    fn file_name(&self) -> &'static str {
        "requirements.txt"
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>> {
        let deps = content
            .lines()
            .map(|line| line.split(" #").next().unwrap_or(line).trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
            .map(|line| Dependency::new(line, Ecosystem::Pip))
            .collect();
        Ok(deps)
    }
}

/// `Pipfile` — package names from `[packages]` and `[dev-packages]`.
pub struct Pipfile;

impl super::ManifestReader for Pipfile {
    fn file_name(&self) -> &'static str {
        "Pipfile"
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>> {
        let table: toml::Table = toml::from_str(content)?;
        let mut deps = Vec::new();

        for section in &["packages", "dev-packages"] {
            if let Some(pkgs) = table.get(*section).and_then(|v| v.as_table()) {
                for name in pkgs.keys() {
                    deps.push(Dependency::new(name.as_str(), Ecosystem::Pip));
                }
            }
        }

        Ok(deps)
    }
}

#[derive(Debug, Deserialize)]
struct PyprojectFile {
    project: Option<PyprojectProject>,
    tool: Option<PyprojectTool>,
}

#[derive(Debug, Deserialize)]
struct PyprojectProject {
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PyprojectTool {
    poetry: Option<PoetrySection>,
}

#[derive(Debug, Deserialize)]
struct PoetrySection {
    #[serde(default)]
    dependencies: toml::Table,
}

/// `pyproject.toml` — PEP 621 `[project].dependencies` strings verbatim, then
/// Poetry dependency names (the `python` constraint is not a package).
pub struct Pyproject;

impl super::ManifestReader for Pyproject {
    fn file_name(&self) -> &'static str {
        "pyproject.toml"
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>> {
        let pyproject: PyprojectFile = toml::from_str(content)?;
        let mut deps = Vec::new();

        if let Some(project) = pyproject.project {
            deps.extend(
                project
                    .dependencies
                    .iter()
                    .map(|spec| Dependency::new(spec.trim(), Ecosystem::Pip)),
            );
        }

        if let Some(poetry) = pyproject.tool.and_then(|t| t.poetry) {
            deps.extend(
                poetry
                    .dependencies
                    .keys()
                    .filter(|name| !name.eq_ignore_ascii_case("python"))
                    .map(|name| Dependency::new(name.as_str(), Ecosystem::Pip)),
            );
        }

        Ok(deps)
    }
}
