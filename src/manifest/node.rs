use anyhow::{bail, Result};
use serde_json::Value;

use crate::models::{Dependency, Ecosystem};

/// `package.json` — `dependencies` and `devDependencies` as `name@range`.
pub struct PackageJson;

impl super::ManifestReader for PackageJson {
    fn file_name(&self) -> &'static str {
        "package.json"
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>> {
        let json: Value = serde_json::from_str(content)?;
        if !json.is_object() {
            bail!("expected a JSON object at the top level");
        }

        let mut deps = Vec::new();
        for section in &["dependencies", "devDependencies"] {
            if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
                for (name, range) in pkgs {
                    let range = range.as_str().unwrap_or("*");
                    deps.push(Dependency::new(format!("{}@{}", name, range), Ecosystem::Npm));
                }
            }
        }

        Ok(deps)
    }
}
