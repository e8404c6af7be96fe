use anyhow::Result;

use crate::models::{Dependency, Ecosystem};

/// `Cargo.toml` — crate names from `[dependencies]` and `[dev-dependencies]`.
pub struct CargoToml;

impl super::ManifestReader for CargoToml {
    fn file_name(&self) -> &'static str {
        "Cargo.toml"
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>> {
        let manifest: toml::Table = toml::from_str(content)?;
        let mut deps = Vec::new();

        for section in &["dependencies", "dev-dependencies"] {
            if let Some(crates) = manifest.get(*section).and_then(|v| v.as_table()) {
                for name in crates.keys() {
                    deps.push(Dependency::new(name.as_str(), Ecosystem::Cargo));
                }
            }
        }

        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestReader;

    #[test]
    fn test_parse_cargo_toml() {
        let content = r#"
[package]
name = "my-app"
version = "0.1.0"

[dependencies]
serde = { version = "1", features = ["derive"] }
tokio = "1"

[dev-dependencies]
tempfile = "3"
"#;
        let deps = CargoToml.parse(content).unwrap();
        let ids: Vec<&str> = deps.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["serde", "tokio", "tempfile"]);
        assert!(deps.iter().all(|d| d.ecosystem == Ecosystem::Cargo));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(CargoToml.parse("[dependencies\nserde = ").is_err());
    }
}
