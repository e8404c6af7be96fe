use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Dependency, Ecosystem};

lazy_static! {
    static ref REQUIRE_LINE: Regex = Regex::new(r"^require\s+(\S+)\s+v\S+").unwrap();
    static ref BLOCK_ENTRY: Regex = Regex::new(r"^(\S+)\s+v\S+").unwrap();
    static ref MODULE_LINE: Regex = Regex::new(r"^module\s+(\S+)").unwrap();
}

/// `go.mod` — module paths from single-line `require` directives and
/// `require ( … )` blocks.
pub struct GoMod;

impl super::ManifestReader for GoMod {
    fn file_name(&self) -> &'static str {
        "go.mod"
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>> {
        let mut deps = Vec::new();
        let mut in_block = false;

        for line in content.lines() {
            let line = line.split("//").next().unwrap_or(line).trim();

            if in_block {
                if line.starts_with(')') {
                    in_block = false;
                } else if let Some(caps) = BLOCK_ENTRY.captures(line) {
                    deps.push(Dependency::new(&caps[1], Ecosystem::Go));
                }
                continue;
            }

            if line.starts_with("require") && line.ends_with('(') {
                in_block = true;
            } else if let Some(caps) = REQUIRE_LINE.captures(line) {
                deps.push(Dependency::new(&caps[1], Ecosystem::Go));
            }
        }

        Ok(deps)
    }
}

/// Module path declared by a `go.mod`, if any.
pub fn module_name(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| MODULE_LINE.captures(line.trim()))
        .map(|caps| caps[1].to_string())
}
