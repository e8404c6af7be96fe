//! Ecosystem manifests rebuilt from the normalized dependency buckets.

use serde_json::{Map, Value};

use crate::manifest::go::module_name;

/// Split `name@range` at the last `@` past the first character so scoped
/// packages keep their leading `@`. No version means `"*"`.
fn split_npm_id(id: &str) -> (&str, &str) {
    match id.rfind('@') {
        Some(idx) if idx > 0 => (&id[..idx], &id[idx + 1..]),
        _ => (id, "*"),
    }
}

fn package_json_template(project_name: &str) -> Map<String, Value> {
    let mut scripts = Map::new();
    scripts.insert("start".into(), Value::from("node index.js"));

    let mut root = Map::new();
    root.insert("name".into(), Value::from(project_name));
    root.insert("version".into(), Value::from("1.0.0"));
    root.insert(
        "description".into(),
        Value::from("Exported from a hosted platform"),
    );
    root.insert("main".into(), Value::from("index.js"));
    root.insert("scripts".into(), Value::Object(scripts));
    root
}

/// `package.json` with every npm dependency promoted to `dependencies`.
///
/// The extracted manifest, when it parses as an object, is kept as the base
/// so scripts and metadata survive.
pub fn package_json(original: Option<&str>, npm: &[String], project_name: &str) -> String {
    let mut root = original
        .and_then(|text| serde_json::from_str::<Value>(text).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_else(|| package_json_template(project_name));

    let mut dependencies = Map::new();
    for id in npm {
        let (name, range) = split_npm_id(id);
        if !dependencies.contains_key(name) {
            dependencies.insert(name.to_string(), Value::from(range));
        }
    }
    root.insert("dependencies".into(), Value::Object(dependencies));
    root.remove("devDependencies");

    let mut text = serde_json::to_string_pretty(&Value::Object(root)).unwrap_or_default();
    text.push('\n');
    text
}

pub fn requirements_txt(pip: &[String]) -> String {
    let mut text = pip.join("\n");
    text.push('\n');
    text
}

pub fn go_mod(original: Option<&str>, modules: &[String], project_name: &str) -> String {
    let module = original
        .and_then(module_name)
        .unwrap_or_else(|| project_name.to_string());

    let mut text = format!("module {}\n\ngo 1.21\n\n", module);
    for module in modules {
        text.push_str(&format!("require {} v0.0.0\n", module));
    }
    text
}

/// Crate names are lowercase ASCII with `-`/`_` and must start with a letter.
pub fn crate_name(project_name: &str) -> String {
    let mut name: String = project_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    name = name.trim_matches('-').to_string();
    if name.is_empty() {
        return "liberated-app".to_string();
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert_str(0, "app-");
    }
    name
}

fn toml_key(key: &str) -> String {
    if !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        key.to_string()
    } else {
        Value::from(key).to_string()
    }
}

pub fn cargo_toml(crates: &[String], project_name: &str) -> String {
    let mut text = format!(
        "[package]\nname = \"{}\"\nversion = \"1.0.0\"\nedition = \"2021\"\n\n[dependencies]\n",
        crate_name(project_name)
    );
    for name in crates {
        text.push_str(&format!("{} = \"*\"\n", toml_key(name)));
    }
    text
}
