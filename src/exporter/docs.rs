use std::collections::{BTreeMap, BTreeSet};

use crate::config::ExportConfig;
use crate::models::{Ecosystem, Metadata, NormalizedDependencies};

pub const ENV_PLACEHOLDER: &str = "# Add your environment variables here\n";

/// Replace every `KEY=value` with `KEY=your_value_here`. Comments, blank
/// lines, and anything without `=` pass through unchanged.
pub fn redact_env(content: &str) -> String {
    content
        .split('\n')
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            match line.split_once('=') {
                Some((key, _)) => format!("{}=your_value_here", key.trim()),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn env_template(env: Option<&str>) -> String {
    match env {
        Some(content) if !content.trim().is_empty() => redact_env(content),
        _ => ENV_PLACEHOLDER.to_string(),
    }
}

#[derive(Default)]
struct DirNode {
    files: BTreeSet<String>,
    dirs: BTreeMap<String, DirNode>,
}

impl DirNode {
    fn insert(&mut self, path: &str) {
        match path.split_once('/') {
            Some((dir, rest)) => self.dirs.entry(dir.to_string()).or_default().insert(rest),
            None => {
                self.files.insert(path.to_string());
            }
        }
    }

    fn render(&self, depth: usize, cap: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        for name in self.files.iter().take(cap) {
            out.push(format!("{}{}", indent, name));
        }
        if self.files.len() > cap {
            out.push(format!("{}... ({} more)", indent, self.files.len() - cap));
        }
        for (name, child) in &self.dirs {
            out.push(format!("{}{}/", indent, name));
            child.render(depth + 1, cap, out);
        }
    }
}

/// Indented tree of `paths` under `root_name/`, at most `cap` files listed
/// per directory.
pub fn structure<'a>(root_name: &str, paths: impl IntoIterator<Item = &'a str>, cap: usize) -> String {
    let mut root = DirNode::default();
    for path in paths {
        root.insert(path);
    }
    let mut lines = vec![format!("{}/", root_name)];
    root.render(1, cap, &mut lines);
    lines.join("\n")
}

fn install_section(ecosystem: Ecosystem, python_entry: &str, run_command: Option<&str>) -> String {
    let (install, run) = match ecosystem {
        Ecosystem::Npm => ("npm install", "npm start".to_string()),
        Ecosystem::Pip => (
            "pip install -r requirements.txt",
            format!("python {}", python_entry),
        ),
        Ecosystem::Go => ("go mod tidy", "go run .".to_string()),
        Ecosystem::Cargo => ("cargo build --release", "cargo run --release".to_string()),
        Ecosystem::Other => return String::new(),
    };
    let run = run_command.map(str::to_string).unwrap_or(run);
    format!(
        "### {}\n\n```bash\n{}\n{}\n```\n\n",
        ecosystem.label(),
        install,
        run
    )
}

/// Everything the README needs to know about the export.
pub struct ReadmeInput<'a> {
    pub project_name: &'a str,
    pub metadata: &'a Metadata,
    pub dependencies: &'a NormalizedDependencies,
    pub structure: &'a str,
    pub python_entry: &'a str,
    pub run_command: Option<&'a str>,
}

pub fn readme(input: &ReadmeInput<'_>) -> String {
    let mut text = format!(
        "# {}\n\nExported from a {} project into a portable, self-hosted source tree.\n\n",
        input.project_name, input.metadata.platform
    );

    text.push_str("## Project Structure\n\n```\n");
    text.push_str(input.structure);
    text.push_str("\n```\n\n## Dependencies\n\n");

    if input.dependencies.total() == 0 {
        text.push_str("No external dependencies were found.\n\n");
    }
    for (ecosystem, ids) in input.dependencies.iter() {
        text.push_str(&format!("### {}\n\n", ecosystem.label()));
        for id in ids {
            text.push_str(&format!("- {}\n", id));
        }
        text.push('\n');
    }

    text.push_str("## Getting Started\n\n### Using Docker\n\n```bash\ndocker compose up --build\n```\n\n");
    for (ecosystem, _) in input.dependencies.iter() {
        text.push_str(&install_section(ecosystem, input.python_entry, input.run_command));
    }

    text.push_str(
        "## Configuration\n\nCopy `.env.example` to `.env` and fill in your configuration values.\n\n",
    );

    text.push_str("## License\n\nReleased under the MIT License. See `LICENSE`.\n\n");

    let metadata = serde_json::to_string_pretty(input.metadata).unwrap_or_default();
    text.push_str(&format!(
        "## Original Platform Metadata\n\n```json\n{}\n```\n",
        metadata
    ));
    text
}

const GITIGNORE: &str = "\
# Dependencies
node_modules/
__pycache__/
*.pyc
*.pyo
*.pyd
.Python
env/
venv/
.venv/

# Build outputs
dist/
build/
target/
*.egg-info/

# Environment variables
.env
.env.local

# IDE
.vscode/
.idea/
*.swp
*.swo

# OS
.DS_Store
Thumbs.db

# Logs
*.log
logs/
";

/// Standard ignore rules, plus any rules from the extracted `.gitignore`
/// that the standard set lacks.
pub fn gitignore(original: Option<&str>) -> String {
    let mut text = GITIGNORE.to_string();
    let known: BTreeSet<&str> = GITIGNORE.lines().map(str::trim).collect();

    let extra: Vec<&str> = original
        .map(|content| {
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .filter(|line| !known.contains(line))
                .collect()
        })
        .unwrap_or_default();

    if !extra.is_empty() {
        text.push_str("\n# From the original project\n");
        let mut seen = BTreeSet::new();
        for line in extra {
            if seen.insert(line) {
                text.push_str(line);
                text.push('\n');
            }
        }
    }
    text
}

pub fn license(config: &ExportConfig) -> String {
    let copyright = match config.copyright_year {
        Some(year) => format!("Copyright (c) {} {}", year, config.copyright_holder),
        None => format!("Copyright (c) {}", config.copyright_holder),
    };
    format!(
        "MIT License

{}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
",
        copyright
    )
}
