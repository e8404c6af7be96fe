use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::analyzer::code::{FileAnalysis, ParseMode};
use crate::analyzer::project::ProjectAnalysis;
use crate::models::{Ecosystem, ExportSummary, ExtractionResult, NormalizedDependencies};

fn header(title: &str, subject: &str) {
    println!("\n {} v{}", "liberator".bold(), env!("CARGO_PKG_VERSION"));
    println!(" {}: {}\n", title, subject);
}

fn bold_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(labels: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(bold_header(labels));
    table
}

/// Extraction summary plus the error and warning channels.
pub fn render_extraction(result: &ExtractionResult, verbose: bool, quiet: bool) {
    if quiet {
        println!(
            "Platform: {}  Files: {}  Dependencies: {}  Errors: {}  Warnings: {}",
            result.metadata.platform.to_string().cyan(),
            result.files.len(),
            result.dependencies.len(),
            result.errors.len().to_string().red(),
            result.warnings.len().to_string().yellow(),
        );
        return;
    }

    header("Source", &result.metadata.source_path.display().to_string());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "EXTRACTION".bold());
    println!(" │  {:<48} │", format!("Platform      : {}", result.metadata.platform));
    println!(" │  {:<48} │", format!("Files         : {}", result.files.len()));
    println!(" │  {:<48} │", format!("Dependencies  : {}", result.dependencies.len()));
    println!(" │  {:<48} │", format!("Config entries: {}", result.config.len()));
    println!(" └────────────────────────────────────────────────────┘\n");

    if !result.errors.is_empty() {
        println!(" {} Problems during extraction:\n", "[ERROR]".red().bold());
        for error in &result.errors {
            println!("   {} {}", "✗".red(), error);
        }
        println!();
    }

    if !result.warnings.is_empty() {
        println!(" {} Warnings:\n", "[WARN]".yellow().bold());
        for warning in &result.warnings {
            println!("   {} {}", "⚠".yellow(), warning);
        }
        println!();
    }

    if verbose && !result.dependencies.is_empty() {
        let mut table = new_table(&["Dependency", "Ecosystem"]);
        for dep in &result.dependencies {
            table.add_row(vec![Cell::new(&dep.id), Cell::new(dep.ecosystem.to_string())]);
        }
        println!("{}\n", table);
    }
}

fn dependency_table(dependencies: &NormalizedDependencies, limit: Option<usize>) -> Table {
    let mut table = new_table(&["Ecosystem", "Count", "Dependencies"]);
    for (ecosystem, ids) in dependencies.iter() {
        let shown: Vec<&str> = ids
            .iter()
            .take(limit.unwrap_or(ids.len()))
            .map(String::as_str)
            .collect();
        let mut listing = shown.join(", ");
        if shown.is_empty() {
            listing.push('…');
        } else if shown.len() < ids.len() {
            listing.push_str(&format!(", … (+{})", ids.len() - shown.len()));
        }
        table.add_row(vec![
            Cell::new(ecosystem.label()).fg(ecosystem_color(ecosystem)),
            Cell::new(ids.len()).set_alignment(CellAlignment::Right),
            Cell::new(listing),
        ]);
    }
    table
}

fn ecosystem_color(ecosystem: Ecosystem) -> Color {
    match ecosystem {
        Ecosystem::Npm => Color::Yellow,
        Ecosystem::Pip => Color::Blue,
        Ecosystem::Go => Color::Cyan,
        Ecosystem::Cargo => Color::Red,
        Ecosystem::Other => Color::DarkGrey,
    }
}

pub fn render_export(summary: &ExportSummary, quiet: bool) {
    if quiet {
        println!(
            "Exported {} files ({} generated) to {}  Status: {}",
            summary.files_exported,
            summary.generated.len(),
            summary.output_path.display(),
            summary.status.to_string().green(),
        );
        return;
    }

    println!(
        " {} Exported {} files to {}",
        "✓".green(),
        summary.files_exported,
        summary.output_path.display()
    );
    println!(" {} Generated: {}\n", "→".cyan(), summary.generated.join(", "));

    if summary.dependencies.total() > 0 {
        println!("{}\n", dependency_table(&summary.dependencies, None));
    }
}

fn parse_mode_label(mode: ParseMode) -> &'static str {
    match mode {
        ParseMode::Syntax => "syntax",
        ParseMode::Heuristic => "heuristic",
        ParseMode::None => "-",
    }
}

/// One row per analyzed source file.
pub fn render_file_analyses(analyses: &[FileAnalysis]) {
    let mut table = new_table(&["File", "Language", "Parse", "Imports", "Functions", "Classes/Types"]);
    for analysis in analyses.iter().filter(|a| a.parse_mode != ParseMode::None) {
        table.add_row(vec![
            Cell::new(&analysis.file_path),
            Cell::new(analysis.language.to_string()),
            Cell::new(parse_mode_label(analysis.parse_mode)),
            Cell::new(analysis.imports.len()).set_alignment(CellAlignment::Right),
            Cell::new(analysis.functions.len()).set_alignment(CellAlignment::Right),
            Cell::new(analysis.classes.len() + analysis.types.len())
                .set_alignment(CellAlignment::Right),
        ]);
    }
    println!(" {} Code analysis:\n", "[INFO]".cyan().bold());
    println!("{}\n", table);
}

/// Summary for the `analyze` command. `verbose` lists up to ten identifiers
/// per ecosystem.
pub fn render_project(root: &str, analysis: &ProjectAnalysis, verbose: bool) {
    header("Analyzing", root);

    let languages: Vec<String> = analysis.languages.iter().map(|l| l.to_string()).collect();
    println!(" Files analyzed : {}", analysis.files.len());
    println!(
        " Languages      : {}",
        if languages.is_empty() {
            "none detected".dimmed().to_string()
        } else {
            languages.join(", ")
        }
    );
    println!(" Dependencies   : {}\n", analysis.dependencies.total());

    if analysis.dependencies.total() > 0 {
        let limit = if verbose { Some(10) } else { Some(0) };
        println!("{}\n", dependency_table(&analysis.dependencies, limit));
    }

    if !analysis.skipped.is_empty() {
        println!(" {} Skipped:\n", "[WARN]".yellow().bold());
        for reason in &analysis.skipped {
            println!("   {} {}", "⚠".yellow(), reason);
        }
        println!();
    }
}
