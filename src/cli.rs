use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::Platform;

#[derive(Parser, Debug)]
#[command(
    name = "liberator",
    about = "Detect, extract, and re-emit hosted-platform projects as portable source trees",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show debug logs and full dependency listings
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print summary lines
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a project and export it as a portable tree
    Extract(ExtractArgs),
    /// Analyze a source tree without writing anything
    Analyze(AnalyzeArgs),
    /// Auto-detect, extract, and export with defaults
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Source project directory
    pub source: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Platform detector to use
    #[arg(long, default_value = "auto", value_name = "PLATFORM")]
    pub platform: PlatformArg,

    /// Also run the code analyzer over the extracted files
    #[arg(long)]
    pub analyze: bool,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Config file [default: ./.liberator/config.toml, fallback ~/.config/liberator/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Source project directory
    pub source: PathBuf,

    /// Save the full analysis as JSON
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Source project directory
    pub source: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Config file [default: ./.liberator/config.toml, fallback ~/.config/liberator/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PlatformArg {
    Auto,
    Base44,
    Replit,
    Generic,
}

impl From<PlatformArg> for Option<Platform> {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Auto => None,
            PlatformArg::Base44 => Some(Platform::Base44),
            PlatformArg::Replit => Some(Platform::Replit),
            PlatformArg::Generic => Some(Platform::Generic),
        }
    }
}
