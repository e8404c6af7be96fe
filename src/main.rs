use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use liberator::analyzer::code::{CodeAnalyzer, FileAnalysis};
use liberator::analyzer::project::analyze_project;
use liberator::cli::{AnalyzeArgs, Cli, Command, ExportArgs, ExtractArgs, ReportFormat};
use liberator::config::{load_config, ExportConfig};
use liberator::models::{ExportSummary, ExtractionResult, Platform};
use liberator::pipeline::{liberate, validate_source, PipelineEvent};
use liberator::report::{self, json::ExtractReport};

fn init_logging(verbose: bool) {
    let default = if verbose { "liberator=debug" } else { "liberator=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract(args) => extract(args, cli.verbose, cli.quiet).await,
        Command::Analyze(args) => analyze(args, cli.verbose).await,
        Command::Export(args) => export(args, cli.quiet).await,
    }
}

fn describe(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::Detected(platform) => format!("Detected {} project, extracting…", platform),
        PipelineEvent::Extracted {
            files,
            dependencies,
            errors,
        } => format!(
            "Extracted {} files, {} dependencies ({} errors)",
            files, dependencies, errors
        ),
        PipelineEvent::Exporting(path) => format!("Exporting to {}…", path.display()),
        PipelineEvent::Exported { files, generated } => {
            format!("Exported {} files, generated {}", files, generated)
        }
    }
}

struct PipelineOutput {
    result: ExtractionResult,
    summary: ExportSummary,
    analysis: Option<Vec<FileAnalysis>>,
}

/// Run the pipeline on a blocking worker, showing its events on a spinner.
async fn run_pipeline(
    source: PathBuf,
    output: PathBuf,
    platform: Option<Platform>,
    config: ExportConfig,
    analyze: bool,
    show_progress: bool,
) -> Result<PipelineOutput> {
    let (tx, mut rx) = mpsc::unbounded_channel::<PipelineEvent>();

    let worker = tokio::task::spawn_blocking(move || {
        let (result, summary) = liberate(&source, &output, platform, config, &mut |event: PipelineEvent| {
            let _ = tx.send(event);
        })?;
        let analysis = analyze.then(|| {
            let mut analyzer = CodeAnalyzer::new();
            result
                .files
                .iter()
                .map(|(path, content)| analyzer.analyze_file(path, content))
                .collect::<Vec<_>>()
        });
        Ok::<_, liberator::error::LiberatorError>(PipelineOutput {
            result,
            summary,
            analysis,
        })
    });

    let pb = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    while let Some(event) = rx.recv().await {
        if let Some(pb) = &pb {
            pb.set_message(describe(&event));
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(worker.await??)
}

async fn extract(args: ExtractArgs, verbose: bool, quiet: bool) -> Result<()> {
    let config = load_config(&std::env::current_dir()?, args.config.as_deref())?;
    let json = matches!(args.report, ReportFormat::Json);

    let out = run_pipeline(
        args.source,
        args.output,
        args.platform.into(),
        config.export,
        args.analyze,
        !quiet && !json,
    )
    .await?;

    match args.report {
        ReportFormat::Terminal => {
            report::terminal::render_extraction(&out.result, verbose, quiet);
            report::terminal::render_export(&out.summary, quiet);
            if let Some(analysis) = &out.analysis {
                report::terminal::render_file_analyses(analysis);
            }
        }
        ReportFormat::Json => {
            let doc = ExtractReport {
                extraction: &out.result,
                export: &out.summary,
                analysis: out.analysis.as_deref(),
            };
            println!("{}", report::json::render(&doc)?);
        }
    }

    Ok(())
}

async fn export(args: ExportArgs, quiet: bool) -> Result<()> {
    let config = load_config(&std::env::current_dir()?, args.config.as_deref())?;
    let out = run_pipeline(args.source, args.output, None, config.export, false, !quiet).await?;

    report::terminal::render_extraction(&out.result, false, true);
    report::terminal::render_export(&out.summary, quiet);
    Ok(())
}

async fn analyze(args: AnalyzeArgs, verbose: bool) -> Result<()> {
    validate_source(&args.source)?;

    let root = args.source.clone();
    let analysis = tokio::task::spawn_blocking(move || analyze_project(&root)).await?;

    report::terminal::render_project(&args.source.display().to_string(), &analysis, verbose);

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&analysis)?)?;
        println!(" {} Analysis saved to {}", "✓".green(), path.display());
    }
    Ok(())
}
