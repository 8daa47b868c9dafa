//! trainsched CLI - Training Scheduler & Cost Projector
//!
//! Loads a quote snapshot, schedules every training plan on the synthetic
//! calendar and prints segments, costs and diagnostics.

mod diagnostics;
mod input;
mod output;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trainsched_core::{Diagnostic, DiagnosticEmitter, PlanId, StaggerPolicy};
use trainsched_solver::{QuotePlanner, QuoteReport, RequirementNormalizer};

use crate::diagnostics::{DiagnosticConfig, ExitCode, JsonEmitter, TerminalEmitter};
use crate::output::ReportView;

#[derive(Parser)]
#[command(name = "trainsched")]
#[command(author, version, about = "Training scheduler and cost projector", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Treat warnings as errors
    #[arg(long, global = true)]
    strict: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    diagnostic_format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a quote snapshot and report skipped rows
    Check {
        /// Quote snapshot (.toml or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Schedule every plan of a quote and show segments and costs
    Schedule {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only show this plan
        #[arg(long, value_name = "ID")]
        plan: Option<PlanId>,

        /// Start every resource on day 1
        #[arg(long, env = "TRAINSCHED_NO_STAGGER")]
        no_stagger: bool,
    },

    /// Show the cost breakdown of a quote
    Cost {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        #[arg(long, value_name = "ID")]
        plan: Option<PlanId>,

        #[arg(long, env = "TRAINSCHED_NO_STAGGER")]
        no_stagger: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = DiagnosticConfig {
        strict: cli.strict,
        quiet: cli.quiet,
        base_path: std::env::current_dir().ok(),
    };

    let code = match &cli.command {
        Commands::Check { file } => cmd_check(&cli, &config, file)?,
        Commands::Schedule {
            file,
            format,
            output: out_path,
            plan,
            no_stagger,
        } => {
            let report = run_planner(file, *no_stagger)?;
            let view = select_plans(&report, *plan)?;
            let (code, embedded) = emit_diagnostics(&cli, &config, file, &view, *format)?;
            let rendered = match format {
                Format::Text => {
                    let mut buf = Vec::new();
                    output::write_schedule_text(&mut buf, &view)?;
                    String::from_utf8(buf)?
                }
                Format::Json => output::schedule_json(&view, embedded)?,
            };
            write_output(&rendered, out_path.as_deref())?;
            code
        }
        Commands::Cost {
            file,
            format,
            plan,
            no_stagger,
        } => {
            let report = run_planner(file, *no_stagger)?;
            let view = select_plans(&report, *plan)?;
            let (code, embedded) = emit_diagnostics(&cli, &config, file, &view, *format)?;
            let rendered = match format {
                Format::Text => {
                    let mut buf = Vec::new();
                    output::write_cost_text(&mut buf, &view)?;
                    String::from_utf8(buf)?
                }
                Format::Json => output::cost_json(&view, embedded)?,
            };
            write_output(&rendered, None)?;
            code
        }
    };

    Ok(code.into())
}

fn cmd_check(cli: &Cli, config: &DiagnosticConfig, file: &Path) -> Result<ExitCode> {
    let quote = input::load_snapshot(file)?;
    quote
        .scheduler
        .validate()
        .with_context(|| format!("invalid scheduler settings in {}", file.display()))?;
    let normalizer = RequirementNormalizer::for_quote(&quote)
        .with_context(|| format!("cannot check quote {}", quote.id))?;

    let mut diagnostics = Vec::new();
    let mut summary = Vec::new();
    for plan in &quote.plans {
        let normalized = normalizer.normalize(plan);
        summary.push(format!(
            "plan {}: {} of {} rows accepted",
            plan.id,
            normalized.requirements.len(),
            plan.rows.len()
        ));
        diagnostics.extend(normalized.diagnostics);
    }

    let code = match cli.diagnostic_format {
        Format::Text => emit_text(config, file, diagnostics),
        Format::Json => {
            let emitter = emit_json(config, file, diagnostics);
            println!("{}", serde_json::to_string_pretty(&emitter.to_json_value())?);
            emitter.exit_code()
        }
    };

    if !cli.quiet && cli.diagnostic_format == Format::Text {
        println!("Quote {}: {}", quote.id, quote.name);
        for line in summary {
            println!("  {line}");
        }
    }
    Ok(code)
}

fn run_planner(file: &Path, no_stagger: bool) -> Result<QuoteReport> {
    let quote = input::load_snapshot(file)?;
    let mut scheduler = quote.scheduler.clone();
    if no_stagger {
        scheduler = scheduler.stagger(StaggerPolicy::None);
    }
    debug!(quote_id = quote.id, ?scheduler, "planning quote");

    QuotePlanner::new(scheduler)
        .plan_quote(&quote)
        .with_context(|| format!("cannot plan quote {} from {}", quote.id, file.display()))
}

fn select_plans(report: &QuoteReport, plan: Option<PlanId>) -> Result<ReportView<'_>> {
    match plan {
        None => Ok(ReportView::all(report)),
        Some(id) => match report.plan(id) {
            Some(plan) => Ok(ReportView::single(report, plan)),
            None => bail!("quote {} has no plan {}", report.quote_id, id),
        },
    }
}

/// Emit the diagnostics of the shown plans. JSON diagnostics are returned
/// for embedding when the report itself is JSON.
fn emit_diagnostics(
    cli: &Cli,
    config: &DiagnosticConfig,
    file: &Path,
    view: &ReportView<'_>,
    format: Format,
) -> Result<(ExitCode, Option<serde_json::Value>)> {
    let diagnostics: Vec<Diagnostic> = view
        .plans
        .iter()
        .flat_map(|p| p.diagnostics.iter().cloned())
        .collect();

    match cli.diagnostic_format {
        Format::Text => Ok((emit_text(config, file, diagnostics), None)),
        Format::Json => {
            let emitter = emit_json(config, file, diagnostics);
            let value = emitter.to_json_value();
            if format == Format::Json {
                Ok((emitter.exit_code(), Some(value)))
            } else {
                eprintln!("{}", serde_json::to_string_pretty(&value)?);
                Ok((emitter.exit_code(), None))
            }
        }
    }
}

fn emit_text(config: &DiagnosticConfig, file: &Path, diagnostics: Vec<Diagnostic>) -> ExitCode {
    let mut emitter = TerminalEmitter::new(io::stderr(), config.clone()).with_source(file);
    emitter.emit_all(diagnostics);
    emitter.exit_code()
}

fn emit_json(config: &DiagnosticConfig, file: &Path, diagnostics: Vec<Diagnostic>) -> JsonEmitter {
    let mut emitter = JsonEmitter::new(config.clone()).with_source(file);
    emitter.emit_all(diagnostics);
    emitter
}

fn write_output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                writeln!(stdout)?;
            }
            Ok(())
        }
    }
}
