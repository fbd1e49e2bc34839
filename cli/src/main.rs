use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use infrasync_kernel::{PlanDocument, PlanReport, RiskCatalog, RuleEngine, Summary};

mod logging;
mod render;

use render::markdown::MarkdownRenderer;
use render::terminal::TerminalRenderer;

/// InfraSync: readable summaries and risk analysis for Terraform plans
#[derive(Parser, Debug)]
#[command(name = "infrasync", version)]
#[command(
    about = "Summarize a Terraform plan and flag risky changes",
    after_help = "Generate the input with: terraform show -json tfplan > tfplan.json"
)]
struct Cli {
    /// Path to the JSON plan
    plan: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Cli)]
    format: OutputFormat,

    /// Show attribute details for creates, destroys and replaces
    #[arg(short, long)]
    verbose: bool,

    /// Include unchanged resources
    #[arg(long)]
    show_unchanged: bool,

    /// One-line summary (cli) or lists without diffs (markdown)
    #[arg(long)]
    compact: bool,

    /// Skip security and risk analysis
    #[arg(long)]
    no_warnings: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to a risk catalog JSON overriding the built-in resource lists
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Cli,
    Markdown,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logging();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let summary = load_plan(&cli.plan)?;

    let report = if cli.no_warnings {
        PlanReport::without_analysis(summary)
    } else {
        let catalog = load_catalog(cli.catalog.as_deref())?;
        PlanReport::build(summary, &RuleEngine::with_builtin_rules(catalog))
    };

    // Files never get escape codes.
    if cli.output.is_some() {
        colored::control::set_override(false);
    }

    let rendered = match cli.format {
        OutputFormat::Cli => TerminalRenderer {
            show_unchanged: cli.show_unchanged,
            verbose: cli.verbose,
            compact: cli.compact,
        }
        .render(&report),
        OutputFormat::Markdown => MarkdownRenderer {
            detailed: !cli.compact,
            show_unchanged: cli.show_unchanged,
        }
        .render(&report),
        OutputFormat::Json => render::json(&report).context("error encoding JSON report")?,
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("error writing output file {}", path.display()))?;
            eprintln!("{}", format!("✓ Output written to {}", path.display()).green());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .context("error writing to stdout")?;
        }
    }

    let outcome = report.outcome();
    log::info!("outcome {:?}, exit code {}", outcome, outcome.code());
    Ok(outcome.code())
}

fn load_plan(path: &Path) -> Result<Summary> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("error reading plan file {}", path.display()))?;
    let plan = PlanDocument::from_json_str(&data)
        .with_context(|| format!("error parsing plan file {}", path.display()))?;
    Ok(plan.into_summary())
}

fn load_catalog(path: Option<&Path>) -> Result<RiskCatalog> {
    let Some(path) = path else {
        return Ok(RiskCatalog::default());
    };

    let data = fs::read_to_string(path)
        .with_context(|| format!("error reading risk catalog {}", path.display()))?;
    let catalog = serde_json::from_str(&data)
        .with_context(|| format!("invalid risk catalog {}", path.display()))?;
    log::debug!("loaded risk catalog from {}", path.display());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "infrasync",
            "-f",
            "markdown",
            "--compact",
            "-o",
            "plan.md",
            "tfplan.json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Markdown);
        assert!(cli.compact);
        assert_eq!(cli.output, Some(PathBuf::from("plan.md")));
        assert_eq!(cli.plan, PathBuf::from("tfplan.json"));
        assert!(!cli.no_warnings);
    }

    #[test]
    fn plan_argument_is_required() {
        assert!(Cli::try_parse_from(["infrasync"]).is_err());
    }

    #[test]
    fn default_catalog_when_no_path() {
        assert_eq!(load_catalog(None).unwrap(), RiskCatalog::default());
    }
}
