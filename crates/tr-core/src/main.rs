//! testreport - HTML reports from test runner event streams
//!
//! The main entry point, handling:
//! - Rendering a report from a JSON-lines runner stream
//! - Validating configuration
//! - Printing JSON Schemas for the runner wire format

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tr_common::{Outcome, OutputFormat};
use tr_core::adapter;
use tr_core::config::{load_config, ConfigOptions, ReportOverrides, ResolvedConfig};
use tr_core::error::CliError;
use tr_core::exit_codes::ExitCode;
use tr_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use tr_core::schema::{
    available_schemas, format_schema, generate_all_schemas, generate_schema, SchemaFormat,
};
use tr_report::{ReportSession, SessionSummary};

/// testreport - Render test runner events into a single HTML report
#[derive(Parser)]
#[command(name = "testreport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config file (TOML); defaults to ./testreport.toml when present
    #[arg(long, global = true, env = "TESTREPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an HTML report from a JSON-lines runner stream
    Render(RenderArgs),

    /// Validate configuration without reading any events
    Check,

    /// Print JSON Schema for the runner wire format
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Runner stream to read; `-` or omitted reads stdin
    input: Option<PathBuf>,

    #[command(flatten)]
    report: ReportArgs,
}

/// Report options; each one overrides the config file.
#[derive(Args, Debug, Default)]
struct ReportArgs {
    /// Output path of the HTML report
    #[arg(long = "html", value_name = "PATH")]
    htmlpath: Option<PathBuf>,

    /// Inline all assets instead of writing an assets/ directory
    #[arg(long)]
    self_contained_html: bool,

    /// Additional stylesheet (repeatable)
    #[arg(long, value_name = "PATH")]
    css: Vec<PathBuf>,

    /// Outcomes whose rows start collapsed (comma list or `all`)
    #[arg(long, value_name = "OUTCOMES")]
    render_collapsed: Option<String>,

    /// Maximum file name length for linked assets
    #[arg(long, value_name = "N")]
    max_asset_filename_length: Option<usize>,

    /// Regex for environment keys whose values are masked (repeatable)
    #[arg(long = "redact", value_name = "REGEX")]
    redact: Vec<String>,

    /// Rewrite the report after every finished test
    #[arg(long)]
    generate_report_on_test: bool,

    /// Initial sort column: result, testId, duration or original
    #[arg(long, value_name = "COLUMN")]
    initial_sort: Option<String>,

    /// Report title
    #[arg(long)]
    title: Option<String>,
}

impl ReportArgs {
    fn overrides(&self) -> ReportOverrides {
        ReportOverrides {
            htmlpath: self.htmlpath.clone(),
            self_contained_html: self.self_contained_html.then_some(true),
            css: self.css.clone(),
            render_collapsed: self.render_collapsed.clone(),
            max_asset_filename_length: self.max_asset_filename_length,
            environment_table_redact_list: self.redact.clone(),
            generate_report_on_test: self.generate_report_on_test.then_some(true),
            initial_sort: self.initial_sort.clone(),
            title: self.title.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name; omit to list available types
    type_name: Option<String>,

    /// Print every schema
    #[arg(long, conflicts_with = "type_name")]
    all: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let run_id = generate_run_id();
    let result = match cli.command {
        None => {
            let _ = Cli::command().print_help();
            eprintln!();
            Ok(ExitCode::ArgsError)
        }
        Some(Commands::Render(args)) => run_render(&cli.global, &run_id, &args),
        Some(Commands::Check) => run_check(&cli.global, &run_id),
        Some(Commands::Schema(args)) => run_schema(&args),
        Some(Commands::Version) => print_version(&cli.global),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(error) => output_error(&cli.global, &run_id, &error),
    };
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn resolve(global: &GlobalOpts, report: &ReportArgs) -> Result<ResolvedConfig, CliError> {
    let options = ConfigOptions {
        config_path: global.config.clone(),
        search_dir: None,
        overrides: report.overrides(),
    };
    Ok(load_config(options)?)
}

fn open_input(input: Option<&Path>) -> Result<Box<dyn BufRead>, CliError> {
    match input {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Input {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

fn run_render(global: &GlobalOpts, run_id: &str, args: &RenderArgs) -> Result<ExitCode, CliError> {
    let resolved = resolve(global, &args.report)?;
    let config_source = resolved.source.path().map(Path::to_path_buf);
    let mut session = ReportSession::new(resolved.report)?;
    let reader = open_input(args.input.as_deref())?;

    tracing::info!(
        run_id,
        report = %session.report_path().display(),
        "Rendering report"
    );
    let summary = adapter::drive(&mut session, reader)?;

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "run_id": run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "command": "render",
                "status": "ok",
                "config_source": config_source,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Summary => println!("{}", summary_line(&summary)),
    }
    Ok(ExitCode::Clean)
}

/// One-line terminal summary, e.g. `2 passed, 1 failed in 00:00:03 -> report.html`.
fn summary_line(summary: &SessionSummary) -> String {
    let counts: Vec<String> = Outcome::ALL
        .iter()
        .filter_map(|outcome| {
            let count = summary.outcomes.get(outcome).copied().unwrap_or(0);
            (count > 0).then(|| format!("{count} {}", outcome.key()))
        })
        .collect();
    let counts = if counts.is_empty() {
        "no tests ran".to_string()
    } else {
        counts.join(", ")
    };
    format!(
        "{counts} in {} -> {}",
        tr_report::table::format_duration(summary.total_duration),
        summary.report.display()
    )
}

fn run_check(global: &GlobalOpts, run_id: &str) -> Result<ExitCode, CliError> {
    let resolved = resolve(global, &ReportArgs::default())?;
    let source = resolved.source.path().map(|p| p.display().to_string());

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "run_id": run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "command": "check",
                "status": "ok",
                "config_source": source,
                "config": resolved.report,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Summary => println!(
            "config ok ({})",
            source.as_deref().unwrap_or("built-in defaults")
        ),
    }
    Ok(ExitCode::Clean)
}

fn run_schema(args: &SchemaArgs) -> Result<ExitCode, CliError> {
    let format = if args.compact {
        SchemaFormat::JsonCompact
    } else {
        SchemaFormat::Json
    };

    if args.all {
        let all = serde_json::to_value(generate_all_schemas())?;
        println!("{}", format_schema(&all, format)?);
        return Ok(ExitCode::Clean);
    }

    match &args.type_name {
        None => {
            for (name, description) in available_schemas() {
                println!("{name:<16} {description}");
            }
        }
        Some(name) => {
            let schema =
                generate_schema(name).ok_or_else(|| CliError::UnknownSchema(name.clone()))?;
            println!("{}", format_schema(&schema, format)?);
        }
    }
    Ok(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) -> Result<ExitCode, CliError> {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "testreport_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", serde_json::to_string_pretty(&version_info)?);
        }
        OutputFormat::Summary => println!("testreport {}", env!("CARGO_PKG_VERSION")),
    }
    Ok(ExitCode::Clean)
}

/// Report an error on stderr in the requested format.
fn output_error(global: &GlobalOpts, run_id: &str, error: &CliError) -> ExitCode {
    let exit_code = error.exit_code();
    tracing::debug!(code = %exit_code, error = ?error, "Command failed");

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "run_id": run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "error",
                "error": {
                    "code": exit_code.code_name(),
                    "exit_code": exit_code.as_i32(),
                    "message": error.to_string(),
                }
            });
            match serde_json::to_string_pretty(&response) {
                Ok(text) => eprintln!("{text}"),
                Err(_) => eprintln!("error: {error}"),
            }
        }
        OutputFormat::Summary => eprintln!("[{run_id}] {}: {error}", exit_code.code_name()),
    }
    exit_code
}
