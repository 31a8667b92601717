mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lu_core::{LuError, ParseOptions, UriProbe};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Which part of the model `parse` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModelKind {
    Luis,
    Qna,
    All,
}

/// LU/QnA authoring compiler.
#[derive(Parser)]
#[command(name = "lu", version, about = "LU/QnA authoring compiler")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that parses a file.
#[derive(Args, Debug, Clone)]
pub(crate) struct SourceArgs {
    /// Path to the .lu or .qna source file
    file: PathBuf,
    /// Locale for prebuilt entity checks (overrides @app.culture)
    #[arg(long)]
    culture: Option<String>,
    /// Log warnings and skip locale-unavailable prebuilt entities instead of failing
    #[arg(long)]
    verbose: bool,
    /// TOML file with parse options
    #[arg(long)]
    config: Option<PathBuf>,
    /// Do not probe imported links over the network
    #[arg(long)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a source file and print the consolidated model as JSON
    Parse {
        #[command(flatten)]
        source: SourceArgs,
        /// Which model to print
        #[arg(long, default_value = "all", value_enum)]
        kind: ModelKind,
    },

    /// Parse a source file and report success or the first error
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { source, kind } => {
            let options = load_options(&source, cli.output, cli.quiet);
            commands::parse::cmd_parse(&source, &options, kind, cli.output, cli.quiet);
        }
        Commands::Check { source } => {
            let options = load_options(&source, cli.output, cli.quiet);
            commands::check::cmd_check(&source, &options, cli.output, cli.quiet);
        }
    }
}

/// Merge the config file (if any) with command-line flags and install the
/// log subscriber. Exits on a bad config file.
fn load_options(source: &SourceArgs, output: OutputFormat, quiet: bool) -> ParseOptions {
    let mut options = match &source.config {
        Some(path) => match config::read_options(path) {
            Ok(options) => options,
            Err(msg) => {
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        },
        None => ParseOptions::default(),
    };
    if let Some(culture) = &source.culture {
        options = options.culture(culture.clone());
    }
    if source.verbose {
        options = options.verbose(true);
    }
    init_logging(options.verbose);
    options
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

pub(crate) fn probe_for(source: &SourceArgs) -> Box<dyn UriProbe> {
    #[cfg(feature = "http")]
    if !source.offline {
        return Box::new(lu_core::HttpProbe::new());
    }
    let _ = source;
    Box::new(lu_core::OfflineProbe)
}

/// Print a parse error: rendered with source context, or as JSON.
pub(crate) fn report_lu_error(e: &LuError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("{}: [{}] {}", e.file, e.code, e.render());
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
