mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{ConvertOptions, RequestKind};
use output::{OutputFormat, print_error};

/// selectgen - Bazel select() generation from per-variant module properties
#[derive(Parser)]
#[command(name = "selectgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Convert exported module snapshots into BUILD files
  Convert {
    /// JSON file holding an array of module snapshots
    modules: PathBuf,

    /// JSON conversion config (directory availability, policy checks)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only print the BUILD file of this directory
    #[arg(short, long)]
    dir: Option<String>,

    /// Reject apexes whose dependencies do not list them in apex_available
    #[arg(long)]
    check_apex_available: bool,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// List configuration axes and their select keys
  Axes {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Decode a reply line of the configured-query tool
  Query {
    /// Request the line answers
    #[arg(value_enum)]
    request: RequestKind,

    /// The reply line
    line: String,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Convert {
      modules,
      config,
      dir,
      check_apex_available,
      output,
    } => cmd::cmd_convert(ConvertOptions {
      modules: &modules,
      config: config.as_deref(),
      dir: dir.as_deref(),
      check_apex_available,
      output,
    }),
    Commands::Axes { output } => cmd::cmd_axes(output),
    Commands::Query { request, line, output } => cmd::cmd_query(request, &line, output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
