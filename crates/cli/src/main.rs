//! Glide Go plugin - serves the Go detector to a Glide host, and exposes
//! detection and the command catalogue for local use.

mod commands;
mod discovery;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use console::Term;
use glide_go_core::CommandCategory;
use miette::{Result, miette};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glide-plugin-go")]
#[command(
    author,
    version,
    about = "Go framework detector and command provider for Glide"
)]
#[command(propagate_version = true, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,

    /// Log filter, e.g. `debug` or `glide_go_engine=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    /// Serve a single TCP connection on this address instead of stdio
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,

    /// JSON file applied as the initial configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the plugin RPC (default)
    Serve(ServeArgs),

    /// Detect a Go project
    Detect {
        /// Directory to inspect (defaults to the enclosing module root)
        path: Option<PathBuf>,

        /// Print the raw context response as JSON
        #[arg(long)]
        json: bool,

        /// Ignore go.work
        #[arg(long)]
        no_workspace: bool,

        /// Ignore development tooling markers
        #[arg(long)]
        no_tools: bool,
    },

    /// List the command catalogue
    Commands {
        /// Only show one category
        #[arg(long)]
        category: Option<CommandCategory>,
    },

    /// Run a catalogue command
    Exec {
        /// Command name, e.g. `test:race`
        name: String,

        /// Working directory (defaults to the enclosing module root)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Environment overlay
        #[arg(long = "env", value_name = "KEY=VALUE", value_parser = commands::exec::parse_env)]
        env: Vec<(String, String)>,

        /// Extra arguments appended to the command
        #[arg(last = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_deref()) {
        eprintln!("{:?}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr subscriber. `--log-level` wins over `RUST_LOG`,
/// which wins over `info`.
fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| miette!("Invalid log level '{}': {}", level, e))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(Term::stderr().is_term())
        .try_init()
        .map_err(|e| miette!("Failed to initialise logging: {}", e))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => commands::serve::execute(cli.serve.listen, cli.serve.config.as_deref()).await,

        Some(Command::Serve(args)) => {
            commands::serve::execute(args.listen, args.config.as_deref()).await
        }

        Some(Command::Detect {
            path,
            json,
            no_workspace,
            no_tools,
        }) => commands::detect::execute(path, json, !no_workspace, !no_tools).await,

        Some(Command::Commands { category }) => commands::list::execute(category),

        Some(Command::Exec {
            name,
            dir,
            env,
            args,
        }) => commands::exec::execute(name, dir, env, args).await,
    }
}
