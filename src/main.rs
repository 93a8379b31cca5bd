//! ptree - run tree-shaped command scripts.
//!
//! Usage:
//!   ptree run [SCRIPT]     Execute a YAML script (stdin when omitted)
//!   ptree check [SCRIPT]   Verify every command resolves without running
//!   ptree show [SCRIPT]    Print the script on one line
//!   ptree commands         List available commands

use clap::{Parser, Subcommand};
use pipetree::{
    ConfigError, DiscardSink, HandlerRegistry, Pipeline, ScriptFile, ScriptLoader, render_script,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// ptree - run tree-shaped command scripts
#[derive(Parser)]
#[command(name = "ptree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log executor trace lines (also enabled by BEAMDEBUG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script
    Run {
        /// Path to the YAML script, or `-` for stdin
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
    },

    /// Verify that every command in a script exists
    Check {
        /// Path to the YAML script, or `-` for stdin
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
    },

    /// Print a script in compact one-line form
    Show {
        /// Path to the YAML script, or `-` for stdin
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
    },

    /// List available commands
    Commands,
}

impl Commands {
    /// The script argument, for subcommands that take one.
    fn script(&self) -> Option<Option<&Path>> {
        match self {
            Commands::Run { script } | Commands::Check { script } | Commands::Show { script } => {
                Some(script.as_deref())
            }
            Commands::Commands => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = cli.command.script().map(load);
    let script_debug = matches!(&loaded, Some(Ok(file)) if file.settings.debug);
    let env_debug = std::env::var_os("BEAMDEBUG").is_some_and(|v| !v.is_empty());
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(rust_log.as_deref(), cli.debug || env_debug || script_debug);

    // Logs go to stderr; stdout belongs to the `print` command.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let file = match loaded {
        Some(Ok(file)) => Some(file),
        Some(Err(e)) => {
            error!("Failed to load script: {}", e);
            return Err(e.into());
        }
        None => None,
    };

    match (cli.command, file) {
        (Commands::Run { .. }, Some(file)) => run_script(file).await,
        (Commands::Check { .. }, Some(file)) => check_script(file),
        (Commands::Show { .. }, Some(file)) => show_script(file),
        (Commands::Commands, _) => {
            list_commands();
            Ok(())
        }
        (Commands::Run { .. } | Commands::Check { .. } | Commands::Show { .. }, None) => {
            Err("subcommand requires a script".into())
        }
    }
}

/// `RUST_LOG` directives (`info` when unset), raised to debug on request.
fn log_filter(rust_log: Option<&str>, debug: bool) -> EnvFilter {
    let filter = rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    if debug {
        filter.add_directive(tracing::Level::DEBUG.into())
    } else {
        filter
    }
}

fn load(path: Option<&Path>) -> Result<ScriptFile, ConfigError> {
    match path {
        Some(path) if path != Path::new("-") => ScriptLoader::load_file(path),
        _ => ScriptLoader::load_reader(std::io::stdin().lock()),
    }
}

/// Execute a script against the discard sink.
async fn run_script(file: ScriptFile) -> Result<(), Box<dyn std::error::Error>> {
    let script = file.to_script()?;

    let pipeline = Pipeline::new(HandlerRegistry::with_builtins())
        .with_channel_capacity(file.settings.channel_capacity);
    let devnull = DiscardSink::spawn(pipeline.channel_capacity());

    let result = pipeline.execute_script(devnull.endpoint(), &script).await;
    let discarded = devnull.shutdown().await;
    debug!(discarded, "discard sink closed");

    if let Err(e) = result {
        error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}

/// Verify command names without running anything.
fn check_script(file: ScriptFile) -> Result<(), Box<dyn std::error::Error>> {
    let script = file.to_script()?;
    let pipeline = Pipeline::new(HandlerRegistry::with_builtins());

    match pipeline.check(&script) {
        Ok(()) => {
            info!("Script is valid: {} top-level command(s)", script.len());
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e.into())
        }
    }
}

fn show_script(file: ScriptFile) -> Result<(), Box<dyn std::error::Error>> {
    let script = file.to_script()?;
    println!("{}", render_script(&script));
    Ok(())
}

fn list_commands() {
    let registry = HandlerRegistry::with_builtins();
    for name in registry.names() {
        let description = registry
            .lookup(name)
            .and_then(|h| h.description().map(str::to_string))
            .unwrap_or_default();
        println!("{:<10} {}", name, description);
    }
}
