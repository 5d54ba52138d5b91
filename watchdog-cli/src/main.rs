mod app;
mod commands;
mod http;
mod logging;
mod tui;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser, Subcommand};
use tracing::{info, warn};

use watchdog_core::config::DashboardConfig;
use watchdog_core::model::{LogId, LogSource};

use commands::Session;
use http::HttpTransport;

#[derive(Parser)]
#[command(name = "watchdog")]
#[command(about = "Dashboard for a Watchdog log and metrics service", long_about = None)]
#[command(version)]
struct Cli {
    /// Service address, overrides `base_url` from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file (default: $WATCHDOG_CONFIG, then watchdog.yaml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Tui,
    /// Print live logs, or stored logs with --stored
    Logs {
        #[arg(long)]
        stored: bool,
        #[arg(long, conflicts_with = "log_type")]
        id: Option<String>,
        #[arg(long = "type")]
        log_type: Option<String>,
    },
    /// Copy a live log (by id) or all live logs of a type into stored logs
    #[command(group(ArgGroup::new("target").required(true).args(["id", "log_type"])))]
    Save {
        #[arg(long)]
        id: Option<String>,
        #[arg(long = "type")]
        log_type: Option<String>,
    },
    /// Delete a stored log
    Delete { id: LogId },
    /// Sample host metrics a few times
    Metrics {
        #[arg(short = 'n', long, default_value_t = 5)]
        samples: usize,
    },
}

/// Resolve the config: --config, then discovery, then defaults. --base-url
/// wins over whatever the file says.
fn load_config(cli: &Cli) -> Result<(Option<PathBuf>, DashboardConfig), String> {
    let (path, config) = match &cli.config {
        Some(path) => {
            let config = DashboardConfig::load(path)
                .map_err(|e| format!("loading {}: {}", path.display(), e))?;
            (Some(path.clone()), config)
        }
        None => {
            let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
            match DashboardConfig::discover(&cwd).map_err(|e| e.to_string())? {
                Some((path, config)) => (Some(path), config),
                None => (None, DashboardConfig::default()),
            }
        }
    };

    let config = match &cli.base_url {
        Some(url) => config.with_base_url(url).map_err(|e| e.to_string())?,
        None => config,
    };
    Ok((path, config))
}

fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let (config_path, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => exit_with(e),
    };

    // The TUI owns the terminal, so its logs go to a file
    let is_tui = matches!(cli.command, None | Some(Commands::Tui));
    let _guard = if is_tui {
        let log_dir = config
            .log_dir
            .clone()
            .unwrap_or_else(logging::default_log_dir);
        match logging::init_file(&log_dir, cli.verbose) {
            Ok(guard) => Some(guard),
            Err(e) => exit_with(format!("creating log dir {}: {}", log_dir.display(), e)),
        }
    } else {
        logging::init_stderr(cli.verbose);
        None
    };

    match &config_path {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => warn!("no config file found, using defaults"),
    }

    let transport = match HttpTransport::new(config.transport_timeout()) {
        Ok(transport) => Arc::new(transport),
        Err(e) => exit_with(format!("building HTTP client: {}", e)),
    };

    match cli.command {
        Some(Commands::Tui) | None => tui::run(config, transport).await,
        Some(Commands::Logs {
            stored,
            id,
            log_type,
        }) => {
            let source = if stored { LogSource::Stored } else { LogSource::Live };
            let session = Session::new(config, transport);
            let result = match commands::query_from_args(id, log_type) {
                Ok(query) => commands::run_logs(&session, source, query).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                exit_with(e);
            }
            Ok(())
        }
        Some(Commands::Save { id, log_type }) => {
            let query = match commands::query_from_args(id, log_type) {
                Ok(Some(query)) => query,
                Ok(None) => exit_with("one of --id or --type is required"),
                Err(e) => exit_with(e),
            };
            let session = Session::new(config, transport);
            if !commands::run_save(&session, query).await.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Delete { id }) => {
            let session = Session::new(config, transport);
            if !commands::run_delete(&session, id).await.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Metrics { samples }) => {
            let session = Session::new(config, transport);
            if let Err(e) = commands::run_metrics(&session, samples).await {
                exit_with(e);
            }
            Ok(())
        }
    }
}
