use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cantstop_client::cli::TuiApp;
use cantstop_client::config::{ClientConfig, DEFAULT_BASE_URL};
use cantstop_client::logging::init_logging;
use cantstop_client::HttpGameService;

#[derive(Debug, Parser, Clone)]
#[command(name = "cantstop")]
#[command(about = "Play Can't Stop against a remote game service")]
struct Args {
    /// Base URL of the game service API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Connect timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    connect_timeout: u64,

    /// Request timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 10000)]
    timeout: u64,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "cantstop_client=trace"
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number every board cell
    #[arg(long)]
    show_cell_numbers: bool,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        ClientConfig {
            base_url: args.base_url,
            connect_timeout: Duration::from_millis(args.connect_timeout),
            timeout: Duration::from_millis(args.timeout),
            log_file: args.log_file,
            log_filter: args.log_level,
            show_cell_numbers: args.show_cell_numbers,
        }
    }
}

fn main() {
    let config = ClientConfig::from(Args::parse());

    if let Err(err) = config.validate() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_logging(&config) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let service = match HttpGameService::new(&config) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("Error: cannot build HTTP client: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!(base_url = service.base_url(), "using game service");

    let mut app = TuiApp::new(Arc::new(service), config.show_cell_numbers);
    if let Err(err) = app.run() {
        eprintln!("Error: terminal failure: {err}");
        std::process::exit(1);
    }
}
