use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{ClientConfig, ConfigError};

/// Installs the global subscriber. The terminal belongs to the UI, so events
/// are written to the configured log file or dropped. Calling it again keeps
/// the first subscriber.
pub fn init_logging(config: &ClientConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(&config.log_filter)?;

    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init(),
    };
    if let Err(err) = installed {
        debug!(%err, "keeping the existing global subscriber");
    }
    Ok(())
}
