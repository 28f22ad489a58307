use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("{name} must be greater than zero")]
    ZeroTimeout { name: &'static str },
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Logs go to this file; without it logging is discarded so the terminal
    /// UI stays intact.
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
    pub show_cell_numbers: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
            log_file: None,
            log_filter: "info".to_string(),
            show_cell_numbers: false,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                name: "connect timeout",
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout { name: "timeout" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ClientConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = ClientConfig {
            base_url: "localhost:8000".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn rejects_zero_timeouts() {
        let config = ClientConfig {
            timeout: Duration::ZERO,
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTimeout { name: "timeout" })
        ));
    }
}
