//! Configuration module for the posture monitor.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON posture history file
    pub data_path: PathBuf,
    /// Directory with the web front-end, served for non-API paths
    pub static_dir: Option<PathBuf>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_path = env::var("POSTURE_DATA_PATH")
            .unwrap_or_else(|_| "./good_posture_ratio.json".to_string())
            .into();

        let static_dir = env::var("POSTURE_STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let bind_addr = env::var("POSTURE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .expect("Invalid POSTURE_BIND_ADDR format");

        let log_level = env::var("POSTURE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("POSTURE_LOG_FORMAT")
            .map(|s| LogFormat::parse(&s))
            .unwrap_or(LogFormat::Text);

        Self {
            data_path,
            static_dir,
            bind_addr,
            log_level,
            log_format,
        }
    }
}
