use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Socket read/write timeout; unset blocks indefinitely.
    pub read_timeout_ms: Option<u64>,
    /// Query language for new connections: AFL when true, AQL otherwise.
    #[serde(default)]
    pub afl: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1239
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: None,
            afl: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolConfig {
    /// Reject chunk payloads whose magic number is wrong instead of logging.
    #[serde(default = "default_validate_magic")]
    pub validate_magic: bool,
}

fn default_validate_magic() -> bool {
    true
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            validate_magic: default_validate_magic(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: Option<String>,
    #[serde(default = "default_stdout_level")]
    pub stdout_level: String,
    #[serde(default = "default_file_level")]
    pub file_level: String,
}

fn default_stdout_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            stdout_level: default_stdout_level(),
            file_level: default_file_level(),
        }
    }
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path =
        env::var("SCIDB_CLIENT_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path, true)
}

/// Reads an optional config file, then `SCIDB_CLIENT__SECTION__KEY` overrides.
pub fn load_settings_from(path: &str, with_env: bool) -> Result<Settings, config::ConfigError> {
    let mut builder =
        config::Config::builder().add_source(config::File::with_name(path).required(false));
    if with_env {
        builder = builder.add_source(
            config::Environment::with_prefix("SCIDB_CLIENT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
    }

    let settings: Settings = builder.build()?.try_deserialize()?;
    Ok(settings)
}
