use crate::constants::{
    DEFAULT_DOWNLOAD_BUFFER_SIZE, DEFAULT_IO_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_UPLOAD_BUFFER_SIZE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which command is used to ask the server for a data port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum PassiveMode {
    /// `EPSV`, reply 229. The data connection goes to the control peer's address.
    Extended,
    /// `PASV`, reply 227. The data connection goes to the advertised address.
    Classic,
}

impl Default for PassiveMode {
    fn default() -> Self {
        PassiveMode::Extended
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub io_timeout_secs: u64,
    pub download_buffer_size: usize,
    pub upload_buffer_size: usize,
    pub passive_mode: PassiveMode,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: DEFAULT_PORT,
            username: String::from("anonymous"),
            password: String::new(),
            io_timeout_secs: DEFAULT_IO_TIMEOUT_SECS,
            download_buffer_size: DEFAULT_DOWNLOAD_BUFFER_SIZE, // 128 KB
            upload_buffer_size: DEFAULT_UPLOAD_BUFFER_SIZE,     // 256 KB
            passive_mode: PassiveMode::Extended,
        }
    }
}

impl ClientConfig {
    /// `host:port` string suitable for dialing.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;

        // A zero-sized buffer would make every read return immediately
        if config.client.download_buffer_size == 0 || config.client.upload_buffer_size == 0 {
            anyhow::bail!("transfer buffer sizes must be greater than zero");
        }

        Ok(config)
    }
}
