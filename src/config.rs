//! Configuration module for the turnchat roles.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "turnchat")]
#[command(author = "turnchat authors")]
#[command(version = "0.1.0")]
#[command(about = "A turn-taking line chat over TCP and UDP", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Receive timeout in seconds (0 = block forever)
    #[arg(long)]
    pub recv_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub role: RoleCommand,
}

/// Which of the four chat programs to run
#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    /// Connect to a TCP chat server and speak first
    TcpClient {
        /// Server address to connect to (e.g., 192.168.1.5:5000)
        #[arg(short = 'C', long)]
        connect: Option<String>,
    },
    /// Serve a single TCP chat session
    TcpServer {
        /// Address to bind to (e.g., 0.0.0.0:5000)
        #[arg(short = 'l', long)]
        listen: Option<String>,
    },
    /// Send datagrams to a UDP chat server and speak first
    UdpClient {
        /// Server address to send to (e.g., 192.168.1.5:6000)
        #[arg(short = 'C', long)]
        connect: Option<String>,
    },
    /// Serve a UDP chat session
    UdpServer {
        /// Address to bind to (e.g., 0.0.0.0:6000)
        #[arg(short = 'l', long)]
        listen: Option<String>,
    },
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub tcp: TcpConfig,
    #[serde(default)]
    pub udp: UdpConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// TCP addresses
#[derive(Debug, Deserialize)]
pub struct TcpConfig {
    /// Server address the client connects to
    #[serde(default = "default_tcp_connect")]
    pub connect: String,
    /// Address the server binds to
    #[serde(default = "default_tcp_listen")]
    pub listen: String,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            connect: default_tcp_connect(),
            listen: default_tcp_listen(),
        }
    }
}

/// UDP addresses
#[derive(Debug, Deserialize)]
pub struct UdpConfig {
    /// Server address the client sends to
    #[serde(default = "default_udp_connect")]
    pub connect: String,
    /// Address the server binds to
    #[serde(default = "default_udp_listen")]
    pub listen: String,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            connect: default_udp_connect(),
            listen: default_udp_listen(),
        }
    }
}

/// Session-related configuration
#[derive(Debug, Deserialize, Default)]
pub struct SessionConfig {
    /// Receive timeout in seconds (0 = block forever)
    #[serde(default)]
    pub recv_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_tcp_connect() -> String {
    "192.168.1.5:5000".to_string()
}

fn default_tcp_listen() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_udp_connect() -> String {
    "192.168.1.5:6000".to_string()
}

fn default_udp_listen() -> String {
    "0.0.0.0:6000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The four roles after CLI resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    TcpClient,
    TcpServer,
    UdpClient,
    UdpServer,
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub role: Role,
    /// Connect address for clients, bind address for servers.
    pub addr: SocketAddr,
    /// Applied as the socket read timeout; `None` blocks forever.
    pub recv_timeout: Option<Duration>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Self::resolve(cli, toml_config)
    }

    /// Merge CLI args with TOML config (CLI takes precedence).
    fn resolve(cli: CliArgs, toml_config: TomlConfig) -> Result<Self, ConfigError> {
        let (role, addr) = match cli.role {
            RoleCommand::TcpClient { connect } => {
                (Role::TcpClient, connect.unwrap_or(toml_config.tcp.connect))
            }
            RoleCommand::TcpServer { listen } => {
                (Role::TcpServer, listen.unwrap_or(toml_config.tcp.listen))
            }
            RoleCommand::UdpClient { connect } => {
                (Role::UdpClient, connect.unwrap_or(toml_config.udp.connect))
            }
            RoleCommand::UdpServer { listen } => {
                (Role::UdpServer, listen.unwrap_or(toml_config.udp.listen))
            }
        };

        let addr = addr
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(addr, e))?;

        let recv_timeout_secs = cli
            .recv_timeout
            .unwrap_or(toml_config.session.recv_timeout);
        let recv_timeout = match recv_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Config {
            role,
            addr,
            recv_timeout,
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    InvalidAddress(String, AddrParseError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidAddress(addr, e) => {
                write!(f, "Invalid socket address '{addr}': {e}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
