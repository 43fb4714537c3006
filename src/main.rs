//! turnchat: a turn-taking line chat over raw sockets
//!
//! Four roles, one per invocation:
//! - TCP client and server
//! - UDP client and server
//!
//! Each process owns a single socket and alternates one message per turn
//! with one peer until either side sends "bye" (case-insensitive).
//! Configuration via CLI arguments or TOML file.

mod config;
mod console;
mod message;
mod session;
mod tcp;
mod udp;

use config::{Config, Role};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        role = ?config.role,
        addr = %config.addr,
        recv_timeout = ?config.recv_timeout,
        "Starting turnchat"
    );

    match config.role {
        Role::TcpClient => tcp::run_client(&config),
        Role::TcpServer => tcp::run_server(&config),
        Role::UdpClient => udp::run_client(&config),
        Role::UdpServer => udp::run_server(&config),
    }
}
