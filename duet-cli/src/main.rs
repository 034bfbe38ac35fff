use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use duet_server::{DEFAULT_BIND_ADDRESS, RelayConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet-relay")]
#[command(about = "Signaling relay for two-party calls")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "DUET_BIND", default_value = DEFAULT_BIND_ADDRESS)]
    bind: SocketAddr,

    /// Tell the remaining member when the other one leaves
    #[arg(
        long,
        env = "DUET_NOTIFY_PEER_LEFT",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    notify_peer_left: bool,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", hide_env_values = true)]
    turn_credential: Option<String>,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, default_value = "duet=info,tower_http=info")]
    log: String,
}

impl Args {
    fn into_config(self) -> Result<RelayConfig> {
        let config = RelayConfig {
            bind_address: self.bind,
            notify_peer_left: self.notify_peer_left,
            ..RelayConfig::default()
        }
        .with_turn(self.turn_url, self.turn_username, self.turn_credential)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.into_config().context("Invalid relay configuration")?;

    println!("{}", "Starting duet relay...".green().bold());
    for server in &config.ice_servers {
        println!("   ICE: {}", server.urls.join(", ").cyan());
    }

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!(
        "Peer-left notifications {}",
        if config.notify_peer_left { "on" } else { "off" }
    );

    duet_server::serve(listener, &config).await
}
