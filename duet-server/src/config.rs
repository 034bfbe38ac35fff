use duet_core::IceServerConfig;
use duet_core::utils::default_stun_urls;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TURN url '{0}' must start with turn: or turns:")]
    InvalidTurnUrl(String),

    #[error("TURN server '{0}' needs both a username and a credential")]
    MissingTurnCredentials(String),

    #[error("TURN credentials given without a TURN url")]
    CredentialsWithoutUrl,
}

/// Relay settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_address: SocketAddr,

    /// Send `PeerLeft` to the remaining member when the other one leaves.
    pub notify_peer_left: bool,

    /// STUN/TURN servers handed to clients in `Welcome`.
    pub ice_servers: Vec<IceServerConfig>,
}

impl RelayConfig {
    /// Append a TURN server after the default STUN entry.
    pub fn with_turn(
        mut self,
        url: Option<String>,
        username: Option<String>,
        credential: Option<String>,
    ) -> Result<Self, ConfigError> {
        let Some(url) = url else {
            if username.is_some() || credential.is_some() {
                return Err(ConfigError::CredentialsWithoutUrl);
            }
            return Ok(self);
        };

        if !(url.starts_with("turn:") || url.starts_with("turns:")) {
            return Err(ConfigError::InvalidTurnUrl(url));
        }
        if username.is_none() || credential.is_none() {
            return Err(ConfigError::MissingTurnCredentials(url));
        }

        self.ice_servers.push(IceServerConfig {
            urls: vec![url],
            username,
            credential,
        });
        Ok(self)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            notify_peer_left: true,
            ice_servers: vec![IceServerConfig {
                urls: default_stun_urls(),
                username: None,
                credential: None,
            }],
        }
    }
}
