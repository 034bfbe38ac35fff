use duet_core::IceServerConfig;
use duet_core::utils::default_stun_urls;
use std::time::Duration;

pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:3000/ws";
pub const DEFAULT_OFFER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a local offer may stay unanswered before it is rolled back
    /// and issued again.
    pub offer_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            offer_timeout: DEFAULT_OFFER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub display_identity: String,
    /// Used until the relay's `Welcome` says otherwise.
    pub ice_servers: Vec<IceServerConfig>,
    pub engine: EngineConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            display_identity: String::new(),
            ice_servers: vec![IceServerConfig {
                urls: default_stun_urls(),
                username: None,
                credential: None,
            }],
            engine: EngineConfig::default(),
        }
    }
}
