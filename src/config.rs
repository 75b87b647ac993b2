use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::mastery::config::{ConfigError, MasteryConfig};
use crate::services::retention::RetentionConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: Option<String>,
    pub mastery: MasteryConfig,
    pub retention: RetentionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|value| !value.is_empty());

        Ok(Self {
            host,
            port,
            log_level,
            jwt_secret,
            mastery: MasteryConfig::from_env()?,
            retention: RetentionConfig::from_env(),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            log_level: "info".to_string(),
            jwt_secret: None,
            mastery: MasteryConfig::default(),
            retention: RetentionConfig::default(),
        }
    }
}
