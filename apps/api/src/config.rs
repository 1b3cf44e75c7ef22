// Runtime configuration
// Values come from the environment (optionally seeded from a .env file)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

/// Errors raised while reading process configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {name} '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Team-related settings that may change while the process is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamSettings {
    /// Maximum number of active members per team; `None` means unlimited
    pub max_users_per_team: Option<i64>,
}

impl TeamSettings {
    /// Returns the effective seat limit
    ///
    /// Zero and negative values are treated as "no limit".
    pub fn seat_limit(&self) -> Option<u32> {
        self.max_users_per_team
            .filter(|limit| *limit > 0)
            .map(|limit| u32::try_from(limit).unwrap_or(u32::MAX))
    }
}

/// Read-only access to the current team settings
pub trait ConfigSource: Send + Sync {
    fn team_settings(&self) -> TeamSettings;
}

/// Hot-reloadable settings holder
///
/// Readers always observe the most recently published value.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    sender: Arc<watch::Sender<TeamSettings>>,
}

impl SharedConfig {
    pub fn new(settings: TeamSettings) -> Self {
        let (sender, _receiver) = watch::channel(settings);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publishes new settings to every reader
    pub fn update<F>(&self, modify: F)
    where
        F: FnOnce(&mut TeamSettings),
    {
        self.sender.send_modify(modify);
        tracing::info!(settings = ?*self.sender.borrow(), "Team settings reloaded");
    }

    /// Subscribes to settings changes
    pub fn subscribe(&self) -> watch::Receiver<TeamSettings> {
        self.sender.subscribe()
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(TeamSettings::default())
    }
}

impl ConfigSource for SharedConfig {
    fn team_settings(&self) -> TeamSettings {
        *self.sender.borrow()
    }
}

/// Process configuration for the API binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string; in-memory stores are used when absent
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub team: TeamSettings,
}

impl AppConfig {
    /// Reads configuration from environment variables
    ///
    /// # Variables
    /// * `DATABASE_URL` - optional PostgreSQL URL
    /// * `BIND_ADDR` - listen address, defaults to `0.0.0.0:3000`
    /// * `MAX_USERS_PER_TEAM` - optional seat limit
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("BIND_ADDR").ok(),
            std::env::var("MAX_USERS_PER_TEAM").ok(),
        )
    }

    fn from_vars(
        database_url: Option<String>,
        bind_addr: Option<String>,
        max_users_per_team: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind_addr = match bind_addr {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", &value, e))?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let max_users_per_team = match max_users_per_team {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| ConfigError::invalid("MAX_USERS_PER_TEAM", &value, e))?,
            ),
            None => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            team: TeamSettings { max_users_per_team },
        })
    }
}
