//! Agent configuration.
//!
//! Settings come from an optional TOML file overlaid with command-line flags
//! and environment variables, then validated into an [`AgentConfig`].

use crate::rules_engine::MoveStrategy;
use crate::transport::PeerAddress;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_tictactoe::Player;
use tracing::{debug, info, instrument};

/// Name of the agent that initiates play in the default two-agent deployment.
pub const FIRST_AGENT: &str = "agent1";
/// Name of its counterpart.
pub const SECOND_AGENT: &str = "agent2";

#[instrument]
fn default_counter_limit() -> u64 {
    10
}

#[instrument]
fn default_turn_delay() -> Duration {
    Duration::from_secs(2)
}

/// Application exchanged once peers are subscribed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum, Display,
)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Tic-tac-toe moves as JSON `{"row", "col"}`.
    #[default]
    #[value(name = "tictactoe")]
    #[display("tictactoe")]
    TicTacToe,
    /// Incrementing decimal counter.
    #[value(name = "counter")]
    #[display("counter")]
    Counter,
}

/// Unvalidated settings from one source. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    /// Agent name.
    pub name: Option<String>,
    /// Local UDP port.
    pub port: Option<u16>,
    /// Peer hostname.
    pub peer_host: Option<String>,
    /// Peer UDP port.
    pub peer_port: Option<u16>,
    /// Whether this agent makes the first move.
    pub initiator: Option<bool>,
    /// Game to play.
    pub game: Option<GameKind>,
    /// Square selection for tic-tac-toe.
    pub strategy: Option<MoveStrategy>,
    /// Target value for the counter game.
    pub counter_limit: Option<u64>,
    /// Pause after each local move, in milliseconds.
    pub turn_delay_ms: Option<u64>,
    /// Give up after this many seconds without a peer move.
    pub idle_timeout_secs: Option<u64>,
}

impl PartialConfig {
    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(ConfigErrorKind::Read(e.to_string())))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;

        info!("Config file loaded");
        Ok(config)
    }

    /// Overlays `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: PartialConfig) -> PartialConfig {
        PartialConfig {
            name: overrides.name.or(self.name),
            port: overrides.port.or(self.port),
            peer_host: overrides.peer_host.or(self.peer_host),
            peer_port: overrides.peer_port.or(self.peer_port),
            initiator: overrides.initiator.or(self.initiator),
            game: overrides.game.or(self.game),
            strategy: overrides.strategy.or(self.strategy),
            counter_limit: overrides.counter_limit.or(self.counter_limit),
            turn_delay_ms: overrides.turn_delay_ms.or(self.turn_delay_ms),
            idle_timeout_secs: overrides.idle_timeout_secs.or(self.idle_timeout_secs),
        }
    }
}

/// Validated, immutable session identity and tuning.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AgentConfig {
    /// Agent name.
    name: String,
    /// Local UDP port.
    port: u16,
    /// Designated peer.
    peer: PeerAddress,
    /// Whether this agent makes the first move.
    initiator: bool,
    /// Game to play.
    game: GameKind,
    /// Square selection for tic-tac-toe.
    strategy: MoveStrategy,
    /// Target value for the counter game.
    counter_limit: u64,
    /// Pause after each local move.
    turn_delay: Duration,
    /// Give up after this long without a peer move.
    idle_timeout: Option<Duration>,
}

impl AgentConfig {
    /// Tic-tac-toe mark: the initiator plays X.
    pub fn mark(&self) -> Player {
        if self.initiator { Player::X } else { Player::O }
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::new(ConfigErrorKind::Missing(field)))
}

fn nonzero_port(port: u16, field: &'static str) -> Result<u16, ConfigError> {
    if port == 0 {
        return Err(ConfigError::new(ConfigErrorKind::Invalid {
            field,
            reason: "port must be non-zero".to_string(),
        }));
    }
    Ok(port)
}

impl TryFrom<PartialConfig> for AgentConfig {
    type Error = ConfigError;

    #[instrument(skip(partial))]
    fn try_from(partial: PartialConfig) -> Result<Self, Self::Error> {
        let name = require(partial.name, "name")?.trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::Invalid {
                field: "name",
                reason: "must not be empty".to_string(),
            }));
        }

        let port = nonzero_port(require(partial.port, "port")?, "port")?;
        let peer_port = nonzero_port(require(partial.peer_port, "peer_port")?, "peer_port")?;

        // Each agent names the other by default.
        let peer_host = partial.peer_host.unwrap_or_else(|| {
            let other = if name == FIRST_AGENT { SECOND_AGENT } else { FIRST_AGENT };
            other.to_string()
        });
        if peer_host.trim().is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::Invalid {
                field: "peer_host",
                reason: "must not be empty".to_string(),
            }));
        }

        let initiator = partial.initiator.unwrap_or(name == FIRST_AGENT);

        let config = Self {
            peer: PeerAddress::new(peer_host, peer_port),
            port,
            initiator,
            game: partial.game.unwrap_or_default(),
            strategy: partial.strategy.unwrap_or_default(),
            counter_limit: partial.counter_limit.unwrap_or_else(default_counter_limit),
            turn_delay: partial
                .turn_delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(default_turn_delay),
            idle_timeout: partial
                .idle_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            name,
        };
        debug!(?config, "Configuration validated");
        Ok(config)
    }
}

/// What went wrong while building a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ConfigErrorKind {
    /// A required setting was not supplied.
    #[display("missing required setting `{_0}`")]
    Missing(&'static str),
    /// A setting was supplied with an unusable value.
    #[display("invalid `{field}`: {reason}")]
    Invalid {
        /// Setting name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// The config file could not be read.
    #[display("failed to read config file: {_0}")]
    Read(String),
    /// The config file is not valid TOML for this schema.
    #[display("failed to parse config: {_0}")]
    Parse(String),
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", kind, file, line)]
pub struct ConfigError {
    /// What went wrong.
    pub kind: ConfigErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
