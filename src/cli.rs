//! Command-line interface for strictly_agents.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strictly_agents::{GameKind, MoveStrategy, PartialConfig};

/// Strictly Agents - peers that subscribe to each other over UDP and play
#[derive(Parser, Debug)]
#[command(name = "strictly_agents")]
#[command(about = "Peer agents exchanging game moves over UDP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one agent: handshake with the peer, then play
    Play(PlayArgs),
}

/// Settings for one agent session. Flags override the config file.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Path to a TOML config file
    #[arg(short, long, env = "AGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Agent name (agent1 initiates by default)
    #[arg(long, env = "AGENT_NAME")]
    pub name: Option<String>,

    /// Local UDP port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Peer hostname (defaults to the other agent's name)
    #[arg(long, env = "PEER_HOST")]
    pub peer_host: Option<String>,

    /// Peer UDP port
    #[arg(long, env = "PEER_PORT")]
    pub peer_port: Option<u16>,

    /// Make the first move (true/false)
    #[arg(long, env = "INITIATOR")]
    pub initiator: Option<bool>,

    /// Game to play once subscribed
    #[arg(long, env = "GAME", value_enum)]
    pub game: Option<GameKind>,

    /// Square selection for tic-tac-toe
    #[arg(long, env = "MOVE_STRATEGY", value_enum)]
    pub strategy: Option<MoveStrategy>,

    /// Target value for the counter game
    #[arg(long, env = "COUNTER_LIMIT")]
    pub counter_limit: Option<u64>,

    /// Pause after each local move, in milliseconds
    #[arg(long, env = "TURN_DELAY_MS")]
    pub turn_delay_ms: Option<u64>,

    /// Give up after this many seconds without a peer move (0 waits forever)
    #[arg(long, env = "IDLE_TIMEOUT_SECS")]
    pub idle_timeout_secs: Option<u64>,
}

impl PlayArgs {
    /// Settings given on the command line or through the environment.
    pub fn to_partial(&self) -> PartialConfig {
        PartialConfig {
            name: self.name.clone(),
            port: self.port,
            peer_host: self.peer_host.clone(),
            peer_port: self.peer_port,
            initiator: self.initiator,
            game: self.game,
            strategy: self.strategy,
            counter_limit: self.counter_limit,
            turn_delay_ms: self.turn_delay_ms,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}
