//! Strictly Agents - CLI
//!
//! Runs one side of a two-agent UDP game session.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, PlayArgs};
use strictly_agents::{
    AgentConfig, CounterRules, ExchangeError, ExchangeLoop, GameKind, HandshakeTiming, Outcome,
    PartialConfig, RulesEngine, SubscriptionProtocol, TicTacToeRules, UdpEndpoint,
};
use tracing::{info, info_span, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Play(args) => run_play(args),
    }
}

/// Run one agent session.
#[instrument(skip_all)]
fn run_play(args: PlayArgs) -> Result<()> {
    let config = load_config(&args)?;

    let span = info_span!("agent", name = %config.name());
    let _guard = span.enter();

    let endpoint = UdpEndpoint::bind(*config.port())
        .with_context(|| format!("Failed to bind UDP port {}", config.port()))?;
    let protocol = SubscriptionProtocol::new(
        endpoint,
        config.name(),
        config.peer().clone(),
        HandshakeTiming::default(),
    );

    let outcome = match config.game() {
        GameKind::TicTacToe => {
            info!("Playing as {}", config.mark());
            play(protocol, TicTacToeRules::new(config.mark(), *config.strategy()), &config)
        }
        GameKind::Counter => play(protocol, CounterRules::new(*config.counter_limit()), &config),
    }?;

    info!(%outcome, "Session finished");
    Ok(())
}

fn play<R: RulesEngine>(
    protocol: SubscriptionProtocol<UdpEndpoint>,
    rules: R,
    config: &AgentConfig,
) -> Result<Outcome, ExchangeError> {
    ExchangeLoop::new(protocol, rules, *config.initiator())
        .with_turn_delay(*config.turn_delay())
        .with_idle_timeout(*config.idle_timeout())
        .run()
}

#[instrument(skip(args))]
fn load_config(args: &PlayArgs) -> Result<AgentConfig> {
    info!("Loading agent configuration");

    let file = match &args.config {
        Some(path) => PartialConfig::from_file(path)?,
        None => PartialConfig::default(),
    };

    Ok(AgentConfig::try_from(file.merge(args.to_partial()))?)
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
