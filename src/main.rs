//! ride-relay CLI entry point.
//!
//! `start` runs the bot; `check` validates configuration and the bot token
//! without connecting to Telegram.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use teloxide::Bot;
use tracing::info;

use ride_relay::config::{load_or_default, resolve_bot_token, Config};
use ride_relay::dispatch::{Destinations, ReliableDispatcher, RetryPolicy};
use ride_relay::flow::{FlowRules, StepMachine};
use ride_relay::relay::Relay;
use ride_relay::session::SessionStore;
use ride_relay::telegram::{run_telegram, TelegramChannel};

/// ride-relay: collects ride requests and posts them to group chats.
#[derive(Parser)]
#[command(name = "ride-relay", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the bot until interrupted.
    Start,
    /// Validate configuration and bot token, then exit.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start => handle_start(&cli.config).await,
        Command::Check => handle_check(&cli.config),
    }
}

/// Load config and resolve everything `start` needs, failing fast.
fn prepare(path: &Path) -> anyhow::Result<(Config, String, Destinations)> {
    let config = load_or_default(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let token = resolve_bot_token(&config.telegram)?;
    let destinations = Destinations::from_config(&config.channels)?;
    Ok((config, token, destinations))
}

/// Run the bot.
async fn handle_start(path: &Path) -> anyhow::Result<()> {
    let (config, token, destinations) = prepare(path)?;
    let _logging_guard = ride_relay::logging::init(&config.logging)?;

    let bot = Bot::new(token);
    let channel = Arc::new(TelegramChannel::new(bot.clone()));
    let dispatcher = ReliableDispatcher::new(channel, RetryPolicy::from_config(&config.dispatch));
    let machine = StepMachine::new(FlowRules::from_config(&config.flow));
    let relay = Arc::new(Relay::new(
        machine,
        Arc::new(SessionStore::new()),
        dispatcher,
        destinations,
    ));

    info!(
        passenger_channel = destinations.passenger,
        driver_channel = destinations.driver,
        max_attempts = config.dispatch.max_attempts,
        "ride-relay starting"
    );

    run_telegram(bot, relay).await?;

    info!("ride-relay stopped");
    Ok(())
}

/// Validate configuration and token presence.
fn handle_check(path: &Path) -> anyhow::Result<()> {
    ride_relay::logging::init_console()?;
    let (config, _token, destinations) = prepare(path)?;
    info!(config = %path.display(), "configuration validated");
    println!("config ok");
    println!("  token env:         {}", config.telegram.bot_token_env);
    println!("  passenger channel: {}", destinations.passenger);
    println!("  driver channel:    {}", destinations.driver);
    println!("  phone policy:      {:?}", config.flow.phone_policy);
    Ok(())
}
