//! Walk through the smart-session dice game and guardian management against
//! an in-memory chain, printing the activity feed.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vortex_aa::{
    onchain, AaConfig, AccountClient, ActivityLog, FileStore, GuardianManager, InMemoryChain,
    LineLevel, SessionManager,
};
use vortex_common::address::Address;

/// One ETH in wei.
const DEFAULT_BALANCE: u128 = 1_000_000_000_000_000_000;

#[derive(Parser)]
#[command(name = "aa-demo", about = "Smart account session and recovery demo")]
struct Cli {
    /// Smart account address.
    #[arg(long, default_value = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")]
    owner: Address,

    /// Starting balance of the smart account in wei.
    #[arg(long, default_value_t = DEFAULT_BALANCE)]
    balance: u128,

    /// Comma-separated dice values to roll (1-6).
    #[arg(long, value_delimiter = ',', default_value = "3,5")]
    rolls: Vec<u8>,

    /// Comma-separated guardian addresses to add.
    #[arg(long, value_delimiter = ',')]
    guardians: Vec<String>,

    /// Guardian to remove after the additions.
    #[arg(long)]
    remove: Option<String>,

    /// Session store file (default: <cache dir>/vortex/aa-session.json).
    #[arg(long)]
    store: Option<PathBuf>,
}

fn print_feed(log: &ActivityLog) {
    for line in log.lines() {
        match line.level {
            LineLevel::Info => println!("  {}", line.text),
            LineLevel::Important => println!("* {}", line.text),
            LineLevel::Error => eprintln!("! {}", line.text),
        }
    }
}

async fn run(cli: Cli, log: &ActivityLog) -> anyhow::Result<()> {
    let config = AaConfig::minato();
    let chain = InMemoryChain::with_account(cli.owner, cli.balance).with_config(config.clone());
    let store = FileStore::new(cli.store.unwrap_or_else(FileStore::default_path));
    tracing::info!(store = %store.path().display(), "using session store");

    // ─── Dice game ──────────────────────────────────────────────────────────

    let sessions = SessionManager::new(chain.clone(), store, config.clone(), log.clone());
    sessions.refresh().await.context("checking session module")?;
    if sessions.active_session().is_none() {
        sessions.create_session().await.context("creating session")?;
    }
    for value in cli.rolls {
        sessions.roll_dice(value).await.context("rolling dice")?;
    }

    // ─── Guardians ──────────────────────────────────────────────────────────

    let mut recovery = GuardianManager::new(chain.clone(), config, log.clone());
    recovery.refresh().await.context("checking recovery module")?;
    for guardian in &cli.guardians {
        recovery
            .add_guardian(guardian)
            .await
            .with_context(|| format!("adding guardian {guardian}"))?;
    }
    if let Some(guardian) = &cli.remove {
        recovery
            .remove_guardian(guardian)
            .await
            .with_context(|| format!("removing guardian {guardian}"))?;
    }
    if !recovery.guardians().is_empty() {
        log.add_line("Guardians:");
        for guardian in recovery.guardians() {
            log.add_line(format!("  {}", guardian.to_checksum()));
        }
    }

    let deployed = onchain::is_deployed(&chain, chain.account())
        .await
        .context("reading account code")?;
    log.add_line(format!("Smart account deployed: {deployed}"));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let log = ActivityLog::new();
    let result = run(cli, &log).await;
    print_feed(&log);
    result
}
