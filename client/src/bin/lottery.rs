//! Offline commit-reveal lottery tooling.
//!
//! Generates and stores seeds, checks round phases from a JSON snapshot file,
//! and prints the calls to sign as JSON, as a hex envelope and as a
//! `stellar contract invoke` command.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use commonware_codec::Encode;
use lottery_client::{
    find_active_round, render_command, Clock, Config, FileStore, JsonFileRounds, RoundSource,
    SystemClock, ValidatedConfig, DEFAULT_SOURCE,
};
use lottery_execution::{
    ensure_allowed, next_transition, phase_of, verify_bytes, PayloadBuilder, SeedVault, Ticket,
};
use lottery_types::{codec::hex_to_bytes, Action, Commitment, Invocation};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Commit-reveal lottery client")]
struct Args {
    /// YAML config file (built-in testnet defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level, overriding the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Stellar CLI identity used in printed commands
    #[arg(long, default_value = DEFAULT_SOURCE)]
    source: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and store a seed, then print its commitment and the purchase calls.
    Commit {
        #[arg(long)]
        round: u64,
        #[arg(long)]
        participant: String,
        /// Ticket price in stroops
        #[arg(long)]
        amount: u128,
    },
    /// Check a revealed seed against a commitment.
    Verify {
        #[arg(long)]
        round: u64,
        #[arg(long)]
        participant: String,
        #[arg(long)]
        seed: String,
        #[arg(long)]
        commitment: String,
    },
    /// Show the phase of a round read from a snapshot file.
    Phase {
        /// JSON file holding one round or a list of rounds
        #[arg(long)]
        rounds: PathBuf,
        /// Round to inspect (first active round when omitted)
        #[arg(long)]
        round: Option<u64>,
        /// Unix seconds (current time when omitted)
        #[arg(long)]
        now: Option<u64>,
    },
    /// Print a token approval for the lottery contract.
    Approve {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        amount: u128,
        #[arg(long)]
        expiration_ledger: Option<u32>,
    },
    /// Print a ticket purchase for an existing commitment.
    Buy {
        #[arg(long)]
        round: u64,
        #[arg(long)]
        participant: String,
        #[arg(long)]
        amount: u128,
        #[arg(long)]
        commitment: String,
    },
    /// Print the reveal for a stored seed; the round must be in its reveal window.
    Reveal {
        #[arg(long)]
        round: u64,
        #[arg(long)]
        participant: String,
        #[arg(long)]
        rounds: PathBuf,
        #[arg(long)]
        now: Option<u64>,
    },
    /// Delete a stored seed.
    Forget {
        #[arg(long)]
        round: u64,
        #[arg(long)]
        participant: String,
    },
}

fn load_config(args: &Args) -> Result<ValidatedConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path.display()))?;
            Config::from_yaml(&contents).context("Could not parse config file")?
        }
        None => Config::default(),
    };
    config
        .apply_env(|name| std::env::var(name).ok())
        .context("Invalid environment override")?;
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config.validate().context("Invalid config")
}

fn init_logging(config: &ValidatedConfig, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_vault(config: &ValidatedConfig) -> Result<SeedVault<FileStore>> {
    let store = FileStore::open(&config.vault_path)?;
    Ok(SeedVault::new(store, config.key_scheme))
}

fn print_invocation(invocation: &Invocation, config: &ValidatedConfig, source: &str) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(invocation)?);
    println!("envelope: {}", hex::encode(invocation.encode()));
    println!();
    println!("{}", render_command(invocation, config.network, source));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config, args.json_logs);
    info!(
        network = %config.network,
        lottery = %config.lottery_contract_id,
        vault = %config.vault_path.display(),
        "loaded config"
    );

    let builder = PayloadBuilder::new(
        config.lottery_contract_id.clone(),
        config.token_contract_id.clone(),
    );
    let clock = SystemClock;

    match args.command {
        Command::Commit {
            round,
            participant,
            amount,
        } => {
            let ticket = Ticket::fresh(&participant, round)?;
            let commitment = ticket.commitment;
            let approve = builder.build_approve(
                &config.lottery_contract_id,
                &participant,
                amount,
                config.expiration_ledger,
            )?;
            let buy = builder.build_buy_ticket(round, &participant, amount, &commitment.to_hex())?;

            let mut vault = open_vault(&config)?;
            vault.store(round, &participant, &ticket.seed)?;

            println!("commitment: {commitment}");
            println!("vault key: {}", vault.key(round, &participant));
            println!();
            println!("{}", render_command(&approve, config.network, &args.source));
            println!();
            println!("{}", render_command(&buy, config.network, &args.source));
        }
        Command::Verify {
            round,
            participant,
            seed,
            commitment,
        } => {
            let seed = hex_to_bytes(seed.trim())?;
            let commitment: Commitment = commitment.trim().parse()?;
            if !verify_bytes(&seed, &participant, round, &commitment) {
                bail!("seed does not match commitment {commitment}");
            }
            println!("valid");
        }
        Command::Phase { rounds, round, now } => {
            let source = JsonFileRounds::new(rounds);
            let now = now.unwrap_or_else(|| clock.now());
            let round_id = match round {
                Some(round_id) => round_id,
                None => find_active_round(&source, now, config.round_scan_limit).await,
            };
            let snapshot = source
                .fetch(round_id)
                .await?
                .ok_or_else(|| anyhow!("round {round_id} not found"))?;
            let phase = phase_of(now, &snapshot);
            let report = json!({
                "round_id": round_id,
                "now": now,
                "phase": phase,
                "permissions": phase.permissions(),
                "next_transition": next_transition(now, &snapshot),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Approve {
            owner,
            amount,
            expiration_ledger,
        } => {
            let invocation = builder.build_approve(
                &config.lottery_contract_id,
                &owner,
                amount,
                expiration_ledger.unwrap_or(config.expiration_ledger),
            )?;
            print_invocation(&invocation, &config, &args.source)?;
        }
        Command::Buy {
            round,
            participant,
            amount,
            commitment,
        } => {
            let invocation = builder.build_buy_ticket(round, &participant, amount, &commitment)?;
            print_invocation(&invocation, &config, &args.source)?;
        }
        Command::Reveal {
            round,
            participant,
            rounds,
            now,
        } => {
            let snapshot = JsonFileRounds::new(rounds)
                .fetch(round)
                .await?
                .ok_or_else(|| anyhow!("round {round} not found"))?;
            ensure_allowed(now.unwrap_or_else(|| clock.now()), &snapshot, Action::RevealSeed)?;

            let vault = open_vault(&config)?;
            let seed = vault
                .retrieve(round, &participant)?
                .ok_or_else(|| anyhow!("no stored seed for round {round} and {participant}"))?;
            let invocation = builder.build_reveal_seed(round, &participant, &seed.to_hex())?;
            print_invocation(&invocation, &config, &args.source)?;
        }
        Command::Forget { round, participant } => {
            let mut vault = open_vault(&config)?;
            vault.remove(round, &participant)?;
            println!("removed {}", vault.key(round, &participant));
        }
    }
    Ok(())
}
