//! keel-cli — Inspect the checkpoint tables compiled into this build.
//!
//! Lists the active table, checks a (height, hash) pair against it, and
//! prints the sync-progress estimate.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use keel_core::constants::NetworkType;
use keel_core::types::Hash256;
use keel_node_lib::{GuardConfig, init_logging};
use tracing::debug;

/// Keel checkpoint guard command-line interface.
#[derive(Parser, Debug)]
#[command(name = "keel-cli")]
#[command(version, about = "Inspect and query the hardcoded block checkpoints")]
struct Cli {
    /// Config file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the test network (no checkpoints).
    #[arg(long, global = true)]
    testnet: bool,

    /// Override the maximum reorganization depth.
    #[arg(long, global = true)]
    reorg_depth: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the active checkpoint table.
    Table(TableArgs),
    /// Check a block hash against the checkpoint at its height.
    Check(CheckArgs),
    /// Print the total blocks estimate (highest checkpoint height).
    Estimate,
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Block height.
    #[arg(long)]
    height: u64,

    /// Block hash, 64 hex characters (optional 0x prefix).
    #[arg(long)]
    hash: String,
}

impl Cli {
    /// Merge file/env configuration with command-line overrides.
    fn resolve_config(&self) -> Result<GuardConfig> {
        let mut config = GuardConfig::load(self.config.as_deref())
            .context("failed to load configuration")?;
        if self.testnet {
            config.network = NetworkType::Testnet;
        }
        if let Some(depth) = self.reorg_depth {
            config.reorg_depth = depth;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(&config.log_level, &config.log_format);
    debug!(network = %config.network, reorg_depth = config.reorg_depth, "resolved config");

    match cli.command {
        Commands::Table(args) => show_table(&config, &args),
        Commands::Check(args) => check(&config, &args),
        Commands::Estimate => {
            println!("{}", config.guard().total_blocks_estimate());
            Ok(())
        }
    }
}

fn show_table(config: &GuardConfig, args: &TableArgs) -> Result<()> {
    let guard = config.guard();
    let table = guard.table();
    if args.json {
        let entries: Vec<serde_json::Value> = table
            .iter()
            .map(|(height, hash)| serde_json::json!({ "height": height, "hash": hash.to_hex() }))
            .collect();
        let out = serde_json::json!({
            "network": config.network.name(),
            "checkpoints": entries,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Network: {}", config.network);
    if table.is_empty() {
        println!("(no checkpoints)");
        return Ok(());
    }
    for (height, hash) in table.iter() {
        println!("{height:>10}  {hash}");
    }
    Ok(())
}

fn check(config: &GuardConfig, args: &CheckArgs) -> Result<()> {
    let hash = Hash256::from_hex(&args.hash).context("invalid --hash")?;
    if config.guard().check_hardened(args.height, &hash) {
        println!("accepted");
        Ok(())
    } else {
        println!("rejected");
        process::exit(1);
    }
}
