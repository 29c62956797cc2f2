//! `x1c` — deploy preview, reward preview, and scripted replay for the
//! X1Coin ledger.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use x1c_cli::{run_script, CliConfig, ReplayScript};
use x1c_token::{calculate_reward, X1Coin};
use x1c_types::{Address, Clock, SystemClock, Timestamp, TokenAmount, TokenParams};
use x1c_utils::{format_duration, format_units, init_logging, parse_units, LogFormat};

#[derive(Parser)]
#[command(name = "x1c", about = "X1Coin ledger tooling")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Issuer (deployer) address.
    #[arg(long, global = true, env = "X1C_ISSUER")]
    issuer: Option<Address>,

    /// Team wallet address.
    #[arg(long, global = true, env = "X1C_TEAM")]
    team: Option<Address>,

    /// Community wallet address.
    #[arg(long, global = true, env = "X1C_COMMUNITY")]
    community: Option<Address>,

    /// Genesis time in Unix seconds (defaults to now).
    #[arg(long, global = true, env = "X1C_GENESIS_TIME")]
    genesis_time: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "X1C_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "X1C_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Build the genesis ledger and print the allocation.
    Deploy {
        /// Print the full snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Preview the staking reward for an amount over a period.
    Reward {
        /// Principal in X1C, e.g. "500" or "0.25".
        #[arg(long)]
        amount: String,
        /// Stake start, Unix seconds.
        #[arg(long)]
        start: u64,
        /// Evaluation time, Unix seconds (defaults to now).
        #[arg(long)]
        now: Option<u64>,
    },
    /// Replay a TOML operation script against a fresh ledger.
    Replay {
        script: PathBuf,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Also print the Prometheus metrics.
        #[arg(long)]
        metrics: bool,
    },
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => CliConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => CliConfig::default(),
        };
        if let Some(a) = self.issuer {
            config.issuer = a;
        }
        if let Some(a) = self.team {
            config.team = a;
        }
        if let Some(a) = self.community {
            config.community = a;
        }
        if self.genesis_time.is_some() {
            config.genesis_time = self.genesis_time;
        }
        if let Some(f) = &self.log_format {
            config.log_format = f.clone();
        }
        if let Some(l) = &self.log_level {
            config.log_level = l.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(LogFormat::parse(&config.log_format), &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Deploy { json } => deploy(&config, json),
        Command::Reward { amount, start, now } => reward(&amount, start, now),
        Command::Replay {
            script,
            json,
            metrics,
        } => replay(&config, &script, json, metrics),
    }
}

fn deploy(config: &CliConfig, json: bool) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let genesis = config.genesis(clock.now());
    let coin = X1Coin::new(&genesis, clock)?;
    coin.audit()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&coin.snapshot())?);
        return Ok(());
    }

    let d = coin.decimals();
    println!("{} ({}) deployed", coin.name(), coin.symbol());
    println!("  total supply:   {} {}", format_units(coin.total_supply(), d), coin.symbol());
    println!(
        "  issuer    {}: {}",
        genesis.issuer,
        format_units(coin.balance_of(&genesis.issuer), d)
    );
    println!(
        "  community {}: {}",
        genesis.community,
        format_units(coin.balance_of(&genesis.community), d)
    );
    let unlock = coin.unlock_time();
    println!(
        "  team      {}: {} locked until {} (in {})",
        genesis.team,
        format_units(coin.locked_balance_of(&genesis.team), d),
        unlock.as_secs(),
        format_duration(coin.now().elapsed_since(unlock)),
    );
    Ok(())
}

fn reward(amount: &str, start: u64, now: Option<u64>) -> anyhow::Result<()> {
    let params = TokenParams::x1c_defaults();
    let Some(principal) = parse_units(amount, params.decimals) else {
        bail!("invalid amount: {amount}");
    };
    let start = Timestamp::new(start);
    let now = now.map(Timestamp::new).unwrap_or_else(Timestamp::now);
    let reward = calculate_reward(principal, start, now, &params)?;
    println!(
        "{} {} staked for {} earns {} {}",
        format_units(principal, params.decimals),
        params.symbol,
        format_duration(start.elapsed_since(now)),
        format_units(reward, params.decimals),
        params.symbol,
    );
    Ok(())
}

fn replay(config: &CliConfig, path: &Path, json: bool, metrics: bool) -> anyhow::Result<()> {
    let script = ReplayScript::from_toml_file(path)?;
    let genesis = config.genesis(Timestamp::now());
    let report = run_script(&genesis, &script)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for record in &report.events {
            println!("#{:<4} t={:<12} {:?}", record.seq, record.at.as_secs(), record.event);
        }
        for r in &report.rejected {
            println!("step {} rejected ({}): {}", r.step, r.kind, r.message);
        }
        println!(
            "applied {} / rejected {}; supply {} circulating {} staked {}",
            report.applied,
            report.rejected.len(),
            format_units(report.total_supply, TokenAmount::DECIMALS),
            format_units(report.circulating_supply, TokenAmount::DECIMALS),
            format_units(report.total_staked, TokenAmount::DECIMALS),
        );
    }
    if metrics {
        print!("{}", report.metrics_text);
    }

    if let Some(failure) = report.audit_failure {
        bail!("conservation audit failed: {failure}");
    }
    Ok(())
}
