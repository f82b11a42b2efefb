#![forbid(unsafe_code)]

use std::env;
use std::ops::Range;

use anyhow::{Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use seatwise_sim::campaign::{CampaignConfig, replay_seed, run_campaign};

/// Run deterministic planner-session campaigns against a shared plan.
#[derive(Debug, Parser)]
#[command(name = "seatwise-sim", version)]
struct Args {
    /// First seed of the campaign.
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Number of seeds to run.
    #[arg(long, default_value_t = 100)]
    seeds: u64,

    /// Concurrent planner sessions per seed.
    #[arg(long, default_value_t = 3)]
    sessions: usize,

    /// Actions per seed.
    #[arg(long, default_value_t = 64)]
    rounds: u64,

    #[arg(long, default_value_t = 24)]
    guests: usize,

    #[arg(long, default_value_t = 4)]
    tables: u32,

    #[arg(long, default_value_t = 6)]
    seats: u16,

    /// Percent chance that a session re-reads the plan instead of writing.
    #[arg(long, default_value_t = 25)]
    refresh_percent: u8,

    /// Surface stale-version rejections instead of retrying once.
    #[arg(long)]
    no_retry: bool,

    /// Replay one seed and print its full trace.
    #[arg(long, value_name = "SEED")]
    replay: Option<u64>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn campaign(&self) -> Result<CampaignConfig> {
        let Some(end) = self.start.checked_add(self.seeds) else {
            bail!("seed range {}+{} overflows", self.start, self.seeds);
        };
        let seed_range: Range<u64> = self.start..end;
        Ok(CampaignConfig {
            seed_range,
            sessions: self.sessions,
            rounds: self.rounds,
            guests: self.guests,
            tables: self.tables,
            seats_per_table: self.seats,
            refresh_percent: self.refresh_percent,
            retry_on_stale: !self.no_retry,
        })
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = args.campaign()?;

    if let Some(seed) = args.replay {
        let trace = replay_seed(seed, &config)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&trace.result.trace)?);
        } else {
            for event in &trace.result.trace {
                println!(
                    "#{:<4} session={} token=v{} {:?} -> {:?}",
                    event.round, event.session, event.token, event.action, event.outcome
                );
            }
            println!(
                "replay seed={seed} committed={} stale={} version={} passed={}",
                trace.result.committed,
                trace.result.stale_rejections,
                trace.result.plan.version(),
                trace.oracle.passed
            );
            for violation in &trace.oracle.violations {
                println!("  {violation}");
            }
        }
        return Ok(());
    }

    let report = run_campaign(&config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "campaign complete: seeds={} passed={} stale_rejections={} interesting={}",
            report.seeds_run,
            report.seeds_passed,
            report.stale_rejections,
            report.interesting_states_reached
        );
        if let Some(seed) = report.first_failure {
            println!("first failure at seed {seed}; rerun with --replay {seed}");
        }
    }

    if !report.all_passed() {
        bail!("{} seed(s) violated plan invariants", report.failures.len());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SEATWISE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "seatwise=debug,info"
        } else {
            "seatwise=info,warn"
        })
    });

    let format = env::var("SEATWISE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
