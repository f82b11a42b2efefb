//! Campaign runner for deterministic simulation campaigns.
//!
//! Executes many seeds with the same parameters, checks every final plan
//! with the oracle, and reports the first failing seed for replay.

use std::ops::Range;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::oracle::{InvariantViolation, OracleResult, PlanOracle};
use crate::{SimulationConfig, SimulationResult, Simulator};

/// Campaign-level parameters; every seed in `seed_range` runs with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub seed_range: Range<u64>,
    pub sessions: usize,
    pub rounds: u64,
    pub guests: usize,
    pub tables: u32,
    pub seats_per_table: u16,
    pub refresh_percent: u8,
    pub retry_on_stale: bool,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            seed_range: 0..100,
            sessions: sim.sessions,
            rounds: sim.rounds,
            guests: sim.guests,
            tables: sim.tables,
            seats_per_table: sim.seats_per_table,
            refresh_percent: sim.refresh_percent,
            retry_on_stale: sim.retry_on_stale,
        }
    }
}

impl CampaignConfig {
    #[must_use]
    pub const fn sim_config_for_seed(&self, seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed,
            sessions: self.sessions,
            rounds: self.rounds,
            guests: self.guests,
            tables: self.tables,
            seats_per_table: self.seats_per_table,
            refresh_percent: self.refresh_percent,
            retry_on_stale: self.retry_on_stale,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the seed range is empty or the per-seed
    /// parameters are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.seed_range.is_empty() {
            bail!("seed_range must not be empty");
        }
        self.sim_config_for_seed(self.seed_range.start).validate()
    }
}

/// Failure details for a single seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub seed: u64,
    pub violations: Vec<String>,
}

/// Aggregate report produced by a campaign run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub seeds_run: usize,
    pub seeds_passed: usize,
    /// First seed that failed, for prioritized replay.
    pub first_failure: Option<u64>,
    pub failures: Vec<SeedFailure>,
    pub writes_committed: u64,
    pub stale_rejections: u64,
    pub interesting_states_reached: usize,
}

impl CampaignReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything a replayed seed produced.
#[derive(Debug, Clone)]
pub struct DetailedTrace {
    pub result: SimulationResult,
    pub oracle: OracleResult,
}

/// Run a full campaign across all seeds in the config.
///
/// # Errors
///
/// Returns an error if config validation fails or a simulation cannot be
/// set up.
pub fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    config.validate()?;

    let mut report = CampaignReport {
        seeds_run: 0,
        seeds_passed: 0,
        first_failure: None,
        failures: Vec::new(),
        writes_committed: 0,
        stale_rejections: 0,
        interesting_states_reached: 0,
    };

    for seed in config.seed_range.clone() {
        let trace = replay_seed(seed, config)?;
        report.seeds_run += 1;
        report.writes_committed += trace.result.committed;
        report.stale_rejections += trace.result.stale_rejections;
        if trace.result.interesting_state_reached {
            report.interesting_states_reached += 1;
        }

        if trace.oracle.passed {
            report.seeds_passed += 1;
        } else {
            warn!(seed, violations = trace.oracle.violations.len(), "seed failed");
            report.first_failure.get_or_insert(seed);
            report.failures.push(SeedFailure {
                seed,
                violations: trace.oracle.violations.iter().map(ToString::to_string).collect(),
            });
        }
    }

    info!(
        seeds = report.seeds_run,
        passed = report.seeds_passed,
        stale = report.stale_rejections,
        "campaign finished"
    );
    Ok(report)
}

/// Run a single seed and return `Ok(())` on pass, `Err(violations)` on
/// failure.
///
/// # Errors
///
/// The outer error is a harness failure; the inner `Result` separates a
/// clean run from invariant violations.
pub fn run_single_seed(
    seed: u64,
    config: &CampaignConfig,
) -> Result<std::result::Result<(), Vec<InvariantViolation>>> {
    let trace = replay_seed(seed, config)?;
    if trace.oracle.passed {
        Ok(Ok(()))
    } else {
        Ok(Err(trace.oracle.violations))
    }
}

/// Replay a single seed with full trace details for debugging.
///
/// # Errors
///
/// Returns an error when config validation or simulation fails.
pub fn replay_seed(seed: u64, config: &CampaignConfig) -> Result<DetailedTrace> {
    let mut simulator = Simulator::new(config.sim_config_for_seed(seed))?;
    let result = simulator.run()?;
    let oracle = check_result(&result);
    Ok(DetailedTrace { result, oracle })
}

/// Full oracle suite over one finished run.
#[must_use]
pub fn check_result(result: &SimulationResult) -> OracleResult {
    PlanOracle::check_all(&result.plan).merge(PlanOracle::check_version_accounting(
        result.start_version,
        result.committed,
        &result.plan,
    ))
}
