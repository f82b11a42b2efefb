//! seatwise-sim library.
//!
//! Deterministic multi-session simulation of a shared seating plan. Several
//! planner sessions take turns issuing mutations with whatever version
//! token they last read; the oracle then checks the plan that comes out.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` for harness failures. Engine rejections
//!   are recorded as outcomes, not errors.
//! - **Logging**: `tracing` macros; per-write events at `debug!`, run
//!   summaries at `info!`.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use seatwise_core::graph::FamilyGraph;
use seatwise_core::model::{Attendee, AttendeeId, Capacity, Category, Point, Shape, Side, Table, TableNumber};
use seatwise_core::seating::VenueLayout;
use seatwise_core::{EngineConfig, PlanningConfig, SharedPlan, TablePlan, Version};

pub mod campaign;
pub mod oracle;
pub mod rng;
pub mod session;

use rng::DeterministicRng;
use session::{Action, Outcome, PlannerSession, SessionId};

/// Spacing between table origins along the strip.
const TABLE_PITCH: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Concurrent planner sessions.
    pub sessions: usize,
    /// Actions performed across all sessions.
    pub rounds: u64,
    /// Attendees in the starting guest list.
    pub guests: usize,
    pub tables: u32,
    pub seats_per_table: u16,
    /// Chance that a session re-reads the version instead of writing.
    pub refresh_percent: u8,
    pub retry_on_stale: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            sessions: 3,
            rounds: 64,
            guests: 24,
            tables: 4,
            seats_per_table: 6,
            refresh_percent: 25,
            retry_on_stale: true,
        }
    }
}

impl SimulationConfig {
    /// # Errors
    ///
    /// Returns an error if any parameter is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.sessions == 0 {
            bail!("sessions must be > 0");
        }
        if self.rounds == 0 {
            bail!("rounds must be > 0");
        }
        if self.guests == 0 {
            bail!("guests must be > 0");
        }
        if self.tables == 0 {
            bail!("tables must be > 0");
        }
        if self.seats_per_table == 0 {
            bail!("seats_per_table must be > 0");
        }
        if self.refresh_percent > 100 {
            bail!("refresh_percent must be <= 100");
        }
        Ok(())
    }
}

/// One step of a simulated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub round: u64,
    pub session: SessionId,
    /// Version token the session held when it acted.
    pub token: u64,
    pub action: Action,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub trace: Vec<TraceEvent>,
    /// Plan version before the first session acted.
    pub start_version: Version,
    /// The published plan after the last round.
    pub plan: TablePlan,
    pub committed: u64,
    pub stale_rejections: u64,
    /// A stale write was rejected and some table ended up full.
    pub interesting_state_reached: bool,
}

pub struct Simulator {
    config: SimulationConfig,
    rng: DeterministicRng,
    plan: SharedPlan,
    sessions: Vec<PlannerSession>,
    roster: Vec<AttendeeId>,
    invited: usize,
    start_version: Version,
}

impl Simulator {
    /// Build the starting plan: a guest list of small families and a strip
    /// of round tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the starting plan
    /// cannot be built.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = DeterministicRng::new(config.seed);

        let guests = (0..config.guests)
            .map(|i| -> Result<Attendee> {
                let id = AttendeeId::parse(&format!("guest-{i:03}"))?;
                let mut attendee = Attendee::new(
                    id,
                    format!("Guest{i}"),
                    "Sim",
                    Side::ALL[i % Side::ALL.len()],
                    Category::ExtendedFamily,
                )
                .confirmed(rng.percent(80));
                if i % 3 != 0 {
                    attendee = attendee.with_parent(AttendeeId::parse(&format!("guest-{:03}", i - 1))?);
                }
                if rng.percent(20) {
                    attendee = attendee.with_plus_one(None);
                }
                Ok(attendee)
            })
            .collect::<Result<Vec<_>>>()?;
        let roster = guests.iter().map(|a| a.id.clone()).collect();
        let graph = FamilyGraph::from_attendees(guests)?;

        let width = TABLE_PITCH * f64::from(config.tables) + 1.0;
        let layout = VenueLayout::new("sim hall", width, 4.0)?;
        let engine = EngineConfig {
            planning: PlanningConfig {
                retry_on_stale: config.retry_on_stale,
                ..PlanningConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut plan = TablePlan::new(layout, graph).with_config(&engine)?;
        for n in 1..=config.tables {
            let table = Table::new(
                TableNumber(n),
                Shape::Round,
                Capacity::new(config.seats_per_table)?,
                Point::new(1.0 + TABLE_PITCH * f64::from(n - 1), 1.0)?,
            );
            plan.place_table(plan.version(), table)?;
        }

        let start_version = plan.version();
        let sessions = (0..config.sessions)
            .map(|id| PlannerSession::new(id, start_version))
            .collect();

        Ok(Self {
            config,
            rng,
            plan: SharedPlan::new(plan),
            sessions,
            roster,
            invited: 0,
            start_version,
        })
    }

    /// Run every round and return the trace and final plan.
    ///
    /// # Errors
    ///
    /// Returns an error if a fresh invitation id cannot be formed.
    pub fn run(&mut self) -> Result<SimulationResult> {
        let mut trace = Vec::new();

        for round in 0..self.config.rounds {
            let who = self.rng.index(self.sessions.len());
            let next_invite = AttendeeId::parse(&format!("invitee-{:03}", self.invited))?;
            let session = &mut self.sessions[who];
            let token = session.seen();
            let action = session.choose_action(
                &mut self.rng,
                &self.roster,
                self.config.tables,
                self.config.refresh_percent,
                &next_invite,
            );
            let outcome = session.perform(&self.plan, &action);

            if let (Action::Invite { attendee, .. }, true) = (&action, outcome.is_committed()) {
                self.roster.push(attendee.clone());
                self.invited += 1;
            }
            trace.push(TraceEvent {
                round,
                session: who,
                token: token.get(),
                action,
                outcome,
            });
        }

        let plan = TablePlan::clone(&self.plan.snapshot());
        let committed: u64 = self.sessions.iter().map(PlannerSession::committed).sum();
        let stale_rejections: u64 = self
            .sessions
            .iter()
            .map(PlannerSession::stale_rejections)
            .sum();
        let any_full = plan.layout().tables().iter().any(Table::is_full);

        info!(
            seed = self.config.seed,
            rounds = self.config.rounds,
            committed,
            stale_rejections,
            version = %plan.version(),
            "simulation finished"
        );

        Ok(SimulationResult {
            trace,
            start_version: self.start_version,
            plan,
            committed,
            stale_rejections,
            interesting_state_reached: stale_rejections > 0 && any_full,
        })
    }
}
