//! Simulated planner sessions.
//!
//! A session is one browser tab: it remembers the plan version it last read
//! and issues mutations with that token, so a session that has not
//! refreshed in a while collides with writes made by the others.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use seatwise_core::model::{Attendee, AttendeeId, Category, Side, TableNumber};
use seatwise_core::{ErrorCode, PlanError, SharedPlan, Version};

use crate::rng::DeterministicRng;

/// Stable identifier for a simulated session.
pub type SessionId = usize;

/// One planner action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Re-read the plan version without writing.
    Refresh,
    Assign { attendee: AttendeeId, table: u32 },
    Unassign { attendee: AttendeeId },
    Attach { child: AttendeeId, parent: AttendeeId },
    Detach { child: AttendeeId },
    Rsvp { attendee: AttendeeId, confirmed: bool },
    Remove { attendee: AttendeeId },
    Invite { attendee: AttendeeId, side: Side },
}

/// What happened when a session performed an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Read { version: u64 },
    Committed { version: u64, retried: bool },
    Rejected { code: String, retried: bool },
}

impl Outcome {
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Rejected { code, .. } if code == ErrorCode::StaleVersion.code())
    }
}

/// Per-action weights, in percent of non-refresh actions.
const ACTION_WEIGHTS: [(u8, ActionKind); 7] = [
    (40, ActionKind::Assign),
    (15, ActionKind::Unassign),
    (12, ActionKind::Attach),
    (8, ActionKind::Detach),
    (12, ActionKind::Rsvp),
    (5, ActionKind::Remove),
    (8, ActionKind::Invite),
];

#[derive(Debug, Clone, Copy)]
enum ActionKind {
    Assign,
    Unassign,
    Attach,
    Detach,
    Rsvp,
    Remove,
    Invite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSession {
    id: SessionId,
    seen: Version,
    committed: u64,
    stale_rejections: u64,
}

impl PlannerSession {
    #[must_use]
    pub const fn new(id: SessionId, seen: Version) -> Self {
        Self {
            id,
            seen,
            committed: 0,
            stale_rejections: 0,
        }
    }

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Version token this session will send with its next write.
    #[must_use]
    pub const fn seen(&self) -> Version {
        self.seen
    }

    #[must_use]
    pub const fn committed(&self) -> u64 {
        self.committed
    }

    #[must_use]
    pub const fn stale_rejections(&self) -> u64 {
        self.stale_rejections
    }

    /// Pick the next action. `roster` holds every id ever handed out,
    /// removed ones included, so stale references get exercised too.
    /// `next_invite` is the id a fresh invitation would use.
    pub fn choose_action(
        &self,
        rng: &mut DeterministicRng,
        roster: &[AttendeeId],
        tables: u32,
        refresh_percent: u8,
        next_invite: &AttendeeId,
    ) -> Action {
        if roster.is_empty() || rng.percent(refresh_percent) {
            return Action::Refresh;
        }

        let pick = |rng: &mut DeterministicRng| roster[rng.index(roster.len())].clone();
        let mut roll = rng.below(100);
        let mut kind = ActionKind::Assign;
        for (weight, candidate) in ACTION_WEIGHTS {
            if roll < u64::from(weight) {
                kind = candidate;
                break;
            }
            roll -= u64::from(weight);
        }

        match kind {
            ActionKind::Assign => Action::Assign {
                attendee: pick(rng),
                table: u32::try_from(rng.below(u64::from(tables))).unwrap_or(0) + 1,
            },
            ActionKind::Unassign => Action::Unassign { attendee: pick(rng) },
            ActionKind::Attach => Action::Attach {
                child: pick(rng),
                parent: pick(rng),
            },
            ActionKind::Detach => Action::Detach { child: pick(rng) },
            ActionKind::Rsvp => Action::Rsvp {
                attendee: pick(rng),
                confirmed: rng.percent(75),
            },
            ActionKind::Remove => Action::Remove { attendee: pick(rng) },
            ActionKind::Invite => Action::Invite {
                attendee: next_invite.clone(),
                side: Side::ALL[rng.index(Side::ALL.len())],
            },
        }
    }

    /// Perform `action` against `plan` with this session's token.
    ///
    /// On a stale rejection the session re-reads the version and, if the
    /// plan's `retry_on_stale` switch is on, tries exactly once more.
    pub fn perform(&mut self, plan: &SharedPlan, action: &Action) -> Outcome {
        if matches!(action, Action::Refresh) {
            self.seen = plan.version();
            trace!(session = self.id, version = %self.seen, "session refreshed");
            return Outcome::Read {
                version: self.seen.get(),
            };
        }

        let mut retried = false;
        let mut result = execute(plan, self.seen, action);
        if result.as_ref().is_err_and(PlanError::is_stale) {
            self.stale_rejections += 1;
            self.seen = plan.version();
            if plan.snapshot().planning().retry_on_stale {
                retried = true;
                result = execute(plan, self.seen, action);
            }
        }

        match result {
            Ok(version) => {
                self.seen = version;
                self.committed += 1;
                debug!(session = self.id, %version, retried, ?action, "session write committed");
                Outcome::Committed {
                    version: version.get(),
                    retried,
                }
            }
            Err(err) => {
                if retried && err.is_stale() {
                    self.stale_rejections += 1;
                }
                trace!(session = self.id, code = %err.code(), retried, "session write rejected");
                Outcome::Rejected {
                    code: err.code().code().to_string(),
                    retried,
                }
            }
        }
    }
}

fn execute(plan: &SharedPlan, expected: Version, action: &Action) -> Result<Version, PlanError> {
    match action {
        Action::Refresh => Ok(plan.version()),
        Action::Assign { attendee, table } => plan.assign_seat(expected, attendee, TableNumber(*table)),
        Action::Unassign { attendee } => plan.unassign_seat(expected, attendee).map(|(v, _)| v),
        Action::Attach { child, parent } => plan.attach(expected, child, parent),
        Action::Detach { child } => plan.detach(expected, child).map(|(v, _)| v),
        Action::Rsvp {
            attendee,
            confirmed,
        } => plan.set_rsvp(expected, attendee, *confirmed).map(|(v, _)| v),
        Action::Remove { attendee } => plan.remove_attendee(expected, attendee).map(|(v, _)| v),
        Action::Invite { attendee, side } => {
            let record = Attendee::new(
                attendee.clone(),
                attendee.as_str(),
                "Invitee",
                *side,
                Category::Other,
            )
            .confirmed(true);
            plan.insert_attendee(expected, record)
        }
    }
}
