use crate::timing::TimingConfig;
use crate::types::{ProcessPhase, ProcessType};
use serde::{Deserialize, Serialize};

pub const STEPS_PER_PHASE: u8 = 4;

// ---------------------------------------------------------------------------
// Step labels
// ---------------------------------------------------------------------------

/// Scripted progress text for steps 1-3 of a phase. Step 4 has no label of
/// its own: it is the transition into the next phase (or the failure outcome).
pub fn step_labels(process: ProcessType, phase: ProcessPhase) -> [&'static str; 3] {
    match (process, phase) {
        (ProcessType::Unlock, ProcessPhase::One) => [
            "Connecting with server",
            "Sending token",
            "Waiting for confirmation",
        ],
        (ProcessType::Unlock, ProcessPhase::Two) => [
            "Applying unlock patch",
            "Verifying carrier response",
            "Finalizing unlock",
        ],
        (ProcessType::Blacklist, ProcessPhase::One) => [
            "Connecting to blacklist database",
            "Analyzing report status",
            "Preparing removal token",
        ],
        (ProcessType::Blacklist, ProcessPhase::Two) => [
            "Submitting removal request",
            "Awaiting registry update",
            "Verifying device status",
        ],
    }
}

/// Label for a 1-based step, `None` for the transition step.
pub fn step_label(process: ProcessType, phase: ProcessPhase, step: u8) -> Option<&'static str> {
    match step {
        1..=3 => Some(step_labels(process, phase)[usize::from(step - 1)]),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Forward-only state of a single process run.
///
/// `Idle → (1,1) → … → (1,4) → (2,1) → … → (2,4) → Failed`. `Failed` is the
/// designed business outcome, not a software error; the only transition out
/// of it is filing a complaint ticket. There is no success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    InProgress { phase: ProcessPhase, step: u8 },
    Failed,
    TicketSubmitted,
}

impl RunState {
    /// Advance one step. Terminal states advance to themselves.
    pub fn advance(self) -> RunState {
        match self {
            RunState::Idle => RunState::InProgress {
                phase: ProcessPhase::One,
                step: 1,
            },
            RunState::InProgress { phase, step } if step < STEPS_PER_PHASE => {
                RunState::InProgress {
                    phase,
                    step: step + 1,
                }
            }
            RunState::InProgress { phase, .. } => match phase.next() {
                Some(next) => RunState::InProgress {
                    phase: next,
                    step: 1,
                },
                None => RunState::Failed,
            },
            terminal => terminal,
        }
    }

    /// Record the user filing a support ticket from the failure screen.
    /// Only legal from `Failed`; any other state is unchanged.
    pub fn submit_ticket(self) -> RunState {
        match self {
            RunState::Failed => RunState::TicketSubmitted,
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Failed | RunState::TicketSubmitted)
    }
}

// ---------------------------------------------------------------------------
// RunPlan
// ---------------------------------------------------------------------------

/// One phase's sampled total and derived step delays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub total_ms: u64,
    pub step_delays_ms: [u64; 4],
}

/// The full schedule for a run: both phases, all eight delays, computed once
/// up front so the sequencer only has to sleep and emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    pub process: ProcessType,
    pub phase1: PhasePlan,
    pub phase2: PhasePlan,
}

impl RunPlan {
    /// Sample a plan from the timing config: one random total per phase.
    pub fn build(cfg: &TimingConfig, process: ProcessType) -> Self {
        let totals = [
            cfg.random_duration_ms(process),
            cfg.random_duration_ms(process),
        ];
        Self::from_totals(cfg, process, totals)
    }

    /// Build a plan from explicit phase totals. Used by tests and by the
    /// CLI simulator, where reproducible schedules matter.
    pub fn from_totals(cfg: &TimingConfig, process: ProcessType, totals: [u64; 2]) -> Self {
        let plan = |phase: ProcessPhase, total_ms: u64| PhasePlan {
            total_ms,
            step_delays_ms: cfg.split_for(process, phase).step_delays_ms(total_ms),
        };
        Self {
            process,
            phase1: plan(ProcessPhase::One, totals[0]),
            phase2: plan(ProcessPhase::Two, totals[1]),
        }
    }

    pub fn phase(&self, phase: ProcessPhase) -> &PhasePlan {
        match phase {
            ProcessPhase::One => &self.phase1,
            ProcessPhase::Two => &self.phase2,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.phase1.total_ms + self.phase2.total_ms
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
