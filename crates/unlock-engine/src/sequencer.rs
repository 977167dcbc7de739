use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use unlock_core::run::{step_label, RunPlan, STEPS_PER_PHASE};
use unlock_core::types::{ProcessPhase, ProcessType};

// ---------------------------------------------------------------------------
// StepEvent
// ---------------------------------------------------------------------------

/// One observable transition of a run, broadcast as it fires.
///
/// Steps 1-3 of each phase carry a scripted label; step 4 is the phase
/// transition. `Failed` and `Cancelled` are terminal: nothing is sent after
/// either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StepEvent {
    StepEntered {
        phase: u8,
        step: u8,
        label: String,
    },
    PhaseCompleted {
        phase: u8,
    },
    Failed {
        process: ProcessType,
    },
    Cancelled,
}

impl StepEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepEvent::Failed { .. } | StepEvent::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// RunHandle
// ---------------------------------------------------------------------------

/// Handle to an in-flight run. Subscribers tap the broadcast channel;
/// dropping the handle does not stop the run, calling [`RunHandle::cancel`]
/// does.
pub struct RunHandle {
    tx: broadcast::Sender<StepEvent>,
    /// Receiver created before the task starts, so the first subscriber
    /// cannot miss early events. Taken at most once.
    pub initial_rx: Mutex<Option<broadcast::Receiver<StepEvent>>>,
    completed: Arc<AtomicBool>,
    cancel_tx: watch::Sender<bool>,
}

impl RunHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<StepEvent> {
        self.tx.subscribe()
    }

    /// Take the pre-subscribed receiver, falling back to a fresh one.
    pub fn take_initial_rx(&self) -> broadcast::Receiver<StepEvent> {
        self.initial_rx
            .lock()
            .expect("initial_rx lock poisoned")
            .take()
            .unwrap_or_else(|| self.tx.subscribe())
    }

    /// Stop all pending steps. Idempotent; a completed run ignores this.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

/// Play out a run plan on tokio timers.
///
/// `speedup` divides every delay; 1 runs the plan in real time, larger
/// values compress it for simulation and tests while preserving ordering.
/// The spawned task emits events in strict step order from a single loop,
/// so no subscriber can ever observe a step out of sequence.
pub fn start(plan: RunPlan, speedup: u64) -> RunHandle {
    let speedup = speedup.max(1);
    let (tx, initial_rx) = broadcast::channel(64);
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    let completed = Arc::new(AtomicBool::new(false));
    let handle = RunHandle {
        tx: tx.clone(),
        initial_rx: Mutex::new(Some(initial_rx)),
        completed: completed.clone(),
        cancel_tx,
    };

    tokio::spawn(async move {
        let process = plan.process;
        for phase in [ProcessPhase::One, ProcessPhase::Two] {
            let delays = plan.phase(phase).step_delays_ms;
            for step in 1..=STEPS_PER_PHASE {
                let delay = delays[usize::from(step - 1)] / speedup;
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
                    _ = cancel_rx.changed() => {
                        tracing::debug!(%process, phase = phase.number(), step, "run cancelled");
                        let _ = tx.send(StepEvent::Cancelled);
                        completed.store(true, Ordering::Relaxed);
                        return;
                    }
                }
                let event = match step_label(process, phase, step) {
                    Some(label) => StepEvent::StepEntered {
                        phase: phase.number(),
                        step,
                        label: label.to_string(),
                    },
                    None => StepEvent::PhaseCompleted {
                        phase: phase.number(),
                    },
                };
                let _ = tx.send(event);
            }
        }
        // Both phases exhausted: the scripted terminal outcome.
        let _ = tx.send(StepEvent::Failed { process });
        completed.store(true, Ordering::Relaxed);
    });

    handle
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
