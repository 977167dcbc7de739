//! `unlock-engine` — the staged-progress sequencer.
//!
//! Takes a precomputed [`unlock_core::run::RunPlan`] and plays it out on
//! tokio timers: two phases of four steps, each step firing after its
//! configured delay, ending in the scripted failure outcome. Consumers tap
//! the broadcast channel on the returned [`RunHandle`]; the handle is also
//! the cancellation point, so tearing down a UI or starting over stops the
//! pending timers instead of leaking them.
//!
//! ```text
//! RunPlan
//!     │
//!     ▼
//! sequencer::start   ← spawns one tokio task, sleeps each step delay
//!     │
//!     ▼
//! RunHandle          ← broadcast::Sender<StepEvent> + cancel + completed
//! ```

pub mod sequencer;

pub use sequencer::{start, RunHandle, StepEvent};
