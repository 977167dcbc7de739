use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use unlock_engine::RunHandle;

/// Occupancy of a device's slot in the active-run registry.
///
/// A slot is reserved (`Pending`) before the blocking start checks run and
/// upgraded to `Live` once the sequencer handle exists. Reserving and checking
/// happen under one lock, so two concurrent starts for the same device can
/// never both pass the guard.
enum RunSlot {
    Pending,
    Live(Arc<RunHandle>),
}

impl RunSlot {
    fn is_vacant(&self) -> bool {
        match self {
            RunSlot::Pending => false,
            RunSlot::Live(handle) => handle.is_completed(),
        }
    }
}

/// Shared application state passed to all route handlers.
///
/// `runs` is the active-run registry, keyed by device identifier. It is the
/// re-entry guard: starting a run for a device that already holds a slot
/// is a 409, and cancelling goes through the stored handle.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    runs: Arc<Mutex<HashMap<String, RunSlot>>>,
    /// Delay divisor applied to every run this server starts. 1 in
    /// production; large values compress runs for demos and tests.
    pub speedup: u64,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self::with_speedup(root, 1)
    }

    pub fn with_speedup(root: PathBuf, speedup: u64) -> Self {
        Self {
            root,
            runs: Arc::new(Mutex::new(HashMap::new())),
            speedup: speedup.max(1),
        }
    }

    /// Live handle for a device, pruning any completed entry on the way.
    /// A pending reservation has no handle yet and reports as absent.
    pub fn active_run(&self, identifier: &str) -> Option<Arc<RunHandle>> {
        let mut runs = self.runs.lock().expect("runs lock poisoned");
        match runs.get(identifier) {
            Some(RunSlot::Live(handle)) if handle.is_completed() => {
                runs.remove(identifier);
                None
            }
            Some(RunSlot::Live(handle)) => Some(handle.clone()),
            Some(RunSlot::Pending) | None => None,
        }
    }

    /// Identifiers holding a slot, pruning completed entries. Pending
    /// reservations count: they reject re-entry just like live runs.
    pub fn active_run_ids(&self) -> Vec<String> {
        let mut runs = self.runs.lock().expect("runs lock poisoned");
        runs.retain(|_, slot| !slot.is_vacant());
        let mut ids: Vec<String> = runs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Claim the slot for a device before starting its run. Returns false if
    /// the slot is already reserved or live; the caller must either
    /// [`activate_run`](Self::activate_run) or [`remove_run`](Self::remove_run)
    /// a successful claim.
    pub fn try_reserve_run(&self, identifier: &str) -> bool {
        let mut runs = self.runs.lock().expect("runs lock poisoned");
        if runs.get(identifier).is_some_and(|slot| !slot.is_vacant()) {
            return false;
        }
        runs.insert(identifier.to_string(), RunSlot::Pending);
        true
    }

    /// Upgrade a reservation to a live handle.
    pub fn activate_run(&self, identifier: String, handle: Arc<RunHandle>) {
        self.runs
            .lock()
            .expect("runs lock poisoned")
            .insert(identifier, RunSlot::Live(handle));
    }

    pub fn remove_run(&self, identifier: &str) {
        self.runs.lock().expect("runs lock poisoned").remove(identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_stores_root() {
        let state = AppState::new(PathBuf::from("/tmp/test"));
        assert_eq!(state.root, PathBuf::from("/tmp/test"));
        assert_eq!(state.speedup, 1);
        assert!(state.active_run_ids().is_empty());
    }

    #[test]
    fn speedup_floor_is_one() {
        let state = AppState::with_speedup(PathBuf::from("/tmp/test"), 0);
        assert_eq!(state.speedup, 1);
    }

    #[test]
    fn reservation_blocks_second_claim() {
        let state = AppState::new(PathBuf::from("/tmp/test"));
        assert!(state.try_reserve_run("356938035643809"));
        assert!(!state.try_reserve_run("356938035643809"));
        assert_eq!(state.active_run_ids(), vec!["356938035643809".to_string()]);
        // Pending slots have no cancellable handle yet.
        assert!(state.active_run("356938035643809").is_none());
    }

    #[test]
    fn released_reservation_can_be_reclaimed() {
        let state = AppState::new(PathBuf::from("/tmp/test"));
        assert!(state.try_reserve_run("356938035643809"));
        state.remove_run("356938035643809");
        assert!(state.try_reserve_run("356938035643809"));
    }
}
