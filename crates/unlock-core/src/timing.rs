use crate::error::{Result, UnlockError};
use crate::paths;
use crate::types::{ProcessPhase, ProcessType};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MS_PER_MINUTE: u64 = 60_000;

// ---------------------------------------------------------------------------
// PhaseSplit
// ---------------------------------------------------------------------------

/// Percentage split of a phase's total duration across its four steps.
///
/// Each step delay is `floor(total * pct / 100)`. Step 4 is floored the same
/// way as steps 1-3 rather than taking the remainder, so the delays sum to at
/// most the total (integer rounding may drop a few milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSplit {
    pub step1: u32,
    pub step2: u32,
    pub step3: u32,
    pub step4: u32,
}

impl PhaseSplit {
    pub fn new(step1: u32, step2: u32, step3: u32, step4: u32) -> Self {
        Self {
            step1,
            step2,
            step3,
            step4,
        }
    }

    pub fn even() -> Self {
        Self::new(25, 25, 25, 25)
    }

    pub fn percentages(&self) -> [u32; 4] {
        [self.step1, self.step2, self.step3, self.step4]
    }

    pub fn sum(&self) -> u32 {
        self.step1 + self.step2 + self.step3 + self.step4
    }

    /// Derive the four step delays from a total phase duration.
    pub fn step_delays_ms(&self, total_ms: u64) -> [u64; 4] {
        let delay = |pct: u32| total_ms * u64::from(pct) / 100;
        [
            delay(self.step1),
            delay(self.step2),
            delay(self.step3),
            delay(self.step4),
        ]
    }
}

// ---------------------------------------------------------------------------
// ProcessTiming
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTiming {
    #[serde(default = "default_min_minutes")]
    pub min_minutes: u32,
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u32,
    pub phase1: PhaseSplit,
    pub phase2: PhaseSplit,
}

fn default_min_minutes() -> u32 {
    5
}

fn default_max_minutes() -> u32 {
    15
}

impl ProcessTiming {
    fn default_for(process: ProcessType) -> Self {
        let phase1 = match process {
            ProcessType::Unlock => PhaseSplit::new(20, 30, 30, 20),
            ProcessType::Blacklist => PhaseSplit::new(25, 35, 25, 15),
        };
        Self {
            min_minutes: default_min_minutes(),
            max_minutes: default_max_minutes(),
            phase1,
            phase2: PhaseSplit::even(),
        }
    }

    pub fn split_for(&self, phase: ProcessPhase) -> &PhaseSplit {
        match phase {
            ProcessPhase::One => &self.phase1,
            ProcessPhase::Two => &self.phase2,
        }
    }
}

// ---------------------------------------------------------------------------
// TimingConfig
// ---------------------------------------------------------------------------

/// Process timing for both service types, admin-editable.
///
/// Read side never fails: a missing or unparsable `timing.yaml` degrades to
/// the built-in defaults. Write side is validated, so a config that made it
/// to disk through `save` has splits summing to ~100 and `min <= max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub unlock: ProcessTiming,
    pub blacklist: ProcessTiming,
}

fn default_version() -> u32 {
    1
}

fn default_enabled() -> bool {
    true
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            version: 1,
            enabled: true,
            unlock: ProcessTiming::default_for(ProcessType::Unlock),
            blacklist: ProcessTiming::default_for(ProcessType::Blacklist),
        }
    }
}

impl TimingConfig {
    /// Load the timing config, falling back to defaults on any failure.
    pub fn load_or_default(root: &Path) -> Self {
        let path = paths::timing_path(root);
        match std::fs::read_to_string(&path) {
            Ok(data) => match serde_yaml::from_str(&data) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("unparsable timing config, using defaults: {e}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        self.validate()?;
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::timing_path(root), data.as_bytes())
    }

    /// Reject configs with out-of-order duration bounds or splits that do
    /// not sum to 100 (±1 to tolerate admin rounding).
    pub fn validate(&self) -> Result<()> {
        for process in ProcessType::all() {
            let timing = self.timing_for(*process);
            if timing.min_minutes == 0 {
                return Err(UnlockError::InvalidTimingConfig(format!(
                    "{process}: min_minutes must be at least 1"
                )));
            }
            if timing.min_minutes > timing.max_minutes {
                return Err(UnlockError::InvalidTimingConfig(format!(
                    "{process}: min_minutes {} exceeds max_minutes {}",
                    timing.min_minutes, timing.max_minutes
                )));
            }
            for phase in [ProcessPhase::One, ProcessPhase::Two] {
                let sum = timing.split_for(phase).sum();
                if !(99..=101).contains(&sum) {
                    return Err(UnlockError::InvalidTimingConfig(format!(
                        "{process} phase {phase}: step percentages sum to {sum}, expected 100"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn timing_for(&self, process: ProcessType) -> &ProcessTiming {
        match process {
            ProcessType::Unlock => &self.unlock,
            ProcessType::Blacklist => &self.blacklist,
        }
    }

    pub fn timing_for_mut(&mut self, process: ProcessType) -> &mut ProcessTiming {
        match process {
            ProcessType::Unlock => &mut self.unlock,
            ProcessType::Blacklist => &mut self.blacklist,
        }
    }

    pub fn split_for(&self, process: ProcessType, phase: ProcessPhase) -> &PhaseSplit {
        self.timing_for(process).split_for(phase)
    }

    /// Sample a total duration: a uniform whole number of minutes in
    /// `[min, max]` inclusive, in milliseconds.
    pub fn random_duration_ms(&self, process: ProcessType) -> u64 {
        let timing = self.timing_for(process);
        let minutes = rand::thread_rng().gen_range(timing.min_minutes..=timing.max_minutes);
        u64::from(minutes) * MS_PER_MINUTE
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_splits_sum_to_100() {
        let cfg = TimingConfig::default();
        for process in ProcessType::all() {
            for phase in [ProcessPhase::One, ProcessPhase::Two] {
                assert_eq!(cfg.split_for(*process, phase).sum(), 100);
            }
        }
    }

    #[test]
    fn random_duration_within_bounds() {
        let cfg = TimingConfig::default();
        for _ in 0..200 {
            let ms = cfg.random_duration_ms(ProcessType::Unlock);
            assert!(ms >= 5 * MS_PER_MINUTE, "below minimum: {ms}");
            assert!(ms <= 15 * MS_PER_MINUTE, "above maximum: {ms}");
            assert_eq!(ms % MS_PER_MINUTE, 0, "not whole minutes: {ms}");
        }
    }

    #[test]
    fn random_duration_degenerate_range() {
        let mut cfg = TimingConfig::default();
        cfg.unlock.min_minutes = 7;
        cfg.unlock.max_minutes = 7;
        assert_eq!(cfg.random_duration_ms(ProcessType::Unlock), 7 * MS_PER_MINUTE);
    }

    #[test]
    fn step_delays_are_floored_percentages() {
        let split = PhaseSplit::new(20, 30, 30, 20);
        assert_eq!(
            split.step_delays_ms(600_000),
            [120_000, 180_000, 180_000, 120_000]
        );

        let split = PhaseSplit::new(25, 35, 25, 15);
        assert_eq!(
            split.step_delays_ms(900_000),
            [225_000, 315_000, 225_000, 135_000]
        );
    }

    #[test]
    fn step_delays_never_exceed_total() {
        // 33/33/33/1 loses milliseconds to flooring; the sum must stay <= total.
        let split = PhaseSplit::new(33, 33, 33, 1);
        let total = 100_001;
        let delays = split.step_delays_ms(total);
        assert!(delays.iter().sum::<u64>() <= total);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = TimingConfig::load_or_default(dir.path());
        assert_eq!(cfg, TimingConfig::default());
    }

    #[test]
    fn load_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".unlockhub")).unwrap();
        std::fs::write(dir.path().join(".unlockhub/timing.yaml"), "{not yaml:::").unwrap();
        let cfg = TimingConfig::load_or_default(dir.path());
        assert_eq!(cfg, TimingConfig::default());
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = TimingConfig::default();
        cfg.unlock.min_minutes = 3;
        cfg.unlock.max_minutes = 8;
        cfg.unlock.phase1 = PhaseSplit::new(10, 40, 40, 10);
        cfg.save(dir.path()).unwrap();

        let loaded = TimingConfig::load_or_default(dir.path());
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn save_rejects_bad_split() {
        let dir = TempDir::new().unwrap();
        let mut cfg = TimingConfig::default();
        cfg.blacklist.phase2 = PhaseSplit::new(50, 50, 50, 50);
        assert!(matches!(
            cfg.save(dir.path()),
            Err(UnlockError::InvalidTimingConfig(_))
        ));
    }

    #[test]
    fn save_rejects_inverted_range() {
        let dir = TempDir::new().unwrap();
        let mut cfg = TimingConfig::default();
        cfg.unlock.min_minutes = 20;
        cfg.unlock.max_minutes = 10;
        assert!(cfg.save(dir.path()).is_err());
    }

    #[test]
    fn validate_tolerates_rounding_sums() {
        let mut cfg = TimingConfig::default();
        cfg.unlock.phase1 = PhaseSplit::new(33, 33, 33, 2); // 101
        cfg.validate().unwrap();
        cfg.unlock.phase1 = PhaseSplit::new(33, 33, 33, 0); // 99
        cfg.validate().unwrap();
    }
}
