use crate::output::print_json;
use anyhow::{anyhow, Result};
use clap::Subcommand;
use std::path::Path;
use unlock_core::timing::{PhaseSplit, TimingConfig};
use unlock_core::types::{ProcessPhase, ProcessType};

#[derive(Subcommand)]
pub enum TimingSubcommand {
    /// Show the effective timing configuration
    Show,
    /// Set the duration range for a process type
    SetRange {
        /// Process type: unlock | blacklist
        #[arg(long)]
        process: String,
        #[arg(long)]
        min: u32,
        #[arg(long)]
        max: u32,
    },
    /// Set the step percentage split for one phase
    SetSplit {
        /// Process type: unlock | blacklist
        #[arg(long)]
        process: String,
        /// Phase number: 1 | 2
        #[arg(long)]
        phase: u8,
        /// Four step percentages summing to 100
        steps: Vec<u32>,
    },
    /// Enable run processing
    Enable,
    /// Disable run processing (new runs are rejected)
    Disable,
}

pub fn run(root: &Path, subcmd: TimingSubcommand, json: bool) -> Result<()> {
    match subcmd {
        TimingSubcommand::Show => show(root, json),
        TimingSubcommand::SetRange { process, min, max } => set_range(root, &process, min, max),
        TimingSubcommand::SetSplit {
            process,
            phase,
            steps,
        } => set_split(root, &process, phase, &steps),
        TimingSubcommand::Enable => set_enabled(root, true),
        TimingSubcommand::Disable => set_enabled(root, false),
    }
}

fn parse_phase(phase: u8) -> Result<ProcessPhase> {
    match phase {
        1 => Ok(ProcessPhase::One),
        2 => Ok(ProcessPhase::Two),
        other => Err(anyhow!("invalid phase {other}: expected 1 or 2")),
    }
}

fn show(root: &Path, json: bool) -> Result<()> {
    let cfg = TimingConfig::load_or_default(root);
    if json {
        print_json(&cfg)?;
        return Ok(());
    }
    println!("processing enabled: {}", cfg.enabled);
    for process in ProcessType::all() {
        let timing = cfg.timing_for(*process);
        println!("\n{process}:");
        println!("  duration: {}-{} minutes per phase", timing.min_minutes, timing.max_minutes);
        for phase in [ProcessPhase::One, ProcessPhase::Two] {
            let split = timing.split_for(phase);
            let [a, b, c, d] = split.percentages();
            println!("  phase {phase} split: {a}/{b}/{c}/{d}");
        }
    }
    Ok(())
}

fn set_range(root: &Path, process: &str, min: u32, max: u32) -> Result<()> {
    let process: ProcessType = process.parse().map_err(|e| anyhow!("{e}"))?;
    let mut cfg = TimingConfig::load_or_default(root);
    let timing = cfg.timing_for_mut(process);
    timing.min_minutes = min;
    timing.max_minutes = max;
    cfg.save(root)?;
    println!("{process}: duration range set to {min}-{max} minutes");
    Ok(())
}

fn set_split(root: &Path, process: &str, phase: u8, steps: &[u32]) -> Result<()> {
    let process: ProcessType = process.parse().map_err(|e| anyhow!("{e}"))?;
    let phase = parse_phase(phase)?;
    let [a, b, c, d] = <[u32; 4]>::try_from(steps)
        .map_err(|_| anyhow!("expected exactly 4 step percentages, got {}", steps.len()))?;

    let mut cfg = TimingConfig::load_or_default(root);
    let timing = cfg.timing_for_mut(process);
    match phase {
        ProcessPhase::One => timing.phase1 = PhaseSplit::new(a, b, c, d),
        ProcessPhase::Two => timing.phase2 = PhaseSplit::new(a, b, c, d),
    }
    cfg.save(root)?;
    println!("{process} phase {phase}: split set to {a}/{b}/{c}/{d}");
    Ok(())
}

fn set_enabled(root: &Path, enabled: bool) -> Result<()> {
    let mut cfg = TimingConfig::load_or_default(root);
    cfg.enabled = enabled;
    cfg.save(root)?;
    println!(
        "run processing {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
