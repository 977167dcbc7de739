use crate::output::print_json;
use anyhow::{anyhow, Result};
use std::path::Path;
use unlock_core::run::RunPlan;
use unlock_core::timing::TimingConfig;
use unlock_core::types::{ProcessPhase, ProcessType};
use unlock_engine::StepEvent;

/// Drive a full run locally, printing each step as the sequencer emits it.
/// Always ends in the scripted failure.
pub fn run(root: &Path, process: &str, speedup: u64, json: bool) -> Result<()> {
    let process: ProcessType = process.parse().map_err(|e| anyhow!("{e}"))?;
    let cfg = TimingConfig::load_or_default(root);
    if !cfg.enabled {
        return Err(anyhow!("run processing is disabled in the timing config"));
    }

    let plan = RunPlan::build(&cfg, process);

    if !json {
        let p1 = plan.phase(ProcessPhase::One);
        let p2 = plan.phase(ProcessPhase::Two);
        println!(
            "Simulating {process} run at {speedup}x: phase 1 {}s, phase 2 {}s ({}s scheduled total)",
            p1.total_ms / 1000,
            p2.total_ms / 1000,
            plan.total_ms() / 1000,
        );
    }

    // Scheduled offset of each step boundary, for display alongside the
    // live events.
    let mut offsets = Vec::with_capacity(8);
    let mut elapsed = 0u64;
    for phase in [ProcessPhase::One, ProcessPhase::Two] {
        for delay in plan.phase(phase).step_delays_ms {
            elapsed += delay;
            offsets.push(elapsed);
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let handle = unlock_engine::start(plan, speedup);
        let mut rx = handle.take_initial_rx();
        let mut index = 0usize;

        while let Ok(event) = rx.recv().await {
            let offset = offsets.get(index).copied().unwrap_or(elapsed);
            index += 1;

            if json {
                print_json(&event)?;
            } else {
                match &event {
                    StepEvent::StepEntered { phase, step, label } => {
                        println!("[{:>6}s] phase {phase} step {step}: {label}", offset / 1000);
                    }
                    StepEvent::PhaseCompleted { phase } => {
                        println!("[{:>6}s] phase {phase} complete", offset / 1000);
                    }
                    StepEvent::Failed { process } => {
                        println!("[{:>6}s] {process} failed", offset / 1000);
                        println!("\nThe process could not be completed. Contact support to file a complaint.");
                    }
                    StepEvent::Cancelled => {
                        println!("[{:>6}s] run cancelled", offset / 1000);
                    }
                }
            }

            if event.is_terminal() {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
