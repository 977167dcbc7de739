use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use unlock_core::device::RegisteredDevice;
use unlock_core::run::RunPlan;
use unlock_core::timing::TimingConfig;
use unlock_core::types::{ProcessType, RunOutcome};
use unlock_core::UnlockError;
use unlock_engine::StepEvent;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartRunBody {
    pub process: ProcessType,
}

/// GET /api/runs — identifiers with a live run.
pub async fn list_runs(State(app): State<AppState>) -> Json<Vec<String>> {
    Json(app.active_run_ids())
}

/// POST /api/runs/{identifier} — start an unlock or blacklist-removal run.
///
/// 409 if the device already has a live run (re-entry guard), 422 if the
/// admin disabled processing, 404 for unregistered devices. The sampled plan
/// is returned so clients can show the expected timeline.
pub async fn start_run(
    State(app): State<AppState>,
    Path(identifier): Path<String>,
    Json(body): Json<StartRunBody>,
) -> Result<(StatusCode, Json<RunPlan>), AppError> {
    // Claim the slot before the blocking checks; a check-then-insert across
    // the await would let two concurrent starts both pass.
    if !app.try_reserve_run(&identifier) {
        return Err(AppError::conflict(format!(
            "run already active for '{identifier}'"
        )));
    }

    let root = app.root.clone();
    let ident = identifier.clone();
    let process = body.process;
    let checked = tokio::task::spawn_blocking(move || {
        RegisteredDevice::load(&root, &ident)?;
        let cfg = TimingConfig::load_or_default(&root);
        if !cfg.enabled {
            return Err(UnlockError::TimingDisabled);
        }
        Ok(RunPlan::build(&cfg, process))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))
    .and_then(|r| r.map_err(AppError::from));
    let plan = match checked {
        Ok(plan) => plan,
        Err(e) => {
            app.remove_run(&identifier);
            return Err(e);
        }
    };

    let handle = Arc::new(unlock_engine::start(plan.clone(), app.speedup));
    // The pre-created receiver has buffered everything since start, so the
    // watcher cannot miss a terminal event even on heavily sped-up runs.
    let mut watcher_rx = handle.take_initial_rx();
    app.activate_run(identifier.clone(), handle);

    let watcher_app = app.clone();
    tokio::spawn(async move {
        loop {
            let outcome = match watcher_rx.recv().await {
                Ok(StepEvent::Failed { .. }) => RunOutcome::Failed,
                Ok(StepEvent::Cancelled) => RunOutcome::Cancelled,
                Ok(_) => continue,
                Err(_) => break,
            };
            let root = watcher_app.root.clone();
            let ident = identifier.clone();
            let persisted = tokio::task::spawn_blocking(move || {
                let mut device = RegisteredDevice::load(&root, &ident)?;
                device.record_outcome(&root, outcome)
            })
            .await;
            if let Ok(Err(e)) = persisted {
                tracing::warn!("failed to record run outcome for '{identifier}': {e}");
            }
            watcher_app.remove_run(&identifier);
            break;
        }
    });

    Ok((StatusCode::ACCEPTED, Json(plan)))
}

/// DELETE /api/runs/{identifier} — cancel a live run.
pub async fn cancel_run(
    State(app): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let handle = app
        .active_run(&identifier)
        .ok_or_else(|| AppError::not_found(format!("no active run for '{identifier}'")))?;
    handle.cancel();
    Ok(Json(serde_json::json!({ "cancelled": identifier })))
}

/// GET /api/runs/{identifier}/events — SSE stream of step events for a live
/// run. Subscribers joining mid-run see events from their join point onward.
pub async fn run_events(
    State(app): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let handle = app
        .active_run(&identifier)
        .ok_or_else(|| AppError::not_found(format!("no active run for '{identifier}'")))?;

    let rx = handle.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok().and_then(|event| {
            serde_json::to_string(&event)
                .ok()
                .map(|data| Ok::<Event, std::convert::Infallible>(Event::default().data(data)))
        })
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use unlock_core::device::CatalogDevice;
    use unlock_core::user::UserAccount;

    const IMEI: &str = "356938035643809";

    fn seed(dir: &tempfile::TempDir) {
        CatalogDevice::create(dir.path(), "galaxy-s23", "Samsung", "Galaxy S23", 1).unwrap();
        let mut user = UserAccount::create(dir.path(), "alice", "a@example.com").unwrap();
        user.grant_credits(5);
        user.save(dir.path()).unwrap();
        RegisteredDevice::register(dir.path(), IMEI, "alice", "galaxy-s23").unwrap();
    }

    async fn wait_for_outcome(app: &AppState) -> RunOutcome {
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let device = RegisteredDevice::load(&app.root, IMEI).unwrap();
            if let Some(outcome) = device.last_outcome {
                return outcome;
            }
        }
        panic!("run outcome never recorded");
    }

    #[tokio::test]
    async fn run_completes_with_failed_outcome() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);
        // Minute-scale plan compressed to milliseconds.
        let app = AppState::with_speedup(dir.path().to_path_buf(), 1_000_000);

        let (status, Json(plan)) = start_run(
            State(app.clone()),
            Path(IMEI.into()),
            Json(StartRunBody {
                process: ProcessType::Unlock,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(plan.process, ProcessType::Unlock);

        assert_eq!(wait_for_outcome(&app).await, RunOutcome::Failed);
        assert!(app.active_run_ids().is_empty());
    }

    #[tokio::test]
    async fn concurrent_start_is_conflict() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);
        // Real-time delays: the first run stays live for the whole test.
        let app = AppState::with_speedup(dir.path().to_path_buf(), 1);

        start_run(
            State(app.clone()),
            Path(IMEI.into()),
            Json(StartRunBody {
                process: ProcessType::Unlock,
            }),
        )
        .await
        .unwrap();

        let second = start_run(
            State(app.clone()),
            Path(IMEI.into()),
            Json(StartRunBody {
                process: ProcessType::Blacklist,
            }),
        )
        .await;
        assert!(second.is_err(), "second start must be rejected");

        // Cleanup so the background task stops quickly.
        cancel_run(State(app), Path(IMEI.into())).await.unwrap();
    }

    #[tokio::test]
    async fn simultaneous_starts_yield_single_run() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);
        let app = AppState::with_speedup(dir.path().to_path_buf(), 1);

        // Interleaved starts for the same device: the slot reservation must
        // let exactly one through even while the other is mid-validation.
        let first = start_run(
            State(app.clone()),
            Path(IMEI.into()),
            Json(StartRunBody {
                process: ProcessType::Unlock,
            }),
        );
        let second = start_run(
            State(app.clone()),
            Path(IMEI.into()),
            Json(StartRunBody {
                process: ProcessType::Unlock,
            }),
        );
        let (a, b) = tokio::join!(first, second);
        let successes = u8::from(a.is_ok()) + u8::from(b.is_ok());
        assert_eq!(successes, 1, "exactly one concurrent start must win");
        assert_eq!(app.active_run_ids(), vec![IMEI.to_string()]);

        cancel_run(State(app), Path(IMEI.into())).await.unwrap();
    }

    #[tokio::test]
    async fn cancel_records_cancelled_outcome() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);
        let app = AppState::with_speedup(dir.path().to_path_buf(), 1);

        start_run(
            State(app.clone()),
            Path(IMEI.into()),
            Json(StartRunBody {
                process: ProcessType::Blacklist,
            }),
        )
        .await
        .unwrap();
        cancel_run(State(app.clone()), Path(IMEI.into()))
            .await
            .unwrap();

        assert_eq!(wait_for_outcome(&app).await, RunOutcome::Cancelled);
    }

    #[tokio::test]
    async fn start_for_unregistered_device_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppState::new(dir.path().to_path_buf());
        let result = start_run(
            State(app.clone()),
            Path("490154203237518".into()),
            Json(StartRunBody {
                process: ProcessType::Unlock,
            }),
        )
        .await;
        assert!(result.is_err());
        // The failed start must release its reservation.
        assert!(app.active_run_ids().is_empty());
    }

    #[tokio::test]
    async fn start_rejected_when_timing_disabled() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);
        let mut cfg = TimingConfig::default();
        cfg.enabled = false;
        cfg.save(dir.path()).unwrap();

        let app = AppState::new(dir.path().to_path_buf());
        let result = start_run(
            State(app.clone()),
            Path(IMEI.into()),
            Json(StartRunBody {
                process: ProcessType::Unlock,
            }),
        )
        .await;
        assert!(result.is_err());
        assert!(app.active_run_ids().is_empty());
    }

    #[tokio::test]
    async fn cancel_without_active_run_is_404() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);
        let app = AppState::new(dir.path().to_path_buf());
        assert!(cancel_run(State(app), Path(IMEI.into())).await.is_err());
    }
}
