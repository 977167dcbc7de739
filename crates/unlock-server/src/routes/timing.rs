use axum::extract::State;
use axum::Json;
use unlock_core::timing::TimingConfig;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/timing — current timing config, defaults if none stored.
/// Load never fails; a missing or corrupt file is served as the defaults.
pub async fn get_timing(State(app): State<AppState>) -> Result<Json<TimingConfig>, AppError> {
    let root = app.root.clone();
    let cfg = tokio::task::spawn_blocking(move || TimingConfig::load_or_default(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(cfg))
}

/// PUT /api/timing — replace the timing config. Validated on write: splits
/// must sum to ~100 and min <= max, otherwise 400.
pub async fn put_timing(
    State(app): State<AppState>,
    Json(cfg): Json<TimingConfig>,
) -> Result<Json<TimingConfig>, AppError> {
    let root = app.root.clone();
    let cfg = tokio::task::spawn_blocking(move || {
        cfg.save(&root)?;
        Ok::<_, unlock_core::UnlockError>(cfg)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(cfg))
}
