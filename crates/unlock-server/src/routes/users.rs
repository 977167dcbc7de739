use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use unlock_core::user::UserAccount;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserBody {
    pub id: String,
    pub email: String,
}

/// POST /api/users
pub async fn create_user(
    State(app): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<UserAccount>), AppError> {
    let root = app.root.clone();
    let user = tokio::task::spawn_blocking(move || UserAccount::create(&root, body.id, body.email))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserAccount>, AppError> {
    let root = app.root.clone();
    let user = tokio::task::spawn_blocking(move || UserAccount::load(&root, &id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct GrantCreditsBody {
    pub amount: u32,
}

/// POST /api/users/{id}/credits — admin credit grant.
pub async fn grant_credits(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<GrantCreditsBody>,
) -> Result<Json<UserAccount>, AppError> {
    let root = app.root.clone();
    let user = tokio::task::spawn_blocking(move || {
        let mut user = UserAccount::load(&root, &id)?;
        user.grant_credits(body.amount);
        user.save(&root)?;
        Ok::<_, unlock_core::UnlockError>(user)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(user))
}
