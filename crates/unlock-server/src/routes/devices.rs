use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use unlock_core::device::{CatalogDevice, RegisteredDevice};

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/devices
pub async fn list_catalog(
    State(app): State<AppState>,
) -> Result<Json<Vec<CatalogDevice>>, AppError> {
    let root = app.root.clone();
    let devices = tokio::task::spawn_blocking(move || CatalogDevice::list(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(devices))
}

#[derive(Deserialize)]
pub struct CreateCatalogBody {
    pub slug: String,
    pub brand: String,
    pub model: String,
    pub credit_cost: u32,
}

/// POST /api/devices — admin catalog entry.
pub async fn create_catalog_entry(
    State(app): State<AppState>,
    Json(body): Json<CreateCatalogBody>,
) -> Result<(StatusCode, Json<CatalogDevice>), AppError> {
    let root = app.root.clone();
    let device = tokio::task::spawn_blocking(move || {
        CatalogDevice::create(&root, body.slug, body.brand, body.model, body.credit_cost)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((StatusCode::CREATED, Json(device)))
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RegisterBody {
    pub identifier: String,
    pub user_id: String,
    pub catalog_slug: String,
}

/// POST /api/register — validate the identifier, deduct the catalog price,
/// persist the registration. This is the only credit-deduction point; runs
/// on the registered device are free afterwards.
pub async fn register_device(
    State(app): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<RegisteredDevice>), AppError> {
    let root = app.root.clone();
    let device = tokio::task::spawn_blocking(move || {
        RegisteredDevice::register(&root, body.identifier, &body.user_id, &body.catalog_slug)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((StatusCode::CREATED, Json(device)))
}

/// GET /api/registered
pub async fn list_registered(
    State(app): State<AppState>,
) -> Result<Json<Vec<RegisteredDevice>>, AppError> {
    let root = app.root.clone();
    let devices = tokio::task::spawn_blocking(move || RegisteredDevice::list(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(devices))
}

/// GET /api/registered/{identifier}
pub async fn get_registered(
    State(app): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<RegisteredDevice>, AppError> {
    let root = app.root.clone();
    let device = tokio::task::spawn_blocking(move || RegisteredDevice::load(&root, &identifier))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unlock_core::user::UserAccount;

    const IMEI: &str = "356938035643809";

    fn app(dir: &tempfile::TempDir) -> AppState {
        AppState::new(dir.path().to_path_buf())
    }

    fn seed(dir: &tempfile::TempDir) {
        CatalogDevice::create(dir.path(), "galaxy-s23", "Samsung", "Galaxy S23", 3).unwrap();
        let mut user = UserAccount::create(dir.path(), "alice", "a@example.com").unwrap();
        user.grant_credits(10);
        user.save(dir.path()).unwrap();
    }

    #[tokio::test]
    async fn register_and_fetch() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);

        let (status, Json(device)) = register_device(
            State(app(&dir)),
            Json(RegisterBody {
                identifier: IMEI.into(),
                user_id: "alice".into(),
                catalog_slug: "galaxy-s23".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(device.credits_spent, 3);

        let Json(loaded) = get_registered(State(app(&dir)), Path(IMEI.into()))
            .await
            .unwrap();
        assert_eq!(loaded.model, "Galaxy S23");

        let Json(all) = list_registered(State(app(&dir))).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn register_bad_identifier_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(&dir);

        let result = register_device(
            State(app(&dir)),
            Json(RegisterBody {
                identifier: "bad id".into(),
                user_id: "alice".into(),
                catalog_slug: "galaxy-s23".into(),
            }),
        )
        .await;
        assert!(result.is_err());
    }
}
