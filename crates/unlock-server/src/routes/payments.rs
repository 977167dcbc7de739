use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use unlock_core::payment::PaymentRequest;
use unlock_core::types::PaymentMethod;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/payments
pub async fn list_payments(
    State(app): State<AppState>,
) -> Result<Json<Vec<PaymentRequest>>, AppError> {
    let root = app.root.clone();
    let payments = tokio::task::spawn_blocking(move || PaymentRequest::list(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(payments))
}

#[derive(Deserialize)]
pub struct CreatePaymentBody {
    pub user_id: String,
    pub method: PaymentMethod,
    pub reference: String,
    pub amount_usd: f64,
    pub credits: u32,
}

/// POST /api/payments — customer files a pending payment claim.
pub async fn create_payment(
    State(app): State<AppState>,
    Json(body): Json<CreatePaymentBody>,
) -> Result<(StatusCode, Json<PaymentRequest>), AppError> {
    let root = app.root.clone();
    let payment = tokio::task::spawn_blocking(move || {
        PaymentRequest::create(
            &root,
            &body.user_id,
            body.method,
            body.reference,
            body.amount_usd,
            body.credits,
        )
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST /api/payments/{id}/confirm — admin confirms and mints credits.
pub async fn confirm_payment(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentRequest>, AppError> {
    let root = app.root.clone();
    let payment = tokio::task::spawn_blocking(move || {
        let mut payment = PaymentRequest::load(&root, &id)?;
        payment.confirm(&root)?;
        Ok::<_, unlock_core::UnlockError>(payment)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(payment))
}

/// POST /api/payments/{id}/reject
pub async fn reject_payment(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentRequest>, AppError> {
    let root = app.root.clone();
    let payment = tokio::task::spawn_blocking(move || {
        let mut payment = PaymentRequest::load(&root, &id)?;
        payment.reject(&root)?;
        Ok::<_, unlock_core::UnlockError>(payment)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(payment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unlock_core::types::PaymentStatus;
    use unlock_core::user::UserAccount;

    fn app(dir: &tempfile::TempDir) -> AppState {
        UserAccount::create(dir.path(), "alice", "a@example.com").unwrap();
        AppState::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn confirm_flow_credits_user() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = app(&dir);

        let (_, Json(payment)) = create_payment(
            State(state.clone()),
            Json(CreatePaymentBody {
                user_id: "alice".into(),
                method: PaymentMethod::Crypto,
                reference: "0xabc".into(),
                amount_usd: 10.0,
                credits: 5,
            }),
        )
        .await
        .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        let Json(confirmed) = confirm_payment(State(state.clone()), Path(payment.id.clone()))
            .await
            .unwrap();
        assert_eq!(confirmed.status, PaymentStatus::Confirmed);
        assert_eq!(
            UserAccount::load(dir.path(), "alice").unwrap().credits,
            5
        );

        // Double-confirm is a conflict, not a second mint.
        assert!(confirm_payment(State(state), Path(payment.id))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn reject_flow() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = app(&dir);

        let (_, Json(payment)) = create_payment(
            State(state.clone()),
            Json(CreatePaymentBody {
                user_id: "alice".into(),
                method: PaymentMethod::Kofi,
                reference: "kofi-9".into(),
                amount_usd: 3.0,
                credits: 1,
            }),
        )
        .await
        .unwrap();

        let Json(rejected) = reject_payment(State(state), Path(payment.id))
            .await
            .unwrap();
        assert_eq!(rejected.status, PaymentStatus::Rejected);
        assert_eq!(UserAccount::load(dir.path(), "alice").unwrap().credits, 0);
    }
}
