use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use unlock_core::ticket::Ticket;
use unlock_core::types::{TicketKind, TicketPriority};
use unlock_core::UnlockError;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/tickets
pub async fn list_tickets(State(app): State<AppState>) -> Result<Json<Vec<Ticket>>, AppError> {
    let root = app.root.clone();
    let tickets = tokio::task::spawn_blocking(move || Ticket::list(&root))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(tickets))
}

#[derive(Deserialize)]
pub struct CreateTicketBody {
    pub user_id: String,
    pub kind: TicketKind,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
}

/// POST /api/tickets — general support ticket.
pub async fn create_ticket(
    State(app): State<AppState>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let root = app.root.clone();
    let ticket = tokio::task::spawn_blocking(move || {
        Ticket::create(
            &root,
            &body.user_id,
            body.kind,
            body.title,
            body.description,
            body.priority,
            None,
            None,
        )
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[derive(Deserialize)]
pub struct ComplaintBody {
    pub title: String,
    pub description: String,
}

/// POST /api/registered/{identifier}/complaint — the failure-screen handoff.
///
/// An unknown device is the caller's mistake and comes back 404. A storage
/// failure while writing the ticket is logged and swallowed: the customer has
/// already hit the scripted failure and gets the same terminal view either
/// way, so `submitted: false` is all the client needs.
pub async fn file_complaint(
    State(app): State<AppState>,
    Path(identifier): Path<String>,
    Json(body): Json<ComplaintBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let ident = identifier.clone();
    let result = tokio::task::spawn_blocking(move || {
        Ticket::file_complaint(&root, &ident, body.title, body.description)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    match result {
        Ok(ticket) => Ok(Json(serde_json::json!({
            "submitted": true,
            "ticket_id": ticket.id,
        }))),
        Err(e @ (UnlockError::DeviceNotFound(_) | UnlockError::UserNotFound(_))) => {
            Err(AppError(e.into()))
        }
        Err(e) => {
            tracing::warn!("complaint submission for '{identifier}' failed: {e}");
            Ok(Json(serde_json::json!({ "submitted": false })))
        }
    }
}

/// POST /api/tickets/{id}/close — admin triage.
pub async fn close_ticket(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, AppError> {
    let root = app.root.clone();
    let ticket = tokio::task::spawn_blocking(move || {
        let mut ticket = Ticket::load(&root, &id)?;
        ticket.close(&root)?;
        Ok::<_, unlock_core::UnlockError>(ticket)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(ticket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unlock_core::device::{CatalogDevice, RegisteredDevice};
    use unlock_core::types::TicketStatus;
    use unlock_core::user::UserAccount;

    const IMEI: &str = "356938035643809";

    fn seeded_app(dir: &tempfile::TempDir) -> AppState {
        CatalogDevice::create(dir.path(), "galaxy-s23", "Samsung", "Galaxy S23", 1).unwrap();
        let mut user = UserAccount::create(dir.path(), "alice", "a@example.com").unwrap();
        user.grant_credits(3);
        user.save(dir.path()).unwrap();
        RegisteredDevice::register(dir.path(), IMEI, "alice", "galaxy-s23").unwrap();
        AppState::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn complaint_creates_high_priority_ticket() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = seeded_app(&dir);

        let Json(body) = file_complaint(
            State(app.clone()),
            Path(IMEI.into()),
            Json(ComplaintBody {
                title: "Unlock failed".into(),
                description: "No refund offered".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["submitted"], true);

        let Json(tickets) = list_tickets(State(app)).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].kind, TicketKind::UnlockComplaint);
        assert_eq!(tickets[0].priority, TicketPriority::High);
        assert_eq!(tickets[0].imei.as_deref(), Some(IMEI));
    }

    #[tokio::test]
    async fn complaint_for_unknown_device_is_client_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppState::new(dir.path().to_path_buf());

        let result = file_complaint(
            State(app),
            Path("490154203237518".into()),
            Json(ComplaintBody {
                title: "t".into(),
                description: "d".into(),
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn close_ticket_flow() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = seeded_app(&dir);

        let (_, Json(ticket)) = create_ticket(
            State(app.clone()),
            Json(CreateTicketBody {
                user_id: "alice".into(),
                kind: TicketKind::Billing,
                title: "Missing credits".into(),
                description: "Paid but not credited".into(),
                priority: TicketPriority::Normal,
            }),
        )
        .await
        .unwrap();

        let Json(closed) = close_ticket(State(app), Path(ticket.id)).await.unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
    }
}
