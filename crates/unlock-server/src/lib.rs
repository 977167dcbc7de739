pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf, speedup: u64) -> Router {
    let app_state = state::AppState::with_speedup(root, speedup);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Config
        .route("/api/config", get(routes::config::get_config))
        // Timing (admin)
        .route("/api/timing", get(routes::timing::get_timing))
        .route("/api/timing", put(routes::timing::put_timing))
        // Users
        .route("/api/users", post(routes::users::create_user))
        .route("/api/users/{id}", get(routes::users::get_user))
        .route("/api/users/{id}/credits", post(routes::users::grant_credits))
        // Device catalog
        .route("/api/devices", get(routes::devices::list_catalog))
        .route("/api/devices", post(routes::devices::create_catalog_entry))
        // Registration
        .route("/api/register", post(routes::devices::register_device))
        .route("/api/registered", get(routes::devices::list_registered))
        .route(
            "/api/registered/{identifier}",
            get(routes::devices::get_registered),
        )
        .route(
            "/api/registered/{identifier}/complaint",
            post(routes::tickets::file_complaint),
        )
        // Runs
        .route("/api/runs", get(routes::runs::list_runs))
        .route("/api/runs/{identifier}", post(routes::runs::start_run))
        .route("/api/runs/{identifier}", delete(routes::runs::cancel_run))
        .route(
            "/api/runs/{identifier}/events",
            get(routes::runs::run_events),
        )
        // Payments
        .route("/api/payments", get(routes::payments::list_payments))
        .route("/api/payments", post(routes::payments::create_payment))
        .route(
            "/api/payments/{id}/confirm",
            post(routes::payments::confirm_payment),
        )
        .route(
            "/api/payments/{id}/reject",
            post(routes::payments::reject_payment),
        )
        // Tickets
        .route("/api/tickets", get(routes::tickets::list_tickets))
        .route("/api/tickets", post(routes::tickets::create_ticket))
        .route("/api/tickets/{id}/close", post(routes::tickets::close_ticket))
        .layer(cors)
        .with_state(app_state)
}

/// Start the unlockhub API server.
pub async fn serve(root: PathBuf, port: u16, speedup: u64) -> anyhow::Result<()> {
    let app = build_router(root, speedup);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("unlockhub API listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
