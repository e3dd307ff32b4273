use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use sea_orm::DatabaseConnection;

/// `GET /healthz`: liveness.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz`: ready once the database answers a ping.
pub async fn readyz(State(db): State<Arc<DatabaseConnection>>) -> StatusCode {
    match db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
