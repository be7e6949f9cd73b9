use axum::{extract::State, Json};
use gabinete_core::error::AppError;

use crate::AppState;

/// Liveness plus a storage round trip.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.storage.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Storage health check failed");
        AppError::ServiceUnavailable {
            reason: "storage unavailable".to_string(),
            retry_after: Some(5),
        }
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "maintenance": state.maintenance.is_enabled(),
        "checks": {
            "storage": "up"
        }
    })))
}
