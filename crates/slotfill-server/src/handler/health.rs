//! Model health handler.
//!
//! Reports whether the model backend can currently serve labeling requests,
//! so load balancers can take an instance out of rotation.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use slotfill_core::{ServiceHealth, SlotFillingService};

use crate::extract::Json;
use crate::service::ServiceState;

/// Tracing target for health operations.
const TRACING_TARGET: &str = "slotfill_server::handler::health";

#[tracing::instrument(skip_all)]
async fn health_status(
    State(slot_filling): State<SlotFillingService>,
) -> (StatusCode, Json<ServiceHealth>) {
    let health = slot_filling.health_check().await;

    let status_code = if health.is_available() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status = ?health.status,
        response_ms = health.response_ms,
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    (status_code, Json(health))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get model health")
        .description(
            "Probes the model backend. Answers `503` when the backend is unhealthy; \
             a degraded backend still answers `200`.",
        )
        .response::<200, Json<ServiceHealth>>()
        .response::<503, Json<ServiceHealth>>()
}

/// Returns routes for health monitoring.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Health"))
}
