#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use slotfill_server::handler::routes;
use slotfill_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
use slotfill_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "slotfill_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "slotfill_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "slotfill_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    let message = format!("{error:#}");
    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %message,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {message}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let slot_filling = cli.model.load_service().await?;
    let state = ServiceState::new(slot_filling);
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, security headers, body limit, compression
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_open_api(middleware.openapi.clone())
        .with_state(state)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use slotfill_core::SlotFillingService;
    use slotfill_reqwest::{RemoteModel, RemoteModelConfig};
    use slotfill_server::middleware::RecoveryConfig;

    use super::*;

    fn server() -> anyhow::Result<TestServer> {
        let state = ServiceState::new(SlotFillingService::mock());
        let router = create_router(state, &MiddlewareConfig::default());
        Ok(TestServer::new(router)?)
    }

    #[tokio::test]
    async fn root_answers_through_full_stack() -> anyhow::Result<()> {
        let server = server()?;

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "Hello": "World" }));
        assert!(!response.header("x-request-id").is_empty());
        response.assert_header("x-content-type-options", "nosniff");

        Ok(())
    }

    #[tokio::test]
    async fn labels_through_full_stack() -> anyhow::Result<()> {
        let server = server()?;

        let response = server
            .post("/label/")
            .json(&json!({
                "text": "book a flight to Boston",
                "entity_types": ["LOC"],
                "entity_descriptions": ["a city or place name"],
            }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["slot_types"], json!(["LOC"]));
        assert_eq!(body["utterance_tokens"][4], "Boston");
        assert_eq!(body["entities_dict"]["0"], json!([[4, 5]]));

        Ok(())
    }

    /// A sidecar that serves its label table but never answers in time.
    async fn spawn_hung_sidecar() -> anyhow::Result<RemoteModelConfig> {
        let sidecar = Router::new()
            .route("/slot_descriptions", get(|| async { "LOC\ta city\n" }))
            .route(
                "/predict",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    StatusCode::OK
                }),
            );

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, sidecar).await });

        Ok(RemoteModelConfig::new(format!("http://{addr}/").parse()?).with_timeout_secs(1))
    }

    #[tokio::test]
    async fn hung_model_is_inference_error() -> anyhow::Result<()> {
        let model = RemoteModel::load(spawn_hung_sidecar().await?).await?;
        let state = ServiceState::new(model.into_service());
        let middleware = MiddlewareConfig {
            recovery: RecoveryConfig::with_timeout_secs(5),
            ..MiddlewareConfig::default()
        };
        let server = TestServer::new(create_router(state, &middleware))?;

        let response = server
            .post("/label/")
            .json(&json!({
                "text": "book a flight to Boston",
                "entity_types": ["LOC"],
                "entity_descriptions": ["a city or place name"],
            }))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json::<Value>()["name"], "inference_error");

        Ok(())
    }

    #[tokio::test]
    async fn serves_api_reference() -> anyhow::Result<()> {
        let server = server()?;
        server.get("/api/openapi.json").await.assert_status_ok();
        server.get("/api/scalar").await.assert_status_ok();
        Ok(())
    }
}
