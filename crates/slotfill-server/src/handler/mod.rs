//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use slotfill_core::SlotFillingService;
//! use slotfill_server::handler::routes;
//! use slotfill_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use slotfill_server::service::ServiceState;
//!
//! let state = ServiceState::new(SlotFillingService::from_provider(provider));
//! let app = routes()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state);
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod health;
mod label;
mod response;
mod root;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{ErrorResponse, RootResponse};
use crate::service::ServiceState;

#[inline]
async fn not_found() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(root::routes())
        .merge(label::routes())
        .merge(health::routes())
        .fallback(not_found)
}

#[cfg(test)]
pub(crate) mod test {
    use aide::axum::ApiRouter;
    use axum_test::TestServer;
    use slotfill_core::label::{LabelSet, ModelOutput, TypeDescription};
    use slotfill_core::{Error, ServiceHealth, SlotFillingProvider, SlotFillingService};

    use crate::handler::routes;
    use crate::middleware::{OpenApiConfig, RouterOpenApiExt};
    use crate::service::ServiceState;

    /// Returns a new [`TestServer`] with the given router and the mock model.
    pub fn create_test_server_with_router(
        router: ApiRouter<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        create_test_server_with_state(router, ServiceState::mock())
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router
            .with_open_api(OpenApiConfig::default())
            .with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with all routes and the given model.
    pub fn create_test_server_with_service(
        slot_filling: SlotFillingService,
    ) -> anyhow::Result<TestServer> {
        create_test_server_with_state(routes(), ServiceState::new(slot_filling))
    }

    /// Returns a new [`TestServer`] with all routes and the mock model.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with_router(routes())
    }

    /// A model whose backend is gone: labeling and health checks both fail.
    struct FailingProvider {
        defaults: LabelSet,
    }

    #[async_trait::async_trait]
    impl SlotFillingProvider for FailingProvider {
        async fn label(
            &self,
            _text: &str,
            _type_descriptions: &[TypeDescription],
        ) -> slotfill_core::Result<ModelOutput> {
            Err(Error::inference().with_message("model crashed"))
        }

        fn default_label_set(&self) -> &LabelSet {
            &self.defaults
        }

        async fn health_check(&self) -> slotfill_core::Result<ServiceHealth> {
            Err(Error::network_error().with_message("connection refused"))
        }
    }

    /// Returns a service backed by a model that always fails.
    pub fn failing_service() -> SlotFillingService {
        SlotFillingService::from_provider(FailingProvider {
            defaults: LabelSet::default(),
        })
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server()?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/predict").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["name"], "not_found");

        Ok(())
    }

    #[tokio::test]
    async fn serves_openapi_document() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document = response.json::<serde_json::Value>();
        assert!(document["paths"].get("/label/").is_some());
        assert!(document["paths"].get("/health").is_some());

        Ok(())
    }
}
