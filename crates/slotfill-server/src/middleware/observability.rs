//! Observability middleware for request tracing.
//!
//! Every request gets an `x-request-id` (generated unless the client sent
//! one) that is recorded on its trace span and echoed back on the response.

use axum::Router;
use axum::http::header::{self, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers observability middleware for request tracing and logging.
    ///
    /// This middleware stack generates unique request IDs, adds structured
    /// logging spans for each request, propagates request IDs to responses,
    /// and marks sensitive headers for redaction in logs.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        self.layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    fn router() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .with_observability()
    }

    #[tokio::test]
    async fn generates_request_id() -> anyhow::Result<()> {
        let server = TestServer::new(router())?;

        let response = server.get("/").await;
        response.assert_status_ok();

        let request_id = response.header(REQUEST_ID_HEADER);
        assert!(!request_id.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn propagates_client_request_id() -> anyhow::Result<()> {
        let server = TestServer::new(router())?;

        let response = server
            .get("/")
            .add_header(REQUEST_ID_HEADER, "label-42")
            .await;
        response.assert_header(REQUEST_ID_HEADER, "label-42");

        Ok(())
    }
}
