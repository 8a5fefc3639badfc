//! Root acknowledgement handler.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;

use crate::extract::Json;
use crate::handler::response::RootResponse;
use crate::service::ServiceState;

/// Answers with a fixed acknowledgement; used as a liveness probe.
#[tracing::instrument(skip_all)]
async fn hello() -> Json<RootResponse> {
    Json(RootResponse::default())
}

fn hello_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Acknowledge")
        .description("Always returns `{\"Hello\": \"World\"}`. Does not touch the model.")
        .response::<200, Json<RootResponse>>()
}

/// Returns the root route.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/", get_with(hello, hello_docs))
        .with_path_items(|item| item.tag("Root"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn returns_hello_world() -> anyhow::Result<()> {
        let server = create_test_server()?;

        for _ in 0..3 {
            let response = server.get("/").await;
            response.assert_status_ok();
            response.assert_json(&json!({ "Hello": "World" }));
        }

        Ok(())
    }

    #[tokio::test]
    async fn unaffected_by_labeling_traffic() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let requests = [
            json!({ "text": "book a flight to Boston" }),
            json!({ "text": "" }),
            json!({ "text": "fly to denver", "entity_types": ["LOC"] }),
        ];

        for body in requests {
            server.post("/label/").json(&body).await;

            let response = server.get("/").await;
            response.assert_status_ok();
            response.assert_json(&json!({ "Hello": "World" }));
        }

        Ok(())
    }
}
