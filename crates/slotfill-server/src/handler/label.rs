//! Slot labeling handler.
//!
//! Accepts free text with optional candidate entity types, runs the model and
//! answers with whole-word tokens and the entity spans found for each type.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use slotfill_core::{Prediction, Query, SlotFillingService};

use crate::extract::{Json, ValidateJson};
use crate::handler::Result;
use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

/// Tracing target for labeling operations.
const TRACING_TARGET: &str = "slotfill_server::handler::label";

/// Labels the text against the supplied (or default) candidate types.
#[tracing::instrument(skip_all)]
async fn label(
    State(slot_filling): State<SlotFillingService>,
    ValidateJson(query): ValidateJson<Query>,
) -> Result<(StatusCode, Json<Prediction>)> {
    tracing::debug!(
        target: TRACING_TARGET,
        text_len = query.text.len(),
        candidates = query.entity_types.as_ref().map_or(0, Vec::len),
        "Labeling request received"
    );

    let prediction = slot_filling.predict(&query).await?;
    Ok((StatusCode::OK, Json(prediction)))
}

fn label_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Label slots")
        .description(
            "Labels `text` against the candidate types in `entity_types`, each described \
             by the entry at the same position in `entity_descriptions`. When both lists \
             are omitted or empty the model's default label table is used. \
             `entities_dict` maps the index of a type in `slot_types` to half-open word \
             ranges `[start, end)` over `utterance_tokens`.",
        )
        .response::<200, Json<Prediction>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
}

/// Returns routes for slot labeling.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/label/", post_with(label, label_docs))
        .api_route("/label", post_with(label, label_docs))
        .with_path_items(|item| item.tag("Label"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use slotfill_core::Prediction;

    use crate::handler::test::{
        create_test_server, create_test_server_with_service, failing_service,
    };

    fn boston() -> Value {
        json!({
            "text": "book a flight to Boston",
            "entity_types": ["LOC"],
            "entity_descriptions": ["a city or place name"],
        })
    }

    #[tokio::test]
    async fn labels_supplied_candidates() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.post("/label/").json(&boston()).await;
        response.assert_status_ok();

        let prediction = response.json::<Prediction>();
        assert_eq!(
            prediction.utterance_tokens,
            ["book", "a", "flight", "to", "Boston"]
        );
        assert_eq!(prediction.slot_types, ["LOC"]);
        assert_eq!(prediction.entity_words(0), vec![&["Boston".to_string()][..]]);

        Ok(())
    }

    #[tokio::test]
    async fn spans_serialize_as_pairs() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.post("/label/").json(&boston()).await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "utterance_tokens": ["book", "a", "flight", "to", "Boston"],
            "entities_dict": { "0": [[4, 5]] },
            "slot_types": ["LOC"],
        }));

        Ok(())
    }

    #[tokio::test]
    async fn route_without_trailing_slash() -> anyhow::Result<()> {
        let server = create_test_server()?;
        server.post("/label").json(&boston()).await.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn omitted_candidates_use_defaults() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/label/")
            .json(&json!({ "text": "fly to new york tomorrow" }))
            .await;
        response.assert_status_ok();

        let prediction = response.json::<Prediction>();
        assert_eq!(prediction.slot_types, ["LOC", "DATE", "TIME", "ORG", "PER"]);
        assert_eq!(
            prediction.entity_words(0),
            vec![&["new".to_string(), "york".to_string()][..]]
        );
        assert_eq!(
            prediction.entity_words(1),
            vec![&["tomorrow".to_string()][..]]
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_candidates_use_defaults() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/label/")
            .json(&json!({
                "text": "fly to denver",
                "entity_types": [],
                "entity_descriptions": [],
            }))
            .await;
        response.assert_status_ok();

        let prediction = response.json::<Prediction>();
        assert_eq!(prediction.slot_types, ["LOC", "DATE", "TIME", "ORG", "PER"]);

        Ok(())
    }

    #[tokio::test]
    async fn mismatched_candidates_are_rejected() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/label/")
            .json(&json!({
                "text": "fly to denver",
                "entity_types": ["LOC", "DATE"],
                "entity_descriptions": ["a city or place name"],
            }))
            .await;
        response.assert_status_bad_request();

        let body = response.json::<Value>();
        assert_eq!(body["name"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("entity_types"));

        Ok(())
    }

    #[tokio::test]
    async fn one_sided_candidates_are_rejected() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/label/")
            .json(&json!({ "text": "fly to denver", "entity_types": ["LOC"] }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn blank_text_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server()?;

        for text in ["", "   "] {
            let response = server.post("/label/").json(&json!({ "text": text })).await;
            response.assert_status_bad_request();
        }

        Ok(())
    }

    #[tokio::test]
    async fn missing_text_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/label/")
            .json(&json!({ "entity_types": ["LOC"], "entity_descriptions": ["a place"] }))
            .await;
        response.assert_status_bad_request();
        assert!(response.json::<Value>()["context"].is_string());

        Ok(())
    }

    #[tokio::test]
    async fn wrong_content_type_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server()?;
        server
            .post("/label/")
            .text("book a flight to Boston")
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn spans_stay_within_tokens() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let utterances = [
            "alice flies united airlines from boston to san francisco next friday",
            "Boston, Boston and BOSTON!",
            "nothing to see here",
            "tonight at noon in denver",
        ];

        for text in utterances {
            let response = server.post("/label/").json(&json!({ "text": text })).await;
            response.assert_status_ok();

            let prediction = response.json::<Prediction>();
            let words = prediction.utterance_tokens.len();
            for (slot_type, spans) in &prediction.entities_dict {
                assert!(*slot_type < prediction.slot_types.len());
                assert!(spans.len() <= words);
                for span in spans {
                    assert!(span.start < span.end, "{text}: {span:?}");
                    assert!(span.end <= words, "{text}: {span:?}");
                }
            }
        }

        Ok(())
    }

    #[tokio::test]
    async fn model_failure_is_internal_error() -> anyhow::Result<()> {
        let server = create_test_server_with_service(failing_service())?;

        let response = server.post("/label/").json(&boston()).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json::<Value>()["name"], "inference_error");

        Ok(())
    }
}
