//! JSON bodies exchanged with the model-serving sidecar.

use serde::{Deserialize, Serialize};
use slotfill_core::TypeDescription;
use slotfill_core::label::{IobTag, ModelOutput};

use crate::error::{Error, Result};

/// Body of `POST /predict`.
#[derive(Debug, Serialize)]
pub(crate) struct PredictRequest<'a> {
    pub query: &'a str,
    pub types_descriptions: &'a [TypeDescription],
}

/// A sequence the sidecar may return either flat or wrapped in a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Rows<T> {
    Single(Vec<T>),
    Batch(Vec<Vec<T>>),
}

impl<T> Rows<T> {
    /// Returns the flat sequence, or the first row of a batch.
    fn into_first(self, field: &str) -> Result<Vec<T>> {
        match self {
            Self::Single(row) => Ok(row),
            Self::Batch(rows) => rows
                .into_iter()
                .next()
                .ok_or_else(|| Error::Malformed(format!("`{field}` is an empty batch"))),
        }
    }
}

/// Body returned by `POST /predict`.
#[derive(Debug, Deserialize)]
pub(crate) struct PredictResponse {
    pub tokens: Rows<String>,
    pub slot_classes: Rows<usize>,
    pub iob_slot_classes: Rows<IobTag>,
}

impl PredictResponse {
    pub fn into_output(self) -> Result<ModelOutput> {
        Ok(ModelOutput::new(
            self.tokens.into_first("tokens")?,
            self.slot_classes.into_first("slot_classes")?,
            self.iob_slot_classes.into_first("iob_slot_classes")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let descriptions = [TypeDescription::new("LOC", "a place")];
        let body = PredictRequest {
            query: "to boston",
            types_descriptions: &descriptions,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "to boston", "types_descriptions": ["LOC\ta place"]})
        );
    }

    #[test]
    fn accepts_flat_response() {
        let body = r#"{"tokens":["[CLS]","boston","[SEP]"],"slot_classes":[0,0,0],"iob_slot_classes":[0,1,0]}"#;
        let output = serde_json::from_str::<PredictResponse>(body)
            .unwrap()
            .into_output()
            .unwrap();

        assert_eq!(output.tokens, ["[CLS]", "boston", "[SEP]"]);
        assert_eq!(output.iob_tags[1], IobTag::Begin);
    }

    #[test]
    fn takes_first_row_of_batched_response() {
        let body = r#"{"tokens":[["[CLS]","hi","[SEP]"],["[CLS]","[SEP]"]],"slot_classes":[[0,0,0]],"iob_slot_classes":[[0,0,0]]}"#;
        let output = serde_json::from_str::<PredictResponse>(body)
            .unwrap()
            .into_output()
            .unwrap();

        assert_eq!(output.tokens, ["[CLS]", "hi", "[SEP]"]);
    }

    #[test]
    fn empty_sequences_are_flat() {
        let body = r#"{"tokens":[],"slot_classes":[],"iob_slot_classes":[]}"#;
        let output = serde_json::from_str::<PredictResponse>(body)
            .unwrap()
            .into_output()
            .unwrap();
        assert!(output.tokens.is_empty());
    }

    #[test]
    fn rejects_unknown_iob_tag() {
        let body = r#"{"tokens":["a"],"slot_classes":[0],"iob_slot_classes":[7]}"#;
        assert!(serde_json::from_str::<PredictResponse>(body).is_err());
    }
}
