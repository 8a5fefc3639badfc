//! Labeling request and response payloads.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::label::{EntitiesDict, LabelSet};
use crate::Result;

/// A labeling request: free text plus optional candidate entity types.
///
/// `entity_types` and `entity_descriptions` are paired by position. When
/// both are omitted or empty the model's default label set is used.
///
/// # Example
///
/// ```json
/// {
///   "text": "book a flight to Boston",
///   "entity_types": ["LOC"],
///   "entity_descriptions": ["a city or place name"]
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[validate(schema(function = "validate_candidates", skip_on_field_errors = false))]
pub struct Query {
    /// Utterance to label.
    #[validate(custom(function = "validate_text"))]
    pub text: String,

    /// Candidate entity type names, e.g. `["LOC", "DATE"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_types: Option<Vec<String>>,

    /// Natural-language description of each candidate type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_descriptions: Option<Vec<String>>,
}

impl Query {
    /// Creates a query that labels against the default label set.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Sets the candidate types and their descriptions.
    pub fn with_candidates<T, D>(mut self, types: T, descriptions: D) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        self.entity_types = Some(types.into_iter().map(Into::into).collect());
        self.entity_descriptions = Some(descriptions.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true when neither candidate list carries any item.
    pub fn uses_default_labels(&self) -> bool {
        let is_empty = |list: &Option<Vec<String>>| list.as_ref().is_none_or(Vec::is_empty);
        is_empty(&self.entity_types) && is_empty(&self.entity_descriptions)
    }

    /// Returns the candidates supplied with the request, if any.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when the two lists differ in length,
    /// including when only one of them is supplied.
    pub fn candidates(&self) -> Result<Option<LabelSet>> {
        if self.uses_default_labels() {
            return Ok(None);
        }

        let types = self.entity_types.as_deref().unwrap_or_default();
        let descriptions = self.entity_descriptions.as_deref().unwrap_or_default();
        LabelSet::from_pairs(types, descriptions).map(Some)
    }
}

fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("must contain at least one non-whitespace character".into());
        return Err(error);
    }

    Ok(())
}

fn validate_candidates(query: &Query) -> Result<(), ValidationError> {
    match query.candidates() {
        Ok(_) => Ok(()),
        Err(err) => {
            let mut error = ValidationError::new("candidates_mismatch");
            error.message = Some(err.message().to_owned().into());
            Err(error)
        }
    }
}

/// Labeling result for one utterance.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Prediction {
    /// Whole-word tokens of the utterance, as produced by the model's tokenizer.
    pub utterance_tokens: Vec<String>,

    /// Entity spans `[start, end)` over `utterance_tokens`, keyed by the
    /// index of their type in `slot_types`.
    #[cfg_attr(
        feature = "schema",
        schemars(with = "std::collections::BTreeMap<usize, Vec<(usize, usize)>>")
    )]
    pub entities_dict: EntitiesDict,

    /// Entity types the keys of `entities_dict` refer to.
    pub slot_types: Vec<String>,
}

impl Prediction {
    /// Returns the words covered by every span of one entity type.
    pub fn entity_words(&self, slot_type: usize) -> Vec<&[String]> {
        self.entities_dict
            .get(&slot_type)
            .map(|spans| {
                spans
                    .iter()
                    .map(|span| span.words(&self.utterance_tokens))
                    .collect()
            })
            .unwrap_or_default()
    }
}
