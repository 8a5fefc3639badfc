//! Validated JSON extractor with automatic validation.
//!
//! This module provides [`ValidateJson`], an enhanced JSON extractor that
//! combines deserialization with automatic validation using the `validator` crate.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// Tracing target for request validation.
const TRACING_TARGET: &str = "slotfill_server::extract::validate";

/// Key under which `validator` files struct-level errors.
const STRUCT_LEVEL_FIELD: &str = "__all__";

/// JSON extractor that runs [`Validate`] on the deserialized value.
///
/// Also see [`Json`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Creates a new instance of [`ValidateJson`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self::new(data))
    }
}

/// Formats length validation errors.
fn format_length_error(
    field: &str,
    params: &HashMap<Cow<'static, str>, serde_json::Value>,
) -> String {
    let number = |key: &str| params.get(key).and_then(serde_json::Value::as_u64);

    match (number("min"), number("max")) {
        (Some(min), Some(max)) => format!(
            "Field '{}' must have between {} and {} items",
            field, min, max
        ),
        (Some(min), None) => format!("Field '{}' must have at least {} items", field, min),
        (None, Some(max)) => format!("Field '{}' must have at most {} items", field, max),
        _ => format!("Field '{}' has invalid length", field),
    }
}

/// Formats one validation error as a user-facing sentence.
fn format_validation_error(field: &str, error: &ValidationError) -> String {
    match (field, &error.message) {
        (STRUCT_LEVEL_FIELD, Some(message)) => message.to_string(),
        (STRUCT_LEVEL_FIELD, None) => format!("Request failed validation: {}", error.code),
        (_, Some(message)) => format!("Field '{}' {}", field, message),
        (_, None) => match error.code.as_ref() {
            "required" => format!("Field '{}' is required and cannot be empty", field),
            "length" => format_length_error(field, &error.params),
            code => format!("Field '{}' failed validation: {}", field, code),
        },
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields = field_errors.keys().collect::<Vec<_>>();
        // Struct-level errors read best after the per-field ones.
        fields.sort_by_key(|field| (**field == STRUCT_LEVEL_FIELD, field.to_string()));

        let error_messages = fields
            .into_iter()
            .flat_map(|field| {
                field_errors[field]
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect::<Vec<_>>();

        let user_message = match error_messages.as_slice() {
            [] => "Validation failed".to_string(),
            [single_error] => single_error.clone(),
            multiple => multiple.join(". "),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            errors = ?field_errors,
            "Request validation failed"
        );

        ErrorKind::BadRequest
            .with_message(user_message)
            .with_resource("query")
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}
