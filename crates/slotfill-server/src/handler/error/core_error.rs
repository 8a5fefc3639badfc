//! Slot-filling error to HTTP error conversion.
//!
//! Invalid input becomes `400`, every model-side failure becomes `500`.
//! Startup and configuration errors never reach a handler, but map to a
//! plain internal error should one slip through.

use slotfill_core::ErrorKind as CoreErrorKind;

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for core error conversions.
const TRACING_TARGET: &str = "slotfill_server::handler::core";

impl From<slotfill_core::Error> for HttpError<'static> {
    fn from(error: slotfill_core::Error) -> Self {
        match error.kind {
            CoreErrorKind::InvalidInput => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Invalid labeling request"
                );
            }
            CoreErrorKind::NetworkError | CoreErrorKind::Timeout => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = ?error.kind,
                    "Model request failed"
                );
            }
            _ => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = ?error.kind,
                    "Labeling failed"
                );
            }
        }

        let message = error
            .message
            .clone()
            .unwrap_or_else(|| "Labeling failed".to_owned());

        match error.kind {
            CoreErrorKind::InvalidInput => ErrorKind::BadRequest
                .with_message(message)
                .with_resource("query"),

            CoreErrorKind::Inference | CoreErrorKind::Serialization => ErrorKind::Inference
                .with_message("Model output could not be used")
                .with_context(message),

            CoreErrorKind::Timeout => ErrorKind::Inference
                .with_message("Model did not respond in time")
                .with_context(message),

            CoreErrorKind::NetworkError => ErrorKind::Inference
                .with_message("Model is unreachable")
                .with_context(message),

            CoreErrorKind::Startup | CoreErrorKind::Configuration => {
                ErrorKind::InternalServerError.with_context(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_bad_request() {
        let error = slotfill_core::Error::invalid_input()
            .with_message("entity_types and entity_descriptions differ in length");
        let http = HttpError::from(error);

        assert_eq!(http.kind(), ErrorKind::BadRequest);
        assert_eq!(
            http.message(),
            Some("entity_types and entity_descriptions differ in length")
        );
    }

    #[test]
    fn model_failures_are_inference_errors() {
        for error in [
            slotfill_core::Error::inference(),
            slotfill_core::Error::timeout(),
            slotfill_core::Error::network_error(),
            slotfill_core::Error::serialization(),
        ] {
            let http = HttpError::from(error);
            assert_eq!(http.kind(), ErrorKind::Inference);
            assert!(http.context().is_some());
        }
    }

    #[test]
    fn startup_errors_are_internal() {
        let http = HttpError::from(slotfill_core::Error::startup());
        assert_eq!(http.kind(), ErrorKind::InternalServerError);
    }
}
