//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Each concern is an extension trait on the router:
//! - [`RouterSecurityExt`]: CORS, security headers, body limits, compression
//! - [`RouterObservabilityExt`]: request IDs and trace spans
//! - [`RouterRecoveryExt`]: timeouts and panic recovery
//! - [`RouterOpenApiExt`]: OpenAPI document and Scalar UI
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use slotfill_server::handler::routes;
//! use slotfill_server::middleware::*;
//!
//! let app = routes()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state)
//!     .with_default_security()
//!     .with_observability()
//!     .with_default_recovery();
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, DEFAULT_MAX_BODY_SIZE, FrameOptions, ReferrerPolicy, RouterSecurityExt,
    SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
