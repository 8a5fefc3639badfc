//! HTTP/HTTPS server startup and lifecycle.
//!
//! The protocol is picked at compile time: HTTPS with the `tls` feature,
//! plain HTTP otherwise.

#[cfg(not(feature = "tls"))]
mod http_server;
#[cfg(feature = "tls")]
mod https_server;
mod lifecycle;
mod shutdown;

use std::io;

use axum::Router;
#[cfg(not(feature = "tls"))]
use http_server::serve_http;
#[cfg(feature = "tls")]
use https_server::serve_https;
use shutdown::shutdown_signal;

use crate::config::ServerConfig;

/// Serves `app` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if TLS certificates cannot be loaded, the address
/// cannot be bound, or the server fails while running.
pub async fn serve(app: Router, config: ServerConfig) -> io::Result<()> {
    #[cfg(feature = "tls")]
    {
        serve_https(app, config).await
    }

    #[cfg(not(feature = "tls"))]
    {
        serve_http(app, config).await
    }
}
