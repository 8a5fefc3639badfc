//! HTTPS server using rustls.

use std::io;
use std::path::Path;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;

use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;
use crate::server::lifecycle::serve_with_shutdown;
use crate::server::shutdown_signal;

/// Serves `app` over HTTPS with the configured certificate and key.
///
/// Without both paths the server falls back to plain HTTP through
/// `axum-server`, so a `tls` build still runs behind a terminating proxy.
pub async fn serve_https(app: Router, server_config: ServerConfig) -> io::Result<()> {
    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();
    let paths = server_config
        .tls_cert_path
        .clone()
        .zip(server_config.tls_key_path.clone());

    if let Some((cert_path, key_path)) = &paths {
        validate_tls_file(cert_path, "Certificate")?;
        validate_tls_file(key_path, "Private key")?;
    }

    serve_with_shutdown(&server_config, move || async move {
        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            shutdown_signal(shutdown_timeout).await;
            shutdown_handle.graceful_shutdown(Some(shutdown_timeout));
        });

        let Some((cert_path, key_path)) = paths else {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_STARTUP,
                addr = %server_addr,
                "No TLS certificate configured, serving plain HTTP"
            );

            return axum_server::bind(server_addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await;
        };

        let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Failed to load TLS certificates: {e}"),
                )
            })?;

        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            cert_path = %cert_path.display(),
            "HTTPS server bound and ready"
        );

        axum_server::bind_rustls(server_addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
    })
    .await
}

/// Checks that a certificate or key file exists and is not empty.
fn validate_tls_file(path: &Path, file_type: &str) -> io::Result<()> {
    let metadata = std::fs::metadata(path).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Cannot read {} file {}: {}", file_type, path.display(), err),
        )
    })?;

    if !metadata.is_file() || metadata.len() == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} file is empty or not a file: {}", file_type, path.display()),
        ));
    }

    Ok(())
}
