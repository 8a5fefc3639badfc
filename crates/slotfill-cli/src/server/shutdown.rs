//! Process signals that stop the server.

use std::future::{Future, pending};
use std::io;
use std::time::Duration;

#[cfg(unix)]
use tokio::signal::unix;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Signal that asked the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGINT or Ctrl+C.
    Interrupt,
    /// SIGTERM, as sent by container runtimes.
    Terminate,
}

impl StopSignal {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Resolves once the process is asked to stop.
///
/// In-flight labeling requests then get `grace` to finish.
pub async fn shutdown_signal(grace: Duration) {
    let signal = tokio::select! {
        () = listen(StopSignal::Interrupt, interrupt()) => StopSignal::Interrupt,
        () = listen(StopSignal::Terminate, terminate()) => StopSignal::Terminate,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = signal.as_str(),
        grace_secs = grace.as_secs(),
        "Stopping, draining in-flight labeling requests"
    );
}

/// Waits for `signal`. A handler that cannot be installed never fires.
async fn listen(name: StopSignal, signal: impl Future<Output = io::Result<()>>) {
    if let Err(error) = signal.await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            signal = name.as_str(),
            error = %error,
            "Cannot listen for signal"
        );
        pending::<()>().await;
    }
}

async fn interrupt() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(unix)]
async fn terminate() -> io::Result<()> {
    let mut stream = unix::signal(unix::SignalKind::terminate())?;
    stream.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> io::Result<()> {
    pending().await
}

#[cfg(test)]
mod tests {
    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn delivered_signal_resolves() {
        let heard = timeout(
            Duration::from_millis(100),
            listen(StopSignal::Interrupt, async { Ok(()) }),
        )
        .await;
        assert!(heard.is_ok());
    }

    #[tokio::test]
    async fn uninstallable_handler_never_fires() {
        let heard = timeout(
            Duration::from_millis(100),
            listen(StopSignal::Terminate, async {
                Err(io::Error::other("signal driver unavailable"))
            }),
        )
        .await;
        assert!(heard.is_err());
    }

    #[test]
    fn signal_names() {
        assert_eq!(StopSignal::Interrupt.as_str(), "SIGINT");
        assert_eq!(StopSignal::Terminate.as_str(), "SIGTERM");
    }
}
