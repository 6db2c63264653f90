//! Web server

use std::net::TcpListener;
use std::time::Duration;

use axum::ServiceExt;
use axum_server::Handle;
use tokio::signal;
use tracing::{event, Level};

/// Bind a listening socket.
///
/// Port 0 lets the operating system pick a free port, read it back with
/// [TcpListener::local_addr].
///
/// # Arguments
///
/// * `host`: IP address or host name to listen on
/// * `port`: Port to listen on
pub fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind((host, port))?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Serve the BMI service until `handle` is shut down
///
/// # Arguments
///
/// * `listener`: Bound socket from [bind]
/// * `service`: The [crate::app::Service] to serve
/// * `handle`: Handle used to shut the server down
pub async fn serve(
    listener: TcpListener,
    service: crate::app::Service,
    handle: Handle,
) -> std::io::Result<()> {
    // run HTTP server with hyper
    axum_server::from_tcp(listener)
        .handle(handle)
        .serve(service.into_make_service())
        .await
}

/// Graceful shutdown handler
///
/// Installs signal handlers to catch Ctrl-C or SIGTERM and trigger a graceful shutdown.
pub async fn shutdown_signal(handle: Handle, timeout: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    event!(Level::INFO, "signal received, starting graceful shutdown");
    // Force shutdown if graceful shutdown takes longer than the timeout
    handle.graceful_shutdown(Some(Duration::from_secs(timeout)));
}
