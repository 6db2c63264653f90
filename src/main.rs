//! This file defines the run-bmi-server binary entry point.

use std::sync::Arc;

use ::tracing::{event, Level};
use axum_server::Handle;
use expanduser::expanduser;

use bmi_relay::app;
use bmi_relay::app_state::AppState;
use bmi_relay::cli;
use bmi_relay::error::BmiError;
use bmi_relay::metrics;
use bmi_relay::registry;
use bmi_relay::server;
use bmi_relay::tracing;

/// Build the model and serve it until a shutdown signal arrives.
fn run(args: &cli::CommandLineArgs) -> Result<(), BmiError> {
    if let Some(path) = &args.path {
        std::env::set_current_dir(expanduser(path)?)?;
    }
    let model = registry::build(args.name.as_deref(), args.bmi_version)?;

    let listener = server::bind(&args.host, args.port)?;
    let port = listener.local_addr()?.port();
    event!(Level::INFO, host = %args.host, port, "starting BMI server");
    // Launchers and scripts read the chosen port from stdout.
    println!("{}", port);

    let state = Arc::new(AppState::new(model, args.debug));
    let service = app::service(state, args.max_message_size);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.workers)
        .enable_all()
        .build()?;
    runtime.block_on(async {
        // Catch ctrl+c and try to shutdown gracefully
        let handle = Handle::new();
        tokio::spawn(server::shutdown_signal(
            handle.clone(),
            args.graceful_shutdown_timeout,
        ));
        server::serve(listener, service, handle).await
    })?;
    event!(Level::INFO, port, "stopped BMI server");
    Ok(())
}

/// Application entry point
fn main() {
    let args = cli::parse();
    tracing::init_tracing(args.debug);
    metrics::register_metrics();
    if let Err(err) = run(&args) {
        event!(Level::ERROR, "{}", err);
        eprintln!("run-bmi-server: {}", err);
        std::process::exit(1);
    }
}
