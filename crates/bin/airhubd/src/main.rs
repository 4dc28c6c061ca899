//! # airhubd — airhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`airhub.toml`, env vars) and install the tracing
//!   subscriber
//! - Construct the device connector and the state bus (adapters)
//! - Construct the fan service and set every configured device up
//! - Poll every device on a fixed interval
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It only wires things together; domain logic lives in `airhub-domain` and `airhub-app`.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use airhub_adapter_http_axum::router;
use airhub_adapter_http_axum::state::AppState;
use airhub_adapter_virtual::{FaultMode, VirtualConnector};
use airhub_app::services::fan_device::Outcome;
use airhub_app::services::fan_service::FanService;
use airhub_app::state_bus::StateBus;

use crate::config::{Config, SimulatedFaults};

type Service = FanService<VirtualConnector, Arc<StateBus>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Adapters
    let connector = config
        .devices
        .iter()
        .fold(VirtualConnector::default(), |connector, device| {
            match device.simulate_faults {
                Some(fault) => connector.with_fault(&device.host, fault_mode(fault)),
                None => connector,
            }
        });
    let state_bus = Arc::new(StateBus::new(256));
    tokio::spawn(trace_snapshots(Arc::clone(&state_bus)));

    // Services
    let service = Arc::new(FanService::new(connector, state_bus));
    for device in &config.devices {
        match service.setup_device(device.settings()?).await {
            Ok(fan) => tracing::info!(entity_id = %fan.entity_id, state = %fan.state, "fan ready"),
            Err(err) => tracing::error!(host = %device.host, error = %err, "device setup failed"),
        }
    }
    if service.devices().is_empty() {
        tracing::warn!("no device managed, add [[devices]] entries to airhub.toml");
    }
    let poller = tokio::spawn(poll_loop(Arc::clone(&service), config.poll_interval()));

    // HTTP
    let app = router::build(AppState::from_arc(service));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "airhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    poller.abort();
    tracing::info!("airhubd stopped");

    Ok(())
}

fn fault_mode(fault: SimulatedFaults) -> FaultMode {
    match fault {
        SimulatedFaults::Offline => FaultMode::Offline,
        SimulatedFaults::Rejecting => FaultMode::Rejecting,
    }
}

async fn poll_loop(service: Arc<Service>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // setup already polled every device once
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let results = service.poll_all().await;
        let failed = results
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Outcome::Failed(_)))
            .count();
        tracing::debug!(polled = results.len(), failed, "poll cycle complete");
    }
}

async fn trace_snapshots(state_bus: Arc<StateBus>) {
    let mut receiver = state_bus.subscribe();
    loop {
        match receiver.recv().await {
            Ok(fan) => tracing::trace!(
                entity_id = %fan.entity_id,
                state = %fan.state,
                speed = ?fan.speed,
                "state published"
            ),
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "state trace lagging");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
