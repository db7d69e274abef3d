use anyhow::Result;
use cpuwatch_daemon::{
    autostart::Autostart,
    collector::LinuxProcessCollector,
    config::Config,
    engine::Engine,
    monitor::Monitor,
    notifier::DesktopNotifier,
    protocol::Response,
    service::{DaemonSink, DaemonState},
    socket::SocketServer,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("cpuwatch daemon starting...");

    // Load configuration
    let config_path = Config::config_path();
    let config = if config_path.exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        info!("No config file found, using defaults");
        Config::default()
    };

    let autostart = Autostart::for_current_user()
        .map_err(|e| warn!("Run on login toggle unavailable: {}", e))
        .ok();

    // Create socket server
    let socket_path = SocketServer::socket_path();
    let server = SocketServer::bind(&socket_path).await?;
    let broadcast_tx = server.broadcast_sender();

    let engine_config = config.engine_config();
    let desktop = config
        .general
        .desktop_notifications
        .then(|| DesktopNotifier::new(config.general.app_name.clone(), engine_config.duration_threshold));
    let sink = DaemonSink::new(desktop, broadcast_tx.clone());
    let monitor = Arc::new(Monitor::new(
        Arc::new(LinuxProcessCollector::new()),
        Engine::new(engine_config),
        Box::new(sink),
        config.tick_interval(),
    ));

    // Start monitoring loop
    let status_tx = broadcast_tx.clone();
    tokio::spawn(Arc::clone(&monitor).run(move |outcome| {
        let status = Response::Status { data: outcome.status.clone() };
        if let Ok(json) = serde_json::to_string(&status) {
            let _ = status_tx.send(json);
        }
    }));

    let state = Arc::new(DaemonState::new(Arc::clone(&monitor), config, autostart));

    info!("Daemon ready, listening for connections...");

    // Accept client connections until interrupted
    loop {
        tokio::select! {
            result = server.accept() => match result {
                Ok(stream) => server.spawn_client(stream, Arc::clone(&state)),
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                monitor.pause().await;
                break;
            }
        }
    }
    Ok(())
}
