//! RenoVision backend server.

use std::path::Path;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use renovision::cli::Cli;
use renovision::config::{self, Config};
use renovision::context::ServiceContext;
use renovision::error::ServerError;
use renovision::server::{build_router, AppState, VERSION};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    // `.env` may carry RUST_LOG as well as the service settings.
    let dotenv = dotenvy::dotenv();
    init_tracing(&cli);
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable .env"),
    }

    if let Err(e) = run(cli).await {
        error!(error = %e, "renovision stopped");
        process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if cli.log_json {
        tracing_subscriber::registry().with(env_filter).with(fmt.json()).init();
    } else {
        tracing_subscriber::registry().with(env_filter).with(fmt).init();
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    // Defaults < file < environment (including .env) < flags
    let config_path = config::discover_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)
        .and_then(|c| c.apply_env(|k| std::env::var(k).ok()))
        .map_err(ServerError::Config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let config = Arc::new(config);

    if !config.has_api_key() {
        warn!("STABILITY_API_KEY is not set; /transform will refuse requests");
    }

    // Upstream mode (live / recording / replaying)
    let replay_path = std::env::var("RENOVISION_REPLAY").ok();
    let is_recording = std::env::var("RENOVISION_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        info!(cassette = %cassette_path, "Replaying upstream responses");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        info!("Recording upstream interactions");
        let (ctx, session) = ServiceContext::recording(&config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config)?, None)
    };

    let app = build_router(AppState { config: Arc::clone(&config), ctx });
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(
        version = VERSION,
        addr = %listener.local_addr()?,
        environment = %config.server.environment,
        upstream = %config.upstream.endpoint,
        "Starting renovision"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("Server stopped");

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => info!(path = %path.display(), "Cassette saved"),
            Err(e) => warn!(error = %e, "Failed to save cassette"),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
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
    info!("Shutdown signal received");
}
