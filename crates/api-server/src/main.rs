use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use api_server::http;
use shared::ai::OpenAiGateway;
use shared::archive::SessionArchive;
use shared::audio::AudioDirectory;
use shared::config::ApiConfig;
use shared::conversation::ConversationService;
use shared::sessions::SessionStore;
use tokio::signal;
use tracing::{error, info, warn};

const FALLBACK_BIND_ADDR: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("failed to load .env file: {err}");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_server=debug,shared=info,axum=info".to_string()),
        )
        .init();

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let audio = match AudioDirectory::open(&config.audio_dir).await {
        Ok(audio) => audio,
        Err(err) => {
            error!(
                "failed to prepare audio directory {}: {err}",
                config.audio_dir.display()
            );
            std::process::exit(1);
        }
    };

    let archive = match SessionArchive::open(&config.sessions_dir).await {
        Ok(archive) => archive,
        Err(err) => {
            error!(
                "failed to prepare sessions directory {}: {err}",
                config.sessions_dir.display()
            );
            std::process::exit(1);
        }
    };

    let gateway = match OpenAiGateway::new(config.gateway.clone()) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("failed to build ai gateway: {err}");
            std::process::exit(1);
        }
    };

    let sessions = SessionStore::new();
    if config.session_idle_ttl_seconds > 0 {
        sessions.spawn_idle_purger(
            Duration::from_secs(config.session_idle_ttl_seconds),
            Duration::from_secs(config.session_purge_interval_seconds),
        );
        info!(
            idle_ttl_seconds = config.session_idle_ttl_seconds,
            "idle session eviction enabled"
        );
    }

    let conversation = ConversationService::new(sessions, Arc::new(gateway), audio);
    let app = http::build_router(http::AppState::new(
        conversation,
        archive,
        config.max_audio_upload_bytes,
    ));

    let addr = match resolve_bind_addr(&config.bind_addr) {
        Ok(addr) => addr,
        Err(err) => {
            error!("invalid fallback bind address: {err}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {err}");
        std::process::exit(1);
    }
}

fn resolve_bind_addr(raw: &str) -> Result<SocketAddr, AddrParseError> {
    raw.parse().or_else(|_| {
        warn!("invalid API_BIND_ADDR {raw}, falling back to {FALLBACK_BIND_ADDR}");
        FALLBACK_BIND_ADDR.parse()
    })
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
