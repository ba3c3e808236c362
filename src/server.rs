//! HTTPサーバー起動

use crate::config::Config;
use crate::error::Result;
use crate::routes;
use crate::state::AppState;
use crate::store::Store;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "stylo_ai=info,tower_http=info";

/// ログ出力を初期化（RUST_LOG があればそちらを優先）
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "stylo_ai=debug,stylo_ai_common=debug,tower_http=debug"
        } else {
            DEFAULT_LOG_FILTER
        })
    });
    // テストなどで二重に初期化されても無視する
    let _ = fmt().with_env_filter(filter).try_init();
}

/// API + `/uploads` 静的配信を持つアプリ全体
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    let uploads = ServeDir::new(state.config.upload_dir.clone());

    routes::router(state)
        .nest_service("/uploads", uploads)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// 設定に従ってストアを開く
pub fn open_store(config: &Config) -> Result<Store> {
    match &config.data_file {
        Some(path) => Store::open(path),
        None => {
            tracing::warn!("no data file configured, data will be lost on shutdown");
            Ok(Store::in_memory())
        }
    }
}

pub async fn serve(config: Config) -> Result<()> {
    tracing::info!("Initializing state...");
    let store = open_store(&config)?;
    let state = Arc::new(AppState::new(config, store)?);

    let address = format!("0.0.0.0:{}", state.config.port);
    tracing::info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    tracing::info!(
        weather = state.weather.is_configured(),
        calendar = state.calendar.config().is_configured(),
        phonepe = state.phonepe.is_configured(),
        vision = state.vision.is_enabled(),
        "StyloAI server running on {address}"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
