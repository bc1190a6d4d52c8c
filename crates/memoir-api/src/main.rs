//! memoir-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use governor::RateLimiter;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use memoir_api::{build_router, AppConfig, AppState, IdentityVerifier, StoreKind};
use memoir_core::{RecordRepository, StoryGenerator};
use memoir_db::{log_pool_metrics, Database, MemoryRecordRepository, PoolConfig};
use memoir_inference::{LlmStoryGenerator, OpenAIBackend};

/// How often pool utilization is logged.
const POOL_METRICS_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "memoir_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "memoir_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("memoir-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = AppConfig::from_env()?;

    let store: Option<Arc<dyn RecordRepository>> = match config.store {
        StoreKind::Postgres => {
            let url = config.database_url.as_deref().unwrap_or_default();
            let db = Database::connect_with_config(url, PoolConfig::from_env()).await?;
            db.migrate().await?;
            info!(subsystem = "db", "Database migrations applied");

            let pool = db.pool().clone();
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(Duration::from_secs(POOL_METRICS_INTERVAL_SECS));
                loop {
                    interval.tick().await;
                    log_pool_metrics(&pool);
                }
            });

            Some(Arc::new(db.records))
        }
        StoreKind::Memory => {
            warn!(
                subsystem = "db",
                "Using in-memory record store; records are lost on restart"
            );
            Some(Arc::new(MemoryRecordRepository::new()))
        }
        StoreKind::None => {
            warn!(
                subsystem = "db",
                "No record store configured; persistence requests will fail"
            );
            None
        }
    };

    let generator: Option<Arc<dyn StoryGenerator>> = if config.generation_enabled {
        let backend = OpenAIBackend::from_env()?;
        info!(
            subsystem = "inference",
            model = %backend.config().gen_model,
            base_url = %backend.config().base_url,
            "Story generation enabled"
        );
        Some(Arc::new(LlmStoryGenerator::new(backend)))
    } else {
        warn!(
            subsystem = "inference",
            "Story generation disabled; set OPENAI_API_KEY or OPENAI_BASE_URL to enable"
        );
        None
    };

    let verifier = IdentityVerifier::new(&config.jwt_secret, config.admin_uids.clone())?;
    let mut state = AppState::new(store, generator, verifier, config.delete_token_ttl)
        .with_allowed_origins(config.allowed_origins.clone());
    if let Some(rate_limit) = config.rate_limit {
        state = state.with_rate_limiter(RateLimiter::direct(rate_limit.quota()?));
    }

    let app = build_router(state);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
