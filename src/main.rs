use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use college_records::config::Config;
use college_records::db;
use college_records::infrastructure::audit::AuditSink;
use college_records::infrastructure::cache::{FingerprintCache, MemoryCache, RedisCache};
use college_records::infrastructure::{AppState, server};

async fn cache_backend(config: &Config) -> Arc<dyn FingerprintCache> {
    match &config.redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => {
                tracing::info!("Fingerprint cache: redis at {}", url);
                Arc::new(cache)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to redis at {}: {}; using in-process cache",
                    url,
                    e
                );
                Arc::new(MemoryCache::new())
            }
        },
        None => {
            tracing::info!("Fingerprint cache: in-process (REDIS_URL not set)");
            Arc::new(MemoryCache::new())
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "college_records=debug,tower_http=debug,audit=info,activity=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    let cache = cache_backend(&config).await;

    // Audit trail runs on its own task
    let (audit, worker) = AuditSink::channel(config.audit_queue_capacity);
    worker.spawn();

    let state = AppState::new(
        db,
        cache,
        config.cache_policy(),
        audit,
        config.auth_keys(),
    );

    let app = server::build_router(state, &config.cors_allowed_origins);

    if let Err(e) = server::serve(app, config.port).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
