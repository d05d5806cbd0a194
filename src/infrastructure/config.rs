use std::env;
use std::time::Duration;

use crate::infrastructure::auth::AuthKeys;
use crate::infrastructure::cache::CachePolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Redis endpoint for the fingerprint cache; `None` selects the
    /// in-process cache.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub cache_read_ttl: Duration,
    pub cache_write_ttl: Duration,
    pub cache_op_timeout: Duration,
    pub audit_queue_capacity: usize,
    pub cors_allowed_origins: Vec<String>,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn jwt_secret_from_env() -> String {
    env::var("JWT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            if cfg!(debug_assertions) {
                "secret".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        })
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://college.db?mode=rwc".to_string()),
            port: parse_var("PORT", 8080),
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            jwt_secret: jwt_secret_from_env(),
            cache_read_ttl: Duration::from_secs(parse_var("CACHE_READ_TTL_SECS", 10)),
            cache_write_ttl: Duration::from_secs(parse_var("CACHE_WRITE_TTL_SECS", 600)),
            cache_op_timeout: Duration::from_millis(parse_var("CACHE_OP_TIMEOUT_MS", 250)),
            audit_queue_capacity: parse_var("AUDIT_QUEUE_CAPACITY", 1024),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            read_ttl: self.cache_read_ttl,
            write_ttl: self.cache_write_ttl,
            op_timeout: self.cache_op_timeout,
        }
    }

    pub fn auth_keys(&self) -> AuthKeys {
        AuthKeys::new(&self.jwt_secret)
    }
}
