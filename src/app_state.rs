use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::availability::cache::AvailabilityCache;
use crate::config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub availability_cache: Arc<AvailabilityCache>,
}

impl AppState {
    pub fn new(db: PgPool, env: config::Config) -> Self {
        let ttl = Duration::from_secs(env.app.availability_cache_ttl_seconds);
        Self {
            db,
            env,
            availability_cache: Arc::new(AvailabilityCache::new(ttl)),
        }
    }
}
