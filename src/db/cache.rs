// src/db/cache.rs
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Cache TTL constants
pub const LISTING_CACHE_TTL: Duration = Duration::from_secs(600); // 10 minutes
pub const STATUS_CACHE_TTL: Duration = Duration::from_secs(600); // 10 minutes

pub fn listing_key(user_id: Uuid, page: i64, page_size: i64) -> String {
    format!("tickets:user:{}:page:{}:limit:{}", user_id, page, page_size)
}

pub fn listing_prefix(user_id: Uuid) -> String {
    format!("tickets:user:{}:page:", user_id)
}

pub fn status_key(ticket_id: Uuid) -> String {
    format!("ticket:status:{}", ticket_id)
}

/// Derived, disposable projections only — never authoritative. Every method
/// swallows its own failures: a broken cache must not fail the request, and
/// entries carry a TTL as the staleness backstop.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str, ttl: Duration);
    async fn delete(&self, key: &str);
    async fn delete_by_prefix(&self, prefix: &str);
}

pub struct RedisCache {
    redis: Arc<ConnectionManager>,
}

impl RedisCache {
    pub fn new(redis: Arc<ConnectionManager>) -> Self {
        Self { redis }
    }

    /// Scan and delete keys matching a pattern without blocking Redis.
    async fn scan_and_delete(&self, pattern: &str) -> Result<usize, redis::RedisError> {
        let mut conn = ConnectionManager::clone(&self.redis);
        let mut cursor: u64 = 0;
        let mut deleted_count = 0;

        loop {
            // Use SCAN instead of KEYS to avoid blocking
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                deleted_count += keys.len();
                let _: () = redis::AsyncCommands::del(&mut conn, &keys).await?;
            }

            cursor = new_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(deleted_count)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = ConnectionManager::clone(&self.redis);
        match conn.get::<_, String>(key).await {
            Ok(value) => {
                tracing::debug!("Cache HIT: {}", key);
                Some(value)
            }
            Err(_) => {
                tracing::debug!("Cache MISS: {}", key);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut conn = ConnectionManager::clone(&self.redis);
        let stored: Result<(), redis::RedisError> =
            conn.set_ex(key, value, ttl.as_secs() as usize).await;
        match stored {
            Ok(()) => tracing::debug!("Cache SET: {} (TTL: {}s)", key, ttl.as_secs()),
            Err(e) => tracing::warn!("Cache SET failed for {}: {}", key, e),
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = ConnectionManager::clone(&self.redis);
        let deleted: Result<(), redis::RedisError> =
            redis::AsyncCommands::del(&mut conn, key).await;
        match deleted {
            Ok(()) => tracing::debug!("Cache DELETE: {}", key),
            Err(e) => tracing::warn!("Cache DELETE failed for {}: {}", key, e),
        }
    }

    async fn delete_by_prefix(&self, prefix: &str) {
        let pattern = format!("{}*", prefix);
        match self.scan_and_delete(&pattern).await {
            Ok(count) => {
                if count > 0 {
                    tracing::debug!("Cache DELETE pattern: {} ({} keys deleted)", pattern, count)
                }
            }
            Err(e) => tracing::warn!("Cache DELETE pattern failed for {}: {}", pattern, e),
        }
    }
}
