// src/queue/redis_queue.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use super::{NotificationQueue, PendingNotification, QueueError};

pub const NOTIFICATION_QUEUE_KEY: &str = "notifications:email";

/// List-backed queue: LPUSH is the logical tail, BRPOP the logical head, so
/// re-enqueued entries line up behind fresh ones.
pub struct RedisNotificationQueue {
    redis: Arc<ConnectionManager>,
    key: String,
}

impl RedisNotificationQueue {
    pub fn new(redis: Arc<ConnectionManager>) -> Self {
        Self {
            redis,
            key: NOTIFICATION_QUEUE_KEY.to_string(),
        }
    }
}

#[async_trait]
impl NotificationQueue for RedisNotificationQueue {
    async fn enqueue(&self, notification: PendingNotification) -> Result<(), QueueError> {
        let payload = serde_json::to_string(&notification)
            .map_err(|e| QueueError::Backend(e.to_string()))?;

        let mut conn = ConnectionManager::clone(&self.redis);
        let pushed: Result<(), redis::RedisError> = conn.lpush(&self.key, payload).await;
        pushed.map_err(|e| QueueError::Backend(e.to_string()))?;

        tracing::debug!(
            "Notification queued for ticket {} ({})",
            notification.ticket_id,
            notification.email
        );
        Ok(())
    }

    async fn dequeue(&self, wait: Duration) -> Result<Option<PendingNotification>, QueueError> {
        let mut conn = ConnectionManager::clone(&self.redis);
        let popped: Option<(String, String)> = conn
            .brpop(&self.key, wait.as_secs() as f64)
            .await
            .map_err(|e| QueueError::Backend(e.to_string()))?;

        let Some((_, payload)) = popped else {
            return Ok(None);
        };

        match serde_json::from_str::<PendingNotification>(&payload) {
            Ok(notification) => Ok(Some(notification)),
            Err(e) => {
                // a bad entry is dropped, not retried
                tracing::warn!("Dropping malformed notification payload: {}", e);
                Ok(None)
            }
        }
    }
}
