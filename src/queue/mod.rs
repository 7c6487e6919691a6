// src/queue/mod.rs
pub mod redis_queue;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A notification is re-enqueued on transient delivery failure until its
/// retry counter reaches this bound, then dropped.
pub const MAX_NOTIFICATION_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TicketCreated,
    StatusChanged,
    ResponseAdded,
}

impl NotificationKind {
    pub fn subject(&self) -> &'static str {
        match self {
            NotificationKind::TicketCreated => "Your ticket has been created",
            NotificationKind::StatusChanged => "Ticket status update",
            NotificationKind::ResponseAdded => "New response to your ticket",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingNotification {
    pub ticket_id: Uuid,
    pub email: String,
    pub kind: NotificationKind,
    pub message: String,
    pub retries: u32,
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue error: {0}")]
    Backend(String),
}

/// Best-effort at-least-once FIFO work queue, not a durable broker.
/// Producers enqueue at the tail; consumers block on the head.
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    async fn enqueue(&self, notification: PendingNotification) -> Result<(), QueueError>;

    /// Blocks for up to `wait` for an entry. Malformed payloads are logged
    /// and dropped by the implementation, never surfaced.
    async fn dequeue(&self, wait: Duration) -> Result<Option<PendingNotification>, QueueError>;
}
