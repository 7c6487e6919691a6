// src/worker/notification_worker.rs
use std::sync::Arc;
use std::time::Duration;

use crate::mail::NotificationTransport;
use crate::queue::{NotificationQueue, PendingNotification, MAX_NOTIFICATION_RETRIES};

const DEQUEUE_WAIT: Duration = Duration::from_secs(5);
const BACKEND_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Drains the notification queue for the lifetime of the process. Several
/// workers may share one queue; entries are informational mails, so duplicate
/// delivery is tolerated. A single bad entry never takes the loop down.
pub struct NotificationWorker {
    queue: Arc<dyn NotificationQueue>,
    mailer: Arc<dyn NotificationTransport>,
}

impl NotificationWorker {
    pub fn new(queue: Arc<dyn NotificationQueue>, mailer: Arc<dyn NotificationTransport>) -> Self {
        Self { queue, mailer }
    }

    pub async fn run(self) {
        tracing::info!("Notification worker started");
        loop {
            self.process_one().await;
        }
    }

    /// One dequeue-and-deliver step. Returns true when an entry was handled,
    /// false when the queue was idle or unreachable.
    pub async fn process_one(&self) -> bool {
        match self.queue.dequeue(DEQUEUE_WAIT).await {
            Ok(Some(notification)) => {
                self.deliver(notification).await;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::error!("Failed to pop notification from queue: {}", e);
                tokio::time::sleep(BACKEND_ERROR_PAUSE).await;
                false
            }
        }
    }

    async fn deliver(&self, mut notification: PendingNotification) {
        let sent = self
            .mailer
            .send(
                &notification.email,
                notification.kind.subject(),
                &notification.message,
            )
            .await;

        match sent {
            Ok(()) => {
                tracing::info!("Email sent for ticket {}", notification.ticket_id);
            }
            Err(e) => {
                notification.retries += 1;
                if notification.retries < MAX_NOTIFICATION_RETRIES {
                    tracing::warn!(
                        "Email delivery failed for ticket {} (attempt {}): {}. Re-queuing",
                        notification.ticket_id,
                        notification.retries,
                        e
                    );
                    if let Err(e) = self.queue.enqueue(notification).await {
                        tracing::error!("Failed to re-queue notification: {}", e);
                    }
                } else {
                    tracing::warn!(
                        "Max retries reached for ticket {} notification, dropping: {}",
                        notification.ticket_id,
                        e
                    );
                }
            }
        }
    }
}
