// src/service/ticket_service.rs
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    antivirus::{AttachmentScanner, ScanError},
    db::{
        cache::{
            listing_key, listing_prefix, status_key, Cache, LISTING_CACHE_TTL, STATUS_CACHE_TTL,
        },
        historydb::HistoryStore,
        responsedb::ResponseStore,
        ticketdb::{NewTicket, TicketStore},
    },
    error::TicketError,
    models::ticketmodel::*,
    queue::{NotificationKind, NotificationQueue, PendingNotification},
    storage::ObjectStore,
};

pub const MAX_ATTACHMENT_SIZE: usize = 100 * 1024 * 1024; // 100 MB
const TICKET_FILES_FOLDER: &str = "tickets";

/// Orchestrates the ticket lifecycle: attachment safety, the status state
/// machine with its audit trail, the response thread and notification
/// fan-out. Every collaborator is injected, so tests can substitute fakes.
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    history: Arc<dyn HistoryStore>,
    responses: Arc<dyn ResponseStore>,
    scanner: Arc<dyn AttachmentScanner>,
    storage: Arc<dyn ObjectStore>,
    cache: Arc<dyn Cache>,
    queue: Arc<dyn NotificationQueue>,
}

impl TicketService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        history: Arc<dyn HistoryStore>,
        responses: Arc<dyn ResponseStore>,
        scanner: Arc<dyn AttachmentScanner>,
        storage: Arc<dyn ObjectStore>,
        cache: Arc<dyn Cache>,
        queue: Arc<dyn NotificationQueue>,
    ) -> Self {
        Self {
            tickets,
            history,
            responses,
            scanner,
            storage,
            cache,
            queue,
        }
    }

    pub async fn create_ticket(
        &self,
        req: CreateTicketRequest,
        attachment: Option<Attachment>,
    ) -> Result<Ticket, TicketError> {
        tracing::info!("Creating new ticket for {}", req.email);

        req.validate()
            .map_err(|e| TicketError::Validation(e.to_string()))?;

        let mut file_url = None;
        let mut file_name = None;
        let mut file_type = None;
        let mut file_verified = false;

        if let Some(attachment) = attachment {
            file_name = Some(attachment.file_name.clone());
            file_type = Some(attachment.content_type.clone());
            file_url = Some(self.scan_and_store(attachment).await?);
            file_verified = true;
        }

        let ticket = self
            .tickets
            .create_ticket(NewTicket {
                user_id: req.user_id,
                subject: req.subject,
                question: req.question,
                full_name: req.full_name,
                email: req.email,
                phone: req.phone,
                telegram: req.telegram,
                file_url,
                file_name,
                file_type,
                file_verified,
                notify_email: req.notify_email,
            })
            .await?;

        // The ticket row is authoritative: losing it is worse than losing one
        // audit line, so a history failure here is logged, not propagated.
        if let Err(e) = self
            .history
            .append_history(
                ticket.id,
                TicketStatus::New,
                Some("ticket created".to_string()),
                None,
            )
            .await
        {
            tracing::error!("Failed to create history record for ticket {}: {}", ticket.id, e);
        }

        if let Some(user_id) = ticket.user_id {
            self.cache.delete_by_prefix(&listing_prefix(user_id)).await;
        }

        self.enqueue_notification(
            ticket.id,
            &ticket.email,
            NotificationKind::TicketCreated,
            format!("Your ticket {} has been created.", ticket.id),
        )
        .await;

        tracing::info!("Ticket {} created successfully", ticket.id);
        Ok(ticket)
    }

    pub async fn update_status(
        &self,
        ticket_id: Uuid,
        new_status: TicketStatus,
        admin_id: Uuid,
        comment: Option<String>,
        new_file_url: Option<String>,
    ) -> Result<Ticket, TicketError> {
        tracing::info!(
            "Updating ticket {} status to {} (admin {})",
            ticket_id,
            new_status,
            admin_id
        );

        let ticket = self
            .tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or(TicketError::TicketNotFound(ticket_id))?;

        if ticket.status.is_terminal() {
            return Err(TicketError::TicketClosed(ticket_id));
        }
        if !ticket.status.can_transition_to(new_status) {
            return Err(TicketError::InvalidTransition {
                from: ticket.status,
                to: new_status,
            });
        }

        let mut status = new_status;
        let mut comment = comment;

        if let Some(url) = new_file_url {
            match self.rescan_stored_file(&url).await? {
                FileVerdict::Clean => {
                    self.tickets.set_ticket_file(ticket_id, &url, true).await?;
                }
                FileVerdict::Infected { signature } => {
                    // the requested transition is overridden: an infected
                    // reference must never be attached
                    tracing::warn!(
                        "Infected file {} on ticket {} ({:?}), forcing rejection",
                        url,
                        ticket_id,
                        signature
                    );
                    if let Err(e) = self.storage.delete(&url).await {
                        tracing::warn!("Failed to delete infected file {}: {}", url, e);
                    }
                    status = TicketStatus::Rejected;
                    comment = Some("File contains potential threat".to_string());
                }
            }
        }

        self.tickets.update_ticket_status(ticket_id, status).await?;
        self.history
            .append_history(ticket_id, status, comment.clone(), Some(admin_id))
            .await?;

        self.cache.delete(&status_key(ticket_id)).await;
        if let Some(user_id) = ticket.user_id {
            self.cache.delete_by_prefix(&listing_prefix(user_id)).await;
        }

        let mut message = format!(
            "Your ticket {} status has been updated to {}.",
            ticket_id, status
        );
        if let Some(comment) = comment.as_deref() {
            message = format!("{} Comment: {}", message, comment);
        }
        self.enqueue_notification(ticket_id, &ticket.email, NotificationKind::StatusChanged, message)
            .await;

        let updated = self
            .tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or(TicketError::TicketNotFound(ticket_id))?;

        tracing::info!("Ticket {} status updated to {}", ticket_id, status);
        Ok(updated)
    }

    pub async fn get_ticket(&self, ticket_id: Uuid) -> Result<Ticket, TicketError> {
        let ticket = self
            .tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or(TicketError::TicketNotFound(ticket_id))?;

        self.cache
            .set(
                &status_key(ticket_id),
                ticket.status.as_str(),
                STATUS_CACHE_TTL,
            )
            .await;

        Ok(ticket)
    }

    /// Cached per (user, page, page_size). The total count is always read
    /// live so pagination metadata never goes stale.
    pub async fn list_tickets(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Ticket>, i64), TicketError> {
        let page = PageRequest::clamped(page, page_size);
        let key = listing_key(user_id, page.page, page.page_size);

        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_str::<Vec<Ticket>>(&cached) {
                Ok(tickets) => {
                    let total = self.tickets.count_user_tickets(user_id).await?;
                    return Ok((tickets, total));
                }
                Err(e) => tracing::warn!("Cache deserialization failed for {}: {}", key, e),
            }
        }

        let tickets = self.tickets.get_user_tickets(user_id, page).await?;
        let total = self.tickets.count_user_tickets(user_id).await?;

        if let Ok(json) = serde_json::to_string(&tickets) {
            self.cache.set(&key, &json, LISTING_CACHE_TTL).await;
        }

        Ok((tickets, total))
    }

    pub async fn list_all_tickets(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Ticket>, i64), TicketError> {
        let page = PageRequest::clamped(page, page_size);
        let (tickets, total) = self.tickets.get_all_tickets(page).await?;
        Ok((tickets, total))
    }

    /// Free-text queries are not cache keys; search always hits the store.
    pub async fn search_tickets(
        &self,
        query: &str,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Ticket>, i64), TicketError> {
        let page = PageRequest::clamped(page, page_size);
        let (tickets, total) = self.tickets.search_tickets(query, page).await?;
        Ok((tickets, total))
    }

    pub async fn get_ticket_history(
        &self,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketHistory>, TicketError> {
        let history = self.history.get_ticket_history(ticket_id).await?;
        Ok(history)
    }

    pub async fn create_response(
        &self,
        ticket_id: Uuid,
        admin_id: Uuid,
        message: String,
        attachment: Option<Attachment>,
    ) -> Result<TicketResponse, TicketError> {
        tracing::info!("Creating new response for ticket {}", ticket_id);

        if message.trim().is_empty() {
            return Err(TicketError::Validation(
                "message must not be empty".to_string(),
            ));
        }

        let ticket = self
            .tickets
            .get_ticket(ticket_id)
            .await?
            .ok_or(TicketError::TicketNotFound(ticket_id))?;

        if ticket.status.is_terminal() {
            return Err(TicketError::TicketClosed(ticket_id));
        }

        let mut file_url = None;
        if let Some(attachment) = attachment {
            file_url = Some(self.scan_and_store(attachment).await?);
        }

        let response = self
            .responses
            .create_response(ticket_id, admin_id, message, file_url)
            .await?;

        if let Err(e) = self
            .history
            .append_history(
                ticket_id,
                ticket.status,
                Some("response added".to_string()),
                Some(admin_id),
            )
            .await
        {
            tracing::error!(
                "Failed to create history record for ticket {}: {}",
                ticket_id,
                e
            );
        }

        if ticket.notify_email {
            self.enqueue_notification(
                ticket_id,
                &ticket.email,
                NotificationKind::ResponseAdded,
                response.message.clone(),
            )
            .await;
        }

        tracing::info!(
            "Response {} created for ticket {}",
            response.id,
            ticket_id
        );
        Ok(response)
    }

    pub async fn get_ticket_responses(
        &self,
        ticket_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<TicketResponse>, i64), TicketError> {
        let page = PageRequest::clamped(page, page_size);
        let (responses, total) = self.responses.get_ticket_responses(ticket_id, page).await?;
        Ok((responses, total))
    }

    /// The one place where bytes meet the scanner and the object store: the
    /// buffer is scanned first and uploaded only on a clean verdict, so no
    /// unscanned reference ever becomes visible.
    async fn scan_and_store(&self, attachment: Attachment) -> Result<String, TicketError> {
        if attachment.file_name.is_empty() || attachment.content_type.is_empty() {
            return Err(TicketError::FileRequired);
        }
        if attachment.bytes.len() > MAX_ATTACHMENT_SIZE {
            return Err(TicketError::FileTooLarge {
                size: attachment.bytes.len(),
                max: MAX_ATTACHMENT_SIZE,
            });
        }

        let outcome = self.scanner.scan(&attachment.bytes).await.map_err(|e| {
            tracing::error!("Failed to scan file {}: {}", attachment.file_name, e);
            match e {
                ScanError::Unavailable => TicketError::AntivirusUnavailable,
                ScanError::Protocol(msg) => TicketError::ScanFailed(msg),
            }
        })?;

        if !outcome.clean {
            tracing::warn!(
                "File {} contains malware ({:?})",
                attachment.file_name,
                outcome.signature
            );
            return Err(TicketError::MalwareDetected {
                signature: outcome.signature,
            });
        }

        let object_id = Uuid::new_v4().to_string();
        let url = self
            .storage
            .upload(
                attachment.bytes,
                TICKET_FILES_FOLDER,
                &object_id,
                &attachment.content_type,
            )
            .await
            .map_err(|e| TicketError::Storage(e.to_string()))?;

        Ok(url)
    }

    async fn rescan_stored_file(&self, file_url: &str) -> Result<FileVerdict, TicketError> {
        let bytes = self
            .storage
            .download(file_url)
            .await
            .map_err(|e| TicketError::Storage(e.to_string()))?;

        let outcome = self.scanner.scan(&bytes).await.map_err(|e| match e {
            ScanError::Unavailable => TicketError::AntivirusUnavailable,
            ScanError::Protocol(msg) => TicketError::ScanFailed(msg),
        })?;

        if outcome.clean {
            Ok(FileVerdict::Clean)
        } else {
            Ok(FileVerdict::Infected {
                signature: outcome.signature,
            })
        }
    }

    async fn enqueue_notification(
        &self,
        ticket_id: Uuid,
        email: &str,
        kind: NotificationKind,
        message: String,
    ) {
        let notification = PendingNotification {
            ticket_id,
            email: email.to_string(),
            kind,
            message,
            retries: 0,
        };

        // notifications are best-effort relative to the request
        if let Err(e) = self.queue.enqueue(notification).await {
            tracing::error!("Failed to queue notification for ticket {}: {}", ticket_id, e);
        }
    }
}

enum FileVerdict {
    Clean,
    Infected { signature: Option<String> },
}
