// src/models/ticketmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    InProgress,
    Closed,
    Rejected,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
            TicketStatus::Rejected => "rejected",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    /// Closed, Rejected and Cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TicketStatus::Closed | TicketStatus::Rejected | TicketStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        match self {
            TicketStatus::New => next != TicketStatus::New,
            TicketStatus::InProgress => next.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub subject: String,
    pub question: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_verified: bool,
    pub status: TicketStatus,
    pub notify_email: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketHistory {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub status: TicketStatus,
    pub comment: Option<String>,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketResponse {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub admin_id: Uuid,
    pub message: String,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTicketRequest {
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "subject must not be empty"))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000, message = "question must not be empty"))]
    pub question: String,
    #[validate(length(min = 1, max = 200, message = "full_name must not be empty"))]
    pub full_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub notify_email: bool,
}

/// One buffered attachment. The bytes are scanned and then uploaded from the
/// same buffer, so the caller hands them over fully read.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub const MAX_PAGE_SIZE: i64 = 100;

    /// Out-of-range values are clamped, never rejected.
    pub fn clamped(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
