// src/error.rs
use thiserror::Error;
use uuid::Uuid;

use crate::models::ticketmodel::TicketStatus;

#[derive(Error, Debug)]
pub enum TicketError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File name and content type are required when an attachment is provided")]
    FileRequired,

    #[error("File of {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: usize, max: usize },

    #[error("Antivirus service is not available")]
    AntivirusUnavailable,

    #[error("Antivirus scan failed: {0}")]
    ScanFailed(String),

    #[error("File contains malware")]
    MalwareDetected { signature: Option<String> },

    #[error("Ticket {0} not found")]
    TicketNotFound(Uuid),

    #[error("Ticket {0} is closed and can no longer be modified")]
    TicketClosed(Uuid),

    #[error("Cannot move ticket from {from} to {to}")]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("Storage error")]
    Storage(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl TicketError {
    /// Infrastructure failures keep their detail out of user-facing text;
    /// policy and validation errors stay precise.
    pub fn user_message(&self) -> String {
        match self {
            TicketError::Storage(_) | TicketError::Database(_) => {
                "Internal error, please try again later".to_string()
            }
            other => other.to_string(),
        }
    }
}
