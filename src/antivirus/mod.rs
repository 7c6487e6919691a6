// src/antivirus/mod.rs
pub mod clamav;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub clean: bool,
    pub signature: Option<String>,
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Antivirus daemon is unreachable")]
    Unavailable,

    #[error("Antivirus protocol error: {0}")]
    Protocol(String),
}

/// Scanning is mandatory for every attachment. An unreachable daemon is a
/// hard failure for the caller, never a silent skip.
#[async_trait]
pub trait AttachmentScanner: Send + Sync {
    /// Scans the buffer without consuming it, so the same bytes can be
    /// uploaded afterwards.
    async fn scan(&self, bytes: &[u8]) -> Result<ScanOutcome, ScanError>;

    async fn available(&self) -> bool;
}
