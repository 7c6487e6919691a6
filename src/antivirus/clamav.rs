// src/antivirus/clamav.rs
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{AttachmentScanner, ScanError, ScanOutcome};

const INSTREAM_COMMAND: &[u8] = b"zINSTREAM\0";
const PING_COMMAND: &[u8] = b"zPING\0";
// clamd expects size-prefixed chunks, terminated by a zero-length chunk
const CHUNK_SIZE: usize = 8192;

pub struct ClamAvScanner {
    address: String,
    timeout: Duration,
}

impl ClamAvScanner {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    async fn connect(&self) -> Result<TcpStream, ScanError> {
        match timeout(self.timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => {
                tracing::error!("Failed to connect to clamd at {}: {}", self.address, e);
                Err(ScanError::Unavailable)
            }
            Err(_) => {
                tracing::error!("Connection to clamd at {} timed out", self.address);
                Err(ScanError::Unavailable)
            }
        }
    }
}

#[async_trait]
impl AttachmentScanner for ClamAvScanner {
    async fn scan(&self, bytes: &[u8]) -> Result<ScanOutcome, ScanError> {
        tracing::debug!("Starting clamd scan of {} bytes", bytes.len());

        let mut conn = self.connect().await?;

        let exchange = async {
            conn.write_all(INSTREAM_COMMAND).await?;
            for chunk in bytes.chunks(CHUNK_SIZE) {
                conn.write_all(&(chunk.len() as u32).to_be_bytes()).await?;
                conn.write_all(chunk).await?;
            }
            conn.write_all(&0u32.to_be_bytes()).await?;

            let mut reply = Vec::new();
            conn.read_to_end(&mut reply).await?;
            Ok::<_, std::io::Error>(reply)
        };

        let reply = match timeout(self.timeout, exchange).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::error!("clamd I/O error: {}", e);
                return Err(ScanError::Protocol(e.to_string()));
            }
            Err(_) => {
                tracing::error!("clamd scan timed out after {:?}", self.timeout);
                return Err(ScanError::Unavailable);
            }
        };

        let reply = String::from_utf8_lossy(&reply)
            .trim_end_matches(|c| c == '\0' || c == '\n')
            .to_string();

        if reply.ends_with("OK") {
            tracing::debug!("clamd scan completed: clean");
            return Ok(ScanOutcome {
                clean: true,
                signature: None,
            });
        }

        if let Some(found) = reply.strip_suffix(" FOUND") {
            let signature = found.strip_prefix("stream: ").unwrap_or(found).to_string();
            tracing::warn!("clamd scan completed: infected ({})", signature);
            return Ok(ScanOutcome {
                clean: false,
                signature: Some(signature),
            });
        }

        tracing::error!("Unexpected clamd reply: {}", reply);
        Err(ScanError::Protocol(reply))
    }

    async fn available(&self) -> bool {
        let mut conn = match self.connect().await {
            Ok(conn) => conn,
            Err(_) => return false,
        };

        let exchange = async {
            conn.write_all(PING_COMMAND).await?;
            let mut reply = Vec::new();
            conn.read_to_end(&mut reply).await?;
            Ok::<_, std::io::Error>(reply)
        };

        match timeout(self.timeout, exchange).await {
            Ok(Ok(reply)) => String::from_utf8_lossy(&reply).starts_with("PONG"),
            _ => false,
        }
    }
}
