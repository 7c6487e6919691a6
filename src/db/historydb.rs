// src/db/historydb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::ticketmodel::*;

/// Audit-trail rows. Append-only: there is deliberately no update or delete.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append_history(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
        comment: Option<String>,
        admin_id: Option<Uuid>,
    ) -> Result<TicketHistory, Error>;

    /// Rows ordered by creation time, oldest first — the order the audit
    /// trail must be displayed in.
    async fn get_ticket_history(&self, ticket_id: Uuid) -> Result<Vec<TicketHistory>, Error>;
}

#[async_trait]
impl HistoryStore for DBClient {
    async fn append_history(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
        comment: Option<String>,
        admin_id: Option<Uuid>,
    ) -> Result<TicketHistory, Error> {
        let entry = sqlx::query_as::<_, TicketHistory>(
            r#"
            INSERT INTO ticket_history (ticket_id, status, comment, admin_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ticket_id)
        .bind(status)
        .bind(comment)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn get_ticket_history(&self, ticket_id: Uuid) -> Result<Vec<TicketHistory>, Error> {
        let entries = sqlx::query_as::<_, TicketHistory>(
            r#"
            SELECT * FROM ticket_history
            WHERE ticket_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
