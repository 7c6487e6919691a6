// src/db/responsedb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::ticketmodel::*;

#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn create_response(
        &self,
        ticket_id: Uuid,
        admin_id: Uuid,
        message: String,
        file_url: Option<String>,
    ) -> Result<TicketResponse, Error>;

    async fn get_ticket_responses(
        &self,
        ticket_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<TicketResponse>, i64), Error>;
}

#[async_trait]
impl ResponseStore for DBClient {
    async fn create_response(
        &self,
        ticket_id: Uuid,
        admin_id: Uuid,
        message: String,
        file_url: Option<String>,
    ) -> Result<TicketResponse, Error> {
        let response = sqlx::query_as::<_, TicketResponse>(
            r#"
            INSERT INTO ticket_responses (ticket_id, admin_id, message, file_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ticket_id)
        .bind(admin_id)
        .bind(message)
        .bind(file_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(response)
    }

    async fn get_ticket_responses(
        &self,
        ticket_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<TicketResponse>, i64), Error> {
        let responses = sqlx::query_as::<_, TicketResponse>(
            r#"
            SELECT * FROM ticket_responses
            WHERE ticket_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ticket_id)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ticket_responses WHERE ticket_id = $1")
                .bind(ticket_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((responses, total.0))
    }
}
