// src/db/ticketdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::ticketmodel::*;

/// Column values for a ticket that has not been persisted yet. The file
/// fields are only ever set after a successful scan-then-upload.
#[derive(Debug, Clone)]
pub struct NewTicket {
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
    pub notify_email: bool,
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, Error>;

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, Error>;

    async fn get_user_tickets(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Ticket>, Error>;

    async fn get_all_tickets(&self, page: PageRequest) -> Result<(Vec<Ticket>, i64), Error>;

    async fn search_tickets(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<(Vec<Ticket>, i64), Error>;

    async fn count_user_tickets(&self, user_id: Uuid) -> Result<i64, Error>;

    async fn update_ticket_status(&self, ticket_id: Uuid, status: TicketStatus)
        -> Result<(), Error>;

    async fn set_ticket_file(
        &self,
        ticket_id: Uuid,
        file_url: &str,
        verified: bool,
    ) -> Result<(), Error>;
}

#[async_trait]
impl TicketStore for DBClient {
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, Error> {
        let created = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets
                (user_id, subject, question, full_name, email, phone, telegram,
                 file_url, file_name, file_type, file_verified, status, notify_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(ticket.user_id)
        .bind(ticket.subject)
        .bind(ticket.question)
        .bind(ticket.full_name)
        .bind(ticket.email)
        .bind(ticket.phone)
        .bind(ticket.telegram)
        .bind(ticket.file_url)
        .bind(ticket.file_name)
        .bind(ticket.file_type)
        .bind(ticket.file_verified)
        .bind(TicketStatus::New)
        .bind(ticket.notify_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>, Error> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    async fn get_user_tickets(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Ticket>, Error> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    async fn get_all_tickets(&self, page: PageRequest) -> Result<(Vec<Ticket>, i64), Error> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets")
            .fetch_one(&self.pool)
            .await?;

        Ok((tickets, total.0))
    }

    async fn search_tickets(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<(Vec<Ticket>, i64), Error> {
        let pattern = format!("%{}%", query);

        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets
            WHERE subject ILIKE $1 OR question ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM tickets
            WHERE subject ILIKE $1 OR question ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((tickets, total.0))
    }

    async fn count_user_tickets(&self, user_id: Uuid) -> Result<i64, Error> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total.0)
    }

    async fn update_ticket_status(
        &self,
        ticket_id: Uuid,
        status: TicketStatus,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE tickets
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            "#,
        )
        .bind(status)
        .bind(ticket_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_ticket_file(
        &self,
        ticket_id: Uuid,
        file_url: &str,
        verified: bool,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE tickets
            SET file_url = $1, file_verified = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            "#,
        )
        .bind(file_url)
        .bind(verified)
        .bind(ticket_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
