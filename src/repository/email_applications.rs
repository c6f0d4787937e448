//! Email applications repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::email_application::{
        CreateEmailApplication, EmailApplication, EmailApplicationQuery, UpdateEmailApplication,
    },
    models::enums::EmailApplicationStatus,
};

#[derive(Clone)]
pub struct EmailApplicationsRepository {
    pool: Pool<Postgres>,
}

impl EmailApplicationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<EmailApplication> {
        sqlx::query_as::<_, EmailApplication>("SELECT * FROM email_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Email application {} not found", id)))
    }

    pub async fn list(&self, query: &EmailApplicationQuery) -> AppResult<Vec<EmailApplication>> {
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = query.page.unwrap_or(1).max(1).saturating_sub(1) * per_page;

        let rows = sqlx::query_as::<_, EmailApplication>(
            r#"
            SELECT * FROM email_applications
            WHERE ($1::int IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.user_id)
        .bind(query.status.map(|s| s.as_str().to_string()))
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a draft application for the requester
    pub async fn create(
        &self,
        user_id: i32,
        data: &CreateEmailApplication,
    ) -> AppResult<EmailApplication> {
        let certification_at = data
            .certification_accepted
            .unwrap_or(false)
            .then(Utc::now);

        let app = sqlx::query_as::<_, EmailApplication>(
            r#"
            INSERT INTO email_applications
                (user_id, service_status, purpose, proposed_email,
                 group_email, group_admin_name, group_admin_email,
                 certification_accepted, certification_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(data.service_status)
        .bind(&data.purpose)
        .bind(&data.proposed_email)
        .bind(&data.group_email)
        .bind(&data.group_admin_name)
        .bind(&data.group_admin_email)
        .bind(data.certification_accepted.unwrap_or(false))
        .bind(certification_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(app)
    }

    /// Update a draft; the service guarantees the application is in draft
    pub async fn update_draft(
        &self,
        id: i32,
        data: &UpdateEmailApplication,
    ) -> AppResult<EmailApplication> {
        sqlx::query_as::<_, EmailApplication>(
            r#"
            UPDATE email_applications SET
                service_status = COALESCE($2, service_status),
                purpose = COALESCE($3, purpose),
                proposed_email = COALESCE($4, proposed_email),
                group_email = COALESCE($5, group_email),
                group_admin_name = COALESCE($6, group_admin_name),
                group_admin_email = COALESCE($7, group_admin_email),
                certification_accepted = COALESCE($8, certification_accepted),
                certification_at = CASE
                    WHEN $8 = TRUE AND certification_at IS NULL THEN $9
                    ELSE certification_at
                END,
                updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.service_status)
        .bind(&data.purpose)
        .bind(&data.proposed_email)
        .bind(&data.group_email)
        .bind(&data.group_admin_name)
        .bind(&data.group_admin_email)
        .bind(data.certification_accepted)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Email application {} not found", id)))
    }

    /// Record first submission
    pub async fn store_submission(
        &self,
        id: i32,
        status: EmailApplicationStatus,
        submitted_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE email_applications SET status = $2, submitted_at = $3, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Move to a status computed by the transition table
    pub async fn store_status(&self, id: i32, status: EmailApplicationStatus) -> AppResult<()> {
        sqlx::query(
            "UPDATE email_applications SET status = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a terminal rejection with its reason
    pub async fn store_rejection(&self, id: i32, reason: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE email_applications
            SET status = $2, rejection_reason = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(EmailApplicationStatus::Rejected)
        .bind(reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Move to processing and bump the attempt counter
    pub async fn store_provision_start(&self, id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE email_applications
            SET status = $2, provision_attempts = provision_attempts + 1, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(EmailApplicationStatus::Processing)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record provisioning success: assignment, timestamp and status land in
    /// one statement so the application can never be completed without an
    /// outcome
    pub async fn store_provision_success(
        &self,
        id: i32,
        assigned_email: &str,
        assigned_user_id: &str,
    ) -> AppResult<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE email_applications
            SET status = $2, final_assigned_email = $3, final_assigned_user_id = $4,
                provisioned_at = $5, provision_failure_reason = NULL, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(EmailApplicationStatus::Completed)
        .bind(assigned_email)
        .bind(assigned_user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record provisioning failure with its detail
    pub async fn store_provision_failure(&self, id: i32, reason: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE email_applications
            SET status = $2, provision_failure_reason = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(EmailApplicationStatus::ProvisionFailed)
        .bind(reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
