//! Loan applications repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::enums::LoanApplicationStatus,
    models::loan_application::{
        CreateLoanApplication, LoanApplication, LoanApplicationItem, LoanApplicationQuery,
        LoanItemRequest, UpdateLoanApplication,
    },
};

#[derive(Clone)]
pub struct LoanApplicationsRepository {
    pool: Pool<Postgres>,
}

impl LoanApplicationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanApplication> {
        sqlx::query_as::<_, LoanApplication>("SELECT * FROM loan_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan application {} not found", id)))
    }

    /// Requested items in application order
    pub async fn get_items(&self, application_id: i32) -> AppResult<Vec<LoanApplicationItem>> {
        let items = sqlx::query_as::<_, LoanApplicationItem>(
            "SELECT * FROM loan_application_items WHERE loan_application_id = $1 ORDER BY position",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list(&self, query: &LoanApplicationQuery) -> AppResult<Vec<LoanApplication>> {
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = query.page.unwrap_or(1).max(1).saturating_sub(1) * per_page;

        let rows = sqlx::query_as::<_, LoanApplication>(
            r#"
            SELECT * FROM loan_applications
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

    /// Create a draft with its item lines in one transaction
    pub async fn create(
        &self,
        user_id: i32,
        data: &CreateLoanApplication,
    ) -> AppResult<LoanApplication> {
        let mut tx = self.pool.begin().await?;

        let confirmed = data.applicant_confirmed.unwrap_or(false);
        let app = sqlx::query_as::<_, LoanApplication>(
            r#"
            INSERT INTO loan_applications
                (user_id, purpose, location, loan_start_date, loan_end_date,
                 applicant_is_responsible, responsible_officer_id,
                 applicant_confirmed, confirmed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&data.purpose)
        .bind(&data.location)
        .bind(data.loan_start_date)
        .bind(data.loan_end_date)
        .bind(data.applicant_is_responsible.unwrap_or(true))
        .bind(data.responsible_officer_id)
        .bind(confirmed)
        .bind(confirmed.then(Utc::now))
        .fetch_one(&mut *tx)
        .await?;

        if let Some(items) = &data.items {
            insert_items(&mut tx, app.id, items).await?;
        }

        tx.commit().await?;
        Ok(app)
    }

    /// Update a draft; when items are present the list is replaced
    pub async fn update_draft(
        &self,
        id: i32,
        data: &UpdateLoanApplication,
    ) -> AppResult<LoanApplication> {
        let mut tx = self.pool.begin().await?;

        let app = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications SET
                purpose = COALESCE($2, purpose),
                location = COALESCE($3, location),
                loan_start_date = COALESCE($4, loan_start_date),
                loan_end_date = COALESCE($5, loan_end_date),
                applicant_is_responsible = COALESCE($6, applicant_is_responsible),
                responsible_officer_id = COALESCE($7, responsible_officer_id),
                applicant_confirmed = COALESCE($8, applicant_confirmed),
                confirmed_at = CASE
                    WHEN $8 = TRUE AND confirmed_at IS NULL THEN $9
                    ELSE confirmed_at
                END,
                updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.purpose)
        .bind(&data.location)
        .bind(data.loan_start_date)
        .bind(data.loan_end_date)
        .bind(data.applicant_is_responsible)
        .bind(data.responsible_officer_id)
        .bind(data.applicant_confirmed)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan application {} not found", id)))?;

        if let Some(items) = &data.items {
            sqlx::query("DELETE FROM loan_application_items WHERE loan_application_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_items(&mut tx, id, items).await?;
        }

        tx.commit().await?;
        Ok(app)
    }

    /// Record first submission
    pub async fn store_submission(
        &self,
        id: i32,
        status: LoanApplicationStatus,
        submitted_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE loan_applications SET status = $2, submitted_at = $3, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Move to a status computed by the transition table
    pub async fn store_status(&self, id: i32, status: LoanApplicationStatus) -> AppResult<()> {
        sqlx::query("UPDATE loan_applications SET status = $2, updated_at = $3 WHERE id = $1")
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
            UPDATE loan_applications
            SET status = $2, rejection_reason = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(LoanApplicationStatus::Rejected)
        .bind(reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    application_id: i32,
    items: &[LoanItemRequest],
) -> AppResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO loan_application_items
                (loan_application_id, equipment_type, quantity, notes, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(application_id)
        .bind(item.equipment_type)
        .bind(item.quantity)
        .bind(&item.notes)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
