//! Approvals repository: the append-only decision ledger

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::approval::Approval,
    models::enums::{ApplicationType, ApprovalDecision, ApprovalStage},
};

#[derive(Clone)]
pub struct ApprovalsRepository {
    pool: Pool<Postgres>,
}

impl ApprovalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Ledger rows of one application, oldest first. The order matters: the
    /// current stage is derived by scanning forward.
    pub async fn list_for(
        &self,
        application_type: ApplicationType,
        application_id: i32,
    ) -> AppResult<Vec<Approval>> {
        let rows = sqlx::query_as::<_, Approval>(
            r#"
            SELECT * FROM approvals
            WHERE application_type = $1 AND application_id = $2
            ORDER BY created_at, id
            "#,
        )
        .bind(application_type)
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Append one row. Rows are never updated or deleted.
    pub async fn append(
        &self,
        application_type: ApplicationType,
        application_id: i32,
        stage: ApprovalStage,
        officer_id: Option<i32>,
        decision: ApprovalDecision,
        comment: Option<&str>,
    ) -> AppResult<Approval> {
        let row = sqlx::query_as::<_, Approval>(
            r#"
            INSERT INTO approvals
                (application_type, application_id, stage, officer_id, decision, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(application_type)
        .bind(application_id)
        .bind(stage)
        .bind(officer_id)
        .bind(decision)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
