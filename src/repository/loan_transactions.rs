//! Loan transactions repository: issuance and return
//!
//! Issue and return each run in a single database transaction with the
//! affected equipment rows locked, so two officers issuing the same unit
//! serialize and the loser observes it as unavailable. The application's
//! status flip is conditional inside that same transaction, so a second
//! issuance of the whole application loses too.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::enums::{AssetType, EquipmentAvailability, EquipmentCondition, LoanApplicationStatus},
    models::loan_application::LoanApplicationItem,
    models::loan_transaction::LoanTransaction,
    validation::FieldErrors,
};

#[derive(Clone)]
pub struct LoanTransactionsRepository {
    pool: Pool<Postgres>,
}

impl LoanTransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_for_application(
        &self,
        application_id: i32,
    ) -> AppResult<Vec<LoanTransaction>> {
        let rows = sqlx::query_as::<_, LoanTransaction>(
            "SELECT * FROM loan_transactions WHERE loan_application_id = $1 ORDER BY issued_at",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Issue concrete units against an approved application. All-or-nothing:
    /// any unit that is missing, unavailable or already out rolls the whole
    /// batch back with a conflict.
    pub async fn issue(
        &self,
        application_id: i32,
        equipment_ids: &[i32],
        issuing_officer_id: i32,
        requested_items: &[LoanApplicationItem],
    ) -> AppResult<Vec<LoanTransaction>> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Move the application off `approved` first; the conditional update
        // locks its row, so a concurrent issue of the same application waits
        // here and then matches nothing.
        let moved = sqlx::query(
            "UPDATE loan_applications SET status = $2, updated_at = $3 \
             WHERE id = $1 AND status = $4",
        )
        .bind(application_id)
        .bind(LoanApplicationStatus::Issued)
        .bind(now)
        .bind(LoanApplicationStatus::Approved)
        .execute(&mut *tx)
        .await?;
        if moved.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Application is no longer approved for issuance".to_string(),
            ));
        }

        // Lock the candidate units so a concurrent issue of the same unit
        // waits here and then sees it as on loan.
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.asset_type, e.availability_status,
                   EXISTS(
                       SELECT 1 FROM loan_transactions t
                       WHERE t.equipment_id = e.id AND t.returned_at IS NULL
                   ) AS has_open_loan
            FROM equipment e
            WHERE e.id = ANY($1)
            FOR UPDATE OF e
            "#,
        )
        .bind(equipment_ids)
        .fetch_all(&mut *tx)
        .await?;

        let mut locked: HashMap<i32, (AssetType, EquipmentAvailability, bool)> = HashMap::new();
        for row in &rows {
            locked.insert(
                row.get("id"),
                (
                    row.get("asset_type"),
                    row.get("availability_status"),
                    row.get("has_open_loan"),
                ),
            );
        }

        for id in equipment_ids {
            match locked.get(id) {
                None => {
                    return Err(AppError::NotFound(format!("Equipment {} not found", id)));
                }
                Some((_, availability, has_open_loan)) => {
                    if *has_open_loan || *availability != EquipmentAvailability::Available {
                        return Err(AppError::Conflict(format!(
                            "Equipment {} is not available for issuance",
                            id
                        )));
                    }
                }
            }
        }

        // The issued units must fit within the requested type quantities.
        let mut remaining: HashMap<AssetType, i32> = HashMap::new();
        for item in requested_items {
            *remaining.entry(item.equipment_type).or_insert(0) += item.quantity;
        }
        let mut errors = FieldErrors::new();
        for id in equipment_ids {
            let asset_type = locked[id].0;
            let slot = remaining.entry(asset_type).or_insert(0);
            if *slot == 0 {
                errors.add(
                    "equipment_ids",
                    format!(
                        "Equipment {} ({}) exceeds the requested quantities",
                        id, asset_type
                    ),
                );
            } else {
                *slot -= 1;
            }
        }
        errors.into_result()?;

        let mut transactions = Vec::with_capacity(equipment_ids.len());
        for id in equipment_ids {
            let transaction = sqlx::query_as::<_, LoanTransaction>(
                r#"
                INSERT INTO loan_transactions
                    (loan_application_id, equipment_id, issuing_officer_id, issued_at)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(application_id)
            .bind(id)
            .bind(issuing_officer_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            transactions.push(transaction);
        }

        sqlx::query(
            "UPDATE equipment SET availability_status = $2, updated_at = $3 WHERE id = ANY($1)",
        )
        .bind(equipment_ids)
        .bind(EquipmentAvailability::OnLoan)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transactions)
    }

    /// Close all open transactions of an application and release the units.
    /// The stored availability after return follows the observed condition.
    pub async fn process_return(
        &self,
        application_id: i32,
        accepting_officer_id: i32,
        condition: EquipmentCondition,
    ) -> AppResult<Vec<LoanTransaction>> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // Same row-lock order as `issue`: application first, equipment after.
        let moved = sqlx::query(
            "UPDATE loan_applications SET status = $2, updated_at = $3 \
             WHERE id = $1 AND status = $4",
        )
        .bind(application_id)
        .bind(LoanApplicationStatus::Returned)
        .bind(now)
        .bind(LoanApplicationStatus::Issued)
        .execute(&mut *tx)
        .await?;
        if moved.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Application has no issuance to return".to_string(),
            ));
        }

        let transactions = sqlx::query_as::<_, LoanTransaction>(
            r#"
            UPDATE loan_transactions
            SET returned_at = $2, return_accepting_officer_id = $3, return_condition = $4
            WHERE loan_application_id = $1 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(now)
        .bind(accepting_officer_id)
        .bind(condition)
        .fetch_all(&mut *tx)
        .await?;

        if transactions.is_empty() {
            return Err(AppError::Conflict(
                "No open loan transactions for this application".to_string(),
            ));
        }

        let equipment_ids: Vec<i32> = transactions.iter().map(|t| t.equipment_id).collect();
        sqlx::query(
            r#"
            UPDATE equipment
            SET availability_status = $2, condition_status = $3, updated_at = $4
            WHERE id = ANY($1)
            "#,
        )
        .bind(&equipment_ids)
        .bind(condition.availability_after_return())
        .bind(condition)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transactions)
    }
}
