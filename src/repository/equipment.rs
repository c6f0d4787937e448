//! Equipment repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::enums::{EquipmentAvailability, EquipmentCondition},
    models::equipment::{
        CreateEquipment, Equipment, EquipmentDetails, EquipmentQuery, UpdateEquipment,
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment with the derived availability attached. A unit with an
    /// open loan transaction is `on_loan` regardless of the stored column.
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<EquipmentDetails>> {
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = query.page.unwrap_or(1).max(1).saturating_sub(1) * per_page;

        let rows = sqlx::query(
            r#"
            SELECT e.*,
                   EXISTS(
                       SELECT 1 FROM loan_transactions t
                       WHERE t.equipment_id = e.id AND t.returned_at IS NULL
                   ) AS has_open_loan
            FROM equipment e
            WHERE ($1::text IS NULL OR e.asset_type = $1)
              AND ($2::text IS NULL OR e.availability_status = $2)
              AND ($3::text IS NULL OR e.department = $3)
            ORDER BY e.serial_number
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.asset_type.map(|t| t.as_str().to_string()))
        .bind(query.availability.map(|a| a.as_str().to_string()))
        .bind(&query.department)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let has_open_loan: bool = row.get("has_open_loan");
            let equipment = Equipment {
                id: row.get("id"),
                asset_type: row.get("asset_type"),
                brand: row.get("brand"),
                model: row.get("model"),
                serial_number: row.get("serial_number"),
                tag_id: row.get("tag_id"),
                purchase_date: row.get("purchase_date"),
                warranty_end_date: row.get("warranty_end_date"),
                availability_status: row.get("availability_status"),
                condition_status: row.get("condition_status"),
                location: row.get("location"),
                department: row.get("department"),
                notes: row.get("notes"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            };
            let effective_availability = if has_open_loan {
                EquipmentAvailability::OnLoan
            } else {
                equipment.availability_status
            };
            result.push(EquipmentDetails {
                equipment,
                effective_availability,
            });
        }
        Ok(result)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub async fn has_open_loan(&self, id: i32) -> AppResult<bool> {
        let open: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loan_transactions WHERE equipment_id = $1 AND returned_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(open)
    }

    /// Get one unit with its derived availability
    pub async fn get_details(&self, id: i32) -> AppResult<EquipmentDetails> {
        let equipment = self.get_by_id(id).await?;
        let has_open_loan = self.has_open_loan(id).await?;

        let effective_availability = if has_open_loan {
            EquipmentAvailability::OnLoan
        } else {
            equipment.availability_status
        };
        Ok(EquipmentDetails {
            equipment,
            effective_availability,
        })
    }

    pub async fn serial_taken(&self, serial: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(serial)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn tag_taken(&self, tag: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment WHERE tag_id = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(tag)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let equipment = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (asset_type, brand, model, serial_number, tag_id,
                                   purchase_date, warranty_end_date, condition_status,
                                   location, department, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(data.asset_type)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(&data.tag_id)
        .bind(data.purchase_date)
        .bind(data.warranty_end_date)
        .bind(data.condition_status.unwrap_or(EquipmentCondition::Good))
        .bind(&data.location)
        .bind(&data.department)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(equipment)
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET
                asset_type = COALESCE($2, asset_type),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                serial_number = COALESCE($5, serial_number),
                tag_id = COALESCE($6, tag_id),
                purchase_date = COALESCE($7, purchase_date),
                warranty_end_date = COALESCE($8, warranty_end_date),
                availability_status = COALESCE($9, availability_status),
                condition_status = COALESCE($10, condition_status),
                location = COALESCE($11, location),
                department = COALESCE($12, department),
                notes = COALESCE($13, notes),
                updated_at = $14
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.asset_type)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(&data.tag_id)
        .bind(data.purchase_date)
        .bind(data.warranty_end_date)
        .bind(data.availability_status)
        .bind(data.condition_status)
        .bind(&data.location)
        .bind(&data.department)
        .bind(&data.notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete a unit; refused once any loan transaction references it, so
    /// issuance history stays intact
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loan_transactions WHERE equipment_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if referenced {
            return Err(AppError::Conflict(
                "Equipment has loan transaction history".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }
}
