//! Grades repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::grade::{CreateGrade, Grade, UpdateGrade},
};

#[derive(Clone)]
pub struct GradesRepository {
    pool: Pool<Postgres>,
}

impl GradesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Grade>> {
        let grades = sqlx::query_as::<_, Grade>("SELECT * FROM grades ORDER BY level")
            .fetch_all(&self.pool)
            .await?;
        Ok(grades)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Grade> {
        sqlx::query_as::<_, Grade>("SELECT * FROM grades WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Grade {} not found", id)))
    }

    pub async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM grades WHERE name = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn level_taken(&self, level: i16, exclude_id: Option<i32>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM grades WHERE level = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(level)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, data: &CreateGrade) -> AppResult<Grade> {
        let grade = sqlx::query_as::<_, Grade>(
            "INSERT INTO grades (name, level, is_approver) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.level)
        .bind(data.is_approver.unwrap_or(false))
        .fetch_one(&self.pool)
        .await?;
        Ok(grade)
    }

    pub async fn update(&self, id: i32, data: &UpdateGrade) -> AppResult<Grade> {
        sqlx::query_as::<_, Grade>(
            r#"
            UPDATE grades SET
                name = COALESCE($2, name),
                level = COALESCE($3, level),
                is_approver = COALESCE($4, is_approver)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.level)
        .bind(data.is_approver)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Grade {} not found", id)))
    }

    /// Delete a grade; refused while users still reference it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE grade_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if referenced {
            return Err(AppError::Conflict(
                "Grade is still referenced by users".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM grades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Grade {} not found", id)));
        }
        Ok(())
    }
}
