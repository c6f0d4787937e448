//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::enums::Role,
    models::user::{CreateUser, UpdateUser, User, UserQuery, UserShort},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID (soft-deleted users are invisible)
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get user by login email
    pub async fn get_by_email(&self, email: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
    }

    /// Whether any active user exists
    pub async fn any_active(&self) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE deleted_at IS NULL)")
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// NRIC to user-id map for one import pass, so row resolution stays a
    /// pure lookup
    pub async fn nric_map(&self) -> AppResult<std::collections::HashMap<String, i32>> {
        let rows: Vec<(String, i32)> =
            sqlx::query_as("SELECT nric, id FROM users WHERE deleted_at IS NULL")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// List users with optional filters
    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<UserShort>> {
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = query.page.unwrap_or(1).max(1).saturating_sub(1) * per_page;

        let rows = sqlx::query_as::<_, UserShort>(
            r#"
            SELECT id, name, email, grade_id, role
            FROM users
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR department = $2)
            ORDER BY name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&query.name)
        .bind(&query.department)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Whether a login email is already taken, optionally excluding a record
    pub async fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Whether a NRIC is already taken, optionally excluding a record
    pub async fn nric_taken(&self, nric: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE nric = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(nric)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Create a user (password already hashed by the caller)
    pub async fn create(&self, data: &CreateUser, password_hash: Option<String>) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, personal_email, nric, phone, grade_id,
                               department, position, role, password)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.personal_email)
        .bind(&data.nric)
        .bind(&data.phone)
        .bind(data.grade_id)
        .bind(&data.department)
        .bind(&data.position)
        .bind(data.role.unwrap_or(Role::Staff))
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Update a user; absent fields keep their values
    pub async fn update(
        &self,
        id: i32,
        data: &UpdateUser,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                personal_email = COALESCE($4, personal_email),
                nric = COALESCE($5, nric),
                phone = COALESCE($6, phone),
                grade_id = COALESCE($7, grade_id),
                department = COALESCE($8, department),
                position = COALESCE($9, position),
                role = COALESCE($10, role),
                password = COALESCE($11, password),
                updated_at = $12
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.personal_email)
        .bind(&data.nric)
        .bind(&data.phone)
        .bind(data.grade_id)
        .bind(&data.department)
        .bind(&data.position)
        .bind(data.role)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Soft-delete a user; records are never hard-deleted
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
