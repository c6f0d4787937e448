//! Fingerprints repository: attendance records and import jobs

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    importer::{ExportRow, ParsedRow},
    models::enums::ImportStatus,
    models::fingerprint::{
        CreateFingerprint, Fingerprint, FingerprintQuery, ImportJob, RowFailure, UpdateFingerprint,
    },
};

#[derive(Clone)]
pub struct FingerprintsRepository {
    pool: Pool<Postgres>,
}

impl FingerprintsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Fingerprint> {
        sqlx::query_as::<_, Fingerprint>("SELECT * FROM fingerprints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fingerprint {} not found", id)))
    }

    pub async fn list(&self, query: &FingerprintQuery) -> AppResult<Vec<Fingerprint>> {
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = query.page.unwrap_or(1).max(1).saturating_sub(1) * per_page;

        let rows = sqlx::query_as::<_, Fingerprint>(
            r#"
            SELECT * FROM fingerprints
            WHERE ($1::int IS NULL OR user_id = $1)
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
              AND ($4::bool IS NOT TRUE OR (check_in IS NULL AND check_out IS NULL))
              AND ($5::bool IS NOT TRUE OR (check_in IS NULL) != (check_out IS NULL))
            ORDER BY date DESC, user_id
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(query.user_id)
        .bind(query.from)
        .bind(query.to)
        .bind(query.absent_only)
        .bind(query.one_print_only)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, data: &CreateFingerprint) -> AppResult<Fingerprint> {
        let log = render_log(data.date, data.check_in, data.check_out);
        let record = sqlx::query_as::<_, Fingerprint>(
            r#"
            INSERT INTO fingerprints (user_id, date, check_in, check_out, log)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.date)
        .bind(data.check_in)
        .bind(data.check_out)
        .bind(log)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn update(&self, id: i32, data: &UpdateFingerprint) -> AppResult<Fingerprint> {
        let current = self.get_by_id(id).await?;
        let date = data.date.unwrap_or(current.date);
        let check_in = data.check_in.or(current.check_in);
        let check_out = data.check_out.or(current.check_out);
        let log = render_log(date, check_in, check_out);

        let record = sqlx::query_as::<_, Fingerprint>(
            r#"
            UPDATE fingerprints
            SET date = $2, check_in = $3, check_out = $4, log = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(date)
        .bind(check_in)
        .bind(check_out)
        .bind(log)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM fingerprints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Fingerprint {} not found", id)));
        }
        Ok(())
    }

    /// Persist the good rows of a parsed sheet. A record already present for
    /// the same employee and date is overwritten with the sheet's times.
    pub async fn insert_parsed(&self, rows: &[ParsedRow]) -> AppResult<()> {
        for row in rows {
            let log = render_log(row.date, row.check_in, row.check_out);
            sqlx::query(
                r#"
                INSERT INTO fingerprints (user_id, date, check_in, check_out, log)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, date) DO UPDATE
                SET check_in = EXCLUDED.check_in,
                    check_out = EXCLUDED.check_out,
                    log = EXCLUDED.log,
                    updated_at = NOW()
                "#,
            )
            .bind(row.user_id)
            .bind(row.date)
            .bind(row.check_in)
            .bind(row.check_out)
            .bind(log)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    /// Rows for a sheet export, joined with the employee identifier
    pub async fn export_rows(&self, query: &FingerprintQuery) -> AppResult<Vec<ExportRow>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            nric: String,
            date: chrono::NaiveDate,
            check_in: Option<chrono::NaiveTime>,
            check_out: Option<chrono::NaiveTime>,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT u.nric, f.date, f.check_in, f.check_out
            FROM fingerprints f
            JOIN users u ON u.id = f.user_id
            WHERE ($1::int IS NULL OR f.user_id = $1)
              AND ($2::date IS NULL OR f.date >= $2)
              AND ($3::date IS NULL OR f.date <= $3)
            ORDER BY f.date, u.nric
            "#,
        )
        .bind(query.user_id)
        .bind(query.from)
        .bind(query.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ExportRow {
                nric: r.nric,
                date: r.date,
                check_in: r.check_in,
                check_out: r.check_out,
            })
            .collect())
    }

    pub async fn create_job(&self, file_name: &str) -> AppResult<ImportJob> {
        let job = sqlx::query_as::<_, ImportJob>(
            "INSERT INTO import_jobs (file_name) VALUES ($1) RETURNING *",
        )
        .bind(file_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn finish_job(
        &self,
        id: i32,
        status: ImportStatus,
        total_rows: i32,
        success_count: i32,
        failures: &[RowFailure],
    ) -> AppResult<ImportJob> {
        let job = sqlx::query_as::<_, ImportJob>(
            r#"
            UPDATE import_jobs
            SET status = $2, total_rows = $3, success_count = $4,
                failure_count = $5, failures = $6, finished_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(total_rows)
        .bind(success_count)
        .bind(failures.len() as i32)
        .bind(sqlx::types::Json(failures))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Import job {} not found", id)))?;
        Ok(job)
    }

    pub async fn get_job(&self, id: i32) -> AppResult<ImportJob> {
        sqlx::query_as::<_, ImportJob>("SELECT * FROM import_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Import job {} not found", id)))
    }

    pub async fn list_jobs(&self) -> AppResult<Vec<ImportJob>> {
        let jobs = sqlx::query_as::<_, ImportJob>(
            "SELECT * FROM import_jobs ORDER BY created_at DESC LIMIT 100",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }
}

fn render_log(
    date: chrono::NaiveDate,
    check_in: Option<chrono::NaiveTime>,
    check_out: Option<chrono::NaiveTime>,
) -> String {
    let fmt = |t: Option<chrono::NaiveTime>| {
        t.map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!("{} {} {}", date.format("%Y-%m-%d"), fmt(check_in), fmt(check_out))
}
