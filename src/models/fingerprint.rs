//! Attendance fingerprint model and import job types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::ImportStatus;

/// One attendance clock-event record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fingerprint {
    pub id: i32,
    /// Employee reference
    pub user_id: i32,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    /// Derived display string ("<date> <in> <out>")
    pub log: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fingerprint query parameters (also drive the export filter)
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct FingerprintQuery {
    pub user_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only records with no check-in and no check-out
    pub absent_only: Option<bool>,
    /// Only records with exactly one of check-in / check-out
    pub one_print_only: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create fingerprint request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFingerprint {
    pub user_id: i32,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

/// Update fingerprint request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFingerprint {
    pub date: Option<NaiveDate>,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

/// One failed sheet row: number and reason, reported without aborting the
/// batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RowFailure {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub reason: String,
}

/// Import job summary record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ImportJob {
    pub id: i32,
    pub file_name: String,
    pub status: ImportStatus,
    pub total_rows: i32,
    pub success_count: i32,
    pub failure_count: i32,
    #[schema(value_type = Vec<RowFailure>)]
    pub failures: sqlx::types::Json<Vec<RowFailure>>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
