//! Equipment loan application model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::approval::Approval;
use super::enums::{AssetType, LoanApplicationStatus};
use super::loan_transaction::LoanTransaction;

/// Loan application record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanApplication {
    pub id: i32,
    /// Requesting user
    pub user_id: i32,
    pub purpose: Option<String>,
    pub location: Option<String>,
    pub loan_start_date: Option<NaiveDate>,
    pub loan_end_date: Option<NaiveDate>,
    /// When false a responsible officer must be named
    pub applicant_is_responsible: bool,
    /// Required unless the applicant is the responsible party
    pub responsible_officer_id: Option<i32>,
    pub applicant_confirmed: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub status: LoanApplicationStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One requested line on a loan application
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanApplicationItem {
    pub id: i32,
    pub loan_application_id: i32,
    pub equipment_type: AssetType,
    pub quantity: i32,
    pub notes: Option<String>,
    /// Ordering within the application
    pub position: i32,
}

/// Application with its items, approval history and transactions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanApplicationDetails {
    #[serde(flatten)]
    pub application: LoanApplication,
    pub items: Vec<LoanApplicationItem>,
    pub approvals: Vec<Approval>,
    pub transactions: Vec<LoanTransaction>,
}

/// Loan application query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanApplicationQuery {
    pub user_id: Option<i32>,
    pub status: Option<LoanApplicationStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One requested line in a create/update request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoanItemRequest {
    pub equipment_type: AssetType,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Create (draft) loan application request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoanApplication {
    #[validate(length(max = 1000, message = "Purpose must be at most 1000 characters"))]
    pub purpose: Option<String>,
    pub location: Option<String>,
    pub loan_start_date: Option<NaiveDate>,
    pub loan_end_date: Option<NaiveDate>,
    pub applicant_is_responsible: Option<bool>,
    pub responsible_officer_id: Option<i32>,
    pub applicant_confirmed: Option<bool>,
    #[validate(nested)]
    pub items: Option<Vec<LoanItemRequest>>,
}

/// Update (draft) loan application request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLoanApplication {
    #[validate(length(max = 1000, message = "Purpose must be at most 1000 characters"))]
    pub purpose: Option<String>,
    pub location: Option<String>,
    pub loan_start_date: Option<NaiveDate>,
    pub loan_end_date: Option<NaiveDate>,
    pub applicant_is_responsible: Option<bool>,
    pub responsible_officer_id: Option<i32>,
    pub applicant_confirmed: Option<bool>,
    /// When present, replaces the item list
    #[validate(nested)]
    pub items: Option<Vec<LoanItemRequest>>,
}
