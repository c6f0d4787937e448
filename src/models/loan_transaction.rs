//! Loan transaction (issuance) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::EquipmentCondition;

/// Record linking an approved loan application to an actual issuance event.
/// A transaction is open while `returned_at` is null; at most one open
/// transaction exists per equipment unit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanTransaction {
    pub id: i32,
    pub loan_application_id: i32,
    pub equipment_id: i32,
    pub issuing_officer_id: i32,
    pub issued_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub return_accepting_officer_id: Option<i32>,
    pub return_condition: Option<EquipmentCondition>,
}

/// Issue request: the concrete units handed over for an approved application
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueRequest {
    #[validate(length(min = 1, message = "At least one equipment unit is required"))]
    pub equipment_ids: Vec<i32>,
}

/// Return request: condition observed when the units come back
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub condition: EquipmentCondition,
}
