//! Approval ledger model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{ApplicationType, ApprovalDecision, ApprovalStage};

/// One approval-stage row. The ledger is append-only: a decision creates
/// exactly one new row and no row is ever mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Approval {
    pub id: i32,
    pub application_type: ApplicationType,
    pub application_id: i32,
    pub stage: ApprovalStage,
    /// Null for seeded pending rows, set for decisions
    pub officer_id: Option<i32>,
    pub decision: ApprovalDecision,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Decision request on a pending stage
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DecisionRequest {
    /// `approved` or `rejected`; `pending` is not a decision
    pub decision: ApprovalDecision,
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}
