//! Organizational grade model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Grade record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: i32,
    /// Grade name, unique (e.g. "N41")
    pub name: String,
    /// Numeric rank level, unique, >= 1
    pub level: i16,
    /// Whether holders of this grade may decide support-stage approvals
    pub is_approver: bool,
}

/// Create grade request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGrade {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "Level must be at least 1"))]
    pub level: i16,
    pub is_approver: Option<bool>,
}

/// Update grade request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGrade {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "Level must be at least 1"))]
    pub level: Option<i16>,
    pub is_approver: Option<bool>,
}
