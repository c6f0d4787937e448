//! Email / account provisioning application model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::approval::Approval;
use super::enums::{EmailApplicationStatus, ServiceStatus};

/// Email application record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EmailApplication {
    pub id: i32,
    /// Requesting user
    pub user_id: i32,
    pub service_status: ServiceStatus,
    pub purpose: Option<String>,
    pub proposed_email: Option<String>,
    /// Group mailbox fields: required together when any one is present
    pub group_email: Option<String>,
    pub group_admin_name: Option<String>,
    pub group_admin_email: Option<String>,
    pub certification_accepted: bool,
    pub certification_at: Option<DateTime<Utc>>,
    pub status: EmailApplicationStatus,
    pub rejection_reason: Option<String>,
    pub final_assigned_email: Option<String>,
    pub final_assigned_user_id: Option<String>,
    pub provisioned_at: Option<DateTime<Utc>>,
    pub provision_attempts: i32,
    pub provision_failure_reason: Option<String>,
    /// Set on first submission; draft is only re-enterable before this
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application with its approval history, oldest decision first
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmailApplicationDetails {
    #[serde(flatten)]
    pub application: EmailApplication,
    pub approvals: Vec<Approval>,
}

/// Email application query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmailApplicationQuery {
    pub user_id: Option<i32>,
    pub status: Option<EmailApplicationStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create (draft) email application request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmailApplication {
    pub service_status: ServiceStatus,
    #[validate(length(max = 1000, message = "Purpose must be at most 1000 characters"))]
    pub purpose: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub proposed_email: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub group_email: Option<String>,
    pub group_admin_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub group_admin_email: Option<String>,
    pub certification_accepted: Option<bool>,
}

/// Update (draft) email application request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEmailApplication {
    pub service_status: Option<ServiceStatus>,
    #[validate(length(max = 1000, message = "Purpose must be at most 1000 characters"))]
    pub purpose: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub proposed_email: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub group_email: Option<String>,
    pub group_admin_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub group_admin_email: Option<String>,
    pub certification_accepted: Option<bool>,
}

/// Result of a provisioning attempt against the directory backend
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProvisionedAccount {
    pub assigned_email: String,
    pub assigned_user_id: String,
}
