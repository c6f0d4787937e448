//! Equipment (ICT asset) model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{AssetType, EquipmentAvailability, EquipmentCondition};

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub asset_type: AssetType,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Serial number, unique
    pub serial_number: String,
    /// Inventory tag, unique when present
    pub tag_id: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
    /// Authoritative only at rest; while on loan the open transaction wins
    pub availability_status: EquipmentAvailability,
    pub condition_status: EquipmentCondition,
    pub location: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Equipment with its derived availability (stored column reconciled against
/// open loan transactions)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentDetails {
    #[serde(flatten)]
    pub equipment: Equipment,
    /// `on_loan` if an open transaction exists, else the stored status
    pub effective_availability: EquipmentAvailability,
}

/// Equipment query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    pub asset_type: Option<AssetType>,
    pub availability: Option<EquipmentAvailability>,
    pub department: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    pub asset_type: AssetType,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(length(min = 1, message = "Serial number is required"))]
    pub serial_number: String,
    pub tag_id: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
    pub condition_status: Option<EquipmentCondition>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    pub asset_type: Option<AssetType>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(length(min = 1, message = "Serial number is required"))]
    pub serial_number: Option<String>,
    pub tag_id: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
    /// At-rest values only; `on_loan` is written by issuance and return
    pub availability_status: Option<EquipmentAvailability>,
    pub condition_status: Option<EquipmentCondition>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
}
