//! Data models for the Resource Management server

pub mod approval;
pub mod email_application;
pub mod enums;
pub mod equipment;
pub mod fingerprint;
pub mod grade;
pub mod loan_application;
pub mod loan_transaction;
pub mod user;

// Re-export commonly used types
pub use approval::Approval;
pub use email_application::EmailApplication;
pub use enums::{
    ApplicationType, ApprovalDecision, ApprovalStage, AssetType, EmailApplicationStatus,
    EquipmentAvailability, EquipmentCondition, ImportStatus, LoanApplicationStatus, Role,
    ServiceStatus,
};
pub use equipment::Equipment;
pub use fingerprint::Fingerprint;
pub use grade::Grade;
pub use loan_application::LoanApplication;
pub use loan_transaction::LoanTransaction;
pub use user::{Actor, User};
