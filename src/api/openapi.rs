//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, email_applications, equipment, fingerprints, grades, health, loan_applications, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MOTAC Resource Management API",
        version = "1.0.0",
        description = "Integrated resource management REST API: account provisioning requests, ICT equipment loans and attendance records"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Grades
        grades::list_grades,
        grades::get_grade,
        grades::create_grade,
        grades::update_grade,
        grades::delete_grade,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Email applications
        email_applications::list_email_applications,
        email_applications::get_email_application,
        email_applications::create_email_application,
        email_applications::update_email_application,
        email_applications::submit_email_application,
        email_applications::decide_email_application,
        email_applications::provision_email_application,
        // Loan applications
        loan_applications::list_loan_applications,
        loan_applications::get_loan_application,
        loan_applications::create_loan_application,
        loan_applications::update_loan_application,
        loan_applications::submit_loan_application,
        loan_applications::decide_loan_application,
        loan_applications::issue_loan_application,
        loan_applications::return_loan_application,
        loan_applications::complete_loan_application,
        // Fingerprints
        fingerprints::list_fingerprints,
        fingerprints::get_fingerprint,
        fingerprints::create_fingerprint,
        fingerprints::update_fingerprint,
        fingerprints::delete_fingerprint,
        fingerprints::import_fingerprints,
        fingerprints::export_fingerprints,
        fingerprints::list_import_jobs,
        fingerprints::get_import_job,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::enums::Role,
            // Grades
            crate::models::grade::Grade,
            crate::models::grade::CreateGrade,
            crate::models::grade::UpdateGrade,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentDetails,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::enums::AssetType,
            crate::models::enums::EquipmentAvailability,
            crate::models::enums::EquipmentCondition,
            // Email applications
            crate::models::email_application::EmailApplication,
            crate::models::email_application::EmailApplicationDetails,
            crate::models::email_application::CreateEmailApplication,
            crate::models::email_application::UpdateEmailApplication,
            crate::models::email_application::ProvisionedAccount,
            crate::models::enums::EmailApplicationStatus,
            crate::models::enums::ServiceStatus,
            // Loan applications
            crate::models::loan_application::LoanApplication,
            crate::models::loan_application::LoanApplicationItem,
            crate::models::loan_application::LoanApplicationDetails,
            crate::models::loan_application::LoanItemRequest,
            crate::models::loan_application::CreateLoanApplication,
            crate::models::loan_application::UpdateLoanApplication,
            crate::models::loan_transaction::LoanTransaction,
            crate::models::loan_transaction::IssueRequest,
            crate::models::loan_transaction::ReturnRequest,
            crate::models::enums::LoanApplicationStatus,
            // Approvals
            crate::models::approval::Approval,
            crate::models::approval::DecisionRequest,
            crate::models::enums::ApplicationType,
            crate::models::enums::ApprovalStage,
            crate::models::enums::ApprovalDecision,
            // Fingerprints
            crate::models::fingerprint::Fingerprint,
            crate::models::fingerprint::CreateFingerprint,
            crate::models::fingerprint::UpdateFingerprint,
            crate::models::fingerprint::ImportJob,
            crate::models::fingerprint::RowFailure,
            crate::models::enums::ImportStatus,
            fingerprints::ImportParams,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::validation::FieldErrors,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "grades", description = "Grade management"),
        (name = "equipment", description = "Equipment inventory"),
        (name = "email-applications", description = "Account provisioning applications"),
        (name = "loan-applications", description = "Equipment loan applications"),
        (name = "fingerprints", description = "Attendance records, sheet import and export")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
