//! Equipment loan application endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::approval::DecisionRequest,
    models::loan_application::{
        CreateLoanApplication, LoanApplication, LoanApplicationDetails, LoanApplicationQuery,
        UpdateLoanApplication,
    },
    models::loan_transaction::{IssueRequest, ReturnRequest},
    AppState,
};

use super::AuthenticatedUser;

/// List loan applications (own applications unless privileged)
#[utoipa::path(
    get,
    path = "/loan-applications",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(LoanApplicationQuery),
    responses(
        (status = 200, description = "Loan applications", body = Vec<LoanApplication>)
    )
)]
pub async fn list_loan_applications(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanApplicationQuery>,
) -> AppResult<Json<Vec<LoanApplication>>> {
    let applications = state
        .services
        .loan_applications
        .list(&claims.actor(), query)
        .await?;
    Ok(Json(applications))
}

/// Get a loan application with items, approvals and transactions
#[utoipa::path(
    get,
    path = "/loan-applications/{id}",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Loan application", body = LoanApplicationDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn get_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanApplicationDetails>> {
    let details = state
        .services
        .loan_applications
        .get_details(&claims.actor(), id)
        .await?;
    Ok(Json(details))
}

/// Create a draft loan application
#[utoipa::path(
    post,
    path = "/loan-applications",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    request_body = CreateLoanApplication,
    responses(
        (status = 201, description = "Draft created", body = LoanApplication),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoanApplication>,
) -> AppResult<(StatusCode, Json<LoanApplication>)> {
    let application = state
        .services
        .loan_applications
        .create(&claims.actor(), &request)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// Update a draft loan application
#[utoipa::path(
    put,
    path = "/loan-applications/{id}",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    request_body = UpdateLoanApplication,
    responses(
        (status = 200, description = "Draft updated", body = LoanApplication),
        (status = 409, description = "Application is no longer a draft"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateLoanApplication>,
) -> AppResult<Json<LoanApplication>> {
    let application = state
        .services
        .loan_applications
        .update(&claims.actor(), id, &request)
        .await?;
    Ok(Json(application))
}

/// Submit a draft for approval
#[utoipa::path(
    post,
    path = "/loan-applications/{id}/submit",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Submitted", body = LoanApplicationDetails),
        (status = 409, description = "Not submittable from the current status"),
        (status = 422, description = "Submission validation failed")
    )
)]
pub async fn submit_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanApplicationDetails>> {
    let details = state
        .services
        .loan_applications
        .submit(&claims.actor(), id)
        .await?;
    Ok(Json(details))
}

/// Decide the pending approval stage
#[utoipa::path(
    post,
    path = "/loan-applications/{id}/decision",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = LoanApplicationDetails),
        (status = 403, description = "Actor may not decide this stage"),
        (status = 409, description = "No stage awaiting a decision")
    )
)]
pub async fn decide_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<DecisionRequest>,
) -> AppResult<Json<LoanApplicationDetails>> {
    let details = state
        .services
        .loan_applications
        .decide(&claims.actor(), id, &request)
        .await?;
    Ok(Json(details))
}

/// Issue concrete equipment units for an approved application
#[utoipa::path(
    post,
    path = "/loan-applications/{id}/issue",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    request_body = IssueRequest,
    responses(
        (status = 200, description = "Units issued", body = LoanApplicationDetails),
        (status = 403, description = "Actor may not manage issuance"),
        (status = 409, description = "A unit is unavailable or the status does not permit issuing")
    )
)]
pub async fn issue_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<IssueRequest>,
) -> AppResult<Json<LoanApplicationDetails>> {
    let details = state
        .services
        .loan_applications
        .issue(&claims.actor(), id, &request)
        .await?;
    Ok(Json(details))
}

/// Accept the issued units back
#[utoipa::path(
    post,
    path = "/loan-applications/{id}/return",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Units returned", body = LoanApplicationDetails),
        (status = 403, description = "Actor may not manage issuance"),
        (status = 409, description = "Nothing is out on this application")
    )
)]
pub async fn return_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<LoanApplicationDetails>> {
    let details = state
        .services
        .loan_applications
        .accept_return(&claims.actor(), id, &request)
        .await?;
    Ok(Json(details))
}

/// Close out a returned application
#[utoipa::path(
    post,
    path = "/loan-applications/{id}/complete",
    tag = "loan-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application completed", body = LoanApplicationDetails),
        (status = 409, description = "Not completable from the current status")
    )
)]
pub async fn complete_loan_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanApplicationDetails>> {
    let details = state
        .services
        .loan_applications
        .complete(&claims.actor(), id)
        .await?;
    Ok(Json(details))
}
