//! Email / account provisioning application endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::approval::DecisionRequest,
    models::email_application::{
        CreateEmailApplication, EmailApplication, EmailApplicationDetails, EmailApplicationQuery,
        UpdateEmailApplication,
    },
    AppState,
};

use super::AuthenticatedUser;

/// List email applications (own applications unless privileged)
#[utoipa::path(
    get,
    path = "/email-applications",
    tag = "email-applications",
    security(("bearer_auth" = [])),
    params(EmailApplicationQuery),
    responses(
        (status = 200, description = "Email applications", body = Vec<EmailApplication>)
    )
)]
pub async fn list_email_applications(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<EmailApplicationQuery>,
) -> AppResult<Json<Vec<EmailApplication>>> {
    let applications = state
        .services
        .email_applications
        .list(&claims.actor(), query)
        .await?;
    Ok(Json(applications))
}

/// Get an email application with its approval history
#[utoipa::path(
    get,
    path = "/email-applications/{id}",
    tag = "email-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Email application", body = EmailApplicationDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn get_email_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EmailApplicationDetails>> {
    let details = state
        .services
        .email_applications
        .get_details(&claims.actor(), id)
        .await?;
    Ok(Json(details))
}

/// Create a draft email application
#[utoipa::path(
    post,
    path = "/email-applications",
    tag = "email-applications",
    security(("bearer_auth" = [])),
    request_body = CreateEmailApplication,
    responses(
        (status = 201, description = "Draft created", body = EmailApplication),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_email_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateEmailApplication>,
) -> AppResult<(StatusCode, Json<EmailApplication>)> {
    let application = state
        .services
        .email_applications
        .create(&claims.actor(), &request)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// Update a draft email application
#[utoipa::path(
    put,
    path = "/email-applications/{id}",
    tag = "email-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    request_body = UpdateEmailApplication,
    responses(
        (status = 200, description = "Draft updated", body = EmailApplication),
        (status = 409, description = "Application is no longer a draft"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_email_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateEmailApplication>,
) -> AppResult<Json<EmailApplication>> {
    let application = state
        .services
        .email_applications
        .update(&claims.actor(), id, &request)
        .await?;
    Ok(Json(application))
}

/// Submit a draft for approval
#[utoipa::path(
    post,
    path = "/email-applications/{id}/submit",
    tag = "email-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Submitted", body = EmailApplicationDetails),
        (status = 409, description = "Not submittable from the current status"),
        (status = 422, description = "Submission validation failed")
    )
)]
pub async fn submit_email_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EmailApplicationDetails>> {
    let details = state
        .services
        .email_applications
        .submit(&claims.actor(), id)
        .await?;
    Ok(Json(details))
}

/// Decide the pending approval stage
#[utoipa::path(
    post,
    path = "/email-applications/{id}/decision",
    tag = "email-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = EmailApplicationDetails),
        (status = 403, description = "Actor may not decide this stage"),
        (status = 409, description = "No stage awaiting a decision")
    )
)]
pub async fn decide_email_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<DecisionRequest>,
) -> AppResult<Json<EmailApplicationDetails>> {
    let details = state
        .services
        .email_applications
        .decide(&claims.actor(), id, &request)
        .await?;
    Ok(Json(details))
}

/// Provision the approved application (or retry a failed one)
#[utoipa::path(
    post,
    path = "/email-applications/{id}/provision",
    tag = "email-applications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Account provisioned", body = EmailApplicationDetails),
        (status = 409, description = "Not provisionable from the current status"),
        (status = 502, description = "Directory backend failed")
    )
)]
pub async fn provision_email_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EmailApplicationDetails>> {
    let details = state
        .services
        .email_applications
        .provision(&claims.actor(), id)
        .await?;
    Ok(Json(details))
}
