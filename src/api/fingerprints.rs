//! Attendance fingerprint endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::fingerprint::{
        CreateFingerprint, Fingerprint, FingerprintQuery, ImportJob, UpdateFingerprint,
    },
    workflow::{self, Capability},
    AppState,
};

use super::AuthenticatedUser;

/// Sheet upload parameters
#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ImportParams {
    /// Original file name, recorded on the job
    pub file_name: Option<String>,
}

/// List attendance records (own records unless privileged)
#[utoipa::path(
    get,
    path = "/fingerprints",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    params(FingerprintQuery),
    responses(
        (status = 200, description = "Attendance records", body = Vec<Fingerprint>)
    )
)]
pub async fn list_fingerprints(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<FingerprintQuery>,
) -> AppResult<Json<Vec<Fingerprint>>> {
    if !workflow::allows(&claims.actor(), Capability::ManageAttendance) {
        query.user_id = Some(claims.user_id);
    }
    let records = state.services.fingerprints.list(&query).await?;
    Ok(Json(records))
}

/// Get one attendance record
#[utoipa::path(
    get,
    path = "/fingerprints/{id}",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fingerprint ID")),
    responses(
        (status = 200, description = "Attendance record", body = Fingerprint),
        (status = 404, description = "Record not found")
    )
)]
pub async fn get_fingerprint(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Fingerprint>> {
    let record = state.services.fingerprints.get(id).await?;
    Ok(Json(record))
}

/// Create an attendance record manually
#[utoipa::path(
    post,
    path = "/fingerprints",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    request_body = CreateFingerprint,
    responses(
        (status = 201, description = "Record created", body = Fingerprint),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_fingerprint(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateFingerprint>,
) -> AppResult<(StatusCode, Json<Fingerprint>)> {
    let record = state
        .services
        .fingerprints
        .create(&claims.actor(), &request)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Update an attendance record
#[utoipa::path(
    put,
    path = "/fingerprints/{id}",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fingerprint ID")),
    request_body = UpdateFingerprint,
    responses(
        (status = 200, description = "Record updated", body = Fingerprint),
        (status = 404, description = "Record not found")
    )
)]
pub async fn update_fingerprint(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateFingerprint>,
) -> AppResult<Json<Fingerprint>> {
    let record = state
        .services
        .fingerprints
        .update(&claims.actor(), id, &request)
        .await?;
    Ok(Json(record))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/fingerprints/{id}",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fingerprint ID")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn delete_fingerprint(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state
        .services
        .fingerprints
        .delete(&claims.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Import an attendance sheet. The response is the job record; a partially
/// failed sheet still imports its good rows.
#[utoipa::path(
    post,
    path = "/fingerprints/import",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    params(ImportParams),
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import job finished", body = ImportJob),
        (status = 403, description = "Actor may not manage attendance")
    )
)]
pub async fn import_fingerprints(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> AppResult<Json<ImportJob>> {
    let file_name = params.file_name.as_deref().unwrap_or("attendance.csv");
    let job = state
        .services
        .fingerprints
        .import(&claims.actor(), file_name, &body)
        .await?;
    Ok(Json(job))
}

/// Export attendance records as a sheet
#[utoipa::path(
    get,
    path = "/fingerprints/export",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    params(FingerprintQuery),
    responses(
        (status = 200, description = "Sheet bytes", content_type = "text/csv")
    )
)]
pub async fn export_fingerprints(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<FingerprintQuery>,
) -> AppResult<impl IntoResponse> {
    if !workflow::allows(&claims.actor(), Capability::ManageAttendance) {
        query.user_id = Some(claims.user_id);
    }
    let bytes = state.services.fingerprints.export(&query).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attendance.csv\"".to_string(),
            ),
        ],
        bytes,
    ))
}

/// List import jobs
#[utoipa::path(
    get,
    path = "/fingerprints/imports",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Import jobs, newest first", body = Vec<ImportJob>)
    )
)]
pub async fn list_import_jobs(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ImportJob>>> {
    let jobs = state.services.fingerprints.list_jobs().await?;
    Ok(Json(jobs))
}

/// Get one import job
#[utoipa::path(
    get,
    path = "/fingerprints/imports/{id}",
    tag = "fingerprints",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Import job ID")),
    responses(
        (status = 200, description = "Import job", body = ImportJob),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_import_job(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ImportJob>> {
    let job = state.services.fingerprints.get_job(id).await?;
    Ok(Json(job))
}
