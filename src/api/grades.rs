//! Grade management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::grade::{CreateGrade, Grade, UpdateGrade},
    AppState,
};

use super::AuthenticatedUser;

/// List grades
#[utoipa::path(
    get,
    path = "/grades",
    tag = "grades",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Grades ordered by level", body = Vec<Grade>)
    )
)]
pub async fn list_grades(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Grade>>> {
    let grades = state.services.grades.list().await?;
    Ok(Json(grades))
}

/// Get a grade by ID
#[utoipa::path(
    get,
    path = "/grades/{id}",
    tag = "grades",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade", body = Grade),
        (status = 404, description = "Grade not found")
    )
)]
pub async fn get_grade(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Grade>> {
    let grade = state.services.grades.get(id).await?;
    Ok(Json(grade))
}

/// Create a grade
#[utoipa::path(
    post,
    path = "/grades",
    tag = "grades",
    security(("bearer_auth" = [])),
    request_body = CreateGrade,
    responses(
        (status = 201, description = "Grade created", body = Grade),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_grade(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateGrade>,
) -> AppResult<(StatusCode, Json<Grade>)> {
    claims.require_admin()?;

    let grade = state.services.grades.create(&request).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

/// Update a grade
#[utoipa::path(
    put,
    path = "/grades/{id}",
    tag = "grades",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Grade ID")),
    request_body = UpdateGrade,
    responses(
        (status = 200, description = "Grade updated", body = Grade),
        (status = 404, description = "Grade not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_grade(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateGrade>,
) -> AppResult<Json<Grade>> {
    claims.require_admin()?;

    let grade = state.services.grades.update(id, &request).await?;
    Ok(Json(grade))
}

/// Delete a grade
#[utoipa::path(
    delete,
    path = "/grades/{id}",
    tag = "grades",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Grade ID")),
    responses(
        (status = 204, description = "Grade deleted"),
        (status = 404, description = "Grade not found"),
        (status = 409, description = "Grade still referenced by users")
    )
)]
pub async fn delete_grade(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.grades.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
