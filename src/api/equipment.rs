//! Equipment inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::equipment::{
        CreateEquipment, Equipment, EquipmentDetails, EquipmentQuery, UpdateEquipment,
    },
    workflow::{self, Capability},
    AppState,
};

use super::AuthenticatedUser;

/// List equipment with derived availability
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment units", body = Vec<EquipmentDetails>)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<EquipmentDetails>>> {
    let units = state.services.equipment.list(&query).await?;
    Ok(Json(units))
}

/// Get one equipment unit
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment unit", body = EquipmentDetails),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentDetails>> {
    let unit = state.services.equipment.get(id).await?;
    Ok(Json(unit))
}

/// Register an equipment unit
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment registered", body = Equipment),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    workflow::require(&claims.actor(), Capability::ManageIssuance)?;

    let unit = state.services.equipment.create(&request).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

/// Update an equipment unit
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Availability is locked by an open loan"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    workflow::require(&claims.actor(), Capability::ManageIssuance)?;

    let unit = state.services.equipment.update(id, &request).await?;
    Ok(Json(unit))
}

/// Delete an equipment unit
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Equipment has loan transaction history")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    workflow::require(&claims.actor(), Capability::ManageIssuance)?;

    state.services.equipment.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
