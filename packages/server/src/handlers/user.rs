use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::shared::{ListResponse, parse_id};
use crate::models::user::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (email, fields) = payload.into_parts();
    let user = state.users.create(&email, fields, None).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List all users",
    responses(
        (status = 200, description = "All users in insertion order", body = ListResponse<UserResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<UserResponse>>, AppError> {
    let users = state.users.list_all().await?;
    Ok(Json(ListResponse::from_records(users)))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id, "User")?;
    Ok(Json(state.users.get_by_id(id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/users/email/{email}",
    tag = "Users",
    operation_id = "getUserByEmail",
    summary = "Get a user by email",
    params(("email" = String, Path, description = "Email address, exact match")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(state.users.get_by_key(&email).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user",
    description = "Partial update; only provided fields are modified.",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id, "User")?;
    let user = state.users.update(id, payload.into()).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "User")?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
