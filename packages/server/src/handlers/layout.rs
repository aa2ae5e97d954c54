use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::layout::{CreateLayoutRequest, LayoutResponse, UpdateLayoutRequest};
use crate::models::shared::{ListResponse, parse_id};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/layouts",
    tag = "Layouts",
    operation_id = "createLayout",
    summary = "Create a screen layout",
    description = "Creation is open to any screen name; only configured screens can be changed afterwards.",
    request_body = CreateLayoutRequest,
    responses(
        (status = 201, description = "Layout created", body = LayoutResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Screen already has a layout (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(screen_name = %payload.screen_name))]
pub async fn create_layout(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateLayoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (screen_name, fields) = payload.into_parts();
    let layout = state.layouts.create(&screen_name, fields, None).await?;
    Ok((StatusCode::CREATED, Json(LayoutResponse::from(layout))))
}

#[utoipa::path(
    get,
    path = "/layouts",
    tag = "Layouts",
    operation_id = "listLayouts",
    summary = "List all screen layouts",
    responses(
        (status = 200, description = "All layouts in insertion order", body = ListResponse<LayoutResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_layouts(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<LayoutResponse>>, AppError> {
    let layouts = state.layouts.list_all().await?;
    Ok(Json(ListResponse::from_records(layouts)))
}

#[utoipa::path(
    get,
    path = "/layouts/{id}",
    tag = "Layouts",
    operation_id = "getLayout",
    summary = "Get a layout by ID",
    params(("id" = Uuid, Path, description = "Layout ID")),
    responses(
        (status = 200, description = "Layout", body = LayoutResponse),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LayoutResponse>, AppError> {
    let id = parse_id(&id, "Layout")?;
    Ok(Json(state.layouts.get_by_id(id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/layouts/{id}",
    tag = "Layouts",
    operation_id = "updateLayout",
    summary = "Update a layout by ID",
    description = "Partial update. Fails with KEY_LOCKED unless the screen (and any new screen name) \
        is one of the configured mutable screens.",
    params(("id" = Uuid, Path, description = "Layout ID")),
    request_body = UpdateLayoutRequest,
    responses(
        (status = 200, description = "Layout updated", body = LayoutResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Screen cannot be modified (KEY_LOCKED)", body = ErrorBody),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Screen name taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateLayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let id = parse_id(&id, "Layout")?;
    let layout = state.layouts.update(id, payload.into()).await?;
    Ok(Json(layout.into()))
}

#[utoipa::path(
    delete,
    path = "/layouts/{id}",
    tag = "Layouts",
    operation_id = "deleteLayout",
    summary = "Delete a layout by ID",
    params(("id" = Uuid, Path, description = "Layout ID")),
    responses(
        (status = 204, description = "Layout deleted"),
        (status = 403, description = "Screen cannot be modified (KEY_LOCKED)", body = ErrorBody),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "Layout")?;
    state.layouts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/layouts/screen/{screen_name}",
    tag = "Layouts",
    operation_id = "getLayoutByScreen",
    summary = "Get the layout of a screen",
    params(("screen_name" = String, Path, description = "Screen name")),
    responses(
        (status = 200, description = "Layout", body = LayoutResponse),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_layout_by_screen(
    State(state): State<AppState>,
    Path(screen_name): Path<String>,
) -> Result<Json<LayoutResponse>, AppError> {
    Ok(Json(state.layouts.get_by_key(&screen_name).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/layouts/screen/{screen_name}",
    tag = "Layouts",
    operation_id = "updateLayoutByScreen",
    summary = "Switch the layout of a screen",
    description = "Screens outside the configured mutable set are rejected with KEY_LOCKED \
        whether or not a layout exists for them.",
    params(("screen_name" = String, Path, description = "Screen name")),
    request_body = UpdateLayoutRequest,
    responses(
        (status = 200, description = "Layout updated", body = LayoutResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Screen cannot be modified (KEY_LOCKED)", body = ErrorBody),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Screen name taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_layout_by_screen(
    State(state): State<AppState>,
    Path(screen_name): Path<String>,
    AppJson(payload): AppJson<UpdateLayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let layout = state
        .layouts
        .update_by_key(&screen_name, payload.into())
        .await?;
    Ok(Json(layout.into()))
}

#[utoipa::path(
    delete,
    path = "/layouts/screen/{screen_name}",
    tag = "Layouts",
    operation_id = "deleteLayoutByScreen",
    summary = "Delete the layout of a screen",
    params(("screen_name" = String, Path, description = "Screen name")),
    responses(
        (status = 204, description = "Layout deleted"),
        (status = 403, description = "Screen cannot be modified (KEY_LOCKED)", body = ErrorBody),
        (status = 404, description = "Layout not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_layout_by_screen(
    State(state): State<AppState>,
    Path(screen_name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.layouts.delete_by_key(&screen_name).await?;
    Ok(StatusCode::NO_CONTENT)
}
