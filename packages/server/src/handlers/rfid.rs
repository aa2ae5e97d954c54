use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kiosk_common::storage::{AttachmentStore, BoxReader, StoredAttachment};
use tokio::io::AsyncWriteExt;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::models::rfid::{RfidResponse, RfidUploadForm};
use crate::models::shared::{ListResponse, non_blank, parse_id};
use crate::state::AppState;
use crate::store::Patch;

const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Body limit for upload routes: the configured file limit plus form overhead.
pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let max = usize::try_from(max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(max)
}

#[utoipa::path(
    post,
    path = "/rfid",
    tag = "RFID",
    operation_id = "createRfidEntry",
    summary = "Register an RFID code with a video",
    description = "Multipart form with a `rfid_code` text field and a `video` file field, both required. \
        The video is stored under a generated name and served from the public uploads prefix.",
    request_body(content = RfidUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "RFID entry created", body = RfidResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "RFID code already registered (CONFLICT)", body = ErrorBody),
        (status = 413, description = "Video too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_rfid(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_form(&state, multipart).await?;
    let reference = form.video.as_ref().map(|v| v.reference.clone());
    let code = form.rfid_code.clone().unwrap_or_default();

    match state.rfid.create(&code, (), reference).await {
        Ok(entry) => Ok((StatusCode::CREATED, Json(RfidResponse::from(entry)))),
        Err(e) => {
            discard_upload(&state, form.video).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/rfid",
    tag = "RFID",
    operation_id = "listRfidEntries",
    summary = "List all RFID entries",
    responses(
        (status = 200, description = "All entries in insertion order", body = ListResponse<RfidResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_rfid(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<RfidResponse>>, AppError> {
    let entries = state.rfid.list_all().await?;
    Ok(Json(ListResponse::from_records(entries)))
}

#[utoipa::path(
    get,
    path = "/rfid/{id}",
    tag = "RFID",
    operation_id = "getRfidEntry",
    summary = "Get an RFID entry by ID",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "RFID entry", body = RfidResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_rfid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RfidResponse>, AppError> {
    let id = parse_id(&id, "RFID entry")?;
    Ok(Json(state.rfid.get_by_id(id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/rfid/code/{rfid_code}",
    tag = "RFID",
    operation_id = "getRfidEntryByCode",
    summary = "Look up the entry for a scanned RFID code",
    description = "Exact, case-sensitive match on the RFID code.",
    params(("rfid_code" = String, Path, description = "RFID code")),
    responses(
        (status = 200, description = "RFID entry", body = RfidResponse),
        (status = 404, description = "Code not registered (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_rfid_by_code(
    State(state): State<AppState>,
    Path(rfid_code): Path<String>,
) -> Result<Json<RfidResponse>, AppError> {
    Ok(Json(state.rfid.get_by_key(&rfid_code).await?.into()))
}

#[utoipa::path(
    put,
    path = "/rfid/{id}",
    tag = "RFID",
    operation_id = "updateRfidEntry",
    summary = "Change the code and/or the video of an entry",
    description = "Multipart form; both fields are optional. A new video replaces the old one, \
        which is deleted once the entry points at the new file.",
    params(("id" = Uuid, Path, description = "Entry ID")),
    request_body(content = RfidUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "RFID entry updated", body = RfidResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "RFID code already registered (CONFLICT)", body = ErrorBody),
        (status = 413, description = "Video too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_rfid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<RfidResponse>, AppError> {
    let form = read_form(&state, multipart).await?;

    let id = match parse_id(&id, "RFID entry") {
        Ok(id) => id,
        Err(e) => {
            discard_upload(&state, form.video).await;
            return Err(e);
        }
    };

    let patch = Patch {
        business_key: non_blank(form.rfid_code.clone()),
        fields: (),
        attachment: form.video.as_ref().map(|v| v.reference.clone()),
    };

    match state.rfid.update(id, patch).await {
        Ok(entry) => Ok(Json(entry.into())),
        Err(e) => {
            discard_upload(&state, form.video).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/rfid/{id}",
    tag = "RFID",
    operation_id = "deleteRfidEntry",
    summary = "Delete an entry and its video",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "RFID entry deleted"),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_rfid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "RFID entry")?;
    state.rfid.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parsed multipart form. The video, if any, is already stored.
#[derive(Default)]
struct RfidForm {
    rfid_code: Option<String>,
    video: Option<StoredAttachment>,
}

/// Read the form fields, storing the `video` field as it arrives.
///
/// On failure nothing uploaded by this request is left behind.
async fn read_form(state: &AppState, mut multipart: Multipart) -> Result<RfidForm, AppError> {
    let mut form = RfidForm::default();

    let result: Result<(), AppError> = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            match field.name() {
                Some("rfid_code") => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read rfid_code: {e}"))
                    })?;
                    form.rfid_code = Some(text);
                }
                Some("video") => {
                    if form.video.is_some() {
                        return Err(AppError::Validation("Only one 'video' field is allowed".into()));
                    }
                    let original = field.file_name().unwrap_or_default().to_string();
                    let stored = spool_field_to_store(
                        field,
                        &original,
                        &*state.attachments,
                        state.config.storage.max_upload_size,
                    )
                    .await?;
                    form.video = Some(stored);
                }
                _ => {} // Ignore unknown fields.
            }
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => Ok(form),
        Err(e) => {
            discard_upload(state, form.video).await;
            Err(e)
        }
    }
}

/// Buffer a multipart field to a temp file, then hand it to the attachment store.
async fn spool_field_to_store(
    mut field: Field<'_>,
    original_name: &str,
    store: &dyn AttachmentStore,
    max_size: u64,
) -> Result<StoredAttachment, AppError> {
    let temp_path = std::env::temp_dir().join(format!("kiosk-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        if total_size == 0 {
            return Err(AppError::Validation("Uploaded video is empty".into()));
        }

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        Ok(store.put_stream(original_name, reader).await?)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}

async fn discard_upload(state: &AppState, upload: Option<StoredAttachment>) {
    let Some(upload) = upload else {
        return;
    };
    if let Err(e) = state.attachments.remove(&upload.reference).await {
        warn!(reference = %upload.reference, error = %e, "Failed to discard orphaned upload");
    }
}
