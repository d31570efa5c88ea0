// region:    --- Imports
use super::extract::ApiPath;
use crate::account::{AnyUser, Seller};
use crate::delivery::commands;
use crate::delivery::model::Deliverable;
use crate::delivery::upload::{is_zip, MAX_UPLOAD_BYTES};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::storage::UploadedFile;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

const FILE_FIELD: &str = "file";

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File too large".to_string())
    } else {
        AppError::bad_request(err.body_text())
    }
}

/// Pull the `file` field out of the form, ignoring anything else.
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

pub async fn handle_upload_deliverable(
    State(state): State<AppState>,
    Seller(ctx): Seller,
    ApiPath(project_id): ApiPath<Uuid>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Deliverable>)> {
    let Some(file) = read_file_field(&mut multipart).await? else {
        return Err(AppError::bad_request("No file uploaded"));
    };
    info!(
        "{:<12} --> upload {} for project {}",
        "HandlerDeliv", file.file_name, project_id
    );

    if file.bytes.is_empty() {
        return Err(AppError::bad_request("No file uploaded"));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge("File too large".to_string()));
    }
    if !is_zip(&file.file_name, file.content_type.as_deref()) {
        return Err(AppError::bad_request("Only zip archives are accepted"));
    }

    let deliverable = commands::upload_deliverable(
        &state.db,
        state.storage.as_ref(),
        state.notifier.clone(),
        ctx,
        project_id,
        file,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(deliverable)))
}

pub async fn handle_get_deliverable(
    State(state): State<AppState>,
    AnyUser(ctx): AnyUser,
    ApiPath(project_id): ApiPath<Uuid>,
) -> AppResult<Json<Deliverable>> {
    Ok(Json(commands::get_deliverable(&state.db, ctx, project_id).await?))
}
