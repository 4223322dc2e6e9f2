//! Request image routes.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{
    IncomingImage, RepairRequest, RequestImage, RequestImageResponse, UploadImagesResponse,
};
use domain::services::{
    authorize_delete, authorize_upload, authorize_view, ensure_capacity, validate_upload,
};
use persistence::repositories::{NewRequestImage, RepairRequestRepository, RequestImageRepository};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_images_uploaded;
use crate::routes::requests::lock_request;
use crate::services::storage::{image_key, remove_all, StorageError};

const IMAGE_FIELD: &str = "images";

fn storage_error(err: StorageError) -> ApiError {
    match err {
        StorageError::NotFound(_) => ApiError::NotFound("Image file not found".to_string()),
        other => ApiError::Internal(other.to_string()),
    }
}

fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Collects the `images` parts, validating each one as it arrives.
async fn read_images(mut multipart: Multipart) -> Result<Vec<IncomingImage>, ApiError> {
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::Validation(format!("Invalid multipart body: {}", e.body_text()))
        }
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("Each image needs a file name".to_string()))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read image: {}", e.body_text())))?;

        validate_upload(&file_name, bytes.len())?;

        images.push(IncomingImage {
            content_type: content_type_for(&file_name),
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Ok(images)
}

async fn load_request(state: &AppState, id: Uuid) -> Result<RepairRequest, ApiError> {
    RepairRequestRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(RepairRequest::from)
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))
}

async fn load_image(state: &AppState, id: Uuid) -> Result<RequestImage, ApiError> {
    RequestImageRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .map(RequestImage::from)
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))
}

/// Attach a batch of images. The batch is stored whole or not at all.
///
/// POST /api/v1/requests/:id/upload-image
pub async fn upload_images(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadImagesResponse>), ApiError> {
    let incoming = read_images(multipart).await?;

    let mut tx = state.pool.begin().await?;
    let request = lock_request(&mut tx, id).await?;
    authorize_upload(user.user_id, &request)?;

    let existing = RequestImageRepository::count_for_request(&mut tx, id).await?;
    ensure_capacity(existing, incoming.len())?;

    let mut written = Vec::with_capacity(incoming.len());
    for image in &incoming {
        let key = image_key(id, &image.file_name);
        if let Err(e) = state.storage.put(&key, &image.bytes).await {
            remove_all(state.storage.as_ref(), &written).await;
            return Err(storage_error(e));
        }
        written.push(key);
    }

    let mut uploaded = Vec::with_capacity(incoming.len());
    for (image, key) in incoming.iter().zip(&written) {
        let new = NewRequestImage {
            request_id: id,
            file_name: &image.file_name,
            content_type: &image.content_type,
            size_bytes: image.bytes.len() as i64,
            storage_key: key,
        };
        match RequestImageRepository::insert(&mut tx, &new).await {
            Ok(row) => uploaded.push(RequestImageResponse::from(RequestImage::from(row))),
            Err(e) => {
                remove_all(state.storage.as_ref(), &written).await;
                return Err(e.into());
            }
        }
    }

    if let Err(e) = tx.commit().await {
        remove_all(state.storage.as_ref(), &written).await;
        return Err(e.into());
    }

    record_images_uploaded(uploaded.len());
    tracing::info!(
        request_id = %id,
        user_id = %user.user_id,
        count = uploaded.len(),
        "Images uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadImagesResponse {
            total_images: existing + uploaded.len() as i64,
            uploaded,
        }),
    ))
}

/// GET /api/v1/requests/:id/images
pub async fn list_images(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RequestImageResponse>>, ApiError> {
    let request = load_request(&state, id).await?;
    authorize_view(user.user_id, user.role, &request)?;

    let images = RequestImageRepository::new(state.pool.clone())
        .list_for_request(id)
        .await?
        .into_iter()
        .map(|row| RequestImageResponse::from(RequestImage::from(row)))
        .collect();
    Ok(Json(images))
}

/// Owner-only removal of one image.
///
/// DELETE /api/v1/request-images/:id
pub async fn delete_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(image_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let image = load_image(&state, image_id).await?;
    let request = load_request(&state, image.request_id).await?;
    authorize_delete(user.user_id, &request)?;

    let removed = RequestImageRepository::new(state.pool.clone())
        .delete(image.id)
        .await?;
    if !removed {
        return Err(ApiError::NotFound("Image not found".to_string()));
    }

    if let Err(e) = state.storage.delete(&image.storage_key).await {
        tracing::warn!(image_id = %image.id, error = %e, "Image row deleted but file remains");
    }

    tracing::info!(image_id = %image.id, request_id = %request.id, "Image deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Streams the stored file.
///
/// GET /api/v1/request-images/:id/file
pub async fn download_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(image_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let image = load_image(&state, image_id).await?;
    let request = load_request(&state, image.request_id).await?;
    authorize_view(user.user_id, user.role, &request)?;

    let file = state
        .storage
        .open(&image.storage_key)
        .await
        .map_err(storage_error)?;

    let headers = [
        (header::CONTENT_TYPE, image.content_type),
        (header::CONTENT_LENGTH, image.size_bytes.to_string()),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
