use crate::UploadState;
use crate::api::error::AppError;
use crate::models::PublicObject;
use crate::services::storage::StoreError;
use crate::utils::keys::object_key;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Utc;
use tracing::info;

/// Multipart field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

struct ImagePart {
    filename: String,
    content_type: String,
    data: Bytes,
}

async fn read_image_part(multipart: &mut Multipart) -> Result<ImagePart, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::BadRequest(format!("Field '{}' must be a file", IMAGE_FIELD))
            })?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        return Ok(ImagePart {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::BadRequest(format!(
        "Missing '{}' file field",
        IMAGE_FIELD
    )))
}

/// Store failures answer with the error object; the status is 200 only when
/// `store_errors_as_ok` is set.
fn store_failure(state: &UploadState, err: StoreError) -> Response {
    if state.config.store_errors_as_ok {
        (StatusCode::OK, Json(err)).into_response()
    } else {
        AppError::Store(err).into_response()
    }
}

#[utoipa::path(
    post,
    path = "/",
    request_body(content = Multipart, description = "Image upload in the `image` field"),
    responses(
        (status = 200, description = "Object stored", body = crate::models::UploadReceipt),
        (status = 400, description = "Missing or malformed image field"),
        (status = 502, description = "Store rejected the upload"),
        (status = 503, description = "Store unreachable")
    ),
    tag = "objects"
)]
pub async fn upload_object(
    State(state): State<UploadState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart =
        multipart.map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?;
    let part = read_image_part(&mut multipart).await?;
    let key = object_key(Utc::now(), &part.filename);
    let size = part.data.len();

    match state.store.upload(&key, part.data, &part.content_type).await {
        Ok(receipt) => {
            info!("📦 Stored '{}' ({} bytes)", key, size);
            Ok(Json(receipt).into_response())
        }
        Err(e) => Ok(store_failure(&state, e)),
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Objects in the bucket", body = Vec<PublicObject>),
        (status = 502, description = "Store rejected the listing"),
        (status = 503, description = "Store unreachable")
    ),
    tag = "objects"
)]
pub async fn list_objects(State(state): State<UploadState>) -> Response {
    match state.store.list_objects().await {
        Ok(objects) => {
            let base = state.store.public_base_url();
            let body: Vec<PublicObject> = objects
                .into_iter()
                .map(|object| PublicObject::from_stored(object, base))
                .collect();
            Json(body).into_response()
        }
        Err(e) => store_failure(&state, e),
    }
}
