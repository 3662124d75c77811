use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::MaybeAuth;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: String,
    pub mime_type: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/media",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Media stored", body = MediaResponse),
        (status = 400, description = "Empty file or unsupported MIME type"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "File too large")
    ),
    security(("bearer" = []))
)]
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaResponse>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let mime_type = field
            .content_type()
            .ok_or_else(|| AppError::Validation("File part needs a content type".to_string()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?;

        let entry = state.media.upload(&data, &mime_type)?;
        return Ok((
            StatusCode::CREATED,
            Json(MediaResponse {
                id: entry.id,
                mime_type: entry.mime_type,
                size: entry.size,
                created_at: entry.created_at,
            }),
        ));
    }

    Err(AppError::Validation(
        "Multipart body is missing a 'file' part".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/media/{id}",
    params(("id" = String, Path, description = "Media ID")),
    responses(
        (status = 200, description = "The stored bytes, served with their MIME type"),
        (status = 404, description = "Media not found")
    )
)]
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let entry = state.media.get(&id).ok_or(AppError::MediaNotFound)?;
    Ok((
        [(header::CONTENT_TYPE, entry.mime_type)],
        Bytes::from(entry.data),
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/media/{id}",
    params(("id" = String, Path, description = "Media ID")),
    responses(
        (status = 204, description = "Media deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_media(
    State(state): State<AppState>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    // GET on this path is public, so the method router carries no auth
    // layer; deletion still needs a valid session
    if auth.0.is_none() {
        return Err(AppError::Unauthorized);
    }
    state.media.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
