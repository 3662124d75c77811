use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::MaybeAuth;
use crate::models::{Post, PostContent, Visibility};
use crate::services::posts::PostUpdate;

#[derive(Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub content: PostContent,
    /// Defaults to friends_only when omitted
    pub visibility: Option<Visibility>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub content: Option<PostContent>,
    pub visibility: Option<Visibility>,
}

#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid content"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "File too large")
    ),
    security(("bearer" = []))
)]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<MaybeAuth>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = state
        .posts
        .create_post(auth.user_id(), payload.content, payload.visibility)?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "The post", body = Post),
        (status = 403, description = "Post exists but the viewer may not see it"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    state
        .posts
        .get_post(&id, auth.user_id())?
        .map(Json)
        .ok_or(AppError::PostNotFound)
}

#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    let post = state.posts.update_post(
        &id,
        auth.user_id(),
        PostUpdate {
            content: payload.content,
            visibility: payload.visibility,
        },
    )?;
    Ok(Json(post))
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.posts.delete_post(&id, auth.user_id())?;
    Ok(StatusCode::NO_CONTENT)
}
