use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::AuthContext;
use crate::models::{FriendRequest, User};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestRequest {
    pub to_user_id: String,
}

#[utoipa::path(
    post,
    path = "/friends/requests",
    request_body = SendFriendRequestRequest,
    responses(
        (status = 201, description = "Friend request sent", body = FriendRequest),
        (status = 400, description = "Request to oneself"),
        (status = 404, description = "Recipient does not exist"),
        (status = 409, description = "Already friends or a pending request exists")
    ),
    security(("bearer" = []))
)]
pub async fn send_friend_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<SendFriendRequestRequest>,
) -> Result<(StatusCode, Json<FriendRequest>), AppError> {
    let request = state
        .friends
        .send_friend_request(&ctx.user.id, &payload.to_user_id)?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/friends/requests",
    responses(
        (status = 200, description = "Pending requests addressed to the caller", body = Vec<FriendRequest>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn list_friend_requests(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Json<Vec<FriendRequest>> {
    Json(state.friends.incoming_requests(&ctx.user.id))
}

#[utoipa::path(
    post,
    path = "/friends/requests/{id}/accept",
    params(("id" = String, Path, description = "Friend request ID")),
    responses(
        (status = 200, description = "Request accepted, friendship created", body = FriendRequest),
        (status = 403, description = "Caller is not the recipient"),
        (status = 404, description = "Request unknown or already handled")
    ),
    security(("bearer" = []))
)]
pub async fn accept_friend_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<FriendRequest>, AppError> {
    let request = state.friends.accept_friend_request(&id, &ctx.user.id)?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/friends/requests/{id}/decline",
    params(("id" = String, Path, description = "Friend request ID")),
    responses(
        (status = 200, description = "Request declined", body = FriendRequest),
        (status = 403, description = "Caller is not the recipient"),
        (status = 404, description = "Request unknown or already handled")
    ),
    security(("bearer" = []))
)]
pub async fn decline_friend_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<FriendRequest>, AppError> {
    let request = state.friends.decline_friend_request(&id, &ctx.user.id)?;
    Ok(Json(request))
}

#[utoipa::path(
    get,
    path = "/friends",
    responses(
        (status = 200, description = "The caller's friends", body = Vec<User>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Json<Vec<User>> {
    Json(state.friends.get_friends(&ctx.user.id))
}

#[utoipa::path(
    delete,
    path = "/friends/{friend_id}",
    params(("friend_id" = String, Path, description = "Friend's user ID")),
    responses(
        (status = 204, description = "Friendship removed in both directions"),
        (status = 400, description = "Users are not friends")
    ),
    security(("bearer" = []))
)]
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(friend_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.friends.remove_friend(&ctx.user.id, &friend_id)?;
    Ok(StatusCode::NO_CONTENT)
}
