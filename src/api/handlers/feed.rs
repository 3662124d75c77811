use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::AppState;
use crate::api::middleware::auth::MaybeAuth;
use crate::services::feed::FeedPage;

#[derive(Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/feed",
    params(
        ("limit" = Option<usize>, Query, description = "Page size (default 20)"),
        ("offset" = Option<usize>, Query, description = "Items to skip (default 0)")
    ),
    responses(
        (status = 200, description = "Visibility-filtered feed, newest first", body = FeedPage)
    )
)]
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(auth): Extension<MaybeAuth>,
    Query(query): Query<FeedQuery>,
) -> Json<FeedPage> {
    // Pagination defaults belong to the transport layer, not the core
    let limit = query.limit.unwrap_or(state.config.feed_default_limit);
    let offset = query.offset.unwrap_or(0);

    Json(state.feed.get_feed(auth.user_id(), limit, offset))
}
