use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Post;
use crate::services::posts::PostService;
use crate::store::Store;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub has_more: bool,
    /// Count of all posts visible to the viewer, before pagination
    pub total: usize,
}

/// Composes the visibility predicate over the full post collection with
/// deterministic ordering and pagination.
#[derive(Clone)]
pub struct FeedService {
    posts: PostService,
    store: Arc<Store>,
}

impl FeedService {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            posts: PostService::new(store.clone()),
            store,
        }
    }

    /// Newest first. Posts sharing a `created_at` are ordered by id
    /// descending so pagination is stable across calls.
    pub fn get_feed(&self, viewer_id: Option<&str>, limit: usize, offset: usize) -> FeedPage {
        let mut visible: Vec<Post> = self
            .store
            .all_posts()
            .into_iter()
            .filter(|post| self.posts.can_view_post(post, viewer_id))
            .collect();

        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = visible.len();
        let page: Vec<Post> = visible.into_iter().skip(offset).take(limit).collect();
        let has_more = offset + page.len() < total;

        FeedPage {
            posts: page,
            has_more,
            total,
        }
    }
}
