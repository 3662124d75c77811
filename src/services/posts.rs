use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::api::error::AppError;
use crate::models::{Post, PostContent, Visibility};
use crate::store::Store;
use crate::utils::validation::{ContentError, ContentErrorKind, validate_content};

/// Fields of a post that may change on edit. Anything left `None` keeps the
/// existing value.
#[derive(Debug, Default, Clone)]
pub struct PostUpdate {
    pub content: Option<PostContent>,
    pub visibility: Option<Visibility>,
}

/// Post CRUD plus the visibility predicate that gates every read.
#[derive(Clone)]
pub struct PostService {
    store: Arc<Store>,
}

/// Maps accumulated validation failures to one API error kind by category,
/// in priority order: empty content wins over an unsupported format, which
/// wins over an oversized file. Anything unexpected falls back to the
/// empty-content kind.
fn content_error(errors: &[ContentError]) -> AppError {
    if errors.iter().any(|e| e.kind == ContentErrorKind::Empty) {
        return AppError::EmptyContent;
    }
    if errors
        .iter()
        .any(|e| e.kind == ContentErrorKind::UnsupportedFormat)
    {
        return AppError::InvalidFormat;
    }
    if errors.iter().any(|e| e.kind == ContentErrorKind::TooLarge) {
        return AppError::FileTooLarge;
    }
    AppError::EmptyContent
}

impl PostService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Public posts are visible to everyone, including anonymous viewers.
    /// Friends-only posts are visible to the author and the author's friends;
    /// anonymous viewers are always denied.
    pub fn can_view_post(&self, post: &Post, viewer_id: Option<&str>) -> bool {
        match post.visibility {
            Visibility::Public => true,
            Visibility::FriendsOnly => match viewer_id {
                None => false,
                Some(viewer) => {
                    viewer == post.author_id || self.store.has_friendship(&post.author_id, viewer)
                }
            },
        }
    }

    /// `Ok(None)` means the post does not exist; a post that exists but fails
    /// the visibility predicate is an `AccessDenied` error. The two are
    /// distinct conditions.
    pub fn get_post(&self, id: &str, requester_id: Option<&str>) -> Result<Option<Post>, AppError> {
        let Some(post) = self.store.post_by_id(id) else {
            return Ok(None);
        };
        if !self.can_view_post(&post, requester_id) {
            return Err(AppError::AccessDenied);
        }
        Ok(Some(post))
    }

    pub fn create_post(
        &self,
        user_id: Option<&str>,
        content: PostContent,
        visibility: Option<Visibility>,
    ) -> Result<Post, AppError> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;

        let errors = validate_content(&content);
        if !errors.is_empty() {
            return Err(content_error(&errors));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            author_id: user_id.to_string(),
            content,
            visibility: visibility.unwrap_or(Visibility::FriendsOnly),
            created_at: now,
            updated_at: now,
            is_edited: false,
        };
        self.store.insert_post(post.clone());
        Ok(post)
    }

    /// Authorization is checked before content validation: an anonymous
    /// caller gets `Unauthorized`, a missing post `PostNotFound`, and a
    /// non-author `AccessDenied`, in that order.
    pub fn update_post(
        &self,
        id: &str,
        user_id: Option<&str>,
        updates: PostUpdate,
    ) -> Result<Post, AppError> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;
        let mut post = self.store.post_by_id(id).ok_or(AppError::PostNotFound)?;
        if post.author_id != user_id {
            return Err(AppError::AccessDenied);
        }

        if let Some(content) = updates.content {
            let errors = validate_content(&content);
            if !errors.is_empty() {
                return Err(content_error(&errors));
            }
            post.content = content;
        }
        if let Some(visibility) = updates.visibility {
            post.visibility = visibility;
        }

        // is_edited stays true forever after the first edit, even if the
        // edit changed nothing
        post.is_edited = true;
        post.updated_at = Utc::now();
        self.store.update_post(post.clone());
        Ok(post)
    }

    pub fn delete_post(&self, id: &str, user_id: Option<&str>) -> Result<(), AppError> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;
        let post = self.store.post_by_id(id).ok_or(AppError::PostNotFound)?;
        if post.author_id != user_id {
            return Err(AppError::AccessDenied);
        }
        self.store.remove_post(id);
        Ok(())
    }

    pub fn posts_by_author(&self, author_id: &str) -> Vec<Post> {
        let mut posts = self.store.posts_by_author(author_id);
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::AuthService;
    use crate::services::friends::FriendService;

    fn text(s: &str) -> PostContent {
        PostContent::Text {
            text: s.to_string(),
        }
    }

    fn setup() -> (Arc<Store>, PostService, String, String) {
        let store = Arc::new(Store::new());
        let auth = AuthService::new(store.clone(), 24);
        let u1 = auth.register("u1@example.com", "u1", "pw").unwrap().id;
        let u2 = auth.register("u2@example.com", "u2", "pw").unwrap().id;
        (store.clone(), PostService::new(store), u1, u2)
    }

    fn befriend(store: &Arc<Store>, a: &str, b: &str) {
        let friends = FriendService::new(store.clone());
        let request = friends.send_friend_request(a, b).unwrap();
        friends.accept_friend_request(&request.id, b).unwrap();
    }

    #[test]
    fn test_create_defaults_to_friends_only() {
        let (_, posts, u1, _) = setup();
        let post = posts.create_post(Some(&u1), text("hi"), None).unwrap();
        assert_eq!(post.visibility, Visibility::FriendsOnly);
        assert!(!post.is_edited);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_create_requires_acting_user() {
        let (_, posts, _, _) = setup();
        assert_eq!(
            posts.create_post(None, text("hi"), None).unwrap_err(),
            AppError::Unauthorized
        );
    }

    #[test]
    fn test_content_error_priority() {
        let (_, posts, u1, _) = setup();

        assert_eq!(
            posts.create_post(Some(&u1), text("  "), None).unwrap_err(),
            AppError::EmptyContent
        );

        // Unsupported format and oversized at once: format wins
        let bad = PostContent::Image {
            media_url: None,
            mime_type: Some("image/bmp".to_string()),
            file_size: Some(crate::utils::validation::MAX_IMAGE_SIZE + 1),
        };
        assert_eq!(
            posts.create_post(Some(&u1), bad, None).unwrap_err(),
            AppError::InvalidFormat
        );

        let oversized = PostContent::Video {
            media_url: None,
            mime_type: Some("video/mp4".to_string()),
            file_size: Some(crate::utils::validation::MAX_VIDEO_SIZE + 1),
        };
        assert_eq!(
            posts.create_post(Some(&u1), oversized, None).unwrap_err(),
            AppError::FileTooLarge
        );
    }

    #[test]
    fn test_visibility_predicate() {
        let (store, posts, u1, u2) = setup();
        let public = posts
            .create_post(Some(&u1), text("pub"), Some(Visibility::Public))
            .unwrap();
        let gated = posts.create_post(Some(&u1), text("gated"), None).unwrap();

        assert!(posts.can_view_post(&public, None));
        assert!(posts.can_view_post(&public, Some(&u2)));

        assert!(!posts.can_view_post(&gated, None));
        assert!(posts.can_view_post(&gated, Some(&u1)));
        assert!(!posts.can_view_post(&gated, Some(&u2)));

        befriend(&store, &u1, &u2);
        assert!(posts.can_view_post(&gated, Some(&u2)));
    }

    #[test]
    fn test_get_post_distinguishes_missing_from_forbidden() {
        let (_, posts, u1, u2) = setup();
        let gated = posts.create_post(Some(&u1), text("gated"), None).unwrap();

        assert!(posts.get_post("missing", Some(&u1)).unwrap().is_none());
        assert_eq!(
            posts.get_post(&gated.id, Some(&u2)).unwrap_err(),
            AppError::AccessDenied
        );
        assert_eq!(
            posts.get_post(&gated.id, None).unwrap_err(),
            AppError::AccessDenied
        );
        assert!(posts.get_post(&gated.id, Some(&u1)).unwrap().is_some());
    }

    #[test]
    fn test_update_preserves_identity_fields() {
        let (_, posts, u1, _) = setup();
        let post = posts.create_post(Some(&u1), text("v1"), None).unwrap();

        let updated = posts
            .update_post(
                &post.id,
                Some(&u1),
                PostUpdate {
                    content: Some(text("v2")),
                    visibility: Some(Visibility::Public),
                },
            )
            .unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.author_id, post.author_id);
        assert_eq!(updated.created_at, post.created_at);
        assert!(updated.is_edited);
        assert!(updated.updated_at >= post.updated_at);
        assert_eq!(updated.content, text("v2"));
        assert_eq!(updated.visibility, Visibility::Public);
    }

    #[test]
    fn test_update_keeps_unspecified_fields() {
        let (_, posts, u1, _) = setup();
        let post = posts
            .create_post(Some(&u1), text("v1"), Some(Visibility::Public))
            .unwrap();

        let updated = posts
            .update_post(&post.id, Some(&u1), PostUpdate::default())
            .unwrap();
        assert_eq!(updated.content, text("v1"));
        assert_eq!(updated.visibility, Visibility::Public);
        // An edit that changes nothing still marks the post edited
        assert!(updated.is_edited);
    }

    #[test]
    fn test_update_error_ordering() {
        let (_, posts, u1, u2) = setup();
        let post = posts.create_post(Some(&u1), text("v1"), None).unwrap();

        assert_eq!(
            posts
                .update_post(&post.id, None, PostUpdate::default())
                .unwrap_err(),
            AppError::Unauthorized
        );
        assert_eq!(
            posts
                .update_post("missing", Some(&u1), PostUpdate::default())
                .unwrap_err(),
            AppError::PostNotFound
        );

        // Non-author loses before content is even validated
        let err = posts
            .update_post(
                &post.id,
                Some(&u2),
                PostUpdate {
                    content: Some(text("")),
                    visibility: None,
                },
            )
            .unwrap_err();
        assert_eq!(err, AppError::AccessDenied);

        // And the stored post is unchanged
        let stored = posts.get_post(&post.id, Some(&u1)).unwrap().unwrap();
        assert_eq!(stored.content, text("v1"));
        assert!(!stored.is_edited);
    }

    #[test]
    fn test_delete_post() {
        let (_, posts, u1, u2) = setup();
        let post = posts.create_post(Some(&u1), text("v1"), None).unwrap();

        assert_eq!(
            posts.delete_post(&post.id, Some(&u2)).unwrap_err(),
            AppError::AccessDenied
        );
        posts.delete_post(&post.id, Some(&u1)).unwrap();
        assert!(posts.get_post(&post.id, Some(&u1)).unwrap().is_none());
        assert_eq!(
            posts.delete_post(&post.id, Some(&u1)).unwrap_err(),
            AppError::PostNotFound
        );
    }
}
