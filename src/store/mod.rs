use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::models::{FriendRequest, Friendship, MediaEntry, Post, RequestStatus, Session, User};

/// All entities plus the secondary indices that keep lookups at O(1) /
/// O(friend count). Index keys for email and username are lowercased so the
/// case-insensitive uniqueness checks are a plain map hit.
#[derive(Default)]
struct StoreInner {
    users: HashMap<String, User>,
    email_index: HashMap<String, String>,
    username_index: HashMap<String, String>,

    sessions: HashMap<String, Session>,
    token_index: HashMap<String, String>,
    user_sessions: HashMap<String, HashSet<String>>,

    posts: HashMap<String, Post>,
    author_posts: HashMap<String, HashSet<String>>,

    friend_requests: HashMap<String, FriendRequest>,
    // Only pending requests live here; accepted/declined requests stay in
    // friend_requests as an audit trail but are invisible to duplicate checks.
    pending_requests: HashMap<(String, String), String>,

    friendships: HashMap<(String, String), Friendship>,
    friend_index: HashMap<String, HashSet<String>>,

    media: HashMap<String, MediaEntry>,
}

/// Authoritative in-memory holder of all entities. Pure bookkeeping: no
/// validation or authorization happens here. Every mutating operation updates
/// the primary map and its secondary indices under one write lock, so no
/// partial-update state is observable from another request.
pub struct Store {
    inner: RwLock<StoreInner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Resets every map and index. Test isolation only.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        *inner = StoreInner::default();
    }

    // ---- users ----

    pub fn insert_user(&self, user: User) {
        let mut inner = self.inner.write().unwrap();
        inner
            .email_index
            .insert(user.email.to_lowercase(), user.id.clone());
        inner
            .username_index
            .insert(user.username.to_lowercase(), user.id.clone());
        inner.users.insert(user.id.clone(), user);
    }

    pub fn user_by_id(&self, id: &str) -> Option<User> {
        self.inner.read().unwrap().users.get(id).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().unwrap();
        let id = inner.email_index.get(&email.to_lowercase())?;
        inner.users.get(id).cloned()
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        let inner = self.inner.read().unwrap();
        let id = inner.username_index.get(&username.to_lowercase())?;
        inner.users.get(id).cloned()
    }

    // ---- sessions ----

    pub fn insert_session(&self, session: Session) {
        let mut inner = self.inner.write().unwrap();
        inner
            .token_index
            .insert(session.token.clone(), session.id.clone());
        inner
            .user_sessions
            .entry(session.user_id.clone())
            .or_default()
            .insert(session.id.clone());
        inner.sessions.insert(session.id.clone(), session);
    }

    pub fn session_by_id(&self, id: &str) -> Option<Session> {
        self.inner.read().unwrap().sessions.get(id).cloned()
    }

    pub fn session_by_token(&self, token: &str) -> Option<Session> {
        let inner = self.inner.read().unwrap();
        let id = inner.token_index.get(token)?;
        inner.sessions.get(id).cloned()
    }

    pub fn remove_session(&self, id: &str) -> Option<Session> {
        let mut inner = self.inner.write().unwrap();
        let session = inner.sessions.remove(id)?;
        inner.token_index.remove(&session.token);
        if let Some(set) = inner.user_sessions.get_mut(&session.user_id) {
            set.remove(id);
            if set.is_empty() {
                inner.user_sessions.remove(&session.user_id);
            }
        }
        Some(session)
    }

    pub fn sessions_for_user(&self, user_id: &str) -> Vec<Session> {
        let inner = self.inner.read().unwrap();
        inner
            .user_sessions
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.sessions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    // ---- posts ----

    pub fn insert_post(&self, post: Post) {
        let mut inner = self.inner.write().unwrap();
        inner
            .author_posts
            .entry(post.author_id.clone())
            .or_default()
            .insert(post.id.clone());
        inner.posts.insert(post.id.clone(), post);
    }

    pub fn post_by_id(&self, id: &str) -> Option<Post> {
        self.inner.read().unwrap().posts.get(id).cloned()
    }

    /// Replaces an existing post in place. The author index is keyed by
    /// author_id, which is immutable, so no index maintenance is needed.
    pub fn update_post(&self, post: Post) {
        let mut inner = self.inner.write().unwrap();
        inner.posts.insert(post.id.clone(), post);
    }

    pub fn remove_post(&self, id: &str) -> Option<Post> {
        let mut inner = self.inner.write().unwrap();
        let post = inner.posts.remove(id)?;
        if let Some(set) = inner.author_posts.get_mut(&post.author_id) {
            set.remove(id);
            if set.is_empty() {
                inner.author_posts.remove(&post.author_id);
            }
        }
        Some(post)
    }

    pub fn posts_by_author(&self, author_id: &str) -> Vec<Post> {
        let inner = self.inner.read().unwrap();
        inner
            .author_posts
            .get(author_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.posts.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn all_posts(&self) -> Vec<Post> {
        self.inner.read().unwrap().posts.values().cloned().collect()
    }

    // ---- friend requests ----

    pub fn insert_friend_request(&self, request: FriendRequest) {
        let mut inner = self.inner.write().unwrap();
        if request.status == RequestStatus::Pending {
            inner.pending_requests.insert(
                (request.from_user_id.clone(), request.to_user_id.clone()),
                request.id.clone(),
            );
        }
        inner.friend_requests.insert(request.id.clone(), request);
    }

    pub fn friend_request_by_id(&self, id: &str) -> Option<FriendRequest> {
        self.inner.read().unwrap().friend_requests.get(id).cloned()
    }

    /// Looks up a pending request in the from→to direction only; callers that
    /// need symmetric duplicate detection probe both directions.
    pub fn pending_request(&self, from: &str, to: &str) -> Option<FriendRequest> {
        let inner = self.inner.read().unwrap();
        let id = inner
            .pending_requests
            .get(&(from.to_string(), to.to_string()))?;
        inner.friend_requests.get(id).cloned()
    }

    /// Moves a request out of the pending subset. Requests are never deleted;
    /// the terminal record stays behind as an audit trail.
    pub fn set_request_status(&self, id: &str, status: RequestStatus) -> Option<FriendRequest> {
        let mut inner = self.inner.write().unwrap();
        let request = inner.friend_requests.get_mut(id)?;
        request.status = status;
        let key = (request.from_user_id.clone(), request.to_user_id.clone());
        let updated = request.clone();
        inner.pending_requests.remove(&key);
        Some(updated)
    }

    pub fn pending_requests_to(&self, user_id: &str) -> Vec<FriendRequest> {
        let inner = self.inner.read().unwrap();
        let mut requests: Vec<FriendRequest> = inner
            .pending_requests
            .values()
            .filter_map(|id| inner.friend_requests.get(id))
            .filter(|r| r.to_user_id == user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    // ---- friendships ----

    /// Creates both directed edges with one shared timestamp. Atomic under
    /// the write lock, so no reader ever sees one edge without its pair.
    pub fn add_friendship(&self, a: &str, b: &str, created_at: DateTime<Utc>) {
        let mut inner = self.inner.write().unwrap();
        for (from, to) in [(a, b), (b, a)] {
            inner.friendships.insert(
                (from.to_string(), to.to_string()),
                Friendship {
                    user_id: from.to_string(),
                    friend_id: to.to_string(),
                    created_at,
                },
            );
            inner
                .friend_index
                .entry(from.to_string())
                .or_default()
                .insert(to.to_string());
        }
    }

    /// Removes both directed edges together.
    pub fn remove_friendship(&self, a: &str, b: &str) {
        let mut inner = self.inner.write().unwrap();
        for (from, to) in [(a, b), (b, a)] {
            inner
                .friendships
                .remove(&(from.to_string(), to.to_string()));
            if let Some(set) = inner.friend_index.get_mut(from) {
                set.remove(to);
                if set.is_empty() {
                    inner.friend_index.remove(from);
                }
            }
        }
    }

    pub fn has_friendship(&self, from: &str, to: &str) -> bool {
        self.inner
            .read()
            .unwrap()
            .friendships
            .contains_key(&(from.to_string(), to.to_string()))
    }

    pub fn friend_ids(&self, user_id: &str) -> Vec<String> {
        self.inner
            .read()
            .unwrap()
            .friend_index
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    // ---- media ----

    pub fn insert_media(&self, entry: MediaEntry) {
        let mut inner = self.inner.write().unwrap();
        inner.media.insert(entry.id.clone(), entry);
    }

    /// The clone hands callers their own copy of the bytes; stored content is
    /// never aliased outside the store.
    pub fn media_by_id(&self, id: &str) -> Option<MediaEntry> {
        self.inner.read().unwrap().media.get(id).cloned()
    }

    pub fn remove_media(&self, id: &str) -> Option<MediaEntry> {
        self.inner.write().unwrap().media.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostContent, Visibility};

    fn user(id: &str, email: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_indices_are_case_insensitive() {
        let store = Store::new();
        store.insert_user(user("u1", "alice@example.com", "Alice"));

        assert!(store.user_by_email("ALICE@EXAMPLE.COM").is_some());
        assert!(store.user_by_username("alice").is_some());
        assert!(store.user_by_email("bob@example.com").is_none());
    }

    #[test]
    fn test_friendship_edges_are_paired() {
        let store = Store::new();
        let now = Utc::now();
        store.add_friendship("a", "b", now);

        assert!(store.has_friendship("a", "b"));
        assert!(store.has_friendship("b", "a"));
        assert_eq!(store.friend_ids("a"), vec!["b".to_string()]);

        store.remove_friendship("b", "a");
        assert!(!store.has_friendship("a", "b"));
        assert!(!store.has_friendship("b", "a"));
        assert!(store.friend_ids("a").is_empty());
        assert!(store.friend_ids("b").is_empty());
    }

    #[test]
    fn test_post_removal_cleans_author_index() {
        let store = Store::new();
        let now = Utc::now();
        store.insert_post(Post {
            id: "p1".to_string(),
            author_id: "u1".to_string(),
            content: PostContent::Text {
                text: "hi".to_string(),
            },
            visibility: Visibility::Public,
            created_at: now,
            updated_at: now,
            is_edited: false,
        });

        assert_eq!(store.posts_by_author("u1").len(), 1);
        store.remove_post("p1");
        assert!(store.posts_by_author("u1").is_empty());
        assert!(store.post_by_id("p1").is_none());
    }

    #[test]
    fn test_terminal_requests_leave_pending_index() {
        let store = Store::new();
        store.insert_friend_request(FriendRequest {
            id: "r1".to_string(),
            from_user_id: "a".to_string(),
            to_user_id: "b".to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        });

        assert!(store.pending_request("a", "b").is_some());
        store.set_request_status("r1", RequestStatus::Accepted);
        assert!(store.pending_request("a", "b").is_none());
        // Audit trail survives
        let kept = store.friend_request_by_id("r1").unwrap();
        assert_eq!(kept.status, RequestStatus::Accepted);
    }

    #[test]
    fn test_clear_resets_everything() {
        let store = Store::new();
        store.insert_user(user("u1", "a@example.com", "a"));
        store.add_friendship("u1", "u2", Utc::now());
        store.clear();

        assert!(store.user_by_id("u1").is_none());
        assert!(!store.has_friendship("u1", "u2"));
    }
}
