use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::api::error::AppError;
use crate::models::{FriendRequest, RequestStatus, User};
use crate::store::Store;

/// Friend-request state machine (`pending -> accepted | declined`, both
/// terminal) and paired friendship-edge maintenance.
#[derive(Clone)]
pub struct FriendService {
    store: Arc<Store>,
}

impl FriendService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn send_friend_request(&self, from: &str, to: &str) -> Result<FriendRequest, AppError> {
        if from == to {
            return Err(AppError::SelfFriendRequest);
        }
        if self.store.user_by_id(from).is_none() || self.store.user_by_id(to).is_none() {
            return Err(AppError::UserNotFound);
        }
        // Duplicate detection is symmetric even though storage is directional:
        // an existing friendship or a pending request in either direction
        // blocks a new one.
        if self.store.has_friendship(from, to)
            || self.store.pending_request(from, to).is_some()
            || self.store.pending_request(to, from).is_some()
        {
            return Err(AppError::DuplicateFriendRequest);
        }

        let request = FriendRequest {
            id: Uuid::new_v4().to_string(),
            from_user_id: from.to_string(),
            to_user_id: to.to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        self.store.insert_friend_request(request.clone());
        Ok(request)
    }

    pub fn accept_friend_request(
        &self,
        request_id: &str,
        acting_user_id: &str,
    ) -> Result<FriendRequest, AppError> {
        let request = self.pending_request_for_update(request_id, acting_user_id)?;

        let updated = self
            .store
            .set_request_status(request_id, RequestStatus::Accepted)
            .ok_or(AppError::FriendRequestNotFound)?;
        // Both edges share one timestamp
        self.store
            .add_friendship(&request.from_user_id, &request.to_user_id, Utc::now());

        tracing::info!(
            "Friend request {} accepted: {} <-> {}",
            request_id,
            request.from_user_id,
            request.to_user_id
        );
        Ok(updated)
    }

    pub fn decline_friend_request(
        &self,
        request_id: &str,
        acting_user_id: &str,
    ) -> Result<FriendRequest, AppError> {
        self.pending_request_for_update(request_id, acting_user_id)?;

        self.store
            .set_request_status(request_id, RequestStatus::Declined)
            .ok_or(AppError::FriendRequestNotFound)
    }

    /// A request that is missing and one that has already been handled are
    /// reported identically; only the recipient may respond.
    fn pending_request_for_update(
        &self,
        request_id: &str,
        acting_user_id: &str,
    ) -> Result<FriendRequest, AppError> {
        let request = self
            .store
            .friend_request_by_id(request_id)
            .filter(|r| r.status == RequestStatus::Pending)
            .ok_or(AppError::FriendRequestNotFound)?;

        if request.to_user_id != acting_user_id {
            return Err(AppError::Forbidden);
        }
        Ok(request)
    }

    /// Either party may initiate removal; both directions are deleted.
    pub fn remove_friend(&self, user_id: &str, friend_id: &str) -> Result<(), AppError> {
        if !self.store.has_friendship(user_id, friend_id) {
            return Err(AppError::NotFriends);
        }
        self.store.remove_friendship(user_id, friend_id);
        Ok(())
    }

    /// Resolves friend ids to full user records, silently dropping any id
    /// that no longer resolves.
    pub fn get_friends(&self, user_id: &str) -> Vec<User> {
        let mut friends: Vec<User> = self
            .store
            .friend_ids(user_id)
            .iter()
            .filter_map(|id| self.store.user_by_id(id))
            .collect();
        friends.sort_by(|a, b| a.username.cmp(&b.username));
        friends
    }

    pub fn are_friends(&self, a: &str, b: &str) -> bool {
        self.store.has_friendship(a, b)
    }

    /// Pending requests addressed to the user, newest first.
    pub fn incoming_requests(&self, user_id: &str) -> Vec<FriendRequest> {
        self.store.pending_requests_to(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::AuthService;

    fn setup() -> (Arc<Store>, FriendService, String, String, String) {
        let store = Arc::new(Store::new());
        let auth = AuthService::new(store.clone(), 24);
        let a = auth.register("a@example.com", "usera", "pw").unwrap().id;
        let b = auth.register("b@example.com", "userb", "pw").unwrap().id;
        let c = auth.register("c@example.com", "userc", "pw").unwrap().id;
        (store.clone(), FriendService::new(store), a, b, c)
    }

    #[test]
    fn test_accept_creates_symmetric_friendship() {
        let (_, friends, a, b, _) = setup();
        let request = friends.send_friend_request(&a, &b).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        let accepted = friends.accept_friend_request(&request.id, &b).unwrap();
        assert_eq!(accepted.status, RequestStatus::Accepted);
        assert!(friends.are_friends(&a, &b));
        assert!(friends.are_friends(&b, &a));

        friends.remove_friend(&b, &a).unwrap();
        assert!(!friends.are_friends(&a, &b));
        assert!(!friends.are_friends(&b, &a));
    }

    #[test]
    fn test_duplicate_detection_is_symmetric() {
        let (_, friends, a, b, _) = setup();
        friends.send_friend_request(&a, &b).unwrap();

        assert_eq!(
            friends.send_friend_request(&b, &a).unwrap_err(),
            AppError::DuplicateFriendRequest
        );
        assert_eq!(
            friends.send_friend_request(&a, &b).unwrap_err(),
            AppError::DuplicateFriendRequest
        );
    }

    #[test]
    fn test_existing_friendship_blocks_new_request() {
        let (_, friends, a, b, _) = setup();
        let request = friends.send_friend_request(&a, &b).unwrap();
        friends.accept_friend_request(&request.id, &b).unwrap();

        assert_eq!(
            friends.send_friend_request(&b, &a).unwrap_err(),
            AppError::DuplicateFriendRequest
        );
    }

    #[test]
    fn test_request_validation() {
        let (_, friends, a, _, _) = setup();
        assert_eq!(
            friends.send_friend_request(&a, &a).unwrap_err(),
            AppError::SelfFriendRequest
        );
        assert_eq!(
            friends.send_friend_request(&a, "missing").unwrap_err(),
            AppError::UserNotFound
        );
    }

    #[test]
    fn test_only_recipient_may_respond() {
        let (_, friends, a, b, c) = setup();
        let request = friends.send_friend_request(&a, &b).unwrap();

        assert_eq!(
            friends.accept_friend_request(&request.id, &a).unwrap_err(),
            AppError::Forbidden
        );
        assert_eq!(
            friends.decline_friend_request(&request.id, &c).unwrap_err(),
            AppError::Forbidden
        );
    }

    #[test]
    fn test_terminal_requests_report_not_found() {
        let (_, friends, a, b, _) = setup();
        let request = friends.send_friend_request(&a, &b).unwrap();
        friends.decline_friend_request(&request.id, &b).unwrap();

        // Already handled is indistinguishable from unknown
        assert_eq!(
            friends.accept_friend_request(&request.id, &b).unwrap_err(),
            AppError::FriendRequestNotFound
        );
        assert_eq!(
            friends.accept_friend_request("missing", &b).unwrap_err(),
            AppError::FriendRequestNotFound
        );
        assert!(!friends.are_friends(&a, &b));
    }

    #[test]
    fn test_decline_allows_retry() {
        let (_, friends, a, b, _) = setup();
        let request = friends.send_friend_request(&a, &b).unwrap();
        friends.decline_friend_request(&request.id, &b).unwrap();

        // Declined requests leave the pending subset, so a new request goes out
        friends.send_friend_request(&a, &b).unwrap();
    }

    #[test]
    fn test_remove_requires_existing_edge() {
        let (_, friends, a, b, _) = setup();
        assert_eq!(
            friends.remove_friend(&a, &b).unwrap_err(),
            AppError::NotFriends
        );
    }

    #[test]
    fn test_get_friends_resolves_users() {
        let (_, friends, a, b, c) = setup();
        for other in [&b, &c] {
            let request = friends.send_friend_request(&a, other).unwrap();
            friends.accept_friend_request(&request.id, other).unwrap();
        }

        let list = friends.get_friends(&a);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].username, "userb");
        assert_eq!(list[1].username, "userc");
    }

    #[test]
    fn test_incoming_requests() {
        let (_, friends, a, b, c) = setup();
        friends.send_friend_request(&a, &c).unwrap();
        friends.send_friend_request(&b, &c).unwrap();

        let incoming = friends.incoming_requests(&c);
        assert_eq!(incoming.len(), 2);
        assert!(friends.incoming_requests(&a).is_empty());
    }
}
