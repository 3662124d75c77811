use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Stored trimmed and lowercased
    pub email: String,
    /// Stored trimmed; uniqueness is case-insensitive
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    FriendsOnly,
}

/// Post payload. A post is text, an image, or a video; image and video carry
/// at least one of a media URL or a MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostContent {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    Video {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: PostContent,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_edited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// One directed edge of a friendship. Edges are always created and removed in
/// pairs, so reads are symmetric in practice.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub user_id: String,
    pub friend_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub id: String,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_serialization_round_trip() {
        let now = Utc::now();
        let post = Post {
            id: "p1".to_string(),
            author_id: "u1".to_string(),
            content: PostContent::Image {
                media_url: Some("https://cdn.example.com/x.jpg".to_string()),
                mime_type: Some("image/jpeg".to_string()),
                file_size: Some(1024),
            },
            visibility: Visibility::FriendsOnly,
            created_at: now,
            updated_at: now,
            is_edited: true,
        };

        let json = serde_json::to_string(&post).unwrap();
        let back: Post = serde_json::from_str(&json).unwrap();
        // DateTime equality compares instants, not strings
        assert_eq!(back, post);
    }

    #[test]
    fn test_post_wire_shape() {
        let now = Utc::now();
        let post = Post {
            id: "p1".to_string(),
            author_id: "u1".to_string(),
            content: PostContent::Text {
                text: "hi".to_string(),
            },
            visibility: Visibility::Public,
            created_at: now,
            updated_at: now,
            is_edited: false,
        };

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["authorId"], "u1");
        assert_eq!(value["visibility"], "public");
        assert_eq!(value["isEdited"], false);
        assert_eq!(value["content"]["type"], "text");
        assert_eq!(value["content"]["text"], "hi");
        // RFC 3339 timestamp
        assert!(value["createdAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_content_union_tags() {
        let video: PostContent = serde_json::from_value(serde_json::json!({
            "type": "video",
            "mediaUrl": "https://cdn.example.com/v.mp4",
        }))
        .unwrap();
        assert_eq!(
            video,
            PostContent::Video {
                media_url: Some("https://cdn.example.com/v.mp4".to_string()),
                mime_type: None,
                file_size: None,
            }
        );
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            username: "a".to_string(),
            password_hash: "secret".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
    }
}
