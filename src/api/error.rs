use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Every failure the core can report, each with a stable machine-readable
/// code and an HTTP status. Handlers return these directly; the closed enum
/// lets callers match every kind exhaustively.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session not found")]
    InvalidSession,

    #[error("Authentication required")]
    Unauthorized,

    #[error("You do not have permission to access this post")]
    AccessDenied,

    #[error("Post content cannot be empty")]
    EmptyContent,

    #[error("Unsupported media format")]
    InvalidFormat,

    #[error("File size exceeds the allowed limit")]
    FileTooLarge,

    #[error("Post not found")]
    PostNotFound,

    #[error("Media not found")]
    MediaNotFound,

    #[error("Cannot send a friend request to yourself")]
    SelfFriendRequest,

    #[error("A friend request already exists between these users")]
    DuplicateFriendRequest,

    #[error("Friend request not found")]
    FriendRequestNotFound,

    #[error("Only the recipient can respond to this friend request")]
    Forbidden,

    #[error("Users are not friends")]
    NotFriends,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Internal Server Error")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::DuplicateUsername => "DUPLICATE_USERNAME",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidSession => "INVALID_SESSION",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::AccessDenied => "ACCESS_DENIED",
            AppError::EmptyContent => "EMPTY_CONTENT",
            AppError::InvalidFormat => "INVALID_FORMAT",
            AppError::FileTooLarge => "FILE_TOO_LARGE",
            AppError::PostNotFound => "POST_NOT_FOUND",
            AppError::MediaNotFound => "MEDIA_NOT_FOUND",
            AppError::SelfFriendRequest => "SELF_FRIEND_REQUEST",
            AppError::DuplicateFriendRequest => "DUPLICATE_FRIEND_REQUEST",
            AppError::FriendRequestNotFound => "FRIEND_REQUEST_NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFriends => "NOT_FRIENDS",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail
            | AppError::DuplicateUsername
            | AppError::DuplicateFriendRequest => StatusCode::CONFLICT,

            AppError::InvalidCredentials | AppError::InvalidSession | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }

            AppError::AccessDenied | AppError::Forbidden => StatusCode::FORBIDDEN,

            AppError::PostNotFound
            | AppError::MediaNotFound
            | AppError::FriendRequestNotFound
            | AppError::UserNotFound => StatusCode::NOT_FOUND,

            AppError::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            AppError::EmptyContent
            | AppError::InvalidFormat
            | AppError::SelfFriendRequest
            | AppError::NotFriends
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,

            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(ref msg) = self {
            tracing::error!("Internal error: {}", msg);
        }

        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
