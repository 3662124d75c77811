pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::services::auth::AuthService;
use crate::services::feed::FeedService;
use crate::services::friends::FriendService;
use crate::services::media::MediaService;
use crate::services::posts::PostService;
use crate::store::Store;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::posts::create_post,
        api::handlers::posts::get_post,
        api::handlers::posts::update_post,
        api::handlers::posts::delete_post,
        api::handlers::feed::get_feed,
        api::handlers::friends::send_friend_request,
        api::handlers::friends::list_friend_requests,
        api::handlers::friends::accept_friend_request,
        api::handlers::friends::decline_friend_request,
        api::handlers::friends::list_friends,
        api::handlers::friends::remove_friend,
        api::handlers::media::upload_media,
        api::handlers::media::get_media,
        api::handlers::media::delete_media,
        api::handlers::health::health,
    ),
    components(
        schemas(
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::LoginResponse,
            api::handlers::posts::CreatePostRequest,
            api::handlers::posts::UpdatePostRequest,
            api::handlers::friends::SendFriendRequestRequest,
            api::handlers::media::MediaResponse,
            models::User,
            models::Post,
            models::PostContent,
            models::Visibility,
            models::FriendRequest,
            models::RequestStatus,
            services::feed::FeedPage,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "posts", description = "Post CRUD with visibility control"),
        (name = "friends", description = "Friend requests and friendships"),
        (name = "feed", description = "The reverse-chronological feed"),
        (name = "media", description = "Opaque media blobs")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub auth: AuthService,
    pub posts: PostService,
    pub friends: FriendService,
    pub feed: FeedService,
    pub media: MediaService,
    pub config: AppConfig,
}

impl AppState {
    /// Wires every service to one shared store. No ambient globals: callers
    /// construct the store and hand it over explicitly.
    pub fn new(store: Arc<Store>, config: AppConfig) -> Self {
        Self {
            auth: AuthService::new(store.clone(), config.session_ttl_hours),
            posts: PostService::new(store.clone()),
            friends: FriendService::new(store.clone()),
            feed: FeedService::new(store.clone()),
            media: MediaService::new(store.clone(), config.max_image_size, config.max_video_size),
            store,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    use api::handlers;
    use api::middleware::auth::{load_user, require_auth};

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/logout",
            post(handlers::auth::logout).layer(from_fn(require_auth)),
        )
        .route(
            "/auth/me",
            get(handlers::auth::me).layer(from_fn(require_auth)),
        )
        // Post mutations resolve the user optimistically; the service's own
        // Unauthorized check is the authority for anonymous callers
        .route("/posts", post(handlers::posts::create_post))
        .route(
            "/posts/:id",
            get(handlers::posts::get_post)
                .put(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route("/feed", get(handlers::feed::get_feed))
        .route(
            "/friends",
            get(handlers::friends::list_friends).layer(from_fn(require_auth)),
        )
        .route(
            "/friends/:friend_id",
            delete(handlers::friends::remove_friend).layer(from_fn(require_auth)),
        )
        .route(
            "/friends/requests",
            post(handlers::friends::send_friend_request)
                .get(handlers::friends::list_friend_requests)
                .layer(from_fn(require_auth)),
        )
        .route(
            "/friends/requests/:id/accept",
            post(handlers::friends::accept_friend_request).layer(from_fn(require_auth)),
        )
        .route(
            "/friends/requests/:id/decline",
            post(handlers::friends::decline_friend_request).layer(from_fn(require_auth)),
        )
        .route(
            "/media",
            post(handlers::media::upload_media)
                .layer(axum::extract::DefaultBodyLimit::max(
                    state.config.max_video_size as usize + 10 * 1024 * 1024, // multipart overhead buffer
                ))
                .layer(from_fn(require_auth)),
        )
        .route(
            "/media/:id",
            get(handlers::media::get_media).delete(handlers::media::delete_media),
        )
        .layer(from_fn_with_state(state.clone(), load_user))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
