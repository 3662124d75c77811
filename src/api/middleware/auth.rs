use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::AppState;
use crate::api::error::AppError;
use crate::models::User;

/// The acting identity resolved from a bearer token
#[derive(Clone)]
pub struct AuthContext {
    pub user: User,
    pub session_id: String,
}

/// Present on every request once `load_user` has run; `None` for anonymous
/// callers.
#[derive(Clone, Default)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl MaybeAuth {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(|ctx| ctx.user.id.as_str())
    }
}

#[derive(Deserialize)]
struct AuthQuery {
    token: Option<String>,
}

/// Resolves the bearer token (or a `?token=` query parameter) into the
/// request's auth context. Never rejects: routes that require a user layer
/// `require_auth` on top, everything else sees an anonymous context.
pub async fn load_user(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let token = if let Some(t) = auth_header {
        Some(t)
    } else {
        // Try query parameter
        let query = req.uri().query().unwrap_or_default();
        serde_urlencoded::from_str::<AuthQuery>(query)
            .ok()
            .and_then(|q| q.token)
    };

    let context = token.and_then(|token| {
        state
            .auth
            .validate_token(&token)
            .map(|(user, session)| AuthContext {
                user,
                session_id: session.id,
            })
    });

    req.extensions_mut().insert(MaybeAuth(context));
    next.run(req).await
}

/// Rejects anonymous requests and promotes the auth context to a required
/// extension.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, AppError> {
    let context = req
        .extensions()
        .get::<MaybeAuth>()
        .and_then(|m| m.0.clone())
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}
