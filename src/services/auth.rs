use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::api::error::AppError;
use crate::models::{Session, User};
use crate::store::Store;

/// Registration, login, logout and session validation over the entity store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<Store>,
    session_ttl_hours: i64,
}

impl AuthService {
    pub fn new(store: Arc<Store>, session_ttl_hours: i64) -> Self {
        Self {
            store,
            session_ttl_hours,
        }
    }

    /// Hash a password using argon2. The PHC output string embeds the salt,
    /// so verification is self-contained given only the stored string, and a
    /// fresh salt per call means the same password never hashes twice to the
    /// same output.
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Verify a password against the stored hash. argon2's comparison is
    /// constant-time.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        let argon2 = Argon2::default();
        let parsed_hash =
            argon2::PasswordHash::new(hash).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate a URL-safe high-entropy session token
    pub fn generate_token() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..32).map(|_| rng.r#gen()).collect();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes)
    }

    pub fn register(&self, email: &str, username: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        let username = username.trim().to_string();

        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email, username and password are required".to_string(),
            ));
        }

        if self.store.user_by_email(&email).is_some() {
            return Err(AppError::DuplicateEmail);
        }
        if self.store.user_by_username(&username).is_some() {
            return Err(AppError::DuplicateUsername);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            username,
            password_hash: Self::hash_password(password)?,
            created_at: Utc::now(),
        };
        self.store.insert_user(user.clone());

        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Both failure paths (unknown email, wrong password) report the same
    /// `InvalidCredentials` error.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self
            .store
            .user_by_email(email.trim())
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            token: Self::generate_token(),
            expires_at: Utc::now() + Duration::hours(self.session_ttl_hours),
        };
        self.store.insert_session(session.clone());
        Ok(session)
    }

    pub fn logout(&self, session_id: &str) -> Result<(), AppError> {
        self.store
            .remove_session(session_id)
            .map(|_| ())
            .ok_or(AppError::InvalidSession)
    }

    /// Resolves a bearer token to its user and session. Returns `None` (not
    /// an error) for unknown or expired tokens; an expired session is deleted
    /// the moment it is read here, there is no background sweeper.
    pub fn validate_token(&self, token: &str) -> Option<(User, Session)> {
        let session = self.store.session_by_token(token)?;
        self.validate(session)
    }

    /// Same as [`validate_token`](Self::validate_token) but by session id.
    pub fn validate_session(&self, session_id: &str) -> Option<(User, Session)> {
        let session = self.store.session_by_id(session_id)?;
        self.validate(session)
    }

    fn validate(&self, session: Session) -> Option<(User, Session)> {
        if session.expires_at <= Utc::now() {
            self.store.remove_session(&session.id);
            return None;
        }
        let user = self.store.user_by_id(&session.user_id)?;
        Some((user, session))
    }
}
