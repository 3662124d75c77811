use std::env;

/// Runtime configuration for the social backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Session validity window in hours (default: 24)
    pub session_ttl_hours: i64,

    /// Default feed page size when the client sends no limit (default: 20)
    pub feed_default_limit: usize,

    /// Maximum uploaded image size in bytes (default: 10 MiB)
    pub max_image_size: u64,

    /// Maximum uploaded video size in bytes (default: 100 MiB)
    pub max_video_size: u64,

    /// Allowed CORS origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24,
            feed_default_limit: 20,
            max_image_size: crate::utils::validation::MAX_IMAGE_SIZE,
            max_video_size: crate::utils::validation::MAX_VIDEO_SIZE,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.session_ttl_hours),

            feed_default_limit: env::var("FEED_DEFAULT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.feed_default_limit),

            max_image_size: env::var("MAX_IMAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_image_size),

            max_video_size: env::var("MAX_VIDEO_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_video_size),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.feed_default_limit, 20);
        assert_eq!(config.max_image_size, 10 * 1024 * 1024);
        assert_eq!(config.max_video_size, 100 * 1024 * 1024);
    }

    #[test]
    fn test_from_env_falls_back_to_defaults() {
        env::remove_var("SESSION_TTL_HOURS");
        env::remove_var("ALLOWED_ORIGINS");
        let config = AppConfig::from_env();
        let default_config = AppConfig::default();
        assert_eq!(config.session_ttl_hours, default_config.session_ttl_hours);
        assert_eq!(config.allowed_origins, default_config.allowed_origins);
        assert!(!config.allowed_origins.contains(&"*".to_string()));
    }
}
