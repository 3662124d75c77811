use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::api::error::AppError;
use crate::models::MediaEntry;
use crate::store::Store;
use crate::utils::validation::{is_supported_image, is_supported_video, normalize_mime};

/// Opaque blob-by-id storage for uploaded media, independent of posts.
/// Content is copied on write and on every read, so callers can never mutate
/// stored bytes through a handed-out reference.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<Store>,
    max_image_size: u64,
    max_video_size: u64,
}

impl MediaService {
    pub fn new(store: Arc<Store>, max_image_size: u64, max_video_size: u64) -> Self {
        Self {
            store,
            max_image_size,
            max_video_size,
        }
    }

    pub fn upload(&self, data: &[u8], mime_type: &str) -> Result<MediaEntry, AppError> {
        if data.is_empty() {
            return Err(AppError::Validation(
                "Uploaded file cannot be empty".to_string(),
            ));
        }

        let mime = normalize_mime(mime_type);
        let max_size = if is_supported_image(&mime) {
            self.max_image_size
        } else if is_supported_video(&mime) {
            self.max_video_size
        } else {
            return Err(AppError::InvalidFormat);
        };

        if data.len() as u64 > max_size {
            return Err(AppError::FileTooLarge);
        }

        let entry = MediaEntry {
            id: Uuid::new_v4().to_string(),
            data: data.to_vec(),
            mime_type: mime,
            size: data.len(),
            created_at: Utc::now(),
        };
        self.store.insert_media(entry.clone());
        Ok(entry)
    }

    pub fn get(&self, id: &str) -> Option<MediaEntry> {
        self.store.media_by_id(id)
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store
            .remove_media(id)
            .map(|_| ())
            .ok_or(AppError::MediaNotFound)
    }
}
