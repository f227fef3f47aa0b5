//! Uploaded avatar images, kept in memory next to the database.
//!
//! Each user has at most one avatar; a new upload replaces the old one.
//! Files are served back under `/uploads/avatars/{user_id}/{file_name}`.

use std::{collections::HashMap, sync::Arc};

use axum::body::Bytes;
use tokio::sync::RwLock;

const FALLBACK_FILE_NAME: &str = "avatar";

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Clone, Default)]
pub struct AvatarStore {
    files: Arc<RwLock<HashMap<i64, StoredFile>>>,
}

impl AvatarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `file` as the user's avatar and returns the URL it is
    /// served from.
    pub async fn put(&self, user_id: i64, file: StoredFile) -> String {
        let url = avatar_url(user_id, &file.file_name);
        self.files.write().await.insert(user_id, file);
        url
    }

    /// The user's current avatar, if it was uploaded under `file_name`.
    pub async fn get(&self, user_id: i64, file_name: &str) -> Option<StoredFile> {
        self.files
            .read()
            .await
            .get(&user_id)
            .filter(|f| f.file_name == file_name)
            .cloned()
    }

    pub async fn remove(&self, user_id: i64) {
        self.files.write().await.remove(&user_id);
    }
}

pub fn avatar_url(user_id: i64, file_name: &str) -> String {
    format!("/uploads/avatars/{user_id}/{file_name}")
}

/// Reduces a client-supplied file name to a single safe path segment:
/// directories are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`
/// and leading dots are stripped.
pub fn sanitize_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
