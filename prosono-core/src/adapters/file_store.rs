//! File-backed token store
//!
//! Persists the token pair as a single JSON document (`tokens.json`) in the
//! ProSono directory, so both keys always land on disk together and the pair
//! survives process restarts. Reads fall back to an empty pair when the file
//! is missing or unreadable; writes update the in-memory pair first and flush
//! to disk best-effort.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::ports::TokenStore;

pub const TOKENS_FILENAME: &str = "tokens.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<StoredTokens>,
}

impl FileTokenStore {
    /// Open the store in the given directory, loading any persisted pair
    pub fn new(dir: &Path) -> Self {
        let path = dir.join(TOKENS_FILENAME);
        let tokens = Self::read_file(&path);
        Self {
            path,
            tokens: Mutex::new(tokens),
        }
    }

    fn read_file(path: &Path) -> StoredTokens {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => StoredTokens::default(),
        }
    }

    fn flush(&self, tokens: &StoredTokens) {
        // In-memory state stays authoritative if the write fails
        if let Ok(content) = serde_json::to_string_pretty(tokens) {
            let _ = std::fs::write(&self.path, content);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredTokens> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    fn set_access_token(&self, token: &str) {
        let mut tokens = self.lock();
        tokens.access_token = Some(token.to_string());
        self.flush(&tokens);
    }

    fn set_refresh_token(&self, token: &str) {
        let mut tokens = self.lock();
        tokens.refresh_token = Some(token.to_string());
        self.flush(&tokens);
    }

    fn set_token_pair(&self, access: &str, refresh: Option<&str>) {
        let mut tokens = self.lock();
        tokens.access_token = Some(access.to_string());
        if let Some(refresh) = refresh {
            tokens.refresh_token = Some(refresh.to_string());
        }
        self.flush(&tokens);
    }

    fn clear(&self) {
        let mut tokens = self.lock();
        *tokens = StoredTokens::default();
        self.flush(&tokens);
    }
}
