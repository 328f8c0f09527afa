use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Access/refresh token pair issued by the tracker API.
///
/// Either both tokens are stored or neither is; a pair missing its refresh
/// half is useless for session recovery and is treated as unauthenticated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived credential sent with each authenticated request.
    pub access_token: String,

    /// Longer-lived credential used solely to obtain a new pair.
    pub refresh_token: String,
}

/// Storage for the credential pair.
///
/// Implementations are explicit context objects owned by the composition
/// root and shared by reference with everything that performs network I/O.
pub trait TokenStore: Send + Sync {
    /// Current credential pair, or `None` when unauthenticated.
    fn load(&self) -> Option<TokenPair>;

    /// Replace the stored pair.
    fn save(&self, tokens: &TokenPair) -> Result<()>;

    /// Drop stored credentials.
    fn clear(&self);
}

/// File-backed token storage under the Traction config directory.
///
/// The credential pair is the only client-side state that must survive a
/// restart; it lives in its own file, separate from any cached data.
pub struct FileTokenStore {
    path: PathBuf,
}

const TOKEN_FILE: &str = "credentials.json";

impl FileTokenStore {
    /// Create a store writing to `credentials.json` inside `dir`.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("Failed to create credentials directory")?;
        Ok(Self {
            path: dir.join(TOKEN_FILE),
        })
    }

    /// Create a store in the default config location.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("traction");
        Self::new(&dir)
    }

    fn read_pair(&self) -> Result<TokenPair> {
        let raw = fs::read_to_string(&self.path).context("Failed to read credentials file")?;
        serde_json::from_str(&raw).context("Failed to parse credentials file")
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<TokenPair> {
        let pair = self.read_pair().ok()?;
        // A half-written pair is unauthenticated, not a partial session.
        if pair.access_token.is_empty() || pair.refresh_token.is_empty() {
            self.clear();
            return None;
        }
        Some(pair)
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        let raw = serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;
        fs::write(&self.path, raw).context("Failed to write credentials file")?;
        tracing::debug!("Stored credentials at {:?}", self.path);
        Ok(())
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove credentials file: {}", err);
            } else {
                tracing::debug!("Cleared stored credentials");
            }
        }
    }
}

/// In-memory token storage for tests and embedded use.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out already authenticated with the given pair.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<TokenPair> {
        self.tokens.read().clone()
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        *self.tokens.write() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) {
        *self.tokens.write() = None;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        assert!(store.load().is_none());

        store.save(&pair("access-1", "refresh-1")).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.access_token, "access-1");
        assert_eq!(loaded.refresh_token, "refresh-1");

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileTokenStore::new(dir.path()).unwrap();
            store.save(&pair("access-1", "refresh-1")).unwrap();
        }
        let reopened = FileTokenStore::new(dir.path()).unwrap();
        assert_eq!(reopened.load().unwrap().access_token, "access-1");
    }

    #[test]
    fn test_dangling_half_pair_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        // Write a pair with an empty refresh half directly.
        std::fs::write(
            dir.path().join("credentials.json"),
            r#"{"access_token":"access-1","refresh_token":""}"#,
        )
        .unwrap();

        assert!(store.load().is_none());
        // The broken pair was also cleared from disk.
        assert!(!dir.path().join("credentials.json").exists());
    }

    #[test]
    fn test_corrupt_file_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        std::fs::write(dir.path().join("credentials.json"), "not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().is_none());

        store.save(&pair("a", "r")).unwrap();
        assert_eq!(store.load().unwrap(), pair("a", "r"));

        store.clear();
        assert!(store.load().is_none());
    }
}
