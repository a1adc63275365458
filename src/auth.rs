//! Opaque bearer-token storage.

use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_TOKEN: &str = "FICOUS_TOKEN";
const TOKEN_FILE: &str = "token";

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the per-user data directory.
    pub fn default_location() -> Option<Self> {
        crate::config::data_dir().map(|dir| Self::new(dir.join(TOKEN_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| format!("Cannot read token {}: {}", self.path.display(), e))?;
        let token = content.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    pub fn save(&self, token: &str) -> Result<(), String> {
        let token = token.trim();
        if token.is_empty() {
            return Err("Token is empty".to_string());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Cannot create {}: {}", parent.display(), e))?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, token).map_err(|e| format!("Cannot write {}: {}", tmp.display(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| format!("Cannot rename: {}", e))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), String> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| format!("Cannot remove token {}: {}", self.path.display(), e))?;
        }
        Ok(())
    }
}

/// The token to send: `FICOUS_TOKEN` if set, else the stored one.
pub fn resolve_token(store: Option<&TokenStore>, env_token: Option<String>) -> Result<Option<String>, String> {
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        return Ok(Some(token.trim().to_string()));
    }
    match store {
        Some(store) => store.load(),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token"));

        assert_eq!(store.load().unwrap(), None);
        store.save("  abc.def  \n").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc.def".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn empty_token_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        assert!(store.save("   ").is_err());
    }

    #[test]
    fn env_token_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        store.save("stored").unwrap();

        let token = resolve_token(Some(&store), Some("from-env".into())).unwrap();
        assert_eq!(token.as_deref(), Some("from-env"));

        let token = resolve_token(Some(&store), Some(" ".into())).unwrap();
        assert_eq!(token.as_deref(), Some("stored"));

        assert_eq!(resolve_token(None, None).unwrap(), None);
    }
}
