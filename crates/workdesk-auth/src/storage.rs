use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{AuthSession, UserProfile};

const SESSION_FILE: &str = "session.json";
const PROFILE_FILE: &str = "profile.json";

/// File cache for the current session and profile.
///
/// Lets a restart read the last profile without a round trip and gives
/// `verify` a token to check at startup.
#[derive(Debug, Clone)]
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        Ok(self.dir.join(file))
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.path(file)?;
        let json = serde_json::to_string_pretty(value).context("Failed to serialize cache entry")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    /// `Ok(None)` when the file is missing. A corrupt file is removed and
    /// reads as missing.
    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Discarding unreadable cache file {:?}: {}", path, e);
                fs::remove_file(&path).ok();
                Ok(None)
            }
        }
    }

    fn remove(&self, file: &str) -> Result<()> {
        let path = self.dir.join(file);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("Failed to delete {:?}", path))?;
        }
        Ok(())
    }

    pub fn save_session(&self, session: &AuthSession) -> Result<()> {
        self.write(SESSION_FILE, session)?;
        tracing::debug!("Stored session in {:?}", self.dir);
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<AuthSession>> {
        self.read(SESSION_FILE)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write(PROFILE_FILE, profile)
    }

    pub fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.read(PROFILE_FILE)
    }

    /// Remove both entries. Safe to call when nothing is cached.
    pub fn clear(&self) -> Result<()> {
        self.remove(SESSION_FILE)?;
        self.remove(PROFILE_FILE)?;
        tracing::debug!("Cleared session cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("session"));

        assert!(cache.load_session().unwrap().is_none());

        let session = AuthSession::new("token");
        cache.save_session(&session).unwrap();
        let profile = UserProfile {
            id: "1".into(),
            email: "demo@kt.com".into(),
            ..Default::default()
        };
        cache.save_profile(&profile).unwrap();

        assert_eq!(cache.load_session().unwrap(), Some(session));
        assert_eq!(cache.load_profile().unwrap(), Some(profile));

        cache.clear().unwrap();
        cache.clear().unwrap();
        assert!(cache.load_session().unwrap().is_none());
        assert!(cache.load_profile().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path());
        fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        assert!(cache.load_session().unwrap().is_none());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }
}
