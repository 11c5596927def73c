//! SQLite user directory for local-only mode.
//!
//! Seeded with a demo administrator (`demo@kt.com` / `demo123`). Passwords are
//! stored as salted SHA-256 digests; sessions are opaque random tokens.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::models::{AuthSession, ProfileUpdate, UserProfile};

pub const DEMO_EMAIL: &str = "demo@kt.com";
pub const DEMO_PASSWORD: &str = "demo123";

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const USER_EXISTS: &str = "User with this email already exists";

pub struct LocalAuthBackend {
    conn: Connection,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn new_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn decode_profile(json: &str) -> Result<UserProfile, AuthError> {
    serde_json::from_str(json).map_err(|e| AuthError::Storage(format!("Corrupt profile: {}", e)))
}

fn encode_profile(profile: &UserProfile) -> Result<String, AuthError> {
    serde_json::to_string(profile).map_err(|e| AuthError::Storage(e.to_string()))
}

impl LocalAuthBackend {
    /// Open (or create) the directory at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| AuthError::Storage(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, AuthError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AuthError> {
        let store = Self { conn };
        store.init_schema()?;
        store.seed_demo_user()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), AuthError> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_salt TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                profile TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn seed_demo_user(&self) -> Result<(), AuthError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let profile = UserProfile {
            id: "1".to_string(),
            username: "demo".to_string(),
            email: DEMO_EMAIL.to_string(),
            first_name: "Demo".to_string(),
            last_name: "User".to_string(),
            fullname: Some("Demo User".to_string()),
            is_admin: true,
            email_verified: true,
            ..Default::default()
        };
        self.insert_user(&profile, DEMO_PASSWORD)?;
        tracing::info!("Seeded local demo user {}", DEMO_EMAIL);
        Ok(())
    }

    fn insert_user(&self, profile: &UserProfile, password: &str) -> Result<(), AuthError> {
        let salt = new_salt();
        self.conn.execute(
            "INSERT INTO users (id, email, password_salt, password_hash, profile) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.id,
                profile.email,
                salt,
                hash_password(&salt, password),
                encode_profile(profile)?
            ],
        )?;
        Ok(())
    }

    fn open_session(&self, user_id: &str) -> Result<AuthSession, AuthError> {
        let token = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(AuthSession::new(token))
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<(AuthSession, UserProfile), AuthError> {
        let row: Option<(String, String, String, String)> = self
            .conn
            .query_row(
                "SELECT id, password_salt, password_hash, profile FROM users WHERE email = ?1",
                params![email.trim()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((id, salt, hash, profile)) = row else {
            return Err(AuthError::InvalidCredentials(INVALID_CREDENTIALS.to_string()));
        };
        if hash_password(&salt, password) != hash {
            return Err(AuthError::InvalidCredentials(INVALID_CREDENTIALS.to_string()));
        }

        let session = self.open_session(&id)?;
        Ok((session, decode_profile(&profile)?))
    }

    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        let email = email.trim();
        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        if exists > 0 {
            return Err(AuthError::UserExists(USER_EXISTS.to_string()));
        }

        let first = first_name.unwrap_or_default().trim().to_string();
        let last = last_name.unwrap_or_default().trim().to_string();
        let fullname = (!first.is_empty() && !last.is_empty()).then(|| format!("{} {}", first, last));
        let profile = UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            username: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            first_name: first,
            last_name: last,
            fullname,
            email_verified: true,
            ..Default::default()
        };
        self.insert_user(&profile, password)?;
        tracing::info!("Registered local user {}", profile.id);
        Ok(profile)
    }

    fn user_id_for(&self, token: &str) -> Result<String, AuthError> {
        self.conn
            .query_row(
                "SELECT user_id FROM sessions WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(AuthError::SessionExpired)
    }

    /// Profile behind a session token.
    pub fn user_for_token(&self, token: &str) -> Result<UserProfile, AuthError> {
        let user_id = self.user_id_for(token)?;
        let profile: String = self.conn.query_row(
            "SELECT profile FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        decode_profile(&profile)
    }

    pub fn update_user(&self, token: &str, update: &ProfileUpdate) -> Result<UserProfile, AuthError> {
        let mut profile = self.user_for_token(token)?;
        update.apply_to(&mut profile);

        self.conn.execute(
            "UPDATE users SET email = ?1, profile = ?2 WHERE id = ?3",
            params![profile.email, encode_profile(&profile)?, profile.id],
        )?;
        Ok(profile)
    }

    pub fn update_password(&self, token: &str, password: &str) -> Result<(), AuthError> {
        let user_id = self.user_id_for(token)?;
        let salt = new_salt();
        self.conn.execute(
            "UPDATE users SET password_salt = ?1, password_hash = ?2 WHERE id = ?3",
            params![salt, hash_password(&salt, password), user_id],
        )?;
        Ok(())
    }

    /// End a session. Unknown tokens are ignored.
    pub fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    pub fn has_user(&self, email: &str) -> Result<bool, AuthError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params![email.trim()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workdesk_i18n::Language;

    #[test]
    fn test_demo_user_is_admin() {
        let store = LocalAuthBackend::in_memory().unwrap();
        let (session, profile) = store.sign_in(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
        assert!(!session.access_token.is_empty());
        assert!(profile.is_admin);
        assert_eq!(profile.id, "1");
        assert_eq!(store.user_for_token(&session.access_token).unwrap(), profile);
    }

    #[test]
    fn test_wrong_password() {
        let store = LocalAuthBackend::in_memory().unwrap();
        let err = store.sign_in(DEMO_EMAIL, "nope").unwrap_err();
        assert_eq!(err.user_message(), "Invalid email or password");
        assert!(store.sign_in("ghost@kt.com", DEMO_PASSWORD).is_err());
    }

    #[test]
    fn test_passwords_are_not_stored_in_clear() {
        let store = LocalAuthBackend::in_memory().unwrap();
        let stored: String = store
            .conn
            .query_row("SELECT password_hash FROM users WHERE id = '1'", [], |r| r.get(0))
            .unwrap();
        assert_ne!(stored, DEMO_PASSWORD);
        assert_eq!(stored.len(), 64);
    }

    #[test]
    fn test_sign_up_then_duplicate() {
        let store = LocalAuthBackend::in_memory().unwrap();
        let profile = store
            .sign_up("ann@kt.com", "pw", Some("Ann"), Some("Lee"))
            .unwrap();
        assert_eq!(profile.username, "ann");
        assert_eq!(profile.fullname.as_deref(), Some("Ann Lee"));
        assert!(!profile.is_admin);

        assert!(matches!(
            store.sign_up("ANN@kt.com", "pw", None, None),
            Err(AuthError::UserExists(_))
        ));
        assert!(store.sign_in("ann@kt.com", "pw").is_ok());
    }

    #[test]
    fn test_update_and_sign_out() {
        let store = LocalAuthBackend::in_memory().unwrap();
        let (session, _) = store.sign_in(DEMO_EMAIL, DEMO_PASSWORD).unwrap();

        let updated = store
            .update_user(&session.access_token, &ProfileUpdate::language(Language::Zh))
            .unwrap();
        assert_eq!(updated.language, Language::Zh);

        store.sign_out(&session.access_token).unwrap();
        store.sign_out(&session.access_token).unwrap();
        assert!(matches!(
            store.user_for_token(&session.access_token),
            Err(AuthError::SessionExpired)
        ));
    }

    #[test]
    fn test_update_password() {
        let store = LocalAuthBackend::in_memory().unwrap();
        let (session, _) = store.sign_in(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
        store.update_password(&session.access_token, "newpass").unwrap();
        assert!(store.sign_in(DEMO_EMAIL, DEMO_PASSWORD).is_err());
        assert!(store.sign_in(DEMO_EMAIL, "newpass").is_ok());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_users.db");
        {
            let store = LocalAuthBackend::new(&path).unwrap();
            store.sign_up("bo@kt.com", "pw", None, None).unwrap();
        }
        let store = LocalAuthBackend::new(&path).unwrap();
        assert!(store.has_user("bo@kt.com").unwrap());
        assert!(store.has_user(DEMO_EMAIL).unwrap());
    }
}
