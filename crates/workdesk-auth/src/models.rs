//! Session and profile models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use workdesk_i18n::{Language, WeekStart};

/// Token pair for an authenticated connection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp; `None` for tokens that do not expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AuthSession {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| chrono::Utc::now().timestamp() >= at)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    Browser,
    Api,
    None,
}

/// User-identifying and preference data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Profile picture URL (or inline data URL in local-only mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<WeekStart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_method: Option<NotificationMethod>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub email_verified: bool,
}

fn text(metadata: &Value, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parsed<T: serde::de::DeserializeOwned>(metadata: &Value, key: &str) -> Option<T> {
    metadata
        .get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

impl UserProfile {
    /// Build a profile from the auth service's user object.
    ///
    /// Profile attributes live in the user's metadata map.
    pub fn from_auth_user(id: &str, email: &str, metadata: &Value, email_verified: bool) -> Self {
        Self {
            id: id.to_string(),
            username: text(metadata, "username").unwrap_or_default(),
            email: email.to_string(),
            first_name: text(metadata, "first_name").unwrap_or_default(),
            last_name: text(metadata, "last_name").unwrap_or_default(),
            fullname: text(metadata, "fullname"),
            phone: text(metadata, "phone"),
            occupation: text(metadata, "occupation"),
            company_name: text(metadata, "company_name"),
            pic: text(metadata, "pic"),
            language: Language::from_code(text(metadata, "language").as_deref()),
            week_start: parsed(metadata, "week_start"),
            notification_method: parsed(metadata, "notification_method"),
            is_admin: metadata
                .get("is_admin")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            email_verified,
        }
    }

    /// Week start preference, Sunday when unset.
    pub fn week_start(&self) -> WeekStart {
        self.week_start.unwrap_or_default()
    }

    /// Full name for display.
    pub fn display_name(&self) -> String {
        if let Some(full) = self.fullname.as_deref().filter(|f| !f.trim().is_empty()) {
            return full.to_string();
        }
        let joined = format!("{} {}", self.first_name, self.last_name);
        let joined = joined.trim();
        if joined.is_empty() {
            self.username.clone()
        } else {
            joined.to_string()
        }
    }
}

/// Partial profile change. Only provided fields are sent and merged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<WeekStart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_method: Option<NotificationMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl ProfileUpdate {
    pub fn language(language: Language) -> Self {
        Self {
            language: Some(language),
            ..Default::default()
        }
    }

    pub fn pic(url: impl Into<String>) -> Self {
        Self {
            pic: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-level merge into `profile`.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        set(&mut profile.username, &self.username);
        set(&mut profile.email, &self.email);
        set(&mut profile.first_name, &self.first_name);
        set(&mut profile.last_name, &self.last_name);
        set_opt(&mut profile.fullname, &self.fullname);
        set_opt(&mut profile.phone, &self.phone);
        set_opt(&mut profile.occupation, &self.occupation);
        set_opt(&mut profile.company_name, &self.company_name);
        set_opt(&mut profile.pic, &self.pic);
        set(&mut profile.language, &self.language);
        set_opt(&mut profile.week_start, &self.week_start);
        set_opt(&mut profile.notification_method, &self.notification_method);
        set(&mut profile.is_admin, &self.is_admin);
    }

    /// Metadata map holding only the provided fields.
    pub fn to_metadata(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let now = chrono::Utc::now().timestamp();
        let mut session = AuthSession::new("t");
        assert!(!session.is_expired());
        session.expires_at = Some(now - 10);
        assert!(session.is_expired());
        session.expires_at = Some(now + 3600);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = AuthSession::new("secret-token");
        assert!(!format!("{:?}", session).contains("secret-token"));
    }

    #[test]
    fn test_from_auth_user() {
        let metadata = serde_json::json!({
            "username": "demo",
            "first_name": "Demo",
            "last_name": "User",
            "language": "zh",
            "week_start": "monday",
            "notification_method": "api",
            "is_admin": true,
            "phone": ""
        });
        let profile = UserProfile::from_auth_user("u1", "demo@kt.com", &metadata, true);
        assert_eq!(profile.language, Language::Zh);
        assert_eq!(profile.week_start(), WeekStart::Monday);
        assert_eq!(profile.notification_method, Some(NotificationMethod::Api));
        assert!(profile.is_admin);
        assert_eq!(profile.phone, None);
        assert_eq!(profile.display_name(), "Demo User");
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let metadata = serde_json::json!({ "language": "pt" });
        let profile = UserProfile::from_auth_user("u1", "x@y.z", &metadata, false);
        assert_eq!(profile.language, Language::En);
        assert_eq!(profile.week_start(), WeekStart::Sunday);
    }

    #[test]
    fn test_update_merges_only_provided_fields() {
        let mut profile = UserProfile {
            id: "u1".into(),
            email: "a@b.c".into(),
            first_name: "Ann".into(),
            phone: Some("123".into()),
            ..Default::default()
        };
        let update = ProfileUpdate {
            first_name: Some("Anna".into()),
            language: Some(Language::De),
            ..Default::default()
        };
        update.apply_to(&mut profile);
        assert_eq!(profile.first_name, "Anna");
        assert_eq!(profile.language, Language::De);
        assert_eq!(profile.phone.as_deref(), Some("123"));
        assert_eq!(profile.email, "a@b.c");
    }

    #[test]
    fn test_metadata_has_only_provided_fields() {
        let update = ProfileUpdate {
            language: Some(Language::Zh),
            week_start: Some(WeekStart::Monday),
            ..Default::default()
        };
        let metadata = update.to_metadata();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["language"], "zh");
        assert_eq!(metadata["week_start"], "monday");
        assert!(ProfileUpdate::default().is_empty());
    }
}
