use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variables that override the backend section of the config file.
pub const ENV_BACKEND_URL: &str = "SUPABASE_URL";
pub const ENV_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Hosted backend (auth, relational store, object store)
    #[serde(default)]
    pub backend: BackendConfig,

    /// Calendar defaults
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`
    pub url: Option<String>,

    /// Public (anon) API key
    pub anon_key: Option<String>,

    /// Privileged key used for admin-level profile updates.
    ///
    /// Optional. Without it, profile updates go through the signed-in user's
    /// own session.
    pub service_role_key: Option<String>,

    /// Object storage bucket for uploads
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,

    /// Folder inside the bucket for profile pictures
    #[serde(default = "default_avatars_folder")]
    pub avatars_folder: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_storage_bucket() -> String {
    "meetsupas".to_string()
}

fn default_avatars_folder() -> String {
    "avatars".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            service_role_key: None,
            storage_bucket: default_storage_bucket(),
            avatars_folder: default_avatars_folder(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    /// Check if both URL and API key are present (not placeholders).
    ///
    /// When this is false the application runs in local-only mode.
    pub fn is_configured(&self) -> bool {
        fn present(value: &Option<String>) -> bool {
            value
                .as_deref()
                .map(|v| !v.trim().is_empty() && !v.starts_with("YOUR_"))
                .unwrap_or(false)
        }
        present(&self.url) && present(&self.anon_key)
    }

    /// True when a privileged key is available for admin updates.
    pub fn has_service_role(&self) -> bool {
        self.service_role_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Number of days covered by the agenda view
    #[serde(default = "default_agenda_days")]
    pub agenda_days: u32,

    /// Hour used when creating an event from a day cell
    #[serde(default = "default_start_hour")]
    pub default_start_hour: u32,

    /// Length of a newly created event
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
}

fn default_agenda_days() -> u32 {
    30
}

fn default_start_hour() -> u32 {
    9
}

fn default_duration_minutes() -> u32 {
    60
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            agenda_days: default_agenda_days(),
            default_start_hour: default_start_hour(),
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("workdesk");

        Self {
            config_dir,
            backend: BackendConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit path, creating a default file if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Overlay backend settings from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup(ENV_ANON_KEY) {
            self.backend.anon_key = Some(key);
        }
        if let Some(key) = lookup(ENV_SERVICE_ROLE_KEY) {
            self.backend.service_role_key = Some(key);
        }
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        let has_url = self.backend.url.as_deref().is_some_and(|u| !u.is_empty());
        let has_key = self
            .backend
            .anon_key
            .as_deref()
            .is_some_and(|k| !k.is_empty());

        match (has_url, has_key) {
            (true, true) => {
                if let Some(url) = &self.backend.url {
                    self.validate_url(url, "backend.url", &mut result);
                }
            }
            (true, false) => {
                result.add_error("backend.anon_key", "API key is required when a backend URL is set")
            }
            (false, true) => {
                result.add_error("backend.url", "Backend URL is required when an API key is set")
            }
            (false, false) => result.add_warning(
                "backend",
                "Backend not configured - running in local-only mode",
            ),
        }

        if self.backend.request_timeout_secs == 0 {
            result.add_error("backend.request_timeout_secs", "Timeout must be greater than 0");
        }

        if self.calendar.agenda_days == 0 {
            result.add_error("calendar.agenda_days", "Agenda window must be at least one day");
        } else if self.calendar.agenda_days > 366 {
            result.add_warning("calendar.agenda_days", "Agenda window is longer than a year");
        }

        if self.calendar.default_start_hour > 23 {
            result.add_error("calendar.default_start_hour", "Hour must be between 0 and 23");
        }

        if self.calendar.default_duration_minutes == 0 {
            result.add_error(
                "calendar.default_duration_minutes",
                "Event duration must be greater than 0",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Directory holding the cached session and profile
    pub fn session_dir(&self) -> PathBuf {
        self.config_dir.join("session")
    }

    /// SQLite file backing the local-only user directory
    pub fn local_users_path(&self) -> PathBuf {
        self.config_dir.join("local_users.db")
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("workdesk");

        Ok(config_dir.join("config.toml"))
    }
}
