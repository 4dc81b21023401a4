//! Configuration for voz
//!
//! Stored in .voz/config.toml. Secrets can come from the environment
//! instead of the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding `admin.password`
pub const ADMIN_PASSWORD_ENV: &str = "VOZ_ADMIN_PASSWORD";

/// Environment variable holding the SMTP password
pub const SMTP_PASSWORD_ENV: &str = "VOZ_SMTP_PASSWORD";

/// Environment variable overriding `api.port`
pub const API_PORT_ENV: &str = "VOZ_API_PORT";

/// voz configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Association name used in notification emails
    pub association: String,

    /// Ticket ID prefix (e.g., "VOZ")
    pub ticket_prefix: String,

    /// Number given to the first ticket
    pub first_ticket_number: u64,

    /// How many times a read-modify-write cycle is attempted when the
    /// sheet changes underneath it
    pub max_write_attempts: u32,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            association: "Residents' Association".to_string(),
            ticket_prefix: "VOZ".to_string(),
            first_ticket_number: 101,
            max_write_attempts: 3,
            sheets: SheetsConfig::default(),
            admin: AdminConfig::default(),
            mail: MailConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// Sheet names in the tabular store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub tickets: String,
    pub projects: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            tickets: "voz".to_string(),
            projects: "proyectos".to_string(),
        }
    }
}

/// Administrative access
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared password; administration is disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Outgoing mail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// SMTP relay host; notifications are only logged when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_host: Option<String>,

    /// SMTPS port
    pub smtp_port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_user: Option<String>,

    /// From address; defaults to `smtp_user`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,

    /// Never read from the file, only from VOZ_SMTP_PASSWORD
    #[serde(skip)]
    pub smtp_password: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 465,
            smtp_user: None,
            from_address: None,
            smtp_password: None,
        }
    }
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3848 }
    }
}

impl Config {
    /// Load config from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> crate::Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file only
    pub fn load_file(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`Config::load`])
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup(ADMIN_PASSWORD_ENV) {
            self.admin.password = Some(password);
        }
        if let Some(password) = lookup(SMTP_PASSWORD_ENV) {
            self.mail.smtp_password = Some(password);
        }
        if let Some(port) = lookup(API_PORT_ENV).and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }
    }

    /// Reject settings the stores cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.ticket_prefix.trim().is_empty() || self.ticket_prefix.contains('-') {
            return Err(crate::Error::Config(format!(
                "ticket_prefix must be non-empty and contain no '-', got '{}'",
                self.ticket_prefix
            )));
        }
        if self.max_write_attempts == 0 {
            return Err(crate::Error::Config(
                "max_write_attempts must be at least 1".to_string(),
            ));
        }
        if self.sheets.tickets == self.sheets.projects {
            return Err(crate::Error::Config(
                "tickets and projects must use different sheets".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# voz configuration

# Association name used in notification emails
association = "Residents' Association"

# Ticket ID prefix and the number given to the first ticket
ticket_prefix = "VOZ"
first_ticket_number = 101

# Attempts per read-modify-write cycle when the sheet changes underneath it
max_write_attempts = 3

[sheets]
tickets = "voz"
projects = "proyectos"

[admin]
# Shared administrator password (or set VOZ_ADMIN_PASSWORD).
# Administration is disabled while unset.
# password = "change-me"

[mail]
# SMTP relay over TLS. Notifications are only logged while smtp_host is unset.
# The password is read from VOZ_SMTP_PASSWORD.
# smtp_host = "smtp.gmail.com"
smtp_port = 465
# smtp_user = "association@example.com"
# from_address = "association@example.com"

[api]
port = 3848
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.ticket_prefix, "VOZ");
        assert_eq!(config.first_ticket_number, 101);
        assert_eq!(config.sheets.tickets, "voz");
        assert_eq!(config.mail.smtp_port, 465);
        assert!(config.admin.password.is_none());
    }

    #[test]
    fn test_commented_default_parses_to_default() {
        let parsed: Config = toml::from_str(&Config::default_with_comments()).unwrap();
        let default = Config::default();
        assert_eq!(parsed.ticket_prefix, default.ticket_prefix);
        assert_eq!(parsed.max_write_attempts, default.max_write_attempts);
        assert_eq!(parsed.sheets.projects, default.sheets.projects);
        assert_eq!(parsed.api.port, default.api.port);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let parsed: Config = toml::from_str(
            r#"
association = "Abelardo Yepes"
[admin]
password = "s3cret"
"#,
        )
        .unwrap();
        assert_eq!(parsed.association, "Abelardo Yepes");
        assert_eq!(parsed.admin.password.as_deref(), Some("s3cret"));
        assert_eq!(parsed.ticket_prefix, "VOZ");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            ADMIN_PASSWORD_ENV => Some("from-env".into()),
            SMTP_PASSWORD_ENV => Some("smtp".into()),
            API_PORT_ENV => Some("9000".into()),
            _ => None,
        });
        assert_eq!(config.admin.password.as_deref(), Some("from-env"));
        assert_eq!(config.mail.smtp_password.as_deref(), Some("smtp"));
        assert_eq!(config.api.port, 9000);
    }

    #[test]
    fn test_smtp_password_never_serialized() {
        let mut config = Config::default();
        config.mail.smtp_password = Some("hunter2".into());
        let content = toml::to_string_pretty(&config).unwrap();
        assert!(!content.contains("hunter2"));
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        let mut config = Config::default();
        config.ticket_prefix = "VOZ-X".into();
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }
}
