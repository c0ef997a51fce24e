use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Notion API token not set ([notion] token or NOTION_TOKEN)")]
    MissingToken,

    #[error("Notion database id not set ([notion] database_id or NOTION_DATABASE_ID)")]
    MissingDatabaseId,
}

/// Top-level configuration loaded from .notion-pr-sync.toml.
///
/// The tracking-database property schema is configuration, not a fixed
/// contract: deployed databases disagree on property names and on whether
/// the PR number and status are number/status-typed or text/select-typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Notion credentials
    #[serde(default)]
    pub notion: NotionConfig,

    /// Tracking-database property mapping
    #[serde(default)]
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotionConfig {
    /// Notion integration token. If None, falls back to NOTION_TOKEN env var.
    pub token: Option<String>,

    /// Tracking database id. If None, falls back to NOTION_DATABASE_ID env var.
    pub database_id: Option<String>,
}

/// Property names and value kinds of the tracking database.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Title property holding the PR title
    pub title: String,
    /// URL property linking back to GitHub
    pub url: String,
    /// Property holding the PR number (typed per `number_kind`)
    pub number: String,
    /// Rich-text property holding the PR author login
    pub author: String,
    /// Date property stamped when the record is created
    pub created: String,
    /// Property holding the record state (typed per `status_kind`)
    pub status: String,
    /// Relation property linking the record to referenced pages
    pub relation: String,
    /// Whether the PR number is a number or a rich-text property
    pub number_kind: NumberKind,
    /// Whether the status is a status or a select property
    pub status_kind: StatusKind,
    /// Status assigned on creation; never touched on update
    pub initial_status: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            title: "PR Title".to_string(),
            url: "GitHub URL".to_string(),
            number: "PR Number".to_string(),
            author: "Author".to_string(),
            created: "Created".to_string(),
            status: "Status".to_string(),
            relation: "Related Pages".to_string(),
            number_kind: NumberKind::Number,
            status_kind: StatusKind::Status,
            initial_status: "Open".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberKind {
    Number,
    RichText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    Status,
    Select,
}

/// Resolved credentials; both values are required before any network call.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub database_id: String,
}

impl Config {
    /// Load configuration from .notion-pr-sync.toml in the current directory.
    /// Returns default config if the file doesn't exist. Missing credentials
    /// fall back to the NOTION_TOKEN / NOTION_DATABASE_ID env vars.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".notion-pr-sync.toml");
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.notion.token.is_none() {
            if let Ok(token) = std::env::var("NOTION_TOKEN") {
                config.notion.token = Some(token);
            }
        }
        if config.notion.database_id.is_none() {
            if let Ok(database_id) = std::env::var("NOTION_DATABASE_ID") {
                config.notion.database_id = Some(database_id);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the credentials, failing fast when either is absent.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let token = self
            .notion
            .token
            .clone()
            .ok_or(ConfigError::MissingToken)?;
        let database_id = self
            .notion
            .database_id
            .clone()
            .ok_or(ConfigError::MissingDatabaseId)?;
        Ok(Credentials { token, database_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.notion.token.is_none());
        assert!(config.notion.database_id.is_none());
        assert_eq!(config.schema.title, "PR Title");
        assert_eq!(config.schema.number_kind, NumberKind::Number);
        assert_eq!(config.schema.status_kind, StatusKind::Status);
        assert_eq!(config.schema.initial_status, "Open");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[notion]
token = "secret_abc"
database_id = "db123"

[schema]
number = "PR"
number_kind = "rich-text"
status_kind = "select"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.notion.token.as_deref(), Some("secret_abc"));
        assert_eq!(config.schema.number, "PR");
        assert_eq!(config.schema.number_kind, NumberKind::RichText);
        assert_eq!(config.schema.status_kind, StatusKind::Select);
        // Unspecified schema fields keep their defaults
        assert_eq!(config.schema.title, "PR Title");
    }

    #[test]
    fn test_missing_credentials_are_fatal() {
        let config = Config::default();
        assert!(matches!(
            config.credentials(),
            Err(ConfigError::MissingToken)
        ));

        let config = Config {
            notion: NotionConfig {
                token: Some("secret_abc".to_string()),
                database_id: None,
            },
            ..Config::default()
        };
        assert!(matches!(
            config.credentials(),
            Err(ConfigError::MissingDatabaseId)
        ));
    }

    #[test]
    fn test_credentials_resolve_when_present() {
        let config = Config {
            notion: NotionConfig {
                token: Some("secret_abc".to_string()),
                database_id: Some("db123".to_string()),
            },
            ..Config::default()
        };
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.token, "secret_abc");
        assert_eq!(credentials.database_id, "db123");
    }
}
