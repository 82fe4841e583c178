//! Application configuration for pagesync.
//!
//! User config lives at `~/.pagesync/pagesync.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets never live in the file: it only names the env vars holding them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PageSyncError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pagesync.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pagesync";

// ---------------------------------------------------------------------------
// Config structs (matching pagesync.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where exported markdown lands.
    #[serde(default)]
    pub output: OutputSection,

    /// Workspace (Notion) API settings.
    #[serde(default)]
    pub notion: NotionSection,

    /// Assistant (OpenAI) API settings.
    #[serde(default)]
    pub assistant: AssistantSection,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Directory that receives one `.md` file per document.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "notion-pages".into()
}

/// `[notion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionSection {
    /// Name of the env var holding the integration token.
    #[serde(default = "default_notion_token_env")]
    pub token_env: String,

    /// API origin.
    #[serde(default = "default_notion_api_base")]
    pub api_base: String,

    /// Value sent in the `Notion-Version` header.
    #[serde(default = "default_notion_api_version")]
    pub api_version: String,
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            token_env: default_notion_token_env(),
            api_base: default_notion_api_base(),
            api_version: default_notion_api_version(),
        }
    }
}

fn default_notion_token_env() -> String {
    "NOTION_TOKEN".into()
}
fn default_notion_api_base() -> String {
    "https://api.notion.com".into()
}
fn default_notion_api_version() -> String {
    "2022-06-28".into()
}

/// `[assistant]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSection {
    /// Name of the env var holding the API key.
    #[serde(default = "default_assistant_key_env")]
    pub api_key_env: String,

    /// API origin.
    #[serde(default = "default_assistant_api_base")]
    pub api_base: String,

    /// Value sent in the `OpenAI-Beta` header on assistant endpoints.
    #[serde(default = "default_beta_header")]
    pub beta_header: String,

    /// Existing assistant to reuse. A new one is created when unset or not found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,

    /// Name given to a newly created assistant.
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Model given to a newly created assistant.
    #[serde(default = "default_assistant_model")]
    pub model: String,

    /// Instructions given to a newly created assistant.
    #[serde(default = "default_assistant_instructions")]
    pub instructions: String,

    /// Delete every uploaded file before a sync.
    #[serde(default = "default_true")]
    pub purge_before_sync: bool,
}

impl Default for AssistantSection {
    fn default() -> Self {
        Self {
            api_key_env: default_assistant_key_env(),
            api_base: default_assistant_api_base(),
            beta_header: default_beta_header(),
            assistant_id: None,
            name: default_assistant_name(),
            model: default_assistant_model(),
            instructions: default_assistant_instructions(),
            purge_before_sync: true,
        }
    }
}

fn default_assistant_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_assistant_api_base() -> String {
    "https://api.openai.com".into()
}
fn default_beta_header() -> String {
    "assistants=v1".into()
}
fn default_assistant_name() -> String {
    "broski".into()
}
fn default_assistant_model() -> String {
    "gpt-4-1106-preview".into()
}
fn default_assistant_instructions() -> String {
    "you are a simple chat bot that can access my notion pages and respond to questions about them"
        .into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Runtime configs (resolved from file config + environment)
// ---------------------------------------------------------------------------

/// Resolved settings for the workspace API client.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token.
    pub token: String,
    /// API origin, e.g. `https://api.notion.com`.
    pub api_base: Url,
    /// `Notion-Version` header value.
    pub api_version: String,
}

impl NotionConfig {
    /// Build from a config section and an already-resolved token.
    pub fn from_section(section: &NotionSection, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            token: token.into(),
            api_base: parse_api_base(&section.api_base)?,
            api_version: section.api_version.clone(),
        })
    }

    /// Resolve from the app config, reading the token from the environment.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        let token = resolve_secret(&config.notion.token_env)?;
        Self::from_section(&config.notion, token)
    }
}

/// Resolved settings for the assistant API client.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// API key.
    pub api_key: String,
    /// API origin, e.g. `https://api.openai.com`.
    pub api_base: Url,
    /// `OpenAI-Beta` header value.
    pub beta_header: String,
    /// Assistant to reuse, if any.
    pub assistant_id: Option<String>,
    /// Name for a newly created assistant.
    pub name: String,
    /// Model for a newly created assistant.
    pub model: String,
    /// Instructions for a newly created assistant.
    pub instructions: String,
    /// Delete every uploaded file before a sync.
    pub purge_before_sync: bool,
}

impl AssistantConfig {
    /// Build from a config section and an already-resolved API key.
    pub fn from_section(section: &AssistantSection, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            api_base: parse_api_base(&section.api_base)?,
            beta_header: section.beta_header.clone(),
            assistant_id: section.assistant_id.clone(),
            name: section.name.clone(),
            model: section.model.clone(),
            instructions: section.instructions.clone(),
            purge_before_sync: section.purge_before_sync,
        })
    }

    /// Resolve from the app config, reading the API key from the environment.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        let api_key = resolve_secret(&config.assistant.api_key_env)?;
        Self::from_section(&config.assistant, api_key)
    }
}

fn parse_api_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| PageSyncError::config(format!("invalid api_base '{raw}': {e}")))
}

/// Read a secret from the named env var. Empty values count as missing.
pub fn resolve_secret(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PageSyncError::config(format!(
            "secret not found. Set the {var_name} environment variable."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pagesync/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| PageSyncError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pagesync/pagesync.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PageSyncError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PageSyncError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PageSyncError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PageSyncError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PageSyncError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("notion-pages"));
        assert!(toml_str.contains("NOTION_TOKEN"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(!toml_str.contains("assistant_id"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[output]
dir = "/tmp/pages"

[assistant]
assistant_id = "asst_123"
purge_before_sync = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.output.dir, "/tmp/pages");
        assert_eq!(config.notion.api_version, "2022-06-28");
        assert_eq!(config.assistant.assistant_id.as_deref(), Some("asst_123"));
        assert!(!config.assistant.purge_before_sync);
        assert_eq!(config.assistant.model, "gpt-4-1106-preview");
    }

    #[test]
    fn notion_config_from_section() {
        let section = NotionSection::default();
        let resolved = NotionConfig::from_section(&section, "secret_abc").expect("resolve");
        assert_eq!(resolved.token, "secret_abc");
        assert_eq!(resolved.api_base.host_str(), Some("api.notion.com"));
    }

    #[test]
    fn invalid_api_base_is_config_error() {
        let section = AssistantSection {
            api_base: "not a url".into(),
            ..AssistantSection::default()
        };
        let err = AssistantConfig::from_section(&section, "sk-test").unwrap_err();
        assert!(matches!(err, PageSyncError::Config { .. }));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn missing_secret_is_reported() {
        let mut config = AppConfig::default();
        // Unique env var name so other tests are unaffected
        config.notion.token_env = "PS_TEST_NONEXISTENT_TOKEN_12345".into();
        let err = NotionConfig::resolve(&config).unwrap_err();
        assert!(err.to_string().contains("PS_TEST_NONEXISTENT_TOKEN_12345"));
    }
}
