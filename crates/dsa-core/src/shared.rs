//! Shared types used across the DSA crates.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The four organization-wide questions asked once per actor.
pub const DEFAULT_GENERAL_QUESTIONS: [&str; 4] = [
    "What’s the name of your organization?",
    "What’s the name of your design system?",
    "How big is your overall product organization (designers, developers, etc.)?",
    "How long has your design system existed?",
];

/// Separates entries of `DSA_GENERAL_QUESTIONS`.
pub const GENERAL_QUESTION_SEPARATOR: char = '|';

/// Award categories whose generated documents include the general answers.
pub const DEFAULT_GENERAL_CATEGORIES: [&str; 6] = [
    "best-documentation",
    "best-accessibility",
    "best-governance",
    "best-collaboration",
    "best-adoption",
    "award-for-innovation",
];

/// Who an answer belongs to.
///
/// Caller-supplied ids (`userId`) and server-issued ids (`sessionId`) share one
/// flat namespace per variant and are persisted in separate trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ActorIdentity {
    /// Opaque id chosen by the caller.
    External(String),
    /// Id issued by `POST /session`.
    Generated(String),
}

impl ActorIdentity {
    /// Builds an identity from the optional `userId` / `sessionId` request fields.
    /// Returns `None` unless exactly one non-empty id is given.
    pub fn from_parts(user_id: Option<String>, session_id: Option<String>) -> Option<Self> {
        let user_id = user_id.filter(|s| !s.trim().is_empty());
        let session_id = session_id.filter(|s| !s.trim().is_empty());
        match (user_id, session_id) {
            (Some(u), None) => Some(Self::External(u)),
            (None, Some(s)) => Some(Self::Generated(s)),
            _ => None,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        match self {
            Self::External(id) | Self::Generated(id) => id,
        }
    }
}

/// Global application configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Name printed in logs and `/api/v1/status`.
    pub app_name: String,
    /// Interface the gateway binds to.
    pub bind_address: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Directory holding the sled database.
    pub storage_path: String,
    /// JSON file with the category → questions mapping.
    pub questions_path: String,
    /// Static OpenAPI document served at `/openapi.yaml`.
    pub openapi_path: String,
    #[serde(default = "default_general_questions")]
    pub general_questions: Vec<String>,
    /// Categories for which `needs-general` is true.
    #[serde(default = "default_general_categories")]
    pub general_categories: Vec<String>,
}

fn default_general_questions() -> Vec<String> {
    DEFAULT_GENERAL_QUESTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_general_categories() -> Vec<String> {
    DEFAULT_GENERAL_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "DSA API".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            storage_path: "./data".to_string(),
            questions_path: "./questions.json".to_string(),
            openapi_path: "./openapi.yaml".to_string(),
            general_questions: default_general_questions(),
            general_categories: default_general_categories(),
        }
    }
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `DSA_*` > config file
    /// (`DSA_CONFIG` path, else `config/gateway.toml`) > defaults.
    ///
    /// `DSA_GENERAL_CATEGORIES` is comma-separated. `DSA_GENERAL_QUESTIONS` is
    /// separated by `|`, since questions themselves contain commas.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(None)
    }

    /// Like [`CoreConfig::load`], reading variables from `vars` instead of the process
    /// environment when given.
    pub fn load_with(vars: Option<config::Map<String, String>>) -> Result<Self, config::ConfigError> {
        let env_var = |key: &str| match &vars {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        let config_path = env_var("DSA_CONFIG").unwrap_or_else(|| "config/gateway.toml".to_string());
        let question_override = env_var("DSA_GENERAL_QUESTIONS").map(|raw| {
            raw.split(GENERAL_QUESTION_SEPARATOR)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("storage_path", defaults.storage_path)?
            .set_default("questions_path", defaults.questions_path)?
            .set_default("openapi_path", defaults.openapi_path)?
            .set_default("general_questions", defaults.general_questions)?
            .set_default("general_categories", defaults.general_categories)?
            .set_override_option("general_questions", question_override)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("DSA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("general_categories")
                    .source(vars.clone()),
            )
            .build()?;

        built.try_deserialize()
    }

    /// Path of the sled database inside `storage_path`.
    pub fn store_path(&self) -> std::path::PathBuf {
        Path::new(&self.storage_path).join("dsa_answers")
    }
}
