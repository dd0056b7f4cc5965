use crate::core::view::DiscountLevel;
use crate::utils::error::{GemsError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SESSION_PREFIX: &str = "real-estate-gems";

/// Environment variables consulted for the service credential, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Falls back to the environment when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub thinking_budget: u32,
    /// Ground answers with Google Search.
    #[serde(default = "default_true")]
    pub google_search: bool,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            temperature: default_temperature(),
            thinking_budget: 0,
            google_search: true,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Session file; an in-memory session is used when unset.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Percent: one of 10, 20, 30, 40, 50.
    #[serde(default)]
    pub default_discount: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_prefix() -> String {
    DEFAULT_SESSION_PREFIX.to_string()
}

fn default_output_path() -> String {
    "./output".to_string()
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| {
            GemsError::configuration(format!("TOML parsing error: {}", e))
        })
    }

    /// Replaces `${VAR}` placeholders with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| GemsError::configuration(format!("Invalid placeholder pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// The credential from the file, or else the first non-empty
    /// environment variable in [`API_KEY_ENV_VARS`].
    ///
    /// Unresolved `${VAR}` placeholders count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.gemini
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.starts_with("${"))
            .map(str::to_string)
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|name| std::env::var(name).ok())
                    .map(|v| v.trim().to_string())
                    .find(|v| !v.is_empty())
            })
    }

    pub fn default_discount(&self) -> Result<Option<DiscountLevel>> {
        self.view
            .default_discount
            .map(|pct| {
                DiscountLevel::from_percent(pct).ok_or_else(|| {
                    GemsError::validation(
                        "view.default_discount",
                        pct.to_string(),
                        "Value must be one of 10, 20, 30, 40, 50",
                    )
                })
            })
            .transpose()
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("gemini.endpoint", &self.gemini.endpoint)?;
        validate_non_empty_string("gemini.model", &self.gemini.model)?;
        validate_range("gemini.temperature", self.gemini.temperature, 0.0, 2.0)?;
        validate_positive_number("gemini.timeout_seconds", self.gemini.timeout_seconds, 1)?;
        validate_non_empty_string("session.prefix", &self.session.prefix)?;
        if let Some(file) = &self.session.file {
            validate_path("session.file", file)?;
        }
        validate_path("export.output_path", &self.export.output_path)?;
        self.default_discount()?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
