use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

// ─── LLM ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini API key; the `GEMINI_API_KEY` env var takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used when a run requests deep research.
    #[serde(default = "default_deep_model")]
    pub deep_model: String,
    #[serde(default = "default_planner_model")]
    pub planner_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_deep_model() -> String {
    "gemini-2.5-pro".into()
}

fn default_planner_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    8192
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_model(),
            deep_model: default_deep_model(),
            planner_model: default_planner_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key, preferring the environment over config.toml.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

// ─── Web search ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Tavily API key; the `TAVILY_API_KEY` env var takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_search_base_url() -> String {
    "https://api.tavily.com".into()
}

fn default_max_results() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_base_url(),
            max_results: default_max_results(),
        }
    }
}

impl SearchConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("TAVILY_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

// ─── Scraper ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// HTML beyond this size is dropped before extraction.
    #[serde(default = "default_max_html_bytes")]
    pub max_html_bytes: usize,
}

fn default_scrape_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("shopscout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_html_bytes() -> usize {
    2_000_000
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_scrape_timeout(),
            user_agent: default_user_agent(),
            max_html_bytes: default_max_html_bytes(),
        }
    }
}

// ─── Gateway ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ─── Storage ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Report database path; defaults to `<workspace>/reports.db`.
    /// Supports `~` expansion.
    #[serde(default)]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn resolved_db_path(&self, workspace_dir: &Path) -> PathBuf {
        match &self.db_path {
            Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
            None => workspace_dir.join("reports.db"),
        }
    }
}

// ─── Loading ────────────────────────────────────────────────────────────────

impl Config {
    /// Load `~/.shopscout/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let workspace_dir = Self::default_workspace_dir()?;
        let config_path = workspace_dir.join("config.toml");
        Self::load_or_init_at(workspace_dir, config_path)
    }

    pub fn load_or_init_at(
        workspace_dir: PathBuf,
        config_path: PathBuf,
    ) -> Result<Self, ConfigError> {
        fs::create_dir_all(&workspace_dir)?;

        let mut config = if config_path.exists() {
            let raw = fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&raw)
                .map_err(|e| ConfigError::Load(format!("{}: {e}", config_path.display())))?
        } else {
            let config = Config::default();
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| ConfigError::Load(e.to_string()))?;
            fs::write(&config_path, rendered)?;
            config
        };

        config.workspace_dir = workspace_dir;
        config.config_path = config_path;
        config.validate()?;
        Ok(config)
    }

    fn default_workspace_dir() -> Result<PathBuf, ConfigError> {
        let user_dirs = UserDirs::new()
            .ok_or_else(|| ConfigError::Load("could not determine home directory".into()))?;
        Ok(user_dirs.home_dir().join(".shopscout"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::Validation(
                "search.max_results must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
