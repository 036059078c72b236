use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use article_atlas_core::trending::{TrendingParams, MAX_YEARS};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding article PDFs, addressed by `file_name`.
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            pdf_dir: default_pdf_dir(),
        }
    }
}

fn default_pdf_dir() -> PathBuf {
    PathBuf::from("./data/pdfs")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
    #[serde(default = "default_abstract_preview_chars")]
    pub abstract_preview_chars: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            abstract_preview_chars: default_abstract_preview_chars(),
        }
    }
}

fn default_page_size() -> i64 {
    10
}
fn default_max_page_size() -> i64 {
    100
}
fn default_abstract_preview_chars() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    #[serde(default = "default_trending_years")]
    pub trending_years: usize,
    #[serde(default = "default_min_citations")]
    pub min_citations: i64,
    #[serde(default = "default_min_percentile")]
    pub min_percentile: f64,
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
    #[serde(default = "default_random_limit")]
    pub random_limit: usize,
    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            trending_years: default_trending_years(),
            min_citations: default_min_citations(),
            min_percentile: default_min_percentile(),
            similar_limit: default_similar_limit(),
            random_limit: default_random_limit(),
            keyword_limit: default_keyword_limit(),
        }
    }
}

impl RankingConfig {
    pub fn trending_params(&self) -> TrendingParams {
        TrendingParams {
            years: self.trending_years,
            min_citations: self.min_citations,
            min_percentile: self.min_percentile,
        }
    }
}

fn default_trending_years() -> usize {
    3
}
fn default_min_citations() -> i64 {
    7
}
fn default_min_percentile() -> f64 {
    0.5
}
fn default_similar_limit() -> usize {
    3
}
fn default_random_limit() -> usize {
    10
}
fn default_keyword_limit() -> usize {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Upper bound on article text sent to the model.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            model: None,
            api_base: default_api_base(),
            max_context_chars: default_max_context_chars(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ChatConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_chat_provider() -> String {
    "disabled".to_string()
}
fn default_api_base() -> String {
    "https://api.openai.com".to_string()
}
fn default_max_context_chars() -> usize {
    12_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Defaults for commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/atlas.sqlite"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:8001".to_string(),
            },
            storage: StorageConfig::default(),
            listing: ListingConfig::default(),
            ranking: RankingConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Listing
    if config.listing.default_page_size < 1 {
        anyhow::bail!("listing.default_page_size must be >= 1");
    }
    if config.listing.max_page_size < config.listing.default_page_size {
        anyhow::bail!("listing.max_page_size must be >= listing.default_page_size");
    }

    // Ranking
    let r = &config.ranking;
    if r.trending_years == 0 || r.trending_years > MAX_YEARS {
        anyhow::bail!("ranking.trending_years must be in [1, {}]", MAX_YEARS);
    }
    if r.min_citations < 0 {
        anyhow::bail!("ranking.min_citations must be >= 0");
    }
    if !(0.0..=1.0).contains(&r.min_percentile) {
        anyhow::bail!("ranking.min_percentile must be in [0.0, 1.0]");
    }
    if r.similar_limit == 0 || r.random_limit == 0 || r.keyword_limit == 0 {
        anyhow::bail!("ranking limits must be >= 1");
    }

    // Chat
    match config.chat.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown chat provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.chat.is_enabled() && config.chat.model.is_none() {
        anyhow::bail!(
            "chat.model must be specified when provider is '{}'",
            config.chat.provider
        );
    }
    if config.chat.max_context_chars == 0 {
        anyhow::bail!("chat.max_context_chars must be > 0");
    }

    Ok(())
}
