//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RENDER__CHUNK_SIZE=50`). Provides helpers to expand `~` and `${VAR}`
//! and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::autocomplete::DEFAULT_SUGGESTION_LIMIT;
use crate::corpus::{IndexingConfig, DEFAULT_SHORT_TITLE_WIDTH};
use crate::error::Error;
use crate::types::QueryConfig;

/// Chunk size used by the incremental renderer unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSettings {
    /// Path of the `{"questions": [...]}` corpus file.
    pub data_json: String,
    pub short_title_width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteSettings {
    pub limit: usize,
    /// Input shorter than this only updates suggestions, it never searches.
    pub min_query_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub corpus: CorpusSettings,
    pub render: RenderSettings,
    pub autocomplete: AutocompleteSettings,
    pub query: QueryConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpus: CorpusSettings { data_json: "data.json".to_string(), short_title_width: DEFAULT_SHORT_TITLE_WIDTH },
            render: RenderSettings { chunk_size: DEFAULT_CHUNK_SIZE },
            autocomplete: AutocompleteSettings { limit: DEFAULT_SUGGESTION_LIMIT, min_query_len: 2 },
            query: QueryConfig::default(),
        }
    }
}

impl Settings {
    pub fn indexing(&self) -> IndexingConfig {
        IndexingConfig { short_title_width: self.corpus.short_title_width }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.render.chunk_size == 0 {
            return Err(Error::InvalidConfig("render.chunk_size must be positive".into()));
        }
        if self.corpus.short_title_width == 0 {
            return Err(Error::InvalidConfig("corpus.short_title_width must be positive".into()));
        }
        if self.query.boosts.is_empty() {
            return Err(Error::InvalidConfig("query.boosts must name at least one field".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Defaults only, ignoring files and environment.
    pub fn defaults() -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())) }
    }

    /// The full typed settings tree, validated.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
