//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! `RUST_ENV` selects the environment (dev by default). Nested keys are
//! addressed with `__` in env vars, e.g. `APP_DATA__QA_FILE`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::dataset::DEFAULT_OUTPUT_FILE;
use crate::error::{Error, Result};
use crate::normalize::DEFAULT_KEEP_CHARS;
use crate::resolver::PLACEHOLDER_CONTEXT;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub normalize: NormalizeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub qa_file: String,
    pub output_file: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { qa_file: "data/qa_data.json".to_string(), output_file: DEFAULT_OUTPUT_FILE.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Directory holding `config.json`, `tokenizer.json` and weights.
    /// Empty means: fall back to env vars and the default locations.
    pub dir: String,
    pub max_len: usize,
    /// `auto`, `cpu` or `metal`.
    pub device: String,
    pub use_fake: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self { dir: String::new(), max_len: 512, device: "auto".to_string(), use_fake: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub context: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { context: PLACEHOLDER_CONTEXT.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeSettings {
    pub keep_chars: String,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self { keep_chars: DEFAULT_KEEP_CHARS.to_string() }
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Load with config files looked up in `dir`.
    pub fn load_from(dir: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            other => tracing::warn!("Unknown RUST_ENV '{}', using base config only", other),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::Config(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::Config(format!("Failed to extract settings: {}", e)))
    }

    fn validate(&self) -> Result<()> {
        let settings = self.settings()?;
        if settings.model.max_len < 3 {
            return Err(Error::Config(format!(
                "model.max_len must leave room for [CLS] and two [SEP] tokens, got {}",
                settings.model.max_len
            )));
        }
        Ok(())
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
