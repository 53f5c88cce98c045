// src/config/classifier.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

pub const ENV_CLASSIFIER_CONFIG_PATH: &str = "CLASSIFIER_CONFIG_PATH";
pub const ENV_HF_API_TOKEN: &str = "HF_API_TOKEN";

pub const DEFAULT_TIMEOUT_MS: u64 = 3000;
const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_MODEL: &str = "nlptown/bert-base-multilingual-uncased-sentiment";

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "huggingface" | "mock" | "disabled" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Full inference URL; derived from `model` when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from HF_API_TOKEN
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            endpoint: None,
            model: None,
            api_key: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClassifierConfig {
    /// Load from an explicit path. `.toml` is parsed as TOML, anything else
    /// as JSON with a TOML retry.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading classifier config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&data, &ext)
            .with_context(|| format!("parsing classifier config {}", path.display()))
    }

    /// Env var + fallbacks:
    /// 1) $CLASSIFIER_CONFIG_PATH
    /// 2) config/classifier.toml
    /// 3) config/classifier.json
    ///
    /// No file at all means the default (disabled) config.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CLASSIFIER_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CLASSIFIER_CONFIG_PATH} points to non-existent path");
            }
            return Self::load_from_file(&pb);
        }
        for candidate in ["config/classifier.toml", "config/classifier.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
        }
        Ok(Self::default())
    }

    pub fn parse(s: &str, hint_ext: &str) -> Result<Self> {
        let parsed: Self = if hint_ext == "toml" {
            toml::from_str(s)?
        } else {
            match serde_json::from_str(s) {
                Ok(c) => c,
                Err(json_err) => toml::from_str(s)
                    .map_err(|_| anyhow!("unsupported classifier config format: {json_err}"))?,
            }
        };
        parsed.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        self.provider = self.provider.trim().to_lowercase();
        if !matches!(self.provider.as_str(), "huggingface" | "mock" | "disabled") {
            bail!("unsupported classifier provider: {}", self.provider);
        }

        // only a live hosted provider needs the token
        let needs_key = self.enabled && self.provider == "huggingface";
        if needs_key && self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = env::var(ENV_HF_API_TOKEN)
                .map_err(|_| anyhow!("Missing {ENV_HF_API_TOKEN} env var"))?;
        }

        self.timeout_ms = self.timeout_ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS);
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.clone(),
            None => format!(
                "https://api-inference.huggingface.co/models/{}",
                self.model_name()
            ),
        }
    }
}
