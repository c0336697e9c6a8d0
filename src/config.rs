//! Runtime settings: defaults, then an optional TOML file, then environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-latte.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root for metrics, plots and the summary cache.
    pub output_dir: PathBuf,
    /// Default ranking length.
    pub top_n: usize,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// OpenAI-compatible API root; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub seed: Option<u64>,
    pub max_attempts: u32,
    pub timeout_secs: u64,
    /// Summary cache file; defaults to `<output_dir>/metrics/summary_cache.json`.
    pub cache_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            top_n: crate::metrics::DEFAULT_TOP_N,
            llm: LlmSettings::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "groq/compound".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.0,
            seed: Some(42),
            max_attempts: 3,
            timeout_secs: 30,
            cache_path: None,
        }
    }
}

impl Settings {
    /// Load settings. An explicit path must exist; the default file is
    /// optional. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply `RUSTY_LATTE_*` overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("RUSTY_LATTE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RUSTY_LATTE_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("RUSTY_LATTE_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = lookup("RUSTY_LATTE_CACHE_PATH") {
            self.llm.cache_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("RUSTY_LATTE_TOP_N") {
            match v.parse() {
                Ok(n) => self.top_n = n,
                Err(_) => log::warn!("ignoring RUSTY_LATTE_TOP_N={v}: not a number"),
            }
        }
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.output_dir.join("metrics").join("metrics.json")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.output_dir.join("plots")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.llm
            .cache_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join("metrics").join("summary_cache.json"))
    }

    /// API key from the configured environment variable; blank counts as unset.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            top_n = 5

            [llm]
            model = "llama-3.1-8b-instant"
            "#,
        )
        .unwrap();
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.llm.model, "llama-3.1-8b-instant");
        assert_eq!(settings.llm.max_attempts, 3);
        assert_eq!(settings.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("RUSTY_LATTE_OUTPUT_DIR", "/tmp/out"),
            ("RUSTY_LATTE_MODEL", "other"),
            ("RUSTY_LATTE_TOP_N", "oops"),
        ]);
        let mut settings = Settings::default();
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.llm.model, "other");
        assert_eq!(settings.top_n, 10);
        assert_eq!(
            settings.metrics_path(),
            PathBuf::from("/tmp/out/metrics/metrics.json")
        );
    }

    #[test]
    fn bad_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rusty-latte.toml");
        std::fs::write(&path, "top_n = \"many\"").unwrap();
        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
