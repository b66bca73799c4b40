//! Configuration and generator factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizalign_core::align::AlignmentPolicy;
use quizalign_core::engine::EngineConfig;
use quizalign_core::ontology::KeywordBank;
use quizalign_core::traits::QuestionGenerator;

use crate::openai::OpenAiGenerator;
use crate::template::TemplateGenerator;

/// Name of the built-in offline generator.
pub const TEMPLATE_PROVIDER: &str = "template";

/// Configuration for a single generator backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Template,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            ProviderConfig::Template => f.debug_struct("Template").finish(),
        }
    }
}

/// Top-level quizalign configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizalignConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is named on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Upper bound on a single generation call, in seconds.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
    /// Attempts per request (at most 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Keyword bank to load instead of the built-in one.
    #[serde(default)]
    pub keyword_bank: Option<PathBuf>,
    /// Where reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Coverage and acceptance thresholds.
    #[serde(default)]
    pub alignment: AlignmentPolicy,
}

fn default_provider() -> String {
    TEMPLATE_PROVIDER.to_string()
}
fn default_attempt_timeout() -> u64 {
    60
}
fn default_max_attempts() -> u32 {
    3
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizalign-reports")
}

impl Default for QuizalignConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            attempt_timeout_secs: default_attempt_timeout(),
            max_attempts: default_max_attempts(),
            keyword_bank: None,
            output_dir: default_output_dir(),
            alignment: AlignmentPolicy::default(),
        }
    }
}

impl QuizalignConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_attempts: self.max_attempts,
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            policy: self.alignment,
        }
    }

    /// Load the configured keyword bank, or the built-in one.
    pub fn load_keyword_bank(&self) -> Result<KeywordBank> {
        match &self.keyword_bank {
            Some(path) => KeywordBank::load(path),
            None => KeywordBank::builtin(),
        }
    }

    /// Build the named generator, or the default one.
    ///
    /// `template` is always available, even when not configured.
    pub fn generator(
        &self,
        name: Option<&str>,
        bank: Arc<KeywordBank>,
    ) -> Result<Arc<dyn QuestionGenerator>> {
        let name = name.unwrap_or(&self.default_provider);
        match self.providers.get(name) {
            Some(config) => create_generator(name, config, bank),
            None if name == TEMPLATE_PROVIDER => {
                create_generator(name, &ProviderConfig::Template, bank)
            }
            None => anyhow::bail!("provider '{name}' is not configured"),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.as_ref().map(|m| resolve_env_vars(m)),
        },
        ProviderConfig::Template => ProviderConfig::Template,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizalign.toml` in the current directory
/// 2. `~/.config/quizalign/config.toml`
///
/// Environment variable override: `QUIZALIGN_OPENAI_KEY`.
pub fn load_config() -> Result<QuizalignConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizalignConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizalign.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizalignConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizalignConfig::default(),
    };

    if let Ok(key) = std::env::var("QUIZALIGN_OPENAI_KEY") {
        config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(ProviderConfig::OpenAI { api_key, .. }) = config.providers.get_mut("openai") {
            *api_key = key;
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizalign"))
}

/// Create a generator instance from its configuration.
pub fn create_generator(
    name: &str,
    config: &ProviderConfig,
    bank: Arc<KeywordBank>,
) -> Result<Arc<dyn QuestionGenerator>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => {
            if api_key.trim().is_empty() {
                anyhow::bail!("provider '{name}' has no API key (set QUIZALIGN_OPENAI_KEY)");
            }
            Ok(Arc::new(OpenAiGenerator::new(
                api_key,
                base_url.clone(),
                model.clone(),
            )))
        }
        ProviderConfig::Template => Ok(Arc::new(TemplateGenerator::new(bank))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Arc<KeywordBank> {
        Arc::new(KeywordBank::builtin().unwrap())
    }

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZALIGN_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZALIGN_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZALIGN_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZALIGN_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizalignConfig::default();
        assert_eq!(config.default_provider, "template");
        assert_eq!(config.attempt_timeout_secs, 60);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.alignment.min_item_coverage, 0.65);
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "openai"
attempt_timeout_secs = 30

[providers.openai]
type = "openai"
api_key = "sk-openai"
model = "gpt-4.1"

[providers.offline]
type = "template"

[alignment]
min_avg_coverage = 0.7
"#;
        let config: QuizalignConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { .. })
        ));
        assert_eq!(config.alignment.min_avg_coverage, 0.7);
        assert_eq!(config.alignment.min_item_coverage, 0.65);
        assert_eq!(config.engine_config().attempt_timeout, Duration::from_secs(30));
    }

    #[test]
    fn debug_masks_api_key() {
        let config = ProviderConfig::OpenAI {
            api_key: "sk-secret".into(),
            base_url: None,
            model: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizalign.toml");
        std::fs::write(&path, "max_attempts = 2\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.default_provider, "template");
    }

    #[test]
    fn missing_explicit_path_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizalign.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn template_is_always_available() {
        let config = QuizalignConfig::default();
        let generator = config.generator(None, bank()).unwrap();
        assert_eq!(generator.name(), "template");
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let config = QuizalignConfig::default();
        let err = config.generator(Some("anthropic"), bank()).err().unwrap();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn openai_without_key_is_rejected() {
        let config = ProviderConfig::OpenAI {
            api_key: String::new(),
            base_url: None,
            model: None,
        };
        assert!(create_generator("openai", &config, bank()).is_err());
    }

    #[test]
    fn custom_keyword_bank_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.toml");
        std::fs::write(
            &path,
            "stopwords = [\"il\"]\n\n[subjects.geografia]\nbase = [\"fiume\"]\n",
        )
        .unwrap();
        let config = QuizalignConfig {
            keyword_bank: Some(path),
            ..QuizalignConfig::default()
        };
        let bank = config.load_keyword_bank().unwrap();
        assert!(bank.subject("Geografia").is_some());
    }
}
