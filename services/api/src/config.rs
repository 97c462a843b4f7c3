use sahayak_core::settings::{LanguageSettings, ModelRouting, OrchestratorSettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// The backend that turns prompts into text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
    /// A self-hosted model behind an OpenAI-compatible endpoint, such as Ollama.
    Local,
    /// Deterministic drafts without any network calls.
    Offline,
}

/// Model used for both tiers when a local provider has no explicit model names.
pub const DEFAULT_LOCAL_MODEL: &str = "gemma:7b";

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
            Provider::Local => "local",
            Provider::Offline => "offline",
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "gemini" => Ok(Provider::Gemini),
            "local" | "ollama" => Ok(Provider::Local),
            "offline" => Ok(Provider::Offline),
            other => Err(ConfigError::InvalidValue(
                "LLM_PROVIDER".to_string(),
                format!("'{}' is not one of openai, gemini, local, offline", other),
            )),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// OpenAI-compatible base URL overriding the provider default.
    pub llm_base_url: Option<String>,
    pub rich_model: String,
    pub light_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub generation_timeout: Duration,
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub log_level: Level,
    pub prompts_path: Option<PathBuf>,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(name, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("'{}': {}", raw, e)))
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address = parse_var::<SocketAddr>("BIND_ADDRESS", "0.0.0.0:3000")?;
        let provider = var_or("LLM_PROVIDER", "openai").parse::<Provider>()?;

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

        let llm_base_url = std::env::var("LLM_BASE_URL")
            .or_else(|_| std::env::var("LOCAL_MODEL_URL"))
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = &llm_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(
                    "LLM_BASE_URL".to_string(),
                    format!("'{}' is not an http(s) URL", url),
                ));
            }
        }

        let (rich_default, light_default) = match provider {
            Provider::Local => (DEFAULT_LOCAL_MODEL, DEFAULT_LOCAL_MODEL),
            _ => ("gpt-4o", "gpt-4o-mini"),
        };
        let rich_model = var_or("RICH_MODEL", rich_default);
        let light_model = var_or("LIGHT_MODEL", light_default);
        let max_tokens = parse_var::<u32>("MAX_TOKENS", "2048")?;
        let temperature = parse_var::<f32>("TEMPERATURE", "0.7")?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue(
                "TEMPERATURE".to_string(),
                format!("{} is outside 0.0..=2.0", temperature),
            ));
        }
        let generation_timeout =
            Duration::from_secs(parse_var::<u64>("GENERATION_TIMEOUT_SECS", "60")?);

        let default_language = var_or("DEFAULT_LANGUAGE", "en").trim().to_lowercase();
        let supported_languages: Vec<String> = var_or("SUPPORTED_LANGUAGES", "en,hi,te")
            .split(',')
            .map(|code| code.trim().to_lowercase())
            .filter(|code| !code.is_empty())
            .collect();
        if !supported_languages.contains(&default_language) {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_LANGUAGE".to_string(),
                format!("'{}' is not in SUPPORTED_LANGUAGES", default_language),
            ));
        }

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);

        match provider {
            Provider::OpenAI if openai_api_key.is_none() => {
                return Err(ConfigError::MissingVar(
                    "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
                ));
            }
            Provider::Gemini if gemini_api_key.is_none() => {
                return Err(ConfigError::MissingVar(
                    "GEMINI_API_KEY must be set for 'gemini' provider".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            bind_address,
            provider,
            openai_api_key,
            gemini_api_key,
            llm_base_url,
            rich_model,
            light_model,
            max_tokens,
            temperature,
            generation_timeout,
            default_language,
            supported_languages,
            log_level,
            prompts_path,
        })
    }

    /// The orchestrator settings described by this configuration.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            models: ModelRouting {
                rich_model: self.rich_model.clone(),
                light_model: self.light_model.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            },
            languages: LanguageSettings {
                default_language: self.default_language.clone(),
                supported_languages: self.supported_languages.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    const VARS: [&str; 15] = [
        "BIND_ADDRESS",
        "LLM_PROVIDER",
        "OPENAI_API_KEY",
        "GEMINI_API_KEY",
        "LLM_BASE_URL",
        "LOCAL_MODEL_URL",
        "RICH_MODEL",
        "LIGHT_MODEL",
        "MAX_TOKENS",
        "TEMPERATURE",
        "GENERATION_TIMEOUT_SECS",
        "DEFAULT_LANGUAGE",
        "SUPPORTED_LANGUAGES",
        "RUST_LOG",
        "PROMPTS_PATH",
    ];

    fn clear_env_vars() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    fn set_minimal_env_openai() {
        unsafe {
            env::set_var("LLM_PROVIDER", "openai");
            env::set_var("OPENAI_API_KEY", "test-openai-key");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!(" gemini ".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("offline".parse::<Provider>().unwrap(), Provider::Offline);
        assert_eq!("Local".parse::<Provider>().unwrap(), Provider::Local);
        assert_eq!("ollama".parse::<Provider>().unwrap(), Provider::Local);
        assert_eq!(Provider::Local.as_str(), "local");
        assert!("anthropic".parse::<Provider>().is_err());
        assert_eq!(Provider::Gemini.as_str(), "gemini");
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal_openai() {
        clear_env_vars();
        set_minimal_env_openai();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.openai_api_key, Some("test-openai-key".to_string()));
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.llm_base_url, None);
        assert_eq!(config.rich_model, "gpt-4o");
        assert_eq!(config.light_model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert_eq!(config.default_language, "en");
        assert_eq!(config.supported_languages, vec!["en", "hi", "te"]);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.prompts_path, None);
    }

    #[test]
    #[serial]
    fn test_config_from_env_gemini_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "gemini");
            env::set_var("GEMINI_API_KEY", "test-gemini-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.gemini_api_key, Some("test-gemini-key".to_string()));
        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    #[serial]
    fn test_config_offline_needs_no_keys() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "offline");
        }

        let config = Config::from_env().expect("Config should load successfully");
        assert_eq!(config.provider, Provider::Offline);
    }

    #[test]
    #[serial]
    fn test_config_local_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "local");
        }

        let config = Config::from_env().expect("Config should load successfully");
        assert_eq!(config.provider, Provider::Local);
        assert_eq!(config.llm_base_url, None);
        assert_eq!(config.rich_model, DEFAULT_LOCAL_MODEL);
        assert_eq!(config.light_model, DEFAULT_LOCAL_MODEL);

        unsafe {
            env::set_var("LOCAL_MODEL_URL", "http://gpu-box:11434/v1");
            env::set_var("LIGHT_MODEL", "llama3.2");
        }
        let config = Config::from_env().expect("Config should load successfully");
        assert_eq!(config.llm_base_url.as_deref(), Some("http://gpu-box:11434/v1"));
        assert_eq!(config.rich_model, DEFAULT_LOCAL_MODEL);
        assert_eq!(config.light_model, "llama3.2");
    }

    #[test]
    #[serial]
    fn test_config_base_url_precedence_and_format() {
        clear_env_vars();
        set_minimal_env_openai();
        unsafe {
            env::set_var("LOCAL_MODEL_URL", "http://localhost:11434/v1");
            env::set_var("LLM_BASE_URL", " https://proxy.example.org/v1 ");
        }

        let config = Config::from_env().expect("Config should load successfully");
        assert_eq!(config.llm_base_url.as_deref(), Some("https://proxy.example.org/v1"));
        assert_eq!(config.rich_model, "gpt-4o");

        unsafe {
            env::set_var("LLM_BASE_URL", "localhost:11434");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "LLM_BASE_URL"),
            _ => panic!("Expected InvalidValue for LLM_BASE_URL"),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        set_minimal_env_openai();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("RICH_MODEL", "gpt-4.1");
            env::set_var("LIGHT_MODEL", "gpt-4.1-mini");
            env::set_var("MAX_TOKENS", "1024");
            env::set_var("TEMPERATURE", "0.2");
            env::set_var("GENERATION_TIMEOUT_SECS", "15");
            env::set_var("DEFAULT_LANGUAGE", "HI");
            env::set_var("SUPPORTED_LANGUAGES", "en, hi ,ta,");
            env::set_var("RUST_LOG", "debug");
            env::set_var("PROMPTS_PATH", "/custom/prompts");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.generation_timeout, Duration::from_secs(15));
        assert_eq!(config.default_language, "hi");
        assert_eq!(config.supported_languages, vec!["en", "hi", "ta"]);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.prompts_path, Some(PathBuf::from("/custom/prompts")));

        let settings = config.orchestrator_settings();
        assert_eq!(settings.models.rich_model, "gpt-4.1");
        assert_eq!(settings.models.light_model, "gpt-4.1-mini");
        assert_eq!(settings.models.temperature, 0.2);
        assert_eq!(settings.languages.default_language, "hi");
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        set_minimal_env_openai();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_numbers() {
        clear_env_vars();
        set_minimal_env_openai();
        unsafe {
            env::set_var("MAX_TOKENS", "lots");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "MAX_TOKENS"),
            _ => panic!("Expected InvalidValue for MAX_TOKENS"),
        }

        unsafe {
            env::remove_var("MAX_TOKENS");
            env::set_var("TEMPERATURE", "3.5");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "TEMPERATURE"),
            _ => panic!("Expected InvalidValue for TEMPERATURE"),
        }
    }

    #[test]
    #[serial]
    fn test_config_default_language_must_be_supported() {
        clear_env_vars();
        set_minimal_env_openai();
        unsafe {
            env::set_var("DEFAULT_LANGUAGE", "fr");
        }

        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "DEFAULT_LANGUAGE"),
            _ => panic!("Expected InvalidValue for DEFAULT_LANGUAGE"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "carrier-pigeon");
        }

        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "LLM_PROVIDER"),
            _ => panic!("Expected InvalidValue for LLM_PROVIDER"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        set_minimal_env_openai();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_openai_key() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "openai");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => {
                assert!(msg.contains("OPENAI_API_KEY"));
            }
            _ => panic!("Expected MissingVar for OPENAI_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_gemini_key() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "gemini");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => {
                assert!(msg.contains("GEMINI_API_KEY"));
            }
            _ => panic!("Expected MissingVar for GEMINI_API_KEY"),
        }
    }
}
