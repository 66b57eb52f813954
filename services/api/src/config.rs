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

/// Defines the supported text-generation providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    /// The OpenAI-compatible base URL of the provider.
    pub fn api_base(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1/",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o",
            Provider::Gemini => "gemini-2.5-flash",
        }
    }
}

/// Which intent classifier the service routes with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifierKind {
    Keyword,
    Llm,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub api_key: String,
    pub chat_model: String,
    pub temperature: f32,
    pub firecrawl_api_key: Option<String>,
    pub classifier: ClassifierKind,
    pub context_turns: usize,
    pub max_tool_calls: usize,
    pub responder_timeout: Duration,
    pub log_level: Level,
    pub prompts_path: PathBuf,
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "gemini" => Provider::Gemini,
            "openai" => Provider::OpenAI,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LLM_PROVIDER".to_string(),
                    format!("'{}' is not one of 'openai', 'gemini'", other),
                ));
            }
        };

        let api_key = match provider {
            Provider::OpenAI => std::env::var("OPENAI_API_KEY").map_err(|_| {
                ConfigError::MissingVar("OPENAI_API_KEY must be set for 'openai' provider".to_string())
            })?,
            Provider::Gemini => std::env::var("GEMINI_API_KEY").map_err(|_| {
                ConfigError::MissingVar("GEMINI_API_KEY must be set for 'gemini' provider".to_string())
            })?,
        };

        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| provider.default_model().to_string());

        let temperature = parse_var("TEMPERATURE", 0.7f32)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue(
                "TEMPERATURE".to_string(),
                format!("{} is outside 0.0..=2.0", temperature),
            ));
        }

        let firecrawl_api_key = std::env::var("FIRECRAWL_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let classifier_str = std::env::var("CLASSIFIER").unwrap_or_else(|_| "keyword".to_string());
        let classifier = match classifier_str.to_lowercase().as_str() {
            "keyword" => ClassifierKind::Keyword,
            "llm" => ClassifierKind::Llm,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CLASSIFIER".to_string(),
                    format!("'{}' is not one of 'keyword', 'llm'", other),
                ));
            }
        };

        let context_turns = parse_var("CONTEXT_TURNS", 10usize)?;
        if context_turns == 0 {
            return Err(ConfigError::InvalidValue(
                "CONTEXT_TURNS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let max_tool_calls = parse_var("MAX_TOOL_CALLS", 3usize)?;
        let responder_timeout = Duration::from_secs(parse_var("RESPONDER_TIMEOUT_SECS", 120u64)?);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./prompts"));

        Ok(Self {
            bind_address,
            provider,
            api_key,
            chat_model,
            temperature,
            firecrawl_api_key,
            classifier,
            context_turns,
            max_tool_calls,
            responder_timeout,
            log_level,
            prompts_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("LLM_PROVIDER");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("GEMINI_API_KEY");
            env::remove_var("CHAT_MODEL");
            env::remove_var("TEMPERATURE");
            env::remove_var("FIRECRAWL_API_KEY");
            env::remove_var("CLASSIFIER");
            env::remove_var("CONTEXT_TURNS");
            env::remove_var("MAX_TOOL_CALLS");
            env::remove_var("RESPONDER_TIMEOUT_SECS");
            env::remove_var("RUST_LOG");
            env::remove_var("PROMPTS_PATH");
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
    #[serial]
    fn test_config_from_env_minimal_gemini() {
        clear_env_vars();
        unsafe {
            env::set_var("GEMINI_API_KEY", "test-gemini-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.api_key, "test-gemini-key");
        assert_eq!(config.chat_model, "gemini-2.5-flash");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.firecrawl_api_key, None);
        assert_eq!(config.classifier, ClassifierKind::Keyword);
        assert_eq!(config.context_turns, 10);
        assert_eq!(config.max_tool_calls, 3);
        assert_eq!(config.responder_timeout, Duration::from_secs(120));
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.prompts_path, PathBuf::from("./prompts"));
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("LLM_PROVIDER", "openai");
            env::set_var("OPENAI_API_KEY", "custom-openai-key");
            env::set_var("CHAT_MODEL", "gpt-4o-mini");
            env::set_var("TEMPERATURE", "0.2");
            env::set_var("FIRECRAWL_API_KEY", "fc-key");
            env::set_var("CLASSIFIER", "llm");
            env::set_var("CONTEXT_TURNS", "6");
            env::set_var("MAX_TOOL_CALLS", "1");
            env::set_var("RESPONDER_TIMEOUT_SECS", "30");
            env::set_var("RUST_LOG", "debug");
            env::set_var("PROMPTS_PATH", "/custom/prompts");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.api_key, "custom-openai-key");
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.firecrawl_api_key, Some("fc-key".to_string()));
        assert_eq!(config.classifier, ClassifierKind::Llm);
        assert_eq!(config.context_turns, 6);
        assert_eq!(config.max_tool_calls, 1);
        assert_eq!(config.responder_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.prompts_path, PathBuf::from("/custom/prompts"));
    }

    #[test]
    #[serial]
    fn test_config_missing_provider_key() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "openai");
            env::set_var("GEMINI_API_KEY", "not-the-right-one");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => assert!(msg.contains("OPENAI_API_KEY")),
            _ => panic!("Expected MissingVar for OPENAI_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "anthropic");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "LLM_PROVIDER"),
            _ => panic!("Expected InvalidValue for LLM_PROVIDER"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_numbers() {
        clear_env_vars();
        unsafe {
            env::set_var("GEMINI_API_KEY", "test-gemini-key");
            env::set_var("MAX_TOOL_CALLS", "three");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "MAX_TOOL_CALLS"),
            _ => panic!("Expected InvalidValue for MAX_TOOL_CALLS"),
        }

        unsafe {
            env::remove_var("MAX_TOOL_CALLS");
            env::set_var("CONTEXT_TURNS", "0");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "CONTEXT_TURNS"),
            _ => panic!("Expected InvalidValue for CONTEXT_TURNS"),
        }

        unsafe {
            env::remove_var("CONTEXT_TURNS");
            env::set_var("TEMPERATURE", "3.5");
        }
        match Config::from_env().unwrap_err() {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "TEMPERATURE"),
            _ => panic!("Expected InvalidValue for TEMPERATURE"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
            env::set_var("GEMINI_API_KEY", "test-gemini-key");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("GEMINI_API_KEY", "test-gemini-key");
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }
}
