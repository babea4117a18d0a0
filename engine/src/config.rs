//! Configuration management for the document engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with AFTAB_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

use crate::services::catalog::DEFAULT_RESULT_LIMIT;

/// Main engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Product search configuration
    pub search: SearchConfig,

    /// Document lifecycle configuration
    pub documents: DocumentsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SearchConfig {
    /// Maximum rows returned by a product search
    #[validate(range(min = 1, max = 500))]
    pub result_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentsConfig {
    /// Id prefixes whose documents drive the lifecycle of documents that
    /// reference them
    pub linked_reference_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AFTAB_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("search.result_limit", DEFAULT_RESULT_LIMIT as i64)?
            .set_default("documents.linked_reference_prefixes", vec!["PI"])?
            .set_default("logging.filter", "aftab_docs=info,engine=info")?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AFTAB_ prefix)
            .add_source(
                Environment::with_prefix("AFTAB")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("documents.linked_reference_prefixes")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the deserializer cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search
            .validate()
            .map_err(|e| ConfigError::Message(format!("search: {}", e)))?;

        if self
            .documents
            .linked_reference_prefixes
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(ConfigError::Message(
                "documents: linked reference prefixes cannot be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            search: SearchConfig::default(),
            documents: DocumentsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            linked_reference_prefixes: vec!["PI".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "aftab_docs=info,engine=info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.result_limit, 30);
        assert_eq!(config.documents.linked_reference_prefixes, vec!["PI"]);
    }

    #[test]
    fn test_result_limit_bounds() {
        let mut config = Config::default();
        config.search.result_limit = 0;
        assert!(config.validate().is_err());

        config.search.result_limit = 501;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_linked_prefix_rejected() {
        let mut config = Config::default();
        config.documents.linked_reference_prefixes.push(" ".to_string());
        assert!(config.validate().is_err());
    }
}
